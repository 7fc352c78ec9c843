use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::snapshot::AvatarState;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAvatar {
    pub name: String,
    pub state: AvatarState,
    pub last_update: Instant,
}

/// Other party members as currently rendered. Membership in the party is
/// tracked by the broker; this only decides who is drawn.
#[derive(Debug, Clone)]
pub struct RemoteRoster {
    avatars: HashMap<String, RemoteAvatar>,
    stale_after: Duration,
}

impl RemoteRoster {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            avatars: HashMap::new(),
            stale_after,
        }
    }

    pub fn upsert(&mut self, id: String, name: String, state: AvatarState, now: Instant) {
        self.avatars.insert(
            id,
            RemoteAvatar {
                name,
                state,
                last_update: now,
            },
        );
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.avatars.remove(id).is_some()
    }

    /// Drops avatars without an update for longer than the stale window and
    /// returns their ids.
    pub fn prune(&mut self, now: Instant) -> Vec<String> {
        let stale_after = self.stale_after;
        let stale: Vec<String> = self
            .avatars
            .iter()
            .filter(|(_, a)| now.saturating_duration_since(a.last_update) > stale_after)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.avatars.remove(id);
        }
        stale
    }

    pub fn get(&self, id: &str) -> Option<&RemoteAvatar> {
        self.avatars.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RemoteAvatar)> {
        self.avatars.iter()
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_avatars_are_pruned_after_five_seconds() {
        let start = Instant::now();
        let mut roster = RemoteRoster::new(Duration::from_secs(5));
        roster.upsert("1".into(), "Ann".into(), AvatarState::default(), start);
        roster.upsert(
            "2".into(),
            "Ben".into(),
            AvatarState::default(),
            start + Duration::from_secs(3),
        );

        assert!(roster.prune(start + Duration::from_secs(5)).is_empty());

        let pruned = roster.prune(start + Duration::from_millis(5_001));
        assert_eq!(pruned, vec!["1".to_string()]);
        assert!(roster.get("2").is_some());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn updates_refresh_the_stale_clock() {
        let start = Instant::now();
        let mut roster = RemoteRoster::new(Duration::from_secs(5));
        roster.upsert("1".into(), "Ann".into(), AvatarState::default(), start);
        roster.upsert(
            "1".into(),
            "Ann".into(),
            AvatarState::default(),
            start + Duration::from_secs(4),
        );
        assert!(roster.prune(start + Duration::from_secs(8)).is_empty());
    }
}
