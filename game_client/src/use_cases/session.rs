use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::simulation::{Authority, SimEvent, Simulation};
use crate::domain::errors::ClientError;
use crate::domain::party::PartyNotice;
use crate::domain::ports::{Frontend, PartyLink};
use crate::domain::roster::RemoteRoster;
use crate::domain::snapshot::SimPhase;

/// Cadences of the session loop.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// One simulation tick per frame; `dt` is this interval in seconds.
    pub frame_interval: Duration,
    pub avatar_interval: Duration,
    pub host_state_interval: Duration,
    pub prune_interval: Duration,
    /// Remote avatars silent for longer than this are dropped from the roster.
    pub stale_after: Duration,
    /// Stop after this long even if the player is still alive.
    pub run_for: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            avatar_interval: Duration::from_millis(50),
            host_state_interval: Duration::from_millis(100),
            prune_interval: Duration::from_secs(1),
            stale_after: Duration::from_secs(5),
            run_for: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOutcome {
    pub game_over: bool,
    pub level: u32,
    pub game_time: f32,
    pub frames: u64,
    /// Remote avatars still on the roster when the loop ended.
    pub remote_players: usize,
}

enum Wake {
    Shutdown,
    Frame,
    Avatar,
    HostState,
    Prune,
    Notice(PartyNotice),
}

async fn next_notice(notices: &mut Option<mpsc::Receiver<PartyNotice>>) -> PartyNotice {
    match notices.as_mut() {
        Some(rx) => rx.recv().await.unwrap_or(PartyNotice::Closed),
        None => std::future::pending().await,
    }
}

/// Party half of a session. Dropped as a unit once the broker link dies.
struct PartySide {
    link: Arc<dyn PartyLink>,
    notices: Option<mpsc::Receiver<PartyNotice>>,
    local_id: String,
}

/// Drives `sim` at a fixed frame rate until game over, shutdown or the
/// configured run time. Network traffic is applied between ticks only.
pub async fn run_session<F: Frontend + ?Sized>(
    sim: &mut Simulation,
    link: Option<Arc<dyn PartyLink>>,
    notices: Option<mpsc::Receiver<PartyNotice>>,
    frontend: &mut F,
    cfg: SessionConfig,
    shutdown: Arc<Notify>,
) -> SessionOutcome {
    let mut party = link.map(|link| PartySide {
        local_id: link.local_id().to_string(),
        link,
        notices,
    });
    let mut roster = RemoteRoster::new(cfg.stale_after);

    if let Some(party) = party.as_ref() {
        match party.link.request_player_states().await {
            Ok(players) => {
                let now = std::time::Instant::now();
                for player in players {
                    roster.upsert(player.id, player.name, player.state, now);
                }
                debug!(count = roster.len(), "roster seeded");
            }
            Err(err) => warn!(error = %err, "failed to fetch party player states"),
        }
    }

    let mut frame_tick = tokio::time::interval(cfg.frame_interval);
    let mut avatar_tick = tokio::time::interval(cfg.avatar_interval);
    let mut host_tick = tokio::time::interval(cfg.host_state_interval);
    let mut prune_tick = tokio::time::interval(cfg.prune_interval);
    for interval in [&mut frame_tick, &mut avatar_tick, &mut host_tick, &mut prune_tick] {
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let dt = cfg.frame_interval.as_secs_f32();
    let deadline = cfg.run_for.map(|d| Instant::now() + d);
    let mut frames: u64 = 0;
    let mut game_over = false;

    info!(authority = ?sim.authority(), "session started");

    loop {
        let connected = party.is_some();
        let listening = party.as_ref().is_some_and(|p| p.notices.is_some());
        let mut notices = party.as_mut().and_then(|p| p.notices.take());

        let wake = tokio::select! {
            _ = shutdown.notified() => Wake::Shutdown,
            _ = frame_tick.tick() => Wake::Frame,
            _ = avatar_tick.tick(), if connected => Wake::Avatar,
            _ = host_tick.tick(), if connected => Wake::HostState,
            _ = prune_tick.tick() => Wake::Prune,
            notice = next_notice(&mut notices), if listening => Wake::Notice(notice),
        };

        if let Some(p) = party.as_mut() {
            p.notices = notices;
        }

        let result = match wake {
            Wake::Shutdown => {
                info!("session shutdown requested");
                break;
            }
            Wake::Frame => {
                frames += 1;
                if sim.phase() == SimPhase::LevelingUp {
                    let offers = sim.offers();
                    if let Some(choice) = frontend.choose_skill(&offers) {
                        if let Err(err) = sim.choose_skill(choice) {
                            warn!(error = %err, ?choice, "skill choice rejected");
                        }
                    }
                }

                let input = frontend.input(&sim.frame());
                let mut result = Ok(());
                for event in sim.tick(input, dt) {
                    match event {
                        SimEvent::XpGained(amount) => {
                            if let Some(p) = party.as_ref() {
                                result = result.and(p.link.share_xp(amount).await);
                            }
                        }
                        SimEvent::LeveledUp { level } => info!(level, "level up"),
                        SimEvent::GameOver => game_over = true,
                    }
                }
                frontend.present(&sim.frame(), &roster);

                if game_over || deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
                result
            }
            Wake::Avatar => match party.as_ref() {
                Some(p) if sim.phase() != SimPhase::GameOver => {
                    p.link.publish_avatar(sim.avatar_state()).await
                }
                _ => Ok(()),
            },
            Wake::HostState => match (party.as_ref(), sim.host_snapshot()) {
                (Some(p), Some(snapshot)) if sim.phase() != SimPhase::GameOver => {
                    p.link.publish_host_state(snapshot).await
                }
                _ => Ok(()),
            },
            Wake::Prune => {
                for id in roster.prune(std::time::Instant::now()) {
                    debug!(player_id = %id, "stale avatar pruned");
                }
                Ok(())
            }
            Wake::Notice(notice) => match party.as_ref() {
                Some(p) => apply_notice(sim, &mut roster, &p.local_id, notice),
                None => Ok(()),
            },
        };

        match result {
            Ok(()) => {}
            Err(ClientError::Closed) => {
                warn!("party link closed; continuing solo");
                party = None;
                roster = RemoteRoster::new(cfg.stale_after);
                sim.set_authority(Authority::Solo);
            }
            Err(err) => debug!(error = %err, "party send failed"),
        }
    }

    let outcome = SessionOutcome {
        game_over,
        level: sim.player().level,
        game_time: sim.game_time(),
        frames,
        remote_players: roster.len(),
    };
    info!(
        game_over = outcome.game_over,
        level = outcome.level,
        game_time = outcome.game_time,
        frames = outcome.frames,
        "session ended"
    );
    outcome
}

/// Applies one broker push between ticks. `Closed` comes back as an error so
/// the loop can drop the party side.
fn apply_notice(
    sim: &mut Simulation,
    roster: &mut RemoteRoster,
    local_id: &str,
    notice: PartyNotice,
) -> Result<(), ClientError> {
    match notice {
        PartyNotice::PartyUpdated(party) => {
            if party.is_host(local_id) && sim.authority() == Authority::Follower {
                info!(party_code = %party.code, "promoted to host");
                sim.set_authority(Authority::Host);
            }
        }
        PartyNotice::GameStarted { is_host } => {
            sim.set_authority(if is_host {
                Authority::Host
            } else {
                Authority::Follower
            });
        }
        PartyNotice::GameStateTick(state) => {
            sim.apply_authoritative(&state);
        }
        PartyNotice::PlayerUpdate(player) => {
            if player.id != local_id {
                roster.upsert(player.id, player.name, player.state, std::time::Instant::now());
            }
        }
        PartyNotice::ReceiveXp {
            amount,
            from_player,
        } => {
            let levels = sim.receive_shared_xp(amount);
            debug!(amount, from_player = %from_player, levels, "shared xp received");
        }
        PartyNotice::PlayerDisconnected { player_id } => {
            if roster.remove(&player_id) {
                debug!(player_id = %player_id, "avatar removed");
            }
        }
        PartyNotice::Closed => return Err(ClientError::Closed),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EnemyKind, MoveInput};
    use crate::domain::party::{PartyPlayerView, PartyView, RemotePlayerView};
    use crate::domain::snapshot::{
        AuthoritativeEnemy, AuthoritativeState, AvatarState, RenderFrame,
    };
    use crate::domain::systems::progression::{Enhancement, SkillChoice, SkillOffer};
    use crate::domain::entities::Element;
    use crate::use_cases::simulation::SimConfig;
    use async_trait::async_trait;
    use glam::Vec2;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        avatars: usize,
        host_states: usize,
        xp: Vec<f32>,
    }

    struct FakeLink {
        id: String,
        others: Vec<RemotePlayerView>,
        recorded: Mutex<Recorded>,
    }

    impl FakeLink {
        fn new(id: &str, others: Vec<RemotePlayerView>) -> Arc<Self> {
            Arc::new(Self {
                id: id.into(),
                others,
                recorded: Mutex::new(Recorded::default()),
            })
        }
    }

    #[async_trait]
    impl PartyLink for FakeLink {
        fn local_id(&self) -> &str {
            &self.id
        }

        async fn publish_avatar(&self, _state: AvatarState) -> Result<(), ClientError> {
            self.recorded.lock().unwrap().avatars += 1;
            Ok(())
        }

        async fn publish_host_state(&self, _state: AuthoritativeState) -> Result<(), ClientError> {
            self.recorded.lock().unwrap().host_states += 1;
            Ok(())
        }

        async fn share_xp(&self, amount: f32) -> Result<(), ClientError> {
            self.recorded.lock().unwrap().xp.push(amount);
            Ok(())
        }

        async fn request_player_states(&self) -> Result<Vec<RemotePlayerView>, ClientError> {
            Ok(self.others.clone())
        }
    }

    /// Stands still and takes the first offer, adding Fire where required.
    struct Idle;

    impl Frontend for Idle {
        fn input(&mut self, _frame: &RenderFrame) -> MoveInput {
            MoveInput::default()
        }

        fn choose_skill(&mut self, offers: &[SkillOffer]) -> Option<SkillChoice> {
            offers.first().map(|offer| SkillChoice {
                kind: offer.kind,
                enhancement: offer
                    .enhancement_required
                    .then_some(Enhancement::Element(Element::Fire)),
            })
        }

        fn present(&mut self, _frame: &RenderFrame, _others: &RemoteRoster) {}
    }

    fn quick(run_for_ms: u64) -> SessionConfig {
        SessionConfig {
            run_for: Some(Duration::from_millis(run_for_ms)),
            ..SessionConfig::default()
        }
    }

    fn follower() -> Simulation {
        Simulation::new(SimConfig {
            seed: 3,
            authority: Authority::Follower,
            ..SimConfig::default()
        })
    }

    fn view(id: &str, name: &str) -> RemotePlayerView {
        RemotePlayerView {
            id: id.into(),
            name: name.into(),
            state: AvatarState::default(),
        }
    }

    #[tokio::test]
    async fn solo_session_runs_until_the_deadline() {
        let mut sim = Simulation::new(SimConfig::default());
        let outcome = run_session(
            &mut sim,
            None,
            None,
            &mut Idle,
            quick(200),
            Arc::new(Notify::new()),
        )
        .await;
        assert!(!outcome.game_over);
        assert!(outcome.frames > 1);
        assert!(sim.game_time() > 0.0);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let mut sim = Simulation::new(SimConfig::default());
        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();
        let outcome = run_session(
            &mut sim,
            None,
            None,
            &mut Idle,
            SessionConfig::default(),
            shutdown,
        )
        .await;
        assert!(!outcome.game_over);
    }

    #[tokio::test]
    async fn follower_applies_notices_between_ticks() {
        let link = FakeLink::new("me", vec![view("a", "Ann")]);
        let (tx, rx) = mpsc::channel(16);
        tx.send(PartyNotice::GameStateTick(AuthoritativeState {
            enemies: vec![AuthoritativeEnemy {
                id: "e1".into(),
                position: Vec2::new(1500.0, 1500.0),
                health: 30.0,
                max_health: None,
                kind: Some(EnemyKind::Demon),
                radius: None,
                speed: None,
                damage: None,
                xp_value: None,
            }],
            game_time: 40.0,
        }))
        .await
        .unwrap();
        tx.send(PartyNotice::PlayerUpdate(view("b", "Bo"))).await.unwrap();
        tx.send(PartyNotice::PlayerUpdate(view("me", "Me"))).await.unwrap();
        tx.send(PartyNotice::ReceiveXp {
            amount: 25.0,
            from_player: "Ann".into(),
        })
        .await
        .unwrap();

        let mut sim = follower();
        let dyn_link: Arc<dyn PartyLink> = link.clone();
        let outcome = run_session(
            &mut sim,
            Some(dyn_link),
            Some(rx),
            &mut Idle,
            quick(300),
            Arc::new(Notify::new()),
        )
        .await;

        assert_eq!(outcome.level, 3);
        assert_eq!(sim.pending_choices(), 0);
        assert_eq!(outcome.remote_players, 2);
        assert!(sim.game_time() >= 40.0);
        assert_eq!(sim.enemies().len(), 1);

        let recorded = link.recorded.lock().unwrap();
        assert!(recorded.avatars > 0);
        assert_eq!(recorded.host_states, 0);
        drop(tx);
    }

    #[tokio::test]
    async fn party_update_naming_us_promotes_to_host() {
        let link = FakeLink::new("me", Vec::new());
        let (tx, rx) = mpsc::channel(4);
        tx.send(PartyNotice::PartyUpdated(PartyView {
            code: "ABCDEF".into(),
            host: "me".into(),
            players: vec![PartyPlayerView {
                id: "me".into(),
                name: "Me".into(),
                level: 1,
                health: 100.0,
                is_host: true,
            }],
            game_started: true,
        }))
        .await
        .unwrap();

        let mut sim = follower();
        let dyn_link: Arc<dyn PartyLink> = link.clone();
        run_session(
            &mut sim,
            Some(dyn_link),
            Some(rx),
            &mut Idle,
            quick(400),
            Arc::new(Notify::new()),
        )
        .await;

        assert_eq!(sim.authority(), Authority::Host);
        assert!(link.recorded.lock().unwrap().host_states > 0);
        drop(tx);
    }

    #[tokio::test]
    async fn closed_link_falls_back_to_solo() {
        let link = FakeLink::new("me", vec![view("a", "Ann")]);
        let (tx, rx) = mpsc::channel(4);
        tx.send(PartyNotice::Closed).await.unwrap();

        let mut sim = follower();
        let dyn_link: Arc<dyn PartyLink> = link.clone();
        let outcome = run_session(
            &mut sim,
            Some(dyn_link),
            Some(rx),
            &mut Idle,
            quick(200),
            Arc::new(Notify::new()),
        )
        .await;

        assert_eq!(sim.authority(), Authority::Solo);
        assert_eq!(outcome.remote_players, 0);
    }
}
