// Party broker: the only owner of party records. Clients change them through
// the request methods below and observe them through pushed `PartyEvent`s.

use super::types::{CreatedParty, Delivery, Outbox, PartyEvent, RemotePlayer};
use crate::domain::party::{generate_code, normalize_code, validate_player_name};
use crate::domain::{ConnId, Party, PartyError, PlayerState, SharedGameState};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct PartyBroker {
    /// Party records keyed by normalized code.
    parties: HashMap<String, Party>,
    /// Which party each connection belongs to.
    memberships: HashMap<ConnId, String>,
    /// Outbound event queues for connected clients.
    outboxes: HashMap<ConnId, Outbox>,
}

impl PartyBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, conn_id: ConnId, outbox: Outbox) {
        self.outboxes.insert(conn_id, outbox);
    }

    /// Drops the connection and runs the same departure path as `leave_party`.
    pub fn disconnect(&mut self, conn_id: ConnId) {
        self.leave_party(conn_id);
        self.outboxes.remove(&conn_id);
    }

    pub fn party(&self, code: &str) -> Option<&Party> {
        self.parties.get(code)
    }

    pub fn party_of(&self, conn_id: ConnId) -> Option<&Party> {
        self.memberships
            .get(&conn_id)
            .and_then(|code| self.parties.get(code))
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    pub fn create_party(
        &mut self,
        conn_id: ConnId,
        player_name: &str,
    ) -> Result<CreatedParty, PartyError> {
        let name = validate_player_name(player_name)?;
        // A connection belongs to at most one party.
        self.leave_party(conn_id);

        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = generate_code(&mut rng);
            if !self.parties.contains_key(&candidate) {
                break candidate;
            }
        };

        let party = Party::new(code.clone(), conn_id, name);
        info!(party_code = %code, conn_id, "party created");
        self.parties.insert(code.clone(), party.clone());
        self.memberships.insert(conn_id, code.clone());

        Ok(CreatedParty { code, party })
    }

    pub fn join_party(
        &mut self,
        conn_id: ConnId,
        party_code: &str,
        player_name: &str,
    ) -> Result<Party, PartyError> {
        let code = normalize_code(party_code)?;
        let name = validate_player_name(player_name)?;
        let target = self.parties.get(&code).ok_or(PartyError::NotFound)?;
        if self.memberships.get(&conn_id) == Some(&code) {
            // Re-joining your own party is a no-op.
            return Ok(target.clone());
        }
        // A rejected join must leave the current membership untouched.
        target.check_admission()?;
        self.leave_party(conn_id);

        let party = self.parties.get_mut(&code).ok_or(PartyError::NotFound)?;
        party.add_member(conn_id, name)?;
        self.memberships.insert(conn_id, code.clone());
        info!(party_code = %code, conn_id, members = party.members.len(), "player joined party");

        let snapshot = party.clone();
        self.broadcast(&snapshot, PartyEvent::PartyUpdated(snapshot.clone()));
        Ok(snapshot)
    }

    /// Removes the connection from its party; deletes empty parties and
    /// migrates the host when needed. A no-op for connections outside a party.
    pub fn leave_party(&mut self, conn_id: ConnId) {
        let Some(code) = self.memberships.remove(&conn_id) else {
            return;
        };
        let Some(party) = self.parties.get_mut(&code) else {
            return;
        };
        let Some(departure) = party.remove_member(conn_id) else {
            return;
        };
        info!(party_code = %code, conn_id, name = %departure.member.name, "player left party");

        if party.is_empty() {
            self.parties.remove(&code);
            info!(party_code = %code, "party deleted (empty)");
            return;
        }

        if let Some(new_host) = departure.new_host {
            info!(party_code = %code, new_host, "host migrated");
        }

        let snapshot = party.clone();
        if snapshot.is_started() {
            self.broadcast(
                &snapshot,
                PartyEvent::PlayerDisconnected { player_id: conn_id },
            );
        }
        self.broadcast(&snapshot, PartyEvent::PartyUpdated(snapshot.clone()));
    }

    pub fn start_game(&mut self, conn_id: ConnId) -> Result<(), PartyError> {
        let code = self
            .memberships
            .get(&conn_id)
            .cloned()
            .ok_or(PartyError::NotInParty)?;
        let party = self.parties.get_mut(&code).ok_or(PartyError::NotFound)?;
        party.start(conn_id)?;

        let host = party.host;
        let members: Vec<ConnId> = party.members.iter().map(|m| m.id).collect();
        info!(party_code = %code, host, players = members.len(), "game started");
        for member in members {
            self.deliver(
                member,
                PartyEvent::GameStarted {
                    is_host: member == host,
                },
            );
        }
        Ok(())
    }

    /// Records the sender's avatar state and relays it to the rest of the party.
    pub fn player_update(&mut self, conn_id: ConnId, state: PlayerState) {
        let Some(party) = self.active_party_mut(conn_id) else {
            return;
        };
        if !party.record_player_state(conn_id, state.clone()) {
            return;
        }
        let Some(name) = party.member(conn_id).map(|m| m.name.clone()) else {
            return;
        };

        let snapshot = party.clone();
        let update = RemotePlayer {
            id: conn_id,
            name,
            state,
        };
        self.broadcast_except(&snapshot, conn_id, PartyEvent::PlayerUpdate(update));
    }

    pub fn request_player_states(&self, conn_id: ConnId) -> Result<Vec<RemotePlayer>, PartyError> {
        let party = self.party_of(conn_id).ok_or(PartyError::NotInParty)?;
        if !party.is_started() {
            return Err(PartyError::NotInParty);
        }
        Ok(party
            .others(conn_id)
            .map(|m| RemotePlayer {
                id: m.id,
                name: m.name.clone(),
                state: m.state.clone(),
            })
            .collect())
    }

    /// Stores the host's authoritative snapshot. Anything from a non-host is
    /// dropped without a reply.
    pub fn host_game_state(&mut self, conn_id: ConnId, state: SharedGameState) -> bool {
        let Some(party) = self.active_party_mut(conn_id) else {
            return false;
        };
        let accepted = party.record_host_state(conn_id, state);
        if !accepted {
            debug!(conn_id, party_code = %party.code, "dropping game state from non-host");
        }
        accepted
    }

    pub fn share_xp(&mut self, conn_id: ConnId, amount: f32) {
        if !amount.is_finite() || amount <= 0.0 {
            debug!(conn_id, amount, "ignoring non-positive xp share");
            return;
        }
        let Some(party) = self.active_party_mut(conn_id) else {
            return;
        };
        let Some(from_player) = party.member(conn_id).map(|m| m.name.clone()) else {
            return;
        };
        let snapshot = party.clone();
        self.broadcast_except(
            &snapshot,
            conn_id,
            PartyEvent::ReceiveXp {
                amount,
                from_player,
            },
        );
    }

    /// Pushes each active party's latest host snapshot to its non-host members.
    pub fn relay_game_states(&self) -> usize {
        let mut sent = 0;
        for party in self.parties.values() {
            if !party.is_started() {
                continue;
            }
            let Some(state) = party.shared_state.as_ref() else {
                continue;
            };
            let shared = Arc::new(state.clone());
            for member in party.non_host_members() {
                if self.deliver(member.id, PartyEvent::GameStateTick(shared.clone())) {
                    sent += 1;
                }
            }
        }
        sent
    }

    fn active_party_mut(&mut self, conn_id: ConnId) -> Option<&mut Party> {
        let code = self.memberships.get(&conn_id)?;
        self.parties.get_mut(code).filter(|p| p.is_started())
    }

    fn broadcast(&self, party: &Party, event: PartyEvent) {
        for member in &party.members {
            self.deliver(member.id, event.clone());
        }
    }

    fn broadcast_except(&self, party: &Party, skip: ConnId, event: PartyEvent) {
        for member in party.others(skip) {
            self.deliver(member.id, event.clone());
        }
    }

    fn deliver(&self, conn_id: ConnId, event: PartyEvent) -> bool {
        let Some(outbox) = self.outboxes.get(&conn_id) else {
            return false;
        };
        match outbox.deliver(event) {
            Delivery::Sent => true,
            Delivery::Dropped => {
                debug!(conn_id, "stream queue full; update shed");
                false
            }
            Delivery::Closed => {
                debug!(conn_id, "outbound queue closed");
                false
            }
        }
    }
}
