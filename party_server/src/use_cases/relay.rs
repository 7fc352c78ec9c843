use super::broker::PartyBroker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Relays every active party's latest host snapshot to its non-host members
/// at a fixed cadence. Parties whose host stopped publishing keep relaying the
/// last snapshot until a new host overwrites it.
pub async fn state_relay_task(
    broker: Arc<Mutex<PartyBroker>>,
    relay_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(relay_interval);
    // A slow tick should not be followed by a burst of catch-up relays.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(interval_ms = relay_interval.as_millis() as u64, "state relay started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("state relay stopping");
                break;
            }
            _ = interval.tick() => {
                let sent = broker.lock().await.relay_game_states();
                if sent > 0 {
                    debug!(sent, "relayed game state ticks");
                }
            }
        }
    }
}
