use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("PARTY_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub fn bind_host() -> [u8; 4] {
    env::var("PARTY_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse::<std::net::Ipv4Addr>().ok())
        .map(|ip| ip.octets())
        .unwrap_or([127, 0, 0, 1])
}

// Per-connection bound on queued avatar and game-state updates.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

// Cadence at which host snapshots are fanned out to party members.
pub const STATE_RELAY_INTERVAL: Duration = Duration::from_millis(100);
