use std::{env, time::Duration};

use crate::domain::Character;

// Runtime/client configuration (not gameplay tuning).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Solo,
    Host,
    Join,
}

pub fn broker_url() -> String {
    env::var("BROKER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/ws".to_string())
}

pub fn player_name() -> String {
    env::var("PLAYER_NAME").unwrap_or_else(|_| "Player".to_string())
}

pub fn game_mode() -> GameMode {
    match env::var("GAME_MODE")
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Ok("host") => GameMode::Host,
        Ok("join") => GameMode::Join,
        _ => GameMode::Solo,
    }
}

pub fn party_code() -> Option<String> {
    env::var("PARTY_CODE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn character() -> Character {
    env::var("CHARACTER")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

// Fixed seed for reproducible runs; random otherwise.
pub fn sim_seed() -> u64 {
    env::var("SIM_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(rand::random)
}

pub fn request_timeout() -> Duration {
    env::var("REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

// How long a host waits in the lobby for others before starting.
pub fn host_start_delay() -> Duration {
    env::var("HOST_START_DELAY_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(3))
}

// Unset means play until death or ctrl-c.
pub fn run_for() -> Option<Duration> {
    env::var("RUN_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
pub const AVATAR_INTERVAL: Duration = Duration::from_millis(50);
pub const HOST_STATE_INTERVAL: Duration = Duration::from_millis(100);
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(1);
pub const STALE_AVATAR_AFTER: Duration = Duration::from_secs(5);

pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;
pub const NOTICE_CHANNEL_CAPACITY: usize = 256;
