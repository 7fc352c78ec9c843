// Network adapter modules split by the client websocket vs read-only HTTP routes.

pub mod client;
pub mod parties;

pub use client::ws_handler;
pub use parties::party_handler;
