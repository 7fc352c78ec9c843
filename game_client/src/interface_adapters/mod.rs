// Interface adapters: broker wire protocol and the websocket client.

pub mod net;
pub mod protocol;

pub use net::{BrokerClient, ChannelCapacity, normalize_broker_url};
