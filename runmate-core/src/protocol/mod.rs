pub mod endpoint;
pub mod inbound;
pub mod outbound;
pub mod transport;
pub mod wire;

pub use endpoint::{EndpointError, RelayEndpoint, DEFAULT_RELAY_ENDPOINT};
pub use inbound::{DecodeError, InboundEvent, INBOUND_EVENTS};
pub use outbound::OutboundEvent;
pub use transport::{Transport, TransportError};
pub use wire::WireEvent;
