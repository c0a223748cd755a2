#![doc = include_str!("../README.md")]

mod credentials;
pub mod deep_link;
mod delivery;
mod dispatcher;
mod executor;
pub mod message;
pub mod model;
mod registry;
mod settings;
pub mod surface;
mod transport;

#[cfg(test)]
mod test_support;

pub use credentials::CredentialStore;
pub use deep_link::{DeepLinkError, DeepLinkHandler};
pub use delivery::{Delivery, DeliveryError};
pub use dispatcher::{BridgeController, MessageOutcome};
pub use executor::{build_outbound_request, ExecuteError, RequestExecutor};
pub use message::{InboundMessage, ScriptMessage};
pub use model::{CookieDescriptor, HttpMethod, Instruction, RequestDescriptor, ResponseEnvelope};
pub use registry::{AdmitError, InstructionRegistry};
pub use settings::BridgeSettings;
pub use surface::{Surface, SurfaceError, UrlOpener};
pub use transport::{
    HttpTransport, OutboundRequest, ReqwestTransport, TransportError, TransportResponse,
};
