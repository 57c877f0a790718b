//! DIMSE (DICOM Message Service Element) service contracts
//!
//! This crate defines the protocol-facing surface shared between a DIMSE
//! transport layer and the cadence service core: typed request events,
//! response-stream items, the status taxonomy with its numeric code
//! mapping, service configuration, and the catalog collaborator seam.
//!
//! The transport layer (association handling, PDU framing, timers) is a
//! separate concern: it decodes inbound messages into [`RequestEvent`]
//! values and encodes the [`ScpResponse`] sequence a handler emits.

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogMatch, InstanceCatalog};
pub use config::{RemoteNode, ScpConfig};
pub use error::{DimseError, Result};
pub use event::{ActionRequest, ActionResponse, RequestEvent, RequestPayload, Requestor};
pub use types::{DimseCommand, MoveDestination, QueryModel, ScpResponse, ServiceStatus};

/// Default DICOM port (non-TLS)
pub const DEFAULT_DIMSE_PORT: u16 = 11112;

/// Maximum number of presentation contexts announced for a C-MOVE
pub const MAX_MOVE_CONTEXTS: usize = 128;
