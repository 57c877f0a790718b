//! cadence — request-handling core for a DICOM UPS worklist SCP
//!
//! The service core answers C-ECHO, C-FIND, C-GET, C-MOVE, C-STORE and
//! N-ACTION requests that a transport layer has already decoded into
//! [`dimse::RequestEvent`] values. Worklist queries run against an
//! in-memory registry of Unified Procedure Step work items populated
//! lazily from a directory of Part 10 files; composite-object queries and
//! retrieves delegate to an external [`dimse::InstanceCatalog`].
//!
//! Handlers emit ordered [`dimse::ScpResponse`] sequences; query and
//! retrieve handlers stream their responses and poll the event's
//! cancellation flag before each emission.

pub mod matcher;
pub mod registry;
pub mod service;
pub mod storage;

pub use registry::{WorkItem, WorkItemRegistry};
pub use service::UpsScp;
