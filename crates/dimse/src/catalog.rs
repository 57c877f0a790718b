//! Composite-object catalog collaborator seam
//!
//! The catalog indexes stored composite objects (images, documents) and is
//! provided by the hosting application; the service core only calls
//! [`InstanceCatalog::search`] and [`InstanceCatalog::upsert`] and treats
//! everything beyond a match's identifier, location and transfer context
//! as opaque.

use async_trait::async_trait;
use dicom_object::InMemDicomObject;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::QueryModel;

/// Error types surfaced by a catalog implementation
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The query identifier is malformed or unsupported for the model
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Backend failure while querying or updating the catalog
    #[error("Catalog backend error: {0}")]
    Backend(String),
}

/// One catalog match for a query or retrieve request
#[derive(Debug, Clone)]
pub struct CatalogMatch {
    /// SOP Instance UID of the matched object
    pub sop_instance_uid: String,

    /// Response identifier pre-built for query responses
    pub identifier: InMemDicomObject,

    /// Filesystem location of the stored object
    pub path: PathBuf,

    /// Negotiated transfer syntax UID for the stored object
    pub transfer_syntax: String,
}

/// Query and update operations on the composite-object catalog
///
/// Each call is one logical unit of work: the implementation owns its
/// transaction/session discipline and must release the unit of work on
/// every exit path, rolling back before surfacing an error.
#[async_trait]
pub trait InstanceCatalog: Send + Sync {
    /// Search the catalog with the given identifier as the query
    ///
    /// Returns the ordered match list backing both the announced
    /// sub-operation count and the emitted stream of a retrieve.
    async fn search(
        &self,
        model: QueryModel,
        identifier: &InMemDicomObject,
    ) -> Result<Vec<CatalogMatch>, CatalogError>;

    /// Insert or update the catalog entry for a stored record
    ///
    /// Idempotent by SOP Instance UID: an existing entry is updated, not
    /// duplicated.
    async fn upsert(&self, record: &InMemDicomObject, path: &Path) -> Result<(), CatalogError>;
}
