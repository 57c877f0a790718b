//! Shared fixtures for the service integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::InMemDicomObject;

use cadence::{UpsScp, WorkItemRegistry};
use dimse::{
    CatalogError, CatalogMatch, InstanceCatalog, QueryModel, RemoteNode, Requestor, ScpConfig,
};

pub fn requestor() -> Requestor {
    Requestor::new("127.0.0.1", 11112)
}

/// Build a UPS dataset with the attributes the matcher evaluates
pub fn ups_dataset(uid: &str, state: &str, machine: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(uid),
    ));
    obj.put(DataElement::new(
        tags::PROCEDURE_STEP_STATE,
        VR::CS,
        PrimitiveValue::from(state),
    ));
    let code_item = InMemDicomObject::from_element_iter([DataElement::new(
        tags::CODE_VALUE,
        VR::SH,
        PrimitiveValue::from(machine),
    )]);
    obj.put(DataElement::new(
        tags::SCHEDULED_STATION_NAME_CODE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![code_item]),
    ));
    obj
}

/// Build a query identifier constraining only the procedure step state
pub fn state_query(state: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::PROCEDURE_STEP_STATE,
        VR::CS,
        PrimitiveValue::from(state),
    ));
    obj
}

/// Build a minimal composite-object dataset
pub fn composite_dataset(uid: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(uid),
    ));
    obj
}

/// Write a composite instance into `dir` and return a catalog match for it
pub fn stored_match(dir: &Path, uid: &str, transfer_syntax: &str) -> CatalogMatch {
    let path = dir.join(format!("{}.dcm", uid));
    cadence::storage::write_dataset(&path, &composite_dataset(uid)).expect("write instance");
    CatalogMatch {
        sop_instance_uid: uid.to_string(),
        identifier: composite_dataset(uid),
        path,
        transfer_syntax: transfer_syntax.to_string(),
    }
}

enum SearchOutcome {
    Matches(Vec<CatalogMatch>),
    InvalidIdentifier,
    Backend,
}

/// Catalog double returning a fixed match list, with switchable failure
/// modes and call counters
pub struct StaticCatalog {
    search_outcome: SearchOutcome,
    upsert_fails: bool,
    pub search_calls: AtomicUsize,
    pub upserts: Mutex<Vec<PathBuf>>,
}

impl StaticCatalog {
    pub fn with_matches(matches: Vec<CatalogMatch>) -> Self {
        Self::new(SearchOutcome::Matches(matches), false)
    }

    pub fn empty() -> Self {
        Self::with_matches(vec![])
    }

    pub fn invalid_identifier() -> Self {
        Self::new(SearchOutcome::InvalidIdentifier, false)
    }

    pub fn failing() -> Self {
        Self::new(SearchOutcome::Backend, false)
    }

    pub fn upsert_failing() -> Self {
        Self::new(SearchOutcome::Matches(vec![]), true)
    }

    fn new(search_outcome: SearchOutcome, upsert_fails: bool) -> Self {
        Self {
            search_outcome,
            upsert_fails,
            search_calls: AtomicUsize::new(0),
            upserts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InstanceCatalog for StaticCatalog {
    async fn search(
        &self,
        _model: QueryModel,
        _identifier: &InMemDicomObject,
    ) -> Result<Vec<CatalogMatch>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match &self.search_outcome {
            SearchOutcome::Matches(matches) => Ok(matches.clone()),
            SearchOutcome::InvalidIdentifier => Err(CatalogError::InvalidIdentifier(
                "unsupported attribute in identifier".to_string(),
            )),
            SearchOutcome::Backend => {
                Err(CatalogError::Backend("connection refused".to_string()))
            }
        }
    }

    async fn upsert(&self, _record: &InMemDicomObject, path: &Path) -> Result<(), CatalogError> {
        if self.upsert_fails {
            return Err(CatalogError::Backend("connection refused".to_string()));
        }
        self.upserts
            .lock()
            .expect("upsert log poisoned")
            .push(path.to_path_buf());
        Ok(())
    }
}

/// Service wired against temp directories and the given catalog
pub fn scp_with(
    instance_dir: &Path,
    storage_dir: &Path,
    catalog: Arc<StaticCatalog>,
) -> UpsScp {
    let mut config = ScpConfig {
        instance_dir: instance_dir.to_path_buf(),
        storage_dir: storage_dir.to_path_buf(),
        ..Default::default()
    };
    config.destinations.insert(
        "STORE_SCP".to_string(),
        RemoteNode::new("STORE_SCP", "127.0.0.1", 11113),
    );
    UpsScp::new(config, Arc::new(WorkItemRegistry::new()), catalog)
}
