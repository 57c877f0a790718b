//! In-memory registry of Unified Procedure Step work items

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use dimse::{DimseError, Result};

use crate::storage;

/// Filename prefix of persisted work-item records
pub const WORKITEM_FILE_PREFIX: &str = "UPS_";
/// Filename extension of persisted work-item records
pub const WORKITEM_FILE_EXT: &str = ".dcm";

/// One schedulable unit of work, keyed by its SOP Instance UID
#[derive(Debug, Clone)]
pub struct WorkItem {
    sop_instance_uid: String,
    dataset: InMemDicomObject,
}

impl WorkItem {
    /// Wrap a UPS dataset, extracting its SOP Instance UID as the key
    ///
    /// Fails when the dataset carries no usable SOP Instance UID.
    pub fn from_dataset(dataset: InMemDicomObject) -> Result<Self> {
        let sop_instance_uid = dataset
            .element(tags::SOP_INSTANCE_UID)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DimseError::dicom_object("work item dataset has no SOP Instance UID")
            })?;

        Ok(Self {
            sop_instance_uid,
            dataset,
        })
    }

    /// The registry key
    pub fn sop_instance_uid(&self) -> &str {
        &self.sop_instance_uid
    }

    /// The underlying UPS dataset
    pub fn dataset(&self) -> &InMemDicomObject {
        &self.dataset
    }

    /// Consume the work item, returning its dataset
    pub fn into_dataset(self) -> InMemDicomObject {
        self.dataset
    }
}

/// Process-lifetime collection of work items
///
/// Constructed once at the composition root and shared behind an `Arc`;
/// the interior mutex also serializes the lazy first load so concurrent
/// associations cannot race on the empty-to-populated transition.
#[derive(Debug, Default)]
pub struct WorkItemRegistry {
    items: Mutex<BTreeMap<String, WorkItem>>,
}

impl WorkItemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from a directory of persisted records
    ///
    /// No-op when the registry already holds items. Otherwise scans `dir`
    /// (single level) for files named `UPS_*.dcm` and inserts each record
    /// that deserializes; a file that cannot be read is logged and
    /// skipped without aborting the scan. Returns the number of items
    /// inserted.
    pub fn load_once(&self, dir: &Path) -> usize {
        let mut items = self.items.lock().expect("registry mutex poisoned");
        if !items.is_empty() {
            debug!("registry already holds {} work items, skipping scan", items.len());
            return 0;
        }

        let mut inserted = 0;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            if !name.starts_with(WORKITEM_FILE_PREFIX) || !name.ends_with(WORKITEM_FILE_EXT) {
                continue;
            }

            let path = entry.path();
            let item = storage::read_dataset(path).and_then(WorkItem::from_dataset);
            match item {
                Ok(item) => {
                    if let Entry::Vacant(slot) = items.entry(item.sop_instance_uid.clone()) {
                        info!("loaded work item from {}", path.display());
                        slot.insert(item);
                        inserted += 1;
                    }
                }
                Err(err) => {
                    warn!("unable to load work item from {}: {}", path.display(), err);
                }
            }
        }

        info!("{} work items loaded from {}", items.len(), dir.display());
        inserted
    }

    /// Insert a work item, keyed by its SOP Instance UID
    ///
    /// Idempotent: returns false and leaves the existing entry untouched
    /// when the key is already present.
    pub fn add(&self, item: WorkItem) -> bool {
        let mut items = self.items.lock().expect("registry mutex poisoned");
        match items.entry(item.sop_instance_uid.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
        }
    }

    /// Remove the work item with the given SOP Instance UID
    ///
    /// Idempotent: returns false when no such item exists.
    pub fn remove(&self, sop_instance_uid: &str) -> bool {
        let mut items = self.items.lock().expect("registry mutex poisoned");
        items.remove(sop_instance_uid).is_some()
    }

    /// Snapshot of the current work items
    pub fn all(&self) -> Vec<WorkItem> {
        let items = self.items.lock().expect("registry mutex poisoned");
        items.values().cloned().collect()
    }

    /// Number of registered work items
    pub fn len(&self) -> usize {
        self.items.lock().expect("registry mutex poisoned").len()
    }

    /// Whether the registry holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
