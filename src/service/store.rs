//! C-STORE handling

use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use tracing::{error, info, warn};

use dimse::{RequestEvent, ServiceStatus};

use crate::service::UpsScp;
use crate::storage;

impl UpsScp {
    /// Handle a C-STORE request
    ///
    /// The inbound dataset is persisted under the storage directory keyed
    /// by its SOP Instance UID, then upserted into the catalog. The file
    /// write alone decides the response status: a catalog fault is logged
    /// and the stored instance still counts as a success.
    pub async fn handle_store(
        &self,
        event: &RequestEvent,
        dataset: &InMemDicomObject,
    ) -> ServiceStatus {
        self.log_request(event);

        // Drop any command or file meta group elements that were included
        let dataset = storage::strip_file_meta(dataset);

        let sop_instance_uid = match dataset
            .element(tags::SOP_INSTANCE_UID)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(uid) => uid,
            None => {
                error!("Unable to decode the dataset: no SOP Instance UID");
                return ServiceStatus::CannotUnderstand;
            }
        };

        info!("SOP Instance UID '{}'", sop_instance_uid);

        let path = self.config.storage_dir.join(&sop_instance_uid);
        if path.exists() {
            warn!("Instance already exists in storage directory, overwriting");
        }

        if let Err(err) = storage::write_dataset(&path, &dataset) {
            error!("Failed writing instance to storage directory: {}", err);
            return ServiceStatus::OutOfResources;
        }
        info!("Instance written to storage directory");

        // Catalog entries are keyed by absolute path
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        match self.catalog.upsert(&dataset, &path).await {
            Ok(()) => info!("Catalog entry for instance added or updated"),
            Err(err) => error!("Unable to add instance to the catalog: {}", err),
        }

        ServiceStatus::Success
    }
}
