//! C-FIND handling

use async_stream::stream;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use futures::stream::BoxStream;
use tracing::{error, info};

use dimse::{CatalogError, QueryModel, RequestEvent, ScpResponse, ServiceStatus};

use crate::matcher;
use crate::service::UpsScp;

impl UpsScp {
    /// Handle a hierarchical C-FIND query
    ///
    /// Worklist queries run against the lazily loaded work-item registry;
    /// composite-object queries delegate to the catalog. Matches stream
    /// as pending responses, each preceded by a cancellation check, and a
    /// clean stream ends with a single Success status.
    pub fn handle_find<'a>(
        &'a self,
        event: &'a RequestEvent,
        model: QueryModel,
        identifier: &'a InMemDicomObject,
    ) -> BoxStream<'a, ScpResponse> {
        Box::pin(stream! {
            self.log_request(event);

            if model.is_worklist() {
                self.registry().load_once(&self.config.instance_dir);

                for item in matcher::search(self.registry(), identifier) {
                    if event.is_cancelled() {
                        info!("C-FIND cancelled by the requester");
                        yield ScpResponse::Status(ServiceStatus::Canceled);
                        return;
                    }
                    yield ScpResponse::Match(Box::new(item.into_dataset()));
                }
                yield ScpResponse::Status(ServiceStatus::Success);
                return;
            }

            let matches = match self.catalog.search(model, identifier).await {
                Ok(matches) => matches,
                Err(CatalogError::InvalidIdentifier(err)) => {
                    error!("Invalid C-FIND identifier received: {}", err);
                    yield ScpResponse::Status(ServiceStatus::InvalidIdentifier);
                    return;
                }
                Err(err) => {
                    error!("Catalog query failed: {}", err);
                    yield ScpResponse::Status(ServiceStatus::UnableToProcess);
                    return;
                }
            };

            for m in matches {
                if event.is_cancelled() {
                    info!("C-FIND cancelled by the requester");
                    yield ScpResponse::Status(ServiceStatus::Canceled);
                    return;
                }

                let mut response = m.identifier;
                response.put(DataElement::new(
                    tags::RETRIEVE_AE_TITLE,
                    VR::AE,
                    PrimitiveValue::from(self.config.local_aet.as_str()),
                ));
                yield ScpResponse::Match(Box::new(response));
            }
            yield ScpResponse::Status(ServiceStatus::Success);
        })
    }
}
