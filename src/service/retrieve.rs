//! C-GET and C-MOVE handling
//!
//! Both bulk retrieves share one sub-protocol: the ordered match list is
//! obtained from the catalog exactly once per invocation, so the
//! announced sub-operation count and the emitted stream are backed by
//! the same list. A record that fails to read yields one failure
//! response for that item and the loop continues.

use async_stream::stream;
use dicom_object::InMemDicomObject;
use futures::stream::BoxStream;
use tracing::{error, info};

use dimse::{
    CatalogError, CatalogMatch, MoveDestination, QueryModel, RequestEvent, ScpResponse,
    ServiceStatus,
};

use crate::service::{UpsScp, TIMESTAMP_FORMAT};
use crate::storage;

impl UpsScp {
    /// Handle a C-GET bulk retrieve
    pub fn handle_get<'a>(
        &'a self,
        event: &'a RequestEvent,
        model: QueryModel,
        identifier: &'a InMemDicomObject,
    ) -> BoxStream<'a, ScpResponse> {
        Box::pin(stream! {
            self.log_request(event);

            let matches = match self.catalog.search(model, identifier).await {
                Ok(matches) => matches,
                Err(CatalogError::InvalidIdentifier(err)) => {
                    error!("Invalid C-GET identifier received: {}", err);
                    yield ScpResponse::Status(ServiceStatus::InvalidIdentifier);
                    return;
                }
                Err(err) => {
                    error!("Catalog query failed: {}", err);
                    yield ScpResponse::Status(ServiceStatus::UnableToProcess);
                    return;
                }
            };

            for await response in self.stream_matches(event, matches) {
                yield response;
            }
        })
    }

    /// Handle a C-MOVE bulk retrieve
    ///
    /// The destination name is resolved before anything else; an
    /// unconfigured destination ends the stream immediately with an empty
    /// destination response. Otherwise the resolved address is announced
    /// together with the transfer contexts required by the match set,
    /// followed by the shared count/record stream.
    pub fn handle_move<'a>(
        &'a self,
        event: &'a RequestEvent,
        model: QueryModel,
        identifier: &'a InMemDicomObject,
        destination: &'a str,
    ) -> BoxStream<'a, ScpResponse> {
        Box::pin(stream! {
            info!(
                "Received C-MOVE request from {}:{} at {} with move destination {}",
                event.requestor.address,
                event.requestor.port,
                event.timestamp.format(TIMESTAMP_FORMAT),
                destination
            );

            let node = match self.config.destination(destination) {
                Some(node) => node,
                None => {
                    info!("No matching move destination in the configuration");
                    yield ScpResponse::Destination(None);
                    return;
                }
            };

            let matches = match self.catalog.search(model, identifier).await {
                Ok(matches) => matches,
                Err(CatalogError::InvalidIdentifier(err)) => {
                    error!("Invalid C-MOVE identifier received: {}", err);
                    yield ScpResponse::Status(ServiceStatus::InvalidIdentifier);
                    return;
                }
                Err(err) => {
                    error!("Catalog query failed: {}", err);
                    yield ScpResponse::Status(ServiceStatus::UnableToProcess);
                    return;
                }
            };

            let mut contexts: Vec<String> = Vec::new();
            for m in &matches {
                if !contexts.contains(&m.transfer_syntax) {
                    contexts.push(m.transfer_syntax.clone());
                }
            }
            contexts.truncate(self.config.max_move_contexts);

            yield ScpResponse::Destination(Some(MoveDestination {
                host: node.host.clone(),
                port: node.port,
                contexts,
            }));

            for await response in self.stream_matches(event, matches) {
                yield response;
            }
        })
    }

    /// Shared retrieve sub-protocol: sub-operation count, then one
    /// response per match with cancellation checked before each emission
    fn stream_matches<'a>(
        &'a self,
        event: &'a RequestEvent,
        matches: Vec<CatalogMatch>,
    ) -> BoxStream<'a, ScpResponse> {
        Box::pin(stream! {
            yield ScpResponse::SubOperations(matches.len() as u32);

            for m in matches {
                if event.is_cancelled() {
                    info!("Retrieve cancelled by the requester");
                    yield ScpResponse::Status(ServiceStatus::Canceled);
                    return;
                }

                match storage::read_dataset(&m.path) {
                    Ok(ds) => yield ScpResponse::Match(Box::new(ds)),
                    Err(err) => {
                        error!("Error reading file {}: {}", m.path.display(), err);
                        yield ScpResponse::Status(ServiceStatus::UnableToProcess);
                    }
                }
            }

            yield ScpResponse::Status(ServiceStatus::Success);
        })
    }
}
