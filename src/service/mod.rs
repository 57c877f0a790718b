//! Request dispatcher: one handler per DIMSE operation
//!
//! [`UpsScp`] owns the collaborators a handler needs (configuration,
//! work-item registry, composite-object catalog) and exposes one entry
//! point per operation plus [`UpsScp::handle`], which dispatches an event
//! by its payload. Query and retrieve handlers return response streams;
//! each yield is a suspension point for the transport runtime, and the
//! event's cancellation flag is polled at the top of every emission loop
//! iteration.

mod find;
mod retrieve;
mod store;

use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;
use tracing::info;

use dimse::{
    ActionRequest, ActionResponse, InstanceCatalog, RequestEvent, RequestPayload, ScpConfig,
    ScpResponse, ServiceStatus,
};

use crate::registry::WorkItemRegistry;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The SCP service core
pub struct UpsScp {
    config: ScpConfig,
    registry: Arc<WorkItemRegistry>,
    catalog: Arc<dyn InstanceCatalog>,
}

impl UpsScp {
    /// Create the service with its injected collaborators
    pub fn new(
        config: ScpConfig,
        registry: Arc<WorkItemRegistry>,
        catalog: Arc<dyn InstanceCatalog>,
    ) -> Self {
        Self {
            config,
            registry,
            catalog,
        }
    }

    /// The service configuration
    pub fn config(&self) -> &ScpConfig {
        &self.config
    }

    /// The shared work-item registry
    pub fn registry(&self) -> &WorkItemRegistry {
        &self.registry
    }

    /// Dispatch an event to its handler, returning the response stream
    ///
    /// The transport layer consumes and transmits each response in
    /// emission order.
    pub fn handle<'a>(&'a self, event: &'a RequestEvent) -> BoxStream<'a, ScpResponse> {
        match &event.payload {
            RequestPayload::Echo => {
                let status = self.handle_echo(event);
                Box::pin(stream! {
                    yield ScpResponse::Status(status);
                })
            }
            RequestPayload::Find { model, identifier } => {
                self.handle_find(event, *model, identifier)
            }
            RequestPayload::Get { model, identifier } => self.handle_get(event, *model, identifier),
            RequestPayload::Move {
                model,
                identifier,
                destination,
            } => self.handle_move(event, *model, identifier, destination),
            RequestPayload::Store { dataset } => Box::pin(stream! {
                let status = self.handle_store(event, dataset).await;
                yield ScpResponse::Status(status);
            }),
            RequestPayload::Action(request) => {
                let response = self.handle_action(event, request);
                Box::pin(stream! {
                    yield ScpResponse::Action(response);
                })
            }
        }
    }

    /// Handle a C-ECHO connectivity check
    pub fn handle_echo(&self, event: &RequestEvent) -> ServiceStatus {
        self.log_request(event);
        ServiceStatus::Success
    }

    /// Handle an N-ACTION request
    ///
    /// Subscription targets are recognized and logged; the response binds
    /// the affected identifiers from the request, carries the action type
    /// through unchanged and leaves the reply payload empty.
    pub fn handle_action(&self, event: &RequestEvent, request: &ActionRequest) -> ActionResponse {
        self.log_request(event);

        if request.is_global_subscription() {
            info!("Request was for subscribing to the (unfiltered) global UPS instance");
        } else if request.is_filtered_subscription() {
            info!("Request was for subscribing to the filtered global UPS instance");
        }
        info!(
            "Requested SOP Class UID: {}, action type {}",
            request.requested_sop_class_uid, request.action_type_id
        );

        ActionResponse::for_request(request)
    }

    fn log_request(&self, event: &RequestEvent) {
        info!(
            "Received {} request from {}:{} at {}",
            event.command(),
            event.requestor.address,
            event.requestor.port,
            event.timestamp.format(TIMESTAMP_FORMAT)
        );
    }
}
