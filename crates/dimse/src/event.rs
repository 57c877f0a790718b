//! Inbound request events
//!
//! The transport layer decodes each DIMSE request primitive into a
//! [`RequestEvent`] before handing it to the service core. The event
//! carries the typed request payload, the requester's network identity,
//! the receive timestamp, and a cooperative cancellation token that the
//! transport sets when a C-CANCEL arrives mid-stream.

use chrono::{DateTime, Utc};
use dicom_object::InMemDicomObject;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::types::{DimseCommand, QueryModel, ServiceStatus};

/// UPS Global Subscription well-known SOP Instance
pub const UPS_GLOBAL_SUBSCRIPTION_INSTANCE: &str = "1.2.840.10008.5.1.4.34.5";
/// UPS Filtered Global Subscription well-known SOP Instance
pub const UPS_FILTERED_GLOBAL_SUBSCRIPTION_INSTANCE: &str = "1.2.840.10008.5.1.4.34.5.1";

/// Network identity of the peer that issued a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requestor {
    /// Remote host address
    pub address: String,
    /// Remote port
    pub port: u16,
}

impl Requestor {
    /// Create a new requestor identity
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// Typed payload of an inbound request
#[derive(Debug, Clone)]
pub enum RequestPayload {
    /// C-ECHO request (no additional data)
    Echo,
    /// C-FIND request with query identifier
    Find {
        /// Targeted information model
        model: QueryModel,
        /// Caller-supplied match constraints
        identifier: InMemDicomObject,
    },
    /// C-GET request with query identifier
    Get {
        /// Targeted information model
        model: QueryModel,
        /// Caller-supplied match constraints
        identifier: InMemDicomObject,
    },
    /// C-MOVE request with query identifier and named destination
    Move {
        /// Targeted information model
        model: QueryModel,
        /// Caller-supplied match constraints
        identifier: InMemDicomObject,
        /// Move Destination AE title as received on the wire
        destination: String,
    },
    /// C-STORE request with the decoded dataset
    Store {
        /// Decoded inbound dataset
        dataset: InMemDicomObject,
    },
    /// N-ACTION request
    Action(ActionRequest),
}

/// N-ACTION request parameters
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Requested SOP Class UID
    pub requested_sop_class_uid: String,
    /// Requested SOP Instance UID
    pub requested_sop_instance_uid: String,
    /// Action Type ID, carried through to the response unchanged
    pub action_type_id: u16,
    /// Optional Action Information dataset
    pub action_information: Option<InMemDicomObject>,
}

impl ActionRequest {
    /// Whether this request targets the unfiltered global subscription
    /// well-known instance
    pub fn is_global_subscription(&self) -> bool {
        self.requested_sop_instance_uid == UPS_GLOBAL_SUBSCRIPTION_INSTANCE
    }

    /// Whether this request targets the filtered global subscription
    /// well-known instance
    pub fn is_filtered_subscription(&self) -> bool {
        self.requested_sop_instance_uid == UPS_FILTERED_GLOBAL_SUBSCRIPTION_INSTANCE
    }
}

/// N-ACTION response record
///
/// Echo-style response binding the affected identifiers from the request;
/// the action type is carried through unchanged and the reply payload is
/// empty.
#[derive(Debug, Clone)]
pub struct ActionResponse {
    /// Affected SOP Class UID (from the requested SOP class)
    pub affected_sop_class_uid: String,
    /// Affected SOP Instance UID (from the requested SOP instance)
    pub affected_sop_instance_uid: String,
    /// Requested SOP Class UID
    pub requested_sop_class_uid: String,
    /// Requested SOP Instance UID
    pub requested_sop_instance_uid: String,
    /// Action Type ID
    pub action_type_id: u16,
    /// Action Reply dataset (always empty in this core)
    pub action_reply: Option<InMemDicomObject>,
    /// Response status
    pub status: ServiceStatus,
}

impl ActionResponse {
    /// Build the echo-style response for a request
    pub fn for_request(request: &ActionRequest) -> Self {
        Self {
            affected_sop_class_uid: request.requested_sop_class_uid.clone(),
            affected_sop_instance_uid: request.requested_sop_instance_uid.clone(),
            requested_sop_class_uid: request.requested_sop_class_uid.clone(),
            requested_sop_instance_uid: request.requested_sop_instance_uid.clone(),
            action_type_id: request.action_type_id,
            action_reply: None,
            status: ServiceStatus::Success,
        }
    }
}

/// One decoded inbound request
#[derive(Debug)]
pub struct RequestEvent {
    /// Unique event ID for correlation
    pub id: Uuid,
    /// Peer that issued the request
    pub requestor: Requestor,
    /// Time the request was received
    pub timestamp: DateTime<Utc>,
    /// Typed request payload
    pub payload: RequestPayload,
    cancellation: CancellationToken,
}

impl RequestEvent {
    /// Create a new event with the given payload
    pub fn new(requestor: Requestor, payload: RequestPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            requestor,
            timestamp: Utc::now(),
            payload,
            cancellation: CancellationToken::new(),
        }
    }

    /// Create a new C-ECHO event
    pub fn echo(requestor: Requestor) -> Self {
        Self::new(requestor, RequestPayload::Echo)
    }

    /// Create a new C-FIND event
    pub fn find(requestor: Requestor, model: QueryModel, identifier: InMemDicomObject) -> Self {
        Self::new(requestor, RequestPayload::Find { model, identifier })
    }

    /// Create a new C-GET event
    pub fn get(requestor: Requestor, model: QueryModel, identifier: InMemDicomObject) -> Self {
        Self::new(requestor, RequestPayload::Get { model, identifier })
    }

    /// Create a new C-MOVE event
    pub fn move_request(
        requestor: Requestor,
        model: QueryModel,
        identifier: InMemDicomObject,
        destination: impl Into<String>,
    ) -> Self {
        Self::new(
            requestor,
            RequestPayload::Move {
                model,
                identifier,
                destination: destination.into(),
            },
        )
    }

    /// Create a new C-STORE event
    pub fn store(requestor: Requestor, dataset: InMemDicomObject) -> Self {
        Self::new(requestor, RequestPayload::Store { dataset })
    }

    /// Create a new N-ACTION event
    pub fn action(requestor: Requestor, request: ActionRequest) -> Self {
        Self::new(requestor, RequestPayload::Action(request))
    }

    /// The DIMSE command this event carries
    pub fn command(&self) -> DimseCommand {
        match &self.payload {
            RequestPayload::Echo => DimseCommand::Echo,
            RequestPayload::Find { .. } => DimseCommand::Find,
            RequestPayload::Get { .. } => DimseCommand::Get,
            RequestPayload::Move { .. } => DimseCommand::Move,
            RequestPayload::Store { .. } => DimseCommand::Store,
            RequestPayload::Action(_) => DimseCommand::Action,
        }
    }

    /// Request cancellation of any in-flight response stream
    ///
    /// Called by the transport layer when a C-CANCEL arrives. Handlers
    /// poll the flag at the top of each emission loop iteration.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
