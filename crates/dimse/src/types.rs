//! Common types for DIMSE service operations

use dicom_object::InMemDicomObject;
use serde::{Deserialize, Serialize};

/// Unified Procedure Step - Push SOP Class
pub const UPS_PUSH_SOP_CLASS: &str = "1.2.840.10008.5.1.4.34.6.1";
/// Unified Procedure Step - Watch SOP Class
pub const UPS_WATCH_SOP_CLASS: &str = "1.2.840.10008.5.1.4.34.6.2";
/// Unified Procedure Step - Pull SOP Class
pub const UPS_PULL_SOP_CLASS: &str = "1.2.840.10008.5.1.4.34.6.3";
/// Unified Procedure Step - Event SOP Class
pub const UPS_EVENT_SOP_CLASS: &str = "1.2.840.10008.5.1.4.34.6.4";

/// Patient Root Query/Retrieve - FIND
pub const PATIENT_ROOT_FIND_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.1.1";
/// Patient Root Query/Retrieve - MOVE
pub const PATIENT_ROOT_MOVE_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.1.2";
/// Patient Root Query/Retrieve - GET
pub const PATIENT_ROOT_GET_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.1.3";
/// Study Root Query/Retrieve - FIND
pub const STUDY_ROOT_FIND_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.2.1";
/// Study Root Query/Retrieve - MOVE
pub const STUDY_ROOT_MOVE_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.2.2";
/// Study Root Query/Retrieve - GET
pub const STUDY_ROOT_GET_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.2.2.3";

/// DIMSE command types serviced by the SCP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimseCommand {
    /// C-ECHO command
    Echo,
    /// C-FIND command
    Find,
    /// C-GET command
    Get,
    /// C-MOVE command
    Move,
    /// C-STORE command
    Store,
    /// N-ACTION command
    Action,
}

impl std::fmt::Display for DimseCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimseCommand::Echo => write!(f, "C-ECHO"),
            DimseCommand::Find => write!(f, "C-FIND"),
            DimseCommand::Get => write!(f, "C-GET"),
            DimseCommand::Move => write!(f, "C-MOVE"),
            DimseCommand::Store => write!(f, "C-STORE"),
            DimseCommand::Action => write!(f, "N-ACTION"),
        }
    }
}

/// Information model targeted by a query or retrieve request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryModel {
    /// Unified Procedure Step worklist (in-memory work-item registry)
    UnifiedProcedureStep,
    /// Patient Root composite-object model (external catalog)
    PatientRoot,
    /// Study Root composite-object model (external catalog)
    StudyRoot,
}

impl QueryModel {
    /// Resolve the information model from an Affected SOP Class UID
    pub fn from_sop_class_uid(uid: &str) -> Option<Self> {
        match uid.trim_end_matches('\0').trim() {
            UPS_PUSH_SOP_CLASS | UPS_WATCH_SOP_CLASS | UPS_PULL_SOP_CLASS
            | UPS_EVENT_SOP_CLASS => Some(QueryModel::UnifiedProcedureStep),
            PATIENT_ROOT_FIND_SOP_CLASS | PATIENT_ROOT_MOVE_SOP_CLASS
            | PATIENT_ROOT_GET_SOP_CLASS => Some(QueryModel::PatientRoot),
            STUDY_ROOT_FIND_SOP_CLASS | STUDY_ROOT_MOVE_SOP_CLASS
            | STUDY_ROOT_GET_SOP_CLASS => Some(QueryModel::StudyRoot),
            _ => None,
        }
    }

    /// Whether this model targets the work-item registry rather than the
    /// composite-object catalog
    pub fn is_worklist(&self) -> bool {
        matches!(self, QueryModel::UnifiedProcedureStep)
    }
}

impl std::fmt::Display for QueryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryModel::UnifiedProcedureStep => write!(f, "WORKLIST"),
            QueryModel::PatientRoot => write!(f, "PATIENT"),
            QueryModel::StudyRoot => write!(f, "STUDY"),
        }
    }
}

/// Service-level response status
///
/// The variants abstract over the numeric DIMSE status registry; use
/// [`ServiceStatus::code`] to map a status to the code mandated for a
/// given command (the Unable To Process family differs per command).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Operation completed successfully
    Success,
    /// Intermediate response, more to follow
    Pending,
    /// Operation cancelled by the requester
    Canceled,
    /// Malformed or unsupported query identifier
    InvalidIdentifier,
    /// Collaborator or I/O failure during matching or reading
    UnableToProcess,
    /// Inbound dataset could not be decoded
    CannotUnderstand,
    /// Persistence failure while storing
    OutOfResources,
}

impl ServiceStatus {
    /// Numeric DIMSE status code for this status under the given command
    pub fn code(&self, command: DimseCommand) -> u16 {
        match self {
            ServiceStatus::Success => 0x0000,
            ServiceStatus::Pending => 0xFF00,
            ServiceStatus::Canceled => 0xFE00,
            ServiceStatus::InvalidIdentifier => 0xA900,
            ServiceStatus::CannotUnderstand => 0xC210,
            ServiceStatus::OutOfResources => 0xA700,
            ServiceStatus::UnableToProcess => match command {
                DimseCommand::Find => 0xC320,
                DimseCommand::Get => 0xC420,
                DimseCommand::Move => 0xC520,
                // Processing failure for commands without a dedicated range
                _ => 0x0110,
            },
        }
    }

    /// Whether this status announces more responses to follow
    pub fn is_pending(&self) -> bool {
        matches!(self, ServiceStatus::Pending)
    }

    /// Whether this status reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ServiceStatus::InvalidIdentifier
                | ServiceStatus::UnableToProcess
                | ServiceStatus::CannotUnderstand
                | ServiceStatus::OutOfResources
        )
    }
}

/// Resolved C-MOVE destination announced before the retrieve stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDestination {
    /// Destination host address
    pub host: String,
    /// Destination port
    pub port: u16,
    /// Transfer syntax UIDs required for the matched instances,
    /// deduplicated in first-seen order and capped
    pub contexts: Vec<String>,
}

/// One item of the ordered response sequence a handler emits
///
/// The transport layer consumes these in emission order and encodes them
/// into the protocol's response messages.
#[derive(Debug, Clone)]
pub enum ScpResponse {
    /// Resolved move destination, or `None` when the requested destination
    /// is not configured (the stream ends immediately after)
    Destination(Option<MoveDestination>),
    /// Number of sub-operations a bulk retrieve will attempt
    SubOperations(u32),
    /// Pending response carrying one matching dataset
    Match(Box<InMemDicomObject>),
    /// N-ACTION response record
    Action(crate::event::ActionResponse),
    /// Terminal or per-item status without a dataset
    Status(ServiceStatus),
}

impl ScpResponse {
    /// The status conveyed by this response item
    pub fn status(&self) -> ServiceStatus {
        match self {
            ScpResponse::Match(_) => ServiceStatus::Pending,
            ScpResponse::Status(status) => *status,
            ScpResponse::Action(response) => response.status,
            ScpResponse::Destination(_) | ScpResponse::SubOperations(_) => {
                ServiceStatus::Pending
            }
        }
    }
}
