//! C-FIND handler behavior against the work-item registry and the catalog

mod common;

use std::sync::Arc;

use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use futures::StreamExt;

use cadence::storage;
use dimse::{QueryModel, RequestEvent, ScpResponse, ServiceStatus};

use common::{requestor, scp_with, state_query, ups_dataset, StaticCatalog};

fn sop_instance_uid(ds: &InMemDicomObject) -> String {
    ds.element(tags::SOP_INSTANCE_UID)
        .expect("SOP Instance UID present")
        .to_str()
        .expect("string value")
        .trim()
        .to_string()
}

#[tokio::test]
async fn worklist_find_streams_matching_items() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");
    storage::write_dataset(
        &instance_dir.path().join("UPS_1.dcm"),
        &ups_dataset("1.2.3.1", "SCHEDULED", "TR1"),
    )
    .expect("write work item");
    storage::write_dataset(
        &instance_dir.path().join("UPS_2.dcm"),
        &ups_dataset("1.2.3.2", "COMPLETED", "TR1"),
    )
    .expect("write work item");

    let scp = scp_with(
        instance_dir.path(),
        storage_dir.path(),
        Arc::new(StaticCatalog::empty()),
    );

    // An empty identifier is unconstrained and matches both items
    let event = RequestEvent::find(
        requestor(),
        QueryModel::UnifiedProcedureStep,
        InMemDicomObject::new_empty(),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 3);
    assert!(matches!(responses[0], ScpResponse::Match(_)));
    assert!(matches!(responses[1], ScpResponse::Match(_)));
    assert!(matches!(
        responses[2],
        ScpResponse::Status(ServiceStatus::Success)
    ));

    // Constraining the step state filters the match set
    let event = RequestEvent::find(
        requestor(),
        QueryModel::UnifiedProcedureStep,
        state_query("SCHEDULED"),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 2);
    match &responses[0] {
        ScpResponse::Match(ds) => assert_eq!(sop_instance_uid(ds), "1.2.3.1"),
        other => panic!("expected a match, got {:?}", other),
    }
    assert!(matches!(
        responses[1],
        ScpResponse::Status(ServiceStatus::Success)
    ));
}

#[tokio::test]
async fn worklist_find_loads_directory_once() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");
    let file = instance_dir.path().join("UPS_1.dcm");
    storage::write_dataset(&file, &ups_dataset("1.2.3.1", "SCHEDULED", "TR1"))
        .expect("write work item");

    let scp = scp_with(
        instance_dir.path(),
        storage_dir.path(),
        Arc::new(StaticCatalog::empty()),
    );

    let event = RequestEvent::find(
        requestor(),
        QueryModel::UnifiedProcedureStep,
        InMemDicomObject::new_empty(),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 2);

    // Mutate the directory; a populated registry must not rescan
    std::fs::remove_file(&file).expect("remove work item file");
    storage::write_dataset(
        &instance_dir.path().join("UPS_2.dcm"),
        &ups_dataset("1.2.3.2", "SCHEDULED", "TR1"),
    )
    .expect("write work item");

    let event = RequestEvent::find(
        requestor(),
        QueryModel::UnifiedProcedureStep,
        InMemDicomObject::new_empty(),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 2);
    match &responses[0] {
        ScpResponse::Match(ds) => assert_eq!(sop_instance_uid(ds), "1.2.3.1"),
        other => panic!("expected a match, got {:?}", other),
    }
}

#[tokio::test]
async fn worklist_find_cancellation_stops_the_stream() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");
    for i in 1..=3 {
        storage::write_dataset(
            &instance_dir.path().join(format!("UPS_{}.dcm", i)),
            &ups_dataset(&format!("1.2.3.{}", i), "SCHEDULED", "TR1"),
        )
        .expect("write work item");
    }

    let scp = scp_with(
        instance_dir.path(),
        storage_dir.path(),
        Arc::new(StaticCatalog::empty()),
    );
    let event = RequestEvent::find(
        requestor(),
        QueryModel::UnifiedProcedureStep,
        InMemDicomObject::new_empty(),
    );

    let mut responses = scp.handle(&event);
    let first = responses.next().await.expect("first response");
    assert!(matches!(first, ScpResponse::Match(_)));

    // Cancel before the second emission
    event.cancel();

    let rest: Vec<_> = responses.collect().await;
    assert_eq!(rest.len(), 1);
    assert!(matches!(
        rest[0],
        ScpResponse::Status(ServiceStatus::Canceled)
    ));
}

#[tokio::test]
async fn catalog_find_stamps_retrieve_ae_title() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");
    let catalog = Arc::new(StaticCatalog::with_matches(vec![common::stored_match(
        storage_dir.path(),
        "1.2.3.4",
        "1.2.840.10008.1.2.1",
    )]));

    let scp = scp_with(instance_dir.path(), storage_dir.path(), catalog);
    let event = RequestEvent::find(
        requestor(),
        QueryModel::PatientRoot,
        InMemDicomObject::new_empty(),
    );

    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 2);
    match &responses[0] {
        ScpResponse::Match(ds) => {
            let aet = ds
                .element(tags::RETRIEVE_AE_TITLE)
                .expect("Retrieve AE Title present")
                .to_str()
                .expect("string value")
                .trim()
                .to_string();
            assert_eq!(aet, scp.config().local_aet);
        }
        other => panic!("expected a match, got {:?}", other),
    }
    assert!(matches!(
        responses[1],
        ScpResponse::Status(ServiceStatus::Success)
    ));
}

#[tokio::test]
async fn catalog_find_maps_identifier_errors() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");

    let scp = scp_with(
        instance_dir.path(),
        storage_dir.path(),
        Arc::new(StaticCatalog::invalid_identifier()),
    );
    let event = RequestEvent::find(
        requestor(),
        QueryModel::StudyRoot,
        InMemDicomObject::new_empty(),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 1);
    assert!(matches!(
        responses[0],
        ScpResponse::Status(ServiceStatus::InvalidIdentifier)
    ));
}

#[tokio::test]
async fn catalog_find_maps_backend_errors() {
    let instance_dir = tempfile::tempdir().expect("create temp dir");
    let storage_dir = tempfile::tempdir().expect("create temp dir");

    let scp = scp_with(
        instance_dir.path(),
        storage_dir.path(),
        Arc::new(StaticCatalog::failing()),
    );
    let event = RequestEvent::find(
        requestor(),
        QueryModel::PatientRoot,
        InMemDicomObject::new_empty(),
    );
    let responses: Vec<_> = scp.handle(&event).collect().await;
    assert_eq!(responses.len(), 1);
    assert!(matches!(
        responses[0],
        ScpResponse::Status(ServiceStatus::UnableToProcess)
    ));
}
