//! Part 10 dataset file I/O

use std::path::Path;

use dicom_dictionary_std::{tags, uids};
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::InMemDicomObject;

use dimse::{DimseError, Result};

/// Read a Part 10 file into an in-memory dataset
pub fn read_dataset(path: &Path) -> Result<InMemDicomObject> {
    let obj = dicom_object::open_file(path)
        .map_err(|e| DimseError::dicom_object(format!("{}: {}", path.display(), e)))?;
    Ok((*obj).clone())
}

/// Write a dataset as a Part 10 file
///
/// The file meta group is rebuilt from the dataset: Explicit VR Little
/// Endian, Media Storage SOP Class UID taken from the dataset's SOP Class
/// UID (Secondary Capture when absent).
pub fn write_dataset(path: &Path, obj: &InMemDicomObject) -> Result<()> {
    let sop_class_uid = obj
        .element(tags::SOP_CLASS_UID)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uids::SECONDARY_CAPTURE_IMAGE_STORAGE.to_string());

    let file_obj = obj
        .clone()
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(sop_class_uid.as_str()),
        )
        .map_err(|e| DimseError::dicom_object(e.to_string()))?;

    file_obj
        .write_to_file(path)
        .map_err(|e| DimseError::storage(e.to_string()))
}

/// Copy of a dataset without protocol-framing elements
///
/// Retains only elements at or above group 0008, dropping command and
/// file meta group elements that may have leaked into an inbound dataset.
pub fn strip_file_meta(obj: &InMemDicomObject) -> InMemDicomObject {
    InMemDicomObject::from_element_iter(
        obj.iter()
            .filter(|el| el.header().tag.group() >= 0x0008)
            .cloned(),
    )
}
