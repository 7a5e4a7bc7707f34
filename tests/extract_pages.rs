mod common;

use common::{pdf_bytes, rig, MockTools};
use mediaforge_worker::error::WorkerError;
use mediaforge_worker::extract::ExtractRequest;

fn extract_req(start: u32, end: u32) -> ExtractRequest {
    ExtractRequest {
        task_id: "ex-1".into(),
        source_url: "http://example.test/input.pdf".into(),
        start_page: start,
        end_page: end,
    }
}

fn four_page_doc() -> Vec<u8> {
    pdf_bytes(&[(false, true), (false, true), (false, true), (false, true)])
}

#[test]
fn extracts_inclusive_page_range() {
    let rig = rig(four_page_doc(), MockTools::new(true));
    let url = rig.pipeline.run_extract(&extract_req(2, 3)).unwrap();

    let path = url.strip_prefix("file://").unwrap();
    let extracted = lopdf::Document::load(path).unwrap();
    assert_eq!(extracted.get_pages().len(), 2);

    let record = rig.store.record("ex-1").unwrap();
    assert_eq!(record.get("status").map(String::as_str), Some("completed"));
    assert_eq!(record.get("progress").map(String::as_str), Some("100"));
}

#[test]
fn full_range_is_allowed() {
    let rig = rig(four_page_doc(), MockTools::new(true));
    let url = rig.pipeline.run_extract(&extract_req(1, 4)).unwrap();
    let path = url.strip_prefix("file://").unwrap();
    let extracted = lopdf::Document::load(path).unwrap();
    assert_eq!(extracted.get_pages().len(), 4);
}

#[test]
fn rejects_out_of_bounds_range() {
    let rig = rig(four_page_doc(), MockTools::new(true));
    let err = rig.pipeline.run_extract(&extract_req(2, 9)).unwrap_err();
    assert!(matches!(
        err,
        WorkerError::PageRange {
            start: 2,
            end: 9,
            page_count: 4
        }
    ));
    let record = rig.store.record("ex-1").unwrap();
    assert_eq!(record.get("status").map(String::as_str), Some("failed"));
}

#[test]
fn empty_output_error_names_the_stage_not_a_file() {
    let err = WorkerError::EmptyOutput {
        step: "extract".into(),
    };
    let msg = err.to_string();
    assert_eq!(msg, "[extract] produced an empty document");
    assert!(!msg.contains(".pdf"));
}

#[test]
fn rejects_inverted_and_zero_based_ranges() {
    let rig = rig(four_page_doc(), MockTools::new(true));
    assert!(matches!(
        rig.pipeline.run_extract(&extract_req(3, 2)).unwrap_err(),
        WorkerError::PageRange { .. }
    ));
    assert!(matches!(
        rig.pipeline.run_extract(&extract_req(0, 2)).unwrap_err(),
        WorkerError::PageRange { .. }
    ));
}
