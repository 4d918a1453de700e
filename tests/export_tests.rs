use serde_json::json;

use crxscan::models::ReportSnapshot;
use crxscan::output::export::{export_summary, render_summary};
use crxscan::report::summarize;

fn fixture_summary() -> crxscan::report::Summary {
    let snapshots: Vec<ReportSnapshot> = serde_json::from_value(json!([
        {
            "extension_id": "aaaabbbbccccddddeeeeffffgggghhhh",
            "version": "4.18.0",
            "data": {
                "webstore": {
                    "name": "Fixture Extension",
                    "last_updated": "2020-05-04",
                    "rating": 4.5
                },
                "risk": {
                    "csp": { "total": 100, "child-src": 25 },
                    "retire": { "total": 0 },
                    "webstore": { "total": 6 },
                    "permissions": { "total": 80 },
                    "optional_permissions": { "total": 15 },
                    "total": 201
                },
                "extcalls": ["https://stats.example.com/collect"]
            }
        }
    ]))
    .unwrap();

    summarize(&snapshots).unwrap()
}

#[test]
fn test_rendering_covers_every_section() {
    let text = render_summary(&fixture_summary());

    assert!(text.contains("Fixture Extension"));
    assert!(text.contains("Extension ID:     aaaabbbbccccddddeeeeffffgggghhhh"));
    assert!(text.contains("4.18.0 (2020-05-04)"));
    assert!(text.contains("CSP Policy:       100 Total"));
    assert!(text.contains("child-src: 25"));
    assert!(text.contains("attributes not set (est.): 3"));
    assert!(text.contains("RetireJS:         0 Total"));
    assert!(text.contains("Web Store:        6 Total"));
    assert!(text.contains("Permissions:      95 Total"));
    assert!(text.contains("** Risk Score: 201 **"));
    assert!(text.contains("https://stats.example.com/collect"));
}

#[test]
fn test_unassessed_sections_are_absent_from_rendering() {
    let snapshots: Vec<ReportSnapshot> = serde_json::from_value(json!([
        {
            "extension_id": "aaaabbbbccccddddeeeeffffgggghhhh",
            "version": "1.0",
            "data": { "risk": { "csp": { "total": 0 } } }
        }
    ]))
    .unwrap();
    let text = render_summary(&summarize(&snapshots).unwrap());

    assert!(text.contains("CSP Policy:       0 Total"));
    assert!(!text.contains("RetireJS"));
    assert!(!text.contains("Web Store"));
    assert!(!text.contains("Permissions"));
    assert!(!text.contains("External Calls"));
}

#[test]
fn test_export_is_byte_identical_to_rendering() {
    let summary = fixture_summary();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aaaabbbbccccddddeeeeffffgggghhhh.txt");

    export_summary(&summary, &path).unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, render_summary(&summary).into_bytes());
}
