use std::fs;
use std::path::Path;

use crxscan::inventory::{self, FIRST_PARTY_EXTENSIONS};

const EXT_A: &str = "abcdefghijklmnopqrstuvwxyzabcdef";
const EXT_B: &str = "ghijklmnopqrstuvwxyzabcdefghijkl";

fn install_extension(root: &Path, id: &str, version_dir: &str, manifest: &str) {
    let dir = root.join(id).join(version_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), manifest).unwrap();
}

fn install_messages(root: &Path, id: &str, version_dir: &str, locale: &str, json: &str) {
    let dir = root.join(id).join(version_dir).join("_locales").join(locale);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("messages.json"), json).unwrap();
}

#[test]
fn test_missing_root_yields_empty_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let records = inventory::scan(&dir.path().join("does-not-exist")).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_only_32_char_directories_qualify() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "1.0", r#"{"name": "Kept"}"#);
    install_extension(dir.path(), "short", "1.0", r#"{"name": "Dropped"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, EXT_A);
}

#[test]
fn test_first_party_extensions_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    for id in FIRST_PARTY_EXTENSIONS {
        install_extension(dir.path(), id, "1.0", r#"{"name": "Hidden"}"#);
    }
    install_extension(dir.path(), EXT_A, "1.0", r#"{"name": "Visible"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, EXT_A);
}

#[test]
fn test_latest_version_selected_numerically() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "9.0", r#"{"name": "Old"}"#);
    install_extension(dir.path(), EXT_A, "2.1", r#"{"name": "Older"}"#);
    install_extension(dir.path(), EXT_A, "10.0", r#"{"name": "Newest"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version, "10.0");
    assert_eq!(records[0].name.as_deref(), Some("Newest"));
}

#[test]
fn test_locale_qualifier_stripped_from_displayed_version() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "4.18.0_0", r#"{"name": "Qualified"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records[0].version, "4.18.0");
}

#[test]
fn test_stray_directories_do_not_break_version_selection() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "1.5", r#"{"name": "Real"}"#);
    fs::create_dir_all(dir.path().join(EXT_A).join("Temp")).unwrap();

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].version, "1.5");
}

#[test]
fn test_placeholder_name_resolved_through_preferred_locale() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "2.0", r#"{"name": "__MSG_appName__"}"#);
    install_messages(
        dir.path(),
        EXT_A,
        "2.0",
        "en_US",
        r#"{"appName": {"message": "Localized Name"}}"#,
    );
    install_messages(
        dir.path(),
        EXT_A,
        "2.0",
        "en",
        r#"{"appName": {"message": "Fallback Name"}}"#,
    );

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records[0].name.as_deref(), Some("Localized Name"));
}

#[test]
fn test_unresolvable_placeholder_yields_nameless_record() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "2.0", r#"{"name": "__MSG_appName__"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, None);
    assert_eq!(records[0].display_name(), "(name unavailable)");
}

#[test]
fn test_corrupted_manifest_skips_only_that_extension() {
    let dir = tempfile::tempdir().unwrap();
    install_extension(dir.path(), EXT_A, "1.0", "{not json");
    install_extension(dir.path(), EXT_B, "1.0", r#"{"name": "Healthy"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, EXT_B);
}

#[test]
fn test_extension_without_version_directories_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(EXT_A)).unwrap();
    install_extension(dir.path(), EXT_B, "3.2.1", r#"{"name": "Fine"}"#);

    let records = inventory::scan(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, EXT_B);
}
