pub mod locale;
pub mod version;

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{ExtensionRecord, Manifest};

/// Extensions installed automatically by the browser vendor. They are hidden
/// from the user, so they are excluded from every inventory scan, and the
/// remote service is expected to occasionally not know them.
pub const FIRST_PARTY_EXTENSIONS: &[&str] = &[
    "nmmhkkegccagdldgiimedpiccmgmieda",
    "pkedcjkdefgpdelpbcmbmeomcjbeemfm",
];

/// Extension identifiers are always exactly this long.
pub const EXTENSION_ID_LENGTH: usize = 32;

/// Scan a local extension install root and produce a record per extension.
///
/// A missing root is not an error: the directory legitimately does not exist
/// on machines where the browser has never installed an extension. A single
/// extension with corrupted metadata (unreadable or malformed manifest,
/// inconsistent locale data) is skipped with a warning rather than aborting
/// the whole scan. Returned order is directory order; callers sort for
/// display.
pub fn scan(install_root: &Path) -> Result<Vec<ExtensionRecord>> {
    if !install_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();

    let entries = std::fs::read_dir(install_root)
        .with_context(|| format!("Cannot list {}", install_root.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(id) = file_name.to_str() else {
            continue;
        };
        if id.len() != EXTENSION_ID_LENGTH || FIRST_PARTY_EXTENSIONS.contains(&id) {
            continue;
        }

        match scan_extension(install_root, id) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => log::warn!("{} has no parseable version directories, skipping", id),
            Err(err) => log::warn!("Skipping {}: {:#}", id, err),
        }
    }

    Ok(records)
}

/// Build the record for one candidate extension directory.
///
/// `Ok(None)` means no subdirectory parsed as a version token. Metadata
/// errors are surfaced so the caller can decide between aborting and
/// skip-and-warn.
fn scan_extension(install_root: &Path, id: &str) -> Result<Option<ExtensionRecord>> {
    let extension_dir = install_root.join(id);

    let mut names = Vec::new();
    let entries = std::fs::read_dir(&extension_dir)
        .with_context(|| format!("Cannot list {}", extension_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }

    let Some(latest) = version::select_latest(names) else {
        return Ok(None);
    };

    // Paths are built from the raw directory name; only display uses the
    // qualifier-stripped form.
    let version_dir = extension_dir.join(&latest.raw);
    let manifest_path = version_dir.join("manifest.json");

    let content = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("Cannot read {}", manifest_path.display()))?;
    let manifest: Manifest = serde_json::from_str(&content)
        .with_context(|| format!("Manifest {} is malformed", manifest_path.display()))?;

    let name = match manifest.name.as_deref() {
        Some(raw_name) => locale::resolve_name(raw_name, &version_dir)?,
        None => None,
    };

    Ok(Some(ExtensionRecord::new(
        id.to_string(),
        name,
        latest.display,
    )))
}
