use serde::Deserialize;
use std::collections::HashMap;

/// One locally installed extension, as discovered by an inventory scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRecord {
    pub id: String,
    /// Resolved display name; `None` when no locale data could resolve it.
    pub name: Option<String>,
    /// Display version, with any trailing locale qualifier stripped.
    pub version: String,
}

impl ExtensionRecord {
    pub fn new(id: String, name: Option<String>, version: String) -> Self {
        Self { id, name, version }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(name unavailable)")
    }
}

/// The subset of manifest.json consumed during an inventory scan.
///
/// `name` is either a literal display string or a `__MSG_<KEY>__` placeholder
/// pointing into the extension's locale tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// One entry in a `_locales/<locale>/messages.json` table.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEntry {
    pub message: String,
}

/// A parsed `messages.json` locale table.
pub type LocaleTable = HashMap<String, MessageEntry>;
