use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::models::LocaleTable;

static MSG_PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^__MSG_(.+)__$").unwrap());

/// Locale directories tried in order; the first one that exists wins.
const LOCALE_PREFERENCE: &[&str] = &["en_US", "en_GB", "en"];

/// Translate a recognized manifest placeholder key to the key used inside
/// the extension's `messages.json`. Unrecognized keys resolve to nothing.
fn locale_table_key(placeholder_key: &str) -> Option<&'static str> {
    match placeholder_key {
        "APP_NAME" => Some("APP_NAME"),
        "CHROME_EXTENSION_NAME" => Some("CHROME_EXTENSION_NAME"),
        "appName" => Some("appName"),
        "app_name" => Some("app_name"),
        "extName" => Some("extName"),
        _ => None,
    }
}

/// Resolve a manifest `name` field into a display name.
///
/// A literal name is returned unchanged. A `__MSG_<KEY>__` placeholder is
/// looked up through the extension's locale tables under
/// `<locale_base>/_locales/`. `Ok(None)` means the name could not be
/// resolved (unknown key, or no English locale file present); an `Err` means
/// the extension's locale data is malformed - a locale file exists but does
/// not contain the entry the manifest points at.
pub fn resolve_name(name_field: &str, locale_base: &Path) -> Result<Option<String>> {
    let Some(captures) = MSG_PLACEHOLDER_RE.captures(name_field) else {
        return Ok(Some(name_field.to_string()));
    };

    let Some(key) = locale_table_key(&captures[1]) else {
        return Ok(None);
    };

    let Some(messages_path) = LOCALE_PREFERENCE
        .iter()
        .map(|locale| locale_base.join("_locales").join(locale).join("messages.json"))
        .find(|path| path.is_file())
    else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(&messages_path)
        .with_context(|| format!("Cannot read {}", messages_path.display()))?;
    let table: LocaleTable = serde_json::from_str(&content)
        .with_context(|| format!("Locale table {} is malformed", messages_path.display()))?;

    let entry = table.get(key).with_context(|| {
        format!(
            "Locale table {} has no '{}' entry",
            messages_path.display(),
            key
        )
    })?;

    Ok(Some(entry.message.clone()))
}
