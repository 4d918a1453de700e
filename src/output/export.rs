use anyhow::{Context, Result};
use std::path::Path;

use crate::report::Summary;

const RULE: &str =
    "================================================================================";

/// Render a summary as plain text. Export is terminal: the file contents are
/// exactly this rendering, nothing is ever parsed back out of it.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();

    out.push_str("Overview\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "  Extension Name:   {}\n",
        summary.name.as_deref().unwrap_or("(name unavailable)")
    ));
    out.push_str(&format!("  Extension ID:     {}\n", summary.extension_id));
    match &summary.last_updated {
        Some(updated) => out.push_str(&format!(
            "  Newest Version:   {} ({})\n",
            summary.version, updated
        )),
        None => out.push_str(&format!("  Newest Version:   {}\n", summary.version)),
    }
    if let Some(rating) = summary.rating {
        out.push_str(&format!("  Store Rating:     {} stars\n", rating));
    }
    out.push_str(&format!(
        "  Versions Tracked: {}\n",
        summary.versions_tracked
    ));

    out.push_str("\nRisk\n");
    out.push_str(RULE);
    out.push('\n');

    if let Some(csp) = &summary.csp {
        out.push_str(&format!("  CSP Policy:       {} Total\n", csp.total));
        for (attribute, count) in &csp.items {
            out.push_str(&format!("    > {}: {}\n", attribute, count));
        }
        if let Some(missing) = csp.missing_attributes {
            out.push_str(&format!("    > attributes not set (est.): {}\n", missing));
        }
    }
    if let Some(retire) = summary.retire {
        out.push_str(&format!("  RetireJS:         {} Total\n", retire));
    }
    if let Some(webstore) = summary.webstore_risk {
        out.push_str(&format!("  Web Store:        {} Total\n", webstore));
    }
    if let Some(permissions) = &summary.permissions {
        out.push_str(&format!(
            "  Permissions:      {} Total\n",
            permissions.total()
        ));
        out.push_str(&format!("    > Required: {}\n", permissions.required));
        out.push_str(&format!("    > Optional: {}\n", permissions.optional));
    }
    if let Some(score) = summary.risk_score {
        out.push_str(&format!("\n  ** Risk Score: {} **\n", score));
    }

    if !summary.external_calls.is_empty() {
        out.push_str("\nExternal Calls\n");
        out.push_str(RULE);
        out.push('\n');
        for call in &summary.external_calls {
            out.push_str(&format!("  {}\n", call));
        }
    }

    out
}

/// Write the plain-text rendering of a summary to `path`.
pub fn export_summary(summary: &Summary, path: &Path) -> Result<()> {
    std::fs::write(path, render_summary(summary))
        .with_context(|| format!("Cannot write report to {}", path.display()))
}
