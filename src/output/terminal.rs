use colored::*;

use crate::models::{ExtensionRecord, ReputationResult};
use crate::report::Summary;

pub fn print_summary(summary: &Summary) {
    print_header(summary);
    print_risk_sections(summary);
    print_external_calls(summary);
}

fn print_header(summary: &Summary) {
    println!("{}", "┌─────────────────────────────────────────────────────────────┐".bright_black());

    let name = summary.name.as_deref().unwrap_or("(name unavailable)");
    println!("│  Extension: {:<48}│", name.bold());
    println!("│  ID: {:<55}│", summary.extension_id);

    let updated = summary.last_updated.as_deref().unwrap_or("?");
    let line = format!(
        "Version: {} ({}) │ {} version(s) tracked",
        summary.version, updated, summary.versions_tracked
    );
    println!("│  {:<59}│", line);

    if let Some(rating) = summary.rating {
        println!("│  {:<59}│", format!("Store Rating: {} stars", rating));
    }

    println!("{}", "└─────────────────────────────────────────────────────────────┘".bright_black());
    println!();
}

fn print_risk_sections(summary: &Summary) {
    println!("{}", "── Risk ─────────────────────────────────────────────────────".bright_black());

    if let Some(ref csp) = summary.csp {
        println!("  {:<18} {}", "CSP Policy:", format!("{} Total", csp.total).yellow());
        for (attribute, count) in &csp.items {
            println!("    > {:<24} {}", format!("{}:", attribute), count);
        }
        if let Some(missing) = csp.missing_attributes {
            println!("    > {:<24} {}", "attributes not set (est.):", missing);
        }
    }

    if let Some(retire) = summary.retire {
        println!("  {:<18} {}", "RetireJS:", format!("{} Total", retire).yellow());
    }

    if let Some(webstore) = summary.webstore_risk {
        println!("  {:<18} {}", "Web Store:", format!("{} Total", webstore).yellow());
    }

    if let Some(ref permissions) = summary.permissions {
        println!(
            "  {:<18} {}",
            "Permissions:",
            format!("{} Total", permissions.total()).yellow()
        );
        println!("    > {:<24} {}", "Required:", permissions.required);
        println!("    > {:<24} {}", "Optional:", permissions.optional);
    }

    if let Some(score) = summary.risk_score {
        println!();
        println!("  ** Risk Score: {} **", score.to_string().red().bold());
    }

    println!();
}

fn print_external_calls(summary: &Summary) {
    if summary.external_calls.is_empty() {
        return;
    }

    println!("{}", "── External Calls ───────────────────────────────────────────".bright_black());

    for call in &summary.external_calls {
        println!("  {} {}", "→".bright_black(), call);
    }

    println!();
}

pub fn print_extension_list(records: &[ExtensionRecord]) {
    if records.is_empty() {
        println!("No extensions were found.");
        return;
    }

    println!("{}", "── Installed Extensions ─────────────────────────────────────".bright_black());

    for record in records {
        println!(
            "  {}  {:<40} v{}",
            record.id.bright_black(),
            record.display_name().bold(),
            record.version
        );
    }

    println!();
    println!("  {} extension(s) found", records.len());
}

pub fn print_reputation_results(results: &[ReputationResult]) {
    if results.is_empty() {
        println!("No reputation results were returned.");
        return;
    }

    println!("{}", "── VirusTotal Results ───────────────────────────────────────".bright_black());

    for result in results {
        let verdict = format!("{}/{}", result.positives, result.total);
        let verdict = if result.positives > 0 {
            verdict.red().bold()
        } else {
            verdict.green()
        };
        println!("  {:<42} {}", result.url, verdict);
    }

    println!();
}
