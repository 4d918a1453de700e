use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::models::{ReportSnapshot, RiskBlock, RiskCategory};

/// Scoring units the upstream service assigns per unset CSP attribute; used
/// to estimate how many attributes a policy leaves unset when the declared
/// CSP total exceeds the itemized sum.
pub const CSP_POINTS_PER_ATTRIBUTE: i64 = 25;

/// Normalized summary of one extension's risk report, computed from the most
/// recent snapshot. Each risk section is `None` when the service did not
/// assess that category at all, which renders differently from an assessed
/// zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub extension_id: String,
    pub version: String,
    pub name: Option<String>,
    pub last_updated: Option<String>,
    pub rating: Option<f64>,
    /// Number of snapshots carrying a version, over the whole report.
    pub versions_tracked: usize,
    pub risk_score: Option<i64>,
    pub csp: Option<CspSection>,
    pub retire: Option<i64>,
    /// Present only when assessed and nonzero; a zero Web Store score is
    /// suppressed, unlike every other category.
    pub webstore_risk: Option<i64>,
    pub permissions: Option<PermissionsSection>,
    pub external_calls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CspSection {
    pub total: i64,
    /// Itemized attribute counts, in attribute-name order.
    pub items: Vec<(String, i64)>,
    /// Estimated count of attributes the policy does not set at all.
    pub missing_attributes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionsSection {
    pub required: i64,
    pub optional: i64,
}

impl PermissionsSection {
    pub fn total(&self) -> i64 {
        self.required + self.optional
    }
}

/// Normalize a version-ordered report into a `Summary`. Pure: no network or
/// filesystem access.
pub fn summarize(report: &[ReportSnapshot]) -> Result<Summary> {
    let last = report.last().context("Report contains no snapshots")?;
    let versions_tracked = report.iter().filter(|s| !s.version.is_empty()).count();

    let webstore = last.data.webstore.as_ref();
    let risk = last.data.risk.as_ref();

    let external_calls = last
        .data
        .extcalls
        .as_deref()
        .map(external_calls)
        .unwrap_or_default();

    Ok(Summary {
        extension_id: last.extension_id.clone(),
        version: last.version.clone(),
        name: webstore.and_then(|w| w.name.clone()),
        last_updated: webstore.and_then(|w| w.last_updated.clone()),
        rating: webstore.and_then(|w| w.rating),
        versions_tracked,
        risk_score: risk.and_then(|r| r.total),
        csp: risk.and_then(|r| r.csp.as_ref()).map(csp_section),
        retire: risk.and_then(|r| r.retire.as_ref()).map(|c| c.total),
        webstore_risk: risk
            .and_then(|r| r.webstore.as_ref())
            .map(|c| c.total)
            .filter(|total| *total != 0),
        permissions: permissions_section(risk),
        external_calls,
    })
}

fn csp_section(category: &RiskCategory) -> CspSection {
    let items: Vec<(String, i64)> = category
        .items
        .iter()
        .filter_map(|(name, value)| value.as_i64().map(|count| (name.clone(), count)))
        .collect();

    let itemized_sum: i64 = items.iter().map(|(_, count)| count).sum();
    let remainder = category.total - itemized_sum;
    let missing_attributes = (remainder > 0).then(|| remainder / CSP_POINTS_PER_ATTRIBUTE);

    CspSection {
        total: category.total,
        items,
        missing_attributes,
    }
}

/// Required and optional permission scores fold into one section, rendered
/// only when their combined total is nonzero.
fn permissions_section(risk: Option<&RiskBlock>) -> Option<PermissionsSection> {
    let risk = risk?;
    let required = risk.permissions.as_ref().map(|c| c.total);
    let optional = risk.optional_permissions.as_ref().map(|c| c.total);
    if required.is_none() && optional.is_none() {
        return None;
    }

    let section = PermissionsSection {
        required: required.unwrap_or(0),
        optional: optional.unwrap_or(0),
    };
    (section.total() != 0).then_some(section)
}

/// Deduplicate external-call URLs by exact string, preserving first
/// occurrence. Only syntactically valid URLs with a parseable network
/// location are kept.
pub fn external_calls(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut calls = Vec::new();

    for candidate in raw {
        let valid = url::Url::parse(candidate)
            .map(|parsed| parsed.host_str().is_some())
            .unwrap_or(false);
        if valid && seen.insert(candidate.clone()) {
            calls.push(candidate.clone());
        }
    }

    calls
}
