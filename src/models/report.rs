use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One version's recorded assessment within a CRXcavator report.
///
/// Reports arrive as an ordered array of these; the last element is always
/// the most recently tracked version.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSnapshot {
    pub extension_id: String,
    #[serde(default)]
    pub version: String,
    pub data: SnapshotData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub webstore: Option<WebstoreInfo>,
    #[serde(default)]
    pub risk: Option<RiskBlock>,
    #[serde(default)]
    pub extcalls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebstoreInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// The nested risk mapping of a snapshot. Every category is optional:
/// an absent category means "not assessed", which is not the same thing as a
/// present category whose total is zero.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskBlock {
    #[serde(default)]
    pub csp: Option<RiskCategory>,
    #[serde(default)]
    pub retire: Option<RiskCategory>,
    #[serde(default)]
    pub webstore: Option<RiskCategory>,
    #[serde(default)]
    pub permissions: Option<RiskCategory>,
    #[serde(default)]
    pub optional_permissions: Option<RiskCategory>,
    #[serde(default)]
    pub total: Option<i64>,
}

/// One risk category: a declared total plus itemized attribute counts keyed
/// by attribute name.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskCategory {
    #[serde(default)]
    pub total: i64,
    #[serde(flatten)]
    pub items: BTreeMap<String, Value>,
}

impl RiskCategory {
    /// Sum of the itemized attribute counts, ignoring non-numeric entries.
    pub fn itemized_sum(&self) -> i64 {
        self.items.values().filter_map(Value::as_i64).sum()
    }
}

/// Reputation lookup result for one externally contacted hostname.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationResult {
    pub url: String,
    pub positives: i64,
    pub total: i64,
}
