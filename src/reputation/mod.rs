use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

use crate::client::ReportApi;
use crate::models::ReputationResult;
use crate::pacing::Pacer;

/// Hosts per submitted group. Group boundaries are purely positional.
pub const GROUP_SIZE: usize = 4;

/// Server-imposed cooldown between paced reputation calls.
pub const GROUP_COOLDOWN: Duration = Duration::from_secs(65);

/// Wall-clock cost of one submit+fetch cycle.
const SECONDS_PER_GROUP: u64 = 130;

/// Reduce a list of URLs to their hostnames, deduplicated in first-occurrence
/// order. This is a coarser second pass over URLs that were already
/// deduplicated exactly for display.
pub fn hostnames(urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut hosts = Vec::new();

    for candidate in urls {
        if let Some(host) = url::Url::parse(candidate)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
        {
            if seen.insert(host.clone()) {
                hosts.push(host);
            }
        }
    }

    hosts
}

pub fn group_count(host_count: usize) -> usize {
    host_count.div_ceil(GROUP_SIZE)
}

/// Estimated duration of a full run: one cycle per group, with the leading
/// wait of the first group exempted.
pub fn estimate_seconds(groups: usize) -> u64 {
    (SECONDS_PER_GROUP * groups as u64).saturating_sub(GROUP_COOLDOWN.as_secs())
}

pub fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    match (minutes, seconds) {
        (0, s) => format!("{} second{}", s, plural(s)),
        (m, 0) => format!("{} minute{}", m, plural(m)),
        (m, s) => format!(
            "{} minute{}, {} second{}",
            m,
            plural(m),
            s,
            plural(s)
        ),
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Drive the rate-limited two-phase reputation protocol over a deduplicated
/// hostname list.
///
/// Every group but the first waits out the cooldown before submitting, and
/// every group waits it out again between submission and fetch while the
/// remote side processes. A submission failure aborts the whole run; a host
/// the service returns no verdict for is simply absent from the results.
pub async fn correlate(
    api: &dyn ReportApi,
    pacer: &dyn Pacer,
    api_key: &str,
    hosts: &[String],
) -> Result<Vec<ReputationResult>> {
    if hosts.is_empty() {
        anyhow::bail!("No external calls were found to check");
    }

    let mut results = Vec::new();

    for (index, group) in hosts.chunks(GROUP_SIZE).enumerate() {
        if index > 0 {
            pacer.wait(GROUP_COOLDOWN).await;
        }

        api.post(
            "/virustotal/report",
            json!({ "apiKey": api_key, "urls": group }),
        )
        .await
        .with_context(|| format!("Submission of host group {} failed", index + 1))?;

        pacer.wait(GROUP_COOLDOWN).await;

        let fetched = api
            .post(
                "/virustotal/results",
                json!({ "apiKey": api_key, "urls": group }),
            )
            .await
            .with_context(|| format!("Result fetch for host group {} failed", index + 1))?;

        results.extend(parse_results(&fetched));
    }

    Ok(results)
}

fn parse_results(value: &Value) -> Vec<ReputationResult> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            Some(ReputationResult {
                url: entry.get("url")?.as_str()?.to_string(),
                positives: entry.get("positives")?.as_i64()?,
                total: entry.get("total")?.as_i64()?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostnames_coarser_dedup() {
        let urls = vec![
            "https://tracker.example.com/a".to_string(),
            "https://tracker.example.com/b".to_string(),
            "https://api.example.org/v1".to_string(),
            "nonsense".to_string(),
        ];
        assert_eq!(
            hostnames(&urls),
            vec!["tracker.example.com".to_string(), "api.example.org".to_string()]
        );
    }

    #[test]
    fn test_group_count() {
        assert_eq!(group_count(1), 1);
        assert_eq!(group_count(4), 1);
        assert_eq!(group_count(5), 2);
        assert_eq!(group_count(9), 3);
    }

    #[test]
    fn test_estimate_seconds() {
        assert_eq!(estimate_seconds(1), 65);
        assert_eq!(estimate_seconds(3), 325);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(65), "1 minute, 5 seconds");
        assert_eq!(format_duration(325), "5 minutes, 25 seconds");
        assert_eq!(format_duration(120), "2 minutes");
        assert_eq!(format_duration(1), "1 second");
    }
}
