use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static EXTENSION_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{32}$").unwrap());
static CRXCAVATOR_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]{32}$").unwrap());
static VIRUSTOTAL_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").unwrap());

/// Check that a string is a well-formed extension identifier
/// (32 lowercase alphabetic characters).
pub fn is_extension_id(input: &str) -> bool {
    EXTENSION_ID_RE.is_match(input)
}

/// Validate a user-supplied extension identifier, rejecting it before any
/// network call is made.
pub fn validate_extension_id(input: &str) -> Result<&str> {
    let input = input.trim();
    if is_extension_id(input) {
        Ok(input)
    } else {
        anyhow::bail!("'{}' is not a valid extension identifier", input)
    }
}

/// CRXcavator API keys are exactly 32 alphabetic characters.
pub fn is_crxcavator_key(key: &str) -> bool {
    CRXCAVATOR_KEY_RE.is_match(key)
}

/// VirusTotal API keys are exactly 64 lowercase hex characters.
pub fn is_virustotal_key(key: &str) -> bool {
    VIRUSTOTAL_KEY_RE.is_match(key)
}

/// Read a newline-delimited batch file of extension identifiers.
///
/// Blank lines are ignored; any other malformed line fails the whole file,
/// since a typo'd identifier would otherwise surface much later as a
/// confusing remote error.
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read batch file {}", path.display()))?;

    let mut ids = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !is_extension_id(line) {
            anyhow::bail!(
                "{}:{} - '{}' is not a valid extension identifier",
                path.display(),
                number + 1,
                line
            );
        }
        ids.push(line.to_string());
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_valid_extension_id() {
        assert!(is_extension_id("nkbihfbeogaeaoehlefnkodbefgpgknn"));
    }

    #[test]
    fn test_invalid_extension_ids() {
        assert!(!is_extension_id("short"));
        assert!(!is_extension_id("NKBIHFBEOGAEAOEHLEFNKODBEFGPGKNN"));
        assert!(!is_extension_id("nkbihfbeogaeaoehlefnkodbefgpgkn1"));
        assert!(!is_extension_id("nkbihfbeogaeaoehlefnkodbefgpgknnx"));
    }

    #[test]
    fn test_key_formats() {
        assert!(is_crxcavator_key("AbCdEfGhIjKlMnOpQrStUvWxYzAbCdEf"));
        assert!(!is_crxcavator_key("AbCdEfGhIjKlMnOpQrStUvWxYzAbCd3f"));
        assert!(is_virustotal_key(&"0123456789abcdef".repeat(4)));
        assert!(!is_virustotal_key(&"0123456789ABCDEF".repeat(4)));
        assert!(!is_virustotal_key("deadbeef"));
    }

    #[test]
    fn test_read_batch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nkbihfbeogaeaoehlefnkodbefgpgknn").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  gighmmpiobklfepjocnamgkkbiglidom  ").unwrap();

        let ids = read_batch_file(file.path()).unwrap();
        assert_eq!(
            ids,
            vec![
                "nkbihfbeogaeaoehlefnkodbefgpgknn".to_string(),
                "gighmmpiobklfepjocnamgkkbiglidom".to_string(),
            ]
        );
    }

    #[test]
    fn test_read_batch_file_rejects_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nkbihfbeogaeaoehlefnkodbefgpgknn").unwrap();
        writeln!(file, "not-an-id").unwrap();

        assert!(read_batch_file(file.path()).is_err());
    }
}
