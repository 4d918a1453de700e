use std::cmp::Ordering;

/// A version token parsed from an extension's version subdirectory name.
///
/// Chrome appends an underscore-suffixed locale qualifier to some directory
/// names (`1.2.3_0`). The qualifier is stripped for display and comparison,
/// but the raw name is what exists on disk and must be used to build paths.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDir {
    pub raw: String,
    pub display: String,
    components: Vec<u64>,
}

impl VersionDir {
    /// Parse a directory name as a dotted-numeric version token.
    ///
    /// Returns `None` for names that are not valid version tokens (a stray
    /// file or a mangled directory must never abort a scan).
    pub fn parse(dir_name: &str) -> Option<Self> {
        let display = dir_name.split('_').next().unwrap_or(dir_name);
        let components = display
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>()?;

        Some(Self {
            raw: dir_name.to_string(),
            display: display.to_string(),
            components,
        })
    }

    /// Numeric component-wise ordering; missing components count as zero,
    /// so `"1.2"` and `"1.2.0"` compare equal.
    fn cmp_components(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

/// Select the newest version among candidate directory names, skipping names
/// that do not parse as version tokens.
pub fn select_latest<I>(names: I) -> Option<VersionDir>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .filter_map(|name| VersionDir::parse(&name))
        .max_by(|a, b| a.cmp_components(b))
}
