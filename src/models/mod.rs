pub mod extension;
pub mod report;

pub use extension::{ExtensionRecord, LocaleTable, Manifest, MessageEntry};
pub use report::{ReportSnapshot, ReputationResult, RiskBlock, RiskCategory, SnapshotData, WebstoreInfo};
