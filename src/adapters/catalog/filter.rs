//! Inclusion filters for full scans
//!
//! Records rejected by a filter are skipped before they are counted.

use crate::domain::Record;

/// Decides whether a record takes part in a full scan
pub trait RecordFilter: Send + Sync {
    /// Whether the record should be indexed
    fn is_included(&self, record: &Record) -> bool;
}

/// Keeps products that are online and searchable
///
/// Missing flags count as `true`.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    online_attribute: String,
    searchable_attribute: String,
}

impl ProductFilter {
    /// Filter on the `online` and `searchable` attributes
    pub fn new() -> Self {
        Self {
            online_attribute: "online".to_string(),
            searchable_attribute: "searchable".to_string(),
        }
    }
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFilter for ProductFilter {
    fn is_included(&self, record: &Record) -> bool {
        record.flag(&self.online_attribute, true) && record.flag(&self.searchable_attribute, true)
    }
}

/// Accepts every record
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl RecordFilter for IncludeAll {
    fn is_included(&self, _record: &Record) -> bool {
        true
    }
}
