//! Sweep outcome reporting.

use serde::Serialize;

use crate::models::CategoryId;

/// Why a sweep did not scan anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepSkip {
    /// Filtering is switched off.
    Disabled,
    /// No sweep category configured.
    Unconfigured,
    /// Topics could not be listed.
    FetchFailed,
}

/// Counters for one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub category_id: Option<CategoryId>,
    pub skipped: Option<SweepSkip>,
    /// Topics returned for the category.
    pub examined: usize,
    pub hidden: usize,
    pub excluded: usize,
    /// Already in the visibility cache, or claimed by a concurrent sweep.
    pub cached: usize,
    pub pinned: usize,
    pub already_hidden: usize,
    /// Topics that vanished before they could be updated.
    pub missing: usize,
    pub failed: usize,
}

impl SweepReport {
    pub(crate) fn skipped(category_id: Option<CategoryId>, reason: SweepSkip) -> Self {
        Self {
            category_id,
            skipped: Some(reason),
            ..Default::default()
        }
    }

    /// Whether the sweep scanned the category.
    pub fn ran(&self) -> bool {
        self.skipped.is_none()
    }
}
