//! Admin dashboard view state: the fetched submission list, the filter and
//! search inputs, pagination and refresh bookkeeping.
//!
//! The full list is always kept sorted by creation time, newest first. The
//! visible rows are derived on demand as `all ∩ filters`, paged by
//! [`PAGE_SIZE`].

use std::time::Duration;

use chrono::{Datelike, FixedOffset};
use serde::Serialize;

use crate::error::CoreError;
use crate::submission::{EducationLevel, JobType, Submission};
use crate::types::{DbId, Timestamp};

pub const PAGE_SIZE: usize = 10;

/// How often the list is re-fetched while auto-refresh is on.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// East Africa Time, UTC+3, used for every displayed timestamp.
const EAT_OFFSET_SECS: i32 = 3 * 3600;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub job_type: Option<JobType>,
    pub education_level: Option<EducationLevel>,
    pub search: String,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.job_type.is_none() && self.education_level.is_none() && self.search.trim().is_empty()
    }

    /// Conjunction of the job type, education level and search predicates.
    pub fn matches(&self, submission: &Submission) -> bool {
        let fields = &submission.fields;
        if self.job_type.is_some_and(|t| t != fields.job_type) {
            return false;
        }
        if self
            .education_level
            .is_some_and(|level| level != fields.education_level)
        {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

        hit(&fields.name)
            || hit(&fields.job_title)
            || hit(fields.job_type.as_str())
            || hit(fields.education_level.as_str())
            || fields.experience_list.iter().any(|entry| {
                hit(&entry.organization) || entry.position_held.as_deref().is_some_and(|p| hit(p))
            })
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Dashboard {
    all: Vec<Submission>,
    filters: Filters,
    /// One-based.
    page: usize,
    loading: bool,
    last_updated: Option<Timestamp>,
    last_error: Option<String>,
    selected: Option<DbId>,
    auto_refresh: bool,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            filters: Filters::default(),
            page: 1,
            loading: false,
            last_updated: None,
            last_error: None,
            selected: None,
            auto_refresh: true,
        }
    }
}

impl Dashboard {
    /// An empty dashboard on page 1 with auto-refresh enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Submission] {
        &self.all
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_updated(&self) -> Option<Timestamp> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    // -- fetch lifecycle --

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Install a freshly fetched list.
    ///
    /// The list is re-sorted newest first. Filters and the current page are
    /// kept; the page is clamped into the new range. A selection that no
    /// longer exists is cleared.
    pub fn replace_all(&mut self, mut submissions: Vec<Submission>, fetched_at: Timestamp) {
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.all = submissions;
        self.loading = false;
        self.last_updated = Some(fetched_at);
        self.last_error = None;
        if let Some(id) = self.selected {
            if !self.all.iter().any(|s| s.id == id) {
                self.selected = None;
            }
        }
        self.clamp_page();
    }

    /// Record a failed fetch. The last known list stays in place.
    pub fn fetch_failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.last_error = Some(message.into());
    }

    // -- filters --

    pub fn set_job_type(&mut self, job_type: Option<JobType>) {
        self.filters.job_type = job_type;
        self.page = 1;
    }

    pub fn set_education_level(&mut self, level: Option<EducationLevel>) {
        self.filters.education_level = level;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.page = 1;
    }

    /// Every submission passing the filters, newest first.
    pub fn filtered(&self) -> Vec<&Submission> {
        self.all.iter().filter(|s| self.filters.matches(s)).collect()
    }

    // -- pagination --

    /// `ceil(filtered / PAGE_SIZE)`; zero when nothing matches.
    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(PAGE_SIZE)
    }

    /// The rows of the current page.
    pub fn page_items(&self) -> Vec<&Submission> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.page < self.page_count() {
            self.page += 1;
        }
    }

    /// Go back one page; no-op on page 1.
    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Jump to `page`, clamped into `[1, page_count]`.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.page_count().max(1));
    }

    // -- selection --

    pub fn select(&mut self, id: DbId) -> Result<&Submission, CoreError> {
        let submission = self
            .all
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::NotFound {
                entity: "submission",
                id,
            })?;
        self.selected = Some(id);
        Ok(submission)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Submission> {
        let id = self.selected?;
        self.all.iter().find(|s| s.id == id)
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Render a timestamp the way the dashboard shows it, e.g.
/// `5th March, 2025 2:07pm EAT`.
pub fn format_eat(ts: Timestamp) -> String {
    let Some(eat) = FixedOffset::east_opt(EAT_OFFSET_SECS) else {
        return ts.to_rfc3339();
    };
    let local = ts.with_timezone(&eat);
    let day = local.day();
    format!(
        "{day}{} {} EAT",
        ordinal_suffix(day),
        local.format("%B, %Y %-I:%M%P")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
