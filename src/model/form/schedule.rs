use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// When a form accepts submissions.
///
/// A missing bound is unbounded on that side; `always_open` makes `close_at`
/// ignored but leaves `open_at` in force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub always_open: bool,
}

impl Schedule {
    /// A schedule that never closes.
    pub fn always_open() -> Self {
        Self {
            always_open: true,
            ..Self::default()
        }
    }

    /// A bounded submission window. Both bounds are inclusive.
    pub fn window(open_at: DateTime<Utc>, close_at: DateTime<Utc>) -> Self {
        Self {
            open_at: Some(open_at),
            close_at: Some(close_at),
            always_open: false,
        }
    }

    /// Whether the window has yet to open at the given instant.
    pub fn opens_in_future(&self, now: DateTime<Utc>) -> bool {
        matches!(self.open_at, Some(open_at) if now < open_at)
    }

    /// Whether the window contains the given instant.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if self.opens_in_future(now) {
            return false;
        }
        if self.always_open {
            return true;
        }
        match self.close_at {
            Some(close_at) => now <= close_at,
            None => true,
        }
    }
}
