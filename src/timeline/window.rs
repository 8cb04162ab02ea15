//! Window attributes.

use serde::{Deserialize, Serialize};

/// A user-facing unit of content (one playlist item); decomposed into one or
/// more periods (e.g. ad breaks around the content period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub is_seekable: bool,
    pub is_dynamic: bool,
    pub default_position_us: i64,
    /// Duration in microseconds, or `None` if not yet known (`UNSET`).
    pub duration_us: Option<i64>,
    pub first_period_index: usize,
    pub last_period_index: usize,
    pub position_in_first_period_us: i64,
}

impl Window {
    /// A placeholder window standing in for a holder whose real timeline has
    /// not yet arrived from its `MediaSource` (§4.1 timeline masking).
    pub fn placeholder(period_index: usize) -> Self {
        Self {
            is_seekable: false,
            is_dynamic: true,
            default_position_us: 0,
            duration_us: None,
            first_period_index: period_index,
            last_period_index: period_index,
            position_in_first_period_us: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        !self.is_seekable && self.is_dynamic && self.duration_us.is_none()
    }

    /// Equality used for timeline-identity comparisons (uids excluded; see
    /// [`super::Timeline::same_content`]).
    pub fn same_content(&self, other: &Window) -> bool {
        self.is_seekable == other.is_seekable
            && self.is_dynamic == other.is_dynamic
            && self.default_position_us == other.default_position_us
            && self.duration_us == other.duration_us
            && self.first_period_index == other.first_period_index
            && self.last_period_index == other.last_period_index
            && self.position_in_first_period_us == other.position_in_first_period_us
    }
}
