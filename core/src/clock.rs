use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Elapsed play time, displayed as `MM:SS`.
///
/// Minutes keep counting past 99 instead of wrapping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElapsedTime(pub Duration);

impl ElapsedTime {
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl From<Duration> for ElapsedTime {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_seconds = self.0.as_secs();
        write!(f, "{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// Formats a millisecond count as zero-padded `MM:SS`, dropping the
/// sub-second part.
pub fn format_elapsed(millis: u64) -> String {
    ElapsedTime::from_millis(millis).to_string()
}
