use std::fmt;

use chrono::{Local, Timelike};

/// Local wall-clock time of day, second resolution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallTime {
    /// Samples the local clock.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
        }
    }

    /// Builds a time of day from components, rejecting out-of-range values.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        // 60 is allowed for leap seconds, matching `Timelike::second` on some platforms.
        if hour < 24 && minute < 60 && second <= 60 {
            Some(Self {
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:02}:{:02}:{:02}]", self.hour, self.minute, self.second)
    }
}
