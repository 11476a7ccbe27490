// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Display;
use std::time::SystemTime;

use jiff::Timestamp;

/// Extension trait for [`SystemTime`] that provides formatting capabilities.
pub trait SystemTimeExt {
    /// Returns a value that formats the [`SystemTime`] in ISO 8601 format.
    ///
    /// Times outside the valid range (before year -9999 or after year 9999) are saturated
    /// to the nearest boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    /// use tick::fmt::SystemTimeExt;
    ///
    /// let time = SystemTime::UNIX_EPOCH + Duration::from_secs(3600);
    /// assert_eq!(time.display().to_string(), "1970-01-01T01:00:00Z");
    /// ```
    fn display(&self) -> impl Display;
}

impl SystemTimeExt for SystemTime {
    fn display(&self) -> impl Display {
        // jiff's Timestamp implements Display that outputs ISO 8601 format
        to_timestamp_saturating(*self)
    }
}

fn to_timestamp_saturating(system_time: SystemTime) -> Timestamp {
    match Timestamp::try_from(system_time) {
        Ok(timestamp) => timestamp,
        Err(_) => {
            if system_time < SystemTime::from(Timestamp::MIN) {
                Timestamp::MIN
            } else {
                Timestamp::MAX
            }
        }
    }
}
