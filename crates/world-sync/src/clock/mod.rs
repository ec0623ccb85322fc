// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wall-clock to simulated time-of-day conversion.
//!
//! The simulated day is 24000 ticks long and its zero point sits at 06:00
//! real time, so real sunrise, noon and sunset line up with the simulated
//! ones. Each real hour is 1000 ticks and each real minute 16 ticks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{Timelike, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// Simulated ticks per real hour.
pub const TICKS_PER_HOUR: i64 = 1000;

/// Simulated ticks per real minute (rounded down from 16.67).
pub const TICKS_PER_MINUTE: i64 = 16;

/// Offset between real midnight and the simulated zero point.
pub const MIDNIGHT_OFFSET: i64 = 6000;

/// Length of one native simulated day.
pub const DAY_LENGTH: i64 = 24_000;

/// Resolve an IANA timezone identifier.
///
/// Only called while validating the time feature; the periodic task works
/// with the resolved [`Tz`]. Bare offsets such as `+02:00` are not zone names
/// and are rejected; use the `Etc/GMT-2` style zones for a fixed offset.
pub fn resolve_timezone(id: &str) -> Result<Tz, ValidationError> {
    id.trim()
        .parse::<Tz>()
        .map_err(|err| ValidationError::InvalidTimezone {
            id: id.to_string(),
            detail: err.to_string(),
        })
}

/// Map an hour (0-23) and minute (0-59) onto the simulated scale.
///
/// The result is not reduced; hosts take it modulo [`DAY_LENGTH`].
#[must_use]
pub fn sim_time(hour: u32, minute: u32) -> i64 {
    TICKS_PER_HOUR * i64::from(hour) + TICKS_PER_MINUTE * i64::from(minute) - MIDNIGHT_OFFSET
}

/// Source of the current wall-clock time in a timezone.
pub trait TimeSource: Send + Sync {
    /// Current hour and minute in `zone`.
    fn local_time(&self, zone: Tz) -> (u32, u32);

    /// Current simulated time-of-day in `zone`.
    fn now(&self, zone: Tz) -> i64 {
        let (hour, minute) = self.local_time(zone);
        sim_time(hour, minute)
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn local_time(&self, zone: Tz) -> (u32, u32) {
        let now = Utc::now().with_timezone(&zone);
        (now.hour(), now.minute())
    }
}

/// A clock that reports a settable time regardless of zone.
///
/// Clones share the same time, so a test can keep one handle and move the
/// other into the engine.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    minute_of_day: Arc<AtomicU32>,
}

impl FixedClock {
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Self {
        let clock = Self::default();
        clock.set(hour, minute);
        clock
    }

    pub fn set(&self, hour: u32, minute: u32) {
        self.minute_of_day
            .store((hour % 24) * 60 + minute % 60, Ordering::Relaxed);
    }
}

impl TimeSource for FixedClock {
    fn local_time(&self, _zone: Tz) -> (u32, u32) {
        let minutes = self.minute_of_day.load(Ordering::Relaxed);
        (minutes / 60, minutes % 60)
    }
}
