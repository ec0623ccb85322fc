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

//! Condition code classification.
//!
//! OpenWeatherMap condition codes are grouped by their leading digit:
//! 2xx thunderstorm, 3xx drizzle, 5xx rain, 6xx snow, 7xx atmosphere,
//! 800 clear and 80x clouds. Only the group matters for a world that can
//! just rain or thunder.

use std::ops::{BitOr, BitOrAssign};

/// Rain and thunder flags applied to a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeatherFlags {
    pub rain: bool,
    pub thunder: bool,
}

impl WeatherFlags {
    pub const CLEAR: Self = Self {
        rain: false,
        thunder: false,
    };
    pub const RAIN: Self = Self {
        rain: true,
        thunder: false,
    };
    pub const THUNDERSTORM: Self = Self {
        rain: true,
        thunder: true,
    };
}

impl BitOr for WeatherFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            rain: self.rain || rhs.rain,
            thunder: self.thunder || rhs.thunder,
        }
    }
}

impl BitOrAssign for WeatherFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Leading decimal digit of a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeatherCategory(u32);

impl WeatherCategory {
    /// Category used when no reading is available.
    pub const NO_DATA: Self = Self(0);

    #[must_use]
    pub fn from_code(mut code: u32) -> Self {
        while code >= 10 {
            code /= 10;
        }
        Self(code)
    }

    #[must_use]
    pub fn digit(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn flags(self) -> WeatherFlags {
        match self.0 {
            2 => WeatherFlags::THUNDERSTORM,
            3 | 5 | 6 => WeatherFlags::RAIN,
            _ => WeatherFlags::CLEAR,
        }
    }
}

/// Rain/thunder flags for a single condition code.
#[must_use]
pub fn classify(code: u32) -> WeatherFlags {
    WeatherCategory::from_code(code).flags()
}

/// OR-combined flags of several condition codes. Empty input is clear.
pub fn classify_all<I>(codes: I) -> WeatherFlags
where
    I: IntoIterator<Item = u32>,
{
    codes
        .into_iter()
        .fold(WeatherFlags::CLEAR, |acc, code| acc | classify(code))
}
