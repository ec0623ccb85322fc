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

//! Environment capability layer.
//!
//! The engine never touches a world directly. It asks an [`EnvironmentHost`]
//! for the eligible targets and applies values through it, so the same
//! engine can drive a game server, a simulator, or the in-memory host used
//! by the binary and the tests.

mod memory;

pub use memory::{EnvironmentKind, HostCall, InMemoryWorlds, WorldState};

use std::fmt;

/// Opaque handle to a managed world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentTarget(String);

impl EnvironmentTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities the engine needs from whatever hosts the worlds.
///
/// Methods take `&self` because both sync tasks share one host; implementors
/// synchronize internally. Each call affects only its target.
pub trait EnvironmentHost: Send + Sync {
    /// Worlds subject to sync. Auxiliary dimensions are filtered out here.
    fn eligible_environments(&self) -> Vec<EnvironmentTarget>;

    /// Set the time of day. The host reduces `value` modulo its day length.
    fn set_clock_value(&self, target: &EnvironmentTarget, value: i64);

    fn set_weather_flags(&self, target: &EnvironmentTarget, rain: bool, thunder: bool);

    /// Turn the host's own day and weather cycles on or off.
    fn set_cycle_enabled(&self, target: &EnvironmentTarget, day_cycle: bool, weather_cycle: bool);
}
