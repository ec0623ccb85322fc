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

//! In-memory environment host.
//!
//! Holds a fixed set of worlds, applies engine calls to them, and keeps a
//! bounded history of the calls it received.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::clock::DAY_LENGTH;
use crate::environment::{EnvironmentHost, EnvironmentTarget};

const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Kind of world. Only [`EnvironmentKind::Normal`] worlds are synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentKind {
    #[default]
    Normal,
    Nether,
    TheEnd,
}

/// Current state of one world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    pub name: String,
    pub kind: EnvironmentKind,
    /// Time of day in `0..DAY_LENGTH`
    pub time: i64,
    pub raining: bool,
    pub thundering: bool,
    pub day_cycle: bool,
    pub weather_cycle: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl WorldState {
    fn new(name: String, kind: EnvironmentKind) -> Self {
        Self {
            name,
            kind,
            time: 0,
            raining: false,
            thundering: false,
            day_cycle: true,
            weather_cycle: true,
            last_updated: None,
        }
    }
}

/// A call received from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ClockValue {
        target: EnvironmentTarget,
        value: i64,
    },
    WeatherFlags {
        target: EnvironmentTarget,
        rain: bool,
        thunder: bool,
    },
    CycleEnabled {
        target: EnvironmentTarget,
        day_cycle: bool,
        weather_cycle: bool,
    },
}

/// Worlds held in memory.
#[derive(Debug)]
pub struct InMemoryWorlds {
    worlds: RwLock<Vec<WorldState>>,
    history: Mutex<VecDeque<HostCall>>,
    max_history_entries: usize,
}

impl InMemoryWorlds {
    #[must_use]
    pub fn new() -> Self {
        Self {
            worlds: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::new()),
            max_history_entries: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// An overworld plus the two auxiliary dimensions.
    #[must_use]
    pub fn with_default_worlds() -> Self {
        Self::new()
            .with_world("world", EnvironmentKind::Normal)
            .with_world("world_nether", EnvironmentKind::Nether)
            .with_world("world_the_end", EnvironmentKind::TheEnd)
    }

    #[must_use]
    pub fn with_world(self, name: impl Into<String>, kind: EnvironmentKind) -> Self {
        self.add_world(name, kind);
        self
    }

    /// Override the number of calls kept in the history.
    #[must_use]
    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.max_history_entries = max_entries.max(1);
        self
    }

    /// Add a world. Worlds are never removed.
    pub fn add_world(&self, name: impl Into<String>, kind: EnvironmentKind) {
        let name = name.into();
        if let Ok(mut worlds) = self.worlds.write() {
            if worlds.iter().any(|w| w.name == name) {
                warn!("World '{name}' already exists");
                return;
            }
            worlds.push(WorldState::new(name, kind));
        }
    }

    /// Snapshot of every world, in insertion order.
    #[must_use]
    pub fn worlds(&self) -> Vec<WorldState> {
        self.worlds.read().map(|w| w.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn world(&self, name: &str) -> Option<WorldState> {
        self.worlds
            .read()
            .ok()
            .and_then(|w| w.iter().find(|w| w.name == name).cloned())
    }

    /// Most recent calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn record(&self, call: HostCall) {
        if let Ok(mut history) = self.history.lock() {
            if history.len() >= self.max_history_entries {
                history.pop_front();
            }
            history.push_back(call);
        }
    }

    fn update(&self, target: &EnvironmentTarget, apply: impl FnOnce(&mut WorldState)) {
        let Ok(mut worlds) = self.worlds.write() else {
            return;
        };
        match worlds.iter_mut().find(|w| w.name == target.name()) {
            Some(world) => {
                apply(world);
                world.last_updated = Some(Utc::now());
            }
            None => warn!("Ignoring update for unknown world '{target}'"),
        }
    }
}

impl Default for InMemoryWorlds {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentHost for InMemoryWorlds {
    fn eligible_environments(&self) -> Vec<EnvironmentTarget> {
        self.worlds
            .read()
            .map(|worlds| {
                worlds
                    .iter()
                    .filter(|w| w.kind == EnvironmentKind::Normal)
                    .map(|w| EnvironmentTarget::new(w.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_clock_value(&self, target: &EnvironmentTarget, value: i64) {
        self.record(HostCall::ClockValue {
            target: target.clone(),
            value,
        });
        self.update(target, |world| world.time = value.rem_euclid(DAY_LENGTH));
    }

    fn set_weather_flags(&self, target: &EnvironmentTarget, rain: bool, thunder: bool) {
        self.record(HostCall::WeatherFlags {
            target: target.clone(),
            rain,
            thunder,
        });
        self.update(target, |world| {
            world.raining = rain;
            world.thundering = thunder;
        });
    }

    fn set_cycle_enabled(&self, target: &EnvironmentTarget, day_cycle: bool, weather_cycle: bool) {
        self.record(HostCall::CycleEnabled {
            target: target.clone(),
            day_cycle,
            weather_cycle,
        });
        self.update(target, |world| {
            world.day_cycle = day_cycle;
            world.weather_cycle = weather_cycle;
        });
    }
}
