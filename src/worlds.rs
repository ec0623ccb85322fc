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

//! World set construction and shutdown reporting.

use chrono::Local;
use log::info;
use world_sync::{Feature, FeatureState, FeatureStatus, InMemoryWorlds};

use crate::config::WorldConfig;

/// Build the in-memory world set from the configured worlds.
pub fn build(configs: &[WorldConfig]) -> InMemoryWorlds {
    let worlds = InMemoryWorlds::new();
    for world in configs {
        worlds.add_world(world.name.clone(), world.kind);
    }
    worlds
}

/// One-line description of a feature for the shutdown summary.
pub fn describe_feature(feature: Feature, status: &FeatureStatus) -> String {
    let state = match &status.state {
        FeatureState::Unconfigured => "off".to_string(),
        FeatureState::Validating => "validating".to_string(),
        FeatureState::Active => "active".to_string(),
        FeatureState::Disabled(reason) => format!("disabled ({reason})"),
    };

    let mut line = format!("{feature} sync: {state}");
    if status.ticks > 0 {
        line.push_str(&format!(", {} ticks", status.ticks));
    }
    if status.failed_fetches > 0 {
        line.push_str(&format!(", {} failed fetches", status.failed_fetches));
    }
    if let Some(at) = status.last_synced_at {
        line.push_str(&format!(
            ", last synced {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
    }
    line
}

/// Log the final state of every world.
pub fn log_summary(worlds: &InMemoryWorlds) {
    for world in worlds.worlds() {
        info!(
            "{} ({:?}): time {}, rain {}, thunder {}, day cycle {}, weather cycle {}",
            world.name,
            world.kind,
            world.time,
            world.raining,
            world.thundering,
            world.day_cycle,
            world.weather_cycle
        );
    }
}
