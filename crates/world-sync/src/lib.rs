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

//! Real-world time and weather synchronization for simulated worlds.
//!
//! This library keeps the clock and weather of a set of managed worlds in
//! step with a real timezone and the current conditions reported by
//! OpenWeatherMap. It is split into layers that can be used on their own:
//!
//! - **Clock layer**: timezone resolution and the affine map from wall-clock
//!   time to the simulated time-of-day scale
//! - **Weather layer**: condition code classification and the OpenWeatherMap
//!   client used for validation and current-conditions polling
//! - **Environment layer**: the capability interface the engine drives, plus
//!   an in-memory implementation
//! - **Engine**: startup validation, periodic sync tasks, self-disablement
//!   and shutdown restore
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use world_sync::{InMemoryWorlds, SyncConfiguration, SyncEngine};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let worlds = Arc::new(InMemoryWorlds::with_default_worlds());
//!     let config = SyncConfiguration {
//!         timezone_id: "Europe/Berlin".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let engine = SyncEngine::builder(config, worlds).start().await;
//!     tokio::signal::ctrl_c().await.ok();
//!     engine.stop().await;
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ```
//! use world_sync::clock::sim_time;
//! use world_sync::weather::classify;
//!
//! assert_eq!(sim_time(12, 0), 6000);
//!
//! let flags = classify(211);
//! assert!(flags.rain && flags.thunder);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod weather;

pub use clock::{FixedClock, SystemClock, TimeSource};
pub use config::{LocationQuery, SyncConfiguration};
pub use engine::{Feature, FeatureState, FeatureStatus, SyncEngine, SyncEngineBuilder, SyncIntervals};
pub use environment::{
    EnvironmentHost, EnvironmentKind, EnvironmentTarget, HostCall, InMemoryWorlds, WorldState,
};
pub use error::{FetchError, ValidationError};
pub use weather::{
    classify, OpenWeatherMapClient, ResolvedLocation, WeatherCategory, WeatherFlags,
    WeatherProvider, WeatherReading,
};
