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

//! Sync engine.
//!
//! Each feature (time, weather) moves through
//! `Unconfigured -> Validating -> Active` or ends in `Disabled(reason)` when
//! its startup validation fails. Active features run one periodic task each.
//! A task awaits its whole tick before the next one is due, so a slow
//! network call delays the task but never stacks ticks.
//!
//! Activating a feature turns off the matching native cycle in every eligible
//! world: time sync owns the day cycle and weather sync owns the weather
//! cycle. Stopping the engine cancels both tasks and re-enables both native
//! cycles of every eligible world.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::{resolve_timezone, SystemClock, TimeSource};
use crate::config::SyncConfiguration;
use crate::environment::EnvironmentHost;
use crate::error::ValidationError;
use crate::weather::{OpenWeatherMapClient, ResolvedLocation, WeatherProvider, WeatherReading};

/// Verbose stream: promoted to info when the debug flag is set.
macro_rules! verbose {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            log::info!($($arg)+);
        } else {
            log::debug!($($arg)+);
        }
    };
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One of the two independently configured sync features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Time,
    Weather,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Time => f.write_str("time"),
            Feature::Weather => f.write_str("weather"),
        }
    }
}

/// Lifecycle state of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeatureState {
    /// Turned off in the configuration. Terminal.
    #[default]
    Unconfigured,
    /// Startup validation in progress.
    Validating,
    /// Validated and scheduled.
    Active,
    /// Validation failed. Terminal for the life of the process.
    Disabled(ValidationError),
}

impl FeatureState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// State plus tick statistics for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureStatus {
    pub state: FeatureState,

    /// Completed ticks, including ticks whose fetch failed
    pub ticks: u64,

    pub failed_fetches: u64,

    /// Last validation or fetch error
    pub last_error: Option<String>,

    /// End of the last tick that applied fresh data
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Tick periods of the two sync tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncIntervals {
    pub time: Duration,
    pub weather: Duration,
}

impl Default for SyncIntervals {
    fn default() -> Self {
        Self {
            time: Duration::from_secs(1),
            weather: Duration::from_secs(300),
        }
    }
}

/// Builder for [`SyncEngine`].
///
/// Defaults to the system clock, the production OpenWeatherMap API and
/// [`SyncIntervals::default`].
pub struct SyncEngineBuilder {
    config: SyncConfiguration,
    host: Arc<dyn EnvironmentHost>,
    clock: Arc<dyn TimeSource>,
    weather: Arc<dyn WeatherProvider>,
    intervals: SyncIntervals,
}

impl fmt::Debug for SyncEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngineBuilder")
            .field("config", &self.config)
            .field("intervals", &self.intervals)
            .finish_non_exhaustive()
    }
}

impl SyncEngineBuilder {
    #[must_use]
    pub fn time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn weather_provider(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.weather = provider;
        self
    }

    #[must_use]
    pub fn intervals(mut self, intervals: SyncIntervals) -> Self {
        self.intervals = SyncIntervals {
            time: intervals.time.max(MIN_INTERVAL),
            weather: intervals.weather.max(MIN_INTERVAL),
        };
        self
    }

    /// Validate both features and schedule the ones that pass.
    ///
    /// Returns once both validations have finished. A failed validation
    /// disables its feature; it never fails the engine.
    pub async fn start(self) -> SyncEngine {
        let Self {
            config,
            host,
            clock,
            weather,
            intervals,
        } = self;

        info!("Starting...");
        verbose!(config.debug, "Configuration: {config:?}");

        let mut engine = SyncEngine {
            config,
            host,
            time_status: Arc::new(watch::channel(FeatureStatus::default()).0),
            weather_status: Arc::new(watch::channel(FeatureStatus::default()).0),
            tasks: Vec::new(),
            cancel_token: CancellationToken::new(),
        };

        engine.setup_time(clock, intervals.time);
        engine.setup_weather(weather, intervals.weather).await;

        info!("Started!");
        engine
    }
}

/// A scheduled periodic sync.
struct TaskHandle {
    feature: Feature,
    join: JoinHandle<()>,
}

/// Orchestrates the time and weather sync features.
pub struct SyncEngine {
    config: SyncConfiguration,
    host: Arc<dyn EnvironmentHost>,
    time_status: Arc<watch::Sender<FeatureStatus>>,
    weather_status: Arc<watch::Sender<FeatureStatus>>,
    tasks: Vec<TaskHandle>,
    cancel_token: CancellationToken,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("time", &self.time_status.borrow().state)
            .field("weather", &self.weather_status.borrow().state)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Start building an engine for `config` that applies to `host`.
    pub fn builder(config: SyncConfiguration, host: Arc<dyn EnvironmentHost>) -> SyncEngineBuilder {
        SyncEngineBuilder {
            config,
            host,
            clock: Arc::new(SystemClock),
            weather: Arc::new(OpenWeatherMapClient::new()),
            intervals: SyncIntervals::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfiguration {
        &self.config
    }

    #[must_use]
    pub fn status(&self, feature: Feature) -> FeatureStatus {
        self.status_tx(feature).borrow().clone()
    }

    #[must_use]
    pub fn state(&self, feature: Feature) -> FeatureState {
        self.status_tx(feature).borrow().state.clone()
    }

    /// Watch a feature's status as ticks complete.
    #[must_use]
    pub fn subscribe(&self, feature: Feature) -> watch::Receiver<FeatureStatus> {
        self.status_tx(feature).subscribe()
    }

    /// Whether a periodic task was ever scheduled for `feature`.
    #[must_use]
    pub fn is_scheduled(&self, feature: Feature) -> bool {
        self.tasks.iter().any(|task| task.feature == feature)
    }

    /// Cancel both tasks and restore the native cycles.
    ///
    /// A tick that is waiting on the network is abandoned. Every eligible
    /// world gets exactly one `set_cycle_enabled(target, true, true)`,
    /// whichever features were active.
    pub async fn stop(mut self) {
        info!("Stopping...");
        self.cancel_token.cancel();

        for task in self.tasks.drain(..) {
            if let Err(err) = task.join.await {
                warn!("The {} sync task ended abnormally: {err}", task.feature);
            }
        }

        for target in self.host.eligible_environments() {
            verbose!(
                self.config.debug,
                "Re-enabling normal daylight and weather cycles for {target}..."
            );
            self.host.set_cycle_enabled(&target, true, true);
        }

        info!("Stopped");
    }

    fn status_tx(&self, feature: Feature) -> &Arc<watch::Sender<FeatureStatus>> {
        match feature {
            Feature::Time => &self.time_status,
            Feature::Weather => &self.weather_status,
        }
    }

    fn setup_time(&mut self, clock: Arc<dyn TimeSource>, interval: Duration) {
        if !self.config.time_enabled {
            return;
        }
        self.status_tx(Feature::Time)
            .send_modify(|status| status.state = FeatureState::Validating);

        let zone = match resolve_timezone(&self.config.timezone_id) {
            Ok(zone) => zone,
            Err(reason) => {
                error!("Error loading timezone. Check that the values in your configuration file are valid.");
                self.disable(Feature::Time, reason);
                return;
            }
        };

        verbose!(self.config.debug, "Enabling time zone sync (every {interval:?})");
        verbose!(self.config.debug, "Syncing time with {zone}");

        self.activate(Feature::Time);
        self.schedule(
            TimeSync {
                clock,
                zone,
                host: Arc::clone(&self.host),
                status: Arc::clone(&self.time_status),
            },
            interval,
        );
    }

    async fn setup_weather(&mut self, provider: Arc<dyn WeatherProvider>, interval: Duration) {
        if !self.config.weather_enabled {
            return;
        }
        self.status_tx(Feature::Weather)
            .send_modify(|status| status.state = FeatureState::Validating);

        let location = match provider
            .validate(&self.config.api_key, &self.config.location)
            .await
        {
            Ok(location) => location,
            Err(reason) => {
                self.disable(Feature::Weather, reason);
                return;
            }
        };

        verbose!(self.config.debug, "Enabling weather sync (every {interval:?})");
        match (&location.name, location.coordinates) {
            (Some(name), Some(coords)) => verbose!(
                self.config.debug,
                "Syncing weather with {name} ({}, {})",
                coords.lat,
                coords.lon
            ),
            _ => verbose!(
                self.config.debug,
                "Syncing weather with {}",
                location.query.as_query()
            ),
        }

        self.activate(Feature::Weather);
        self.schedule(
            WeatherSync {
                provider,
                api_key: self.config.api_key.clone(),
                location,
                host: Arc::clone(&self.host),
                status: Arc::clone(&self.weather_status),
                debug: self.config.debug,
            },
            interval,
        );
    }

    fn disable(&self, feature: Feature, reason: ValidationError) {
        match reason.detail() {
            Some(detail) if self.config.debug => {
                error!("Could not enable {feature} sync: {reason} ({detail})");
            }
            _ => error!("Could not enable {feature} sync: {reason}"),
        }
        if matches!(
            reason,
            ValidationError::InvalidApiKey
                | ValidationError::InvalidLocation
                | ValidationError::ConfigurationError(_)
        ) {
            error!("Please check that the values set in the config file are correct");
        }
        error!("Disabling {feature} sync...");

        let message = reason.to_string();
        self.status_tx(feature).send_modify(|status| {
            status.state = FeatureState::Disabled(reason);
            status.last_error = Some(message);
        });
    }

    /// Mark `feature` active and hand its cycle over from the host.
    fn activate(&self, feature: Feature) {
        self.status_tx(feature)
            .send_modify(|status| status.state = FeatureState::Active);

        let day_cycle = !self.time_status.borrow().state.is_active();
        let weather_cycle = !self.weather_status.borrow().state.is_active();

        for target in self.host.eligible_environments() {
            verbose!(self.config.debug, "Disabling native {feature} cycle in {target}");
            self.host.set_cycle_enabled(&target, day_cycle, weather_cycle);
        }
    }

    fn schedule(&mut self, task: impl SyncTask, interval: Duration) {
        let feature = task.feature();
        let join = tokio::spawn(run_periodic(task, interval, self.cancel_token.clone()));
        self.tasks.push(TaskHandle { feature, join });
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            warn!("Sync engine dropped without stop(); native cycles were not restored");
        }
        self.cancel_token.cancel();
    }
}

/// Body of one periodic sync task.
#[async_trait]
trait SyncTask: Send + Sync + 'static {
    fn feature(&self) -> Feature;

    async fn tick(&self);
}

async fn run_periodic<T: SyncTask>(task: T, period: Duration, cancel_token: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            () = cancel_token.cancelled() => break,
            () = task.tick() => {}
        }
    }

    debug!("The {} sync task stopped", task.feature());
}

struct TimeSync {
    clock: Arc<dyn TimeSource>,
    zone: Tz,
    host: Arc<dyn EnvironmentHost>,
    status: Arc<watch::Sender<FeatureStatus>>,
}

#[async_trait]
impl SyncTask for TimeSync {
    fn feature(&self) -> Feature {
        Feature::Time
    }

    async fn tick(&self) {
        let value = self.clock.now(self.zone);
        for target in self.host.eligible_environments() {
            self.host.set_clock_value(&target, value);
        }

        self.status.send_modify(|status| {
            status.ticks += 1;
            status.last_synced_at = Some(Utc::now());
        });
    }
}

struct WeatherSync {
    provider: Arc<dyn WeatherProvider>,
    api_key: String,
    location: ResolvedLocation,
    host: Arc<dyn EnvironmentHost>,
    status: Arc<watch::Sender<FeatureStatus>>,
    debug: bool,
}

#[async_trait]
impl SyncTask for WeatherSync {
    fn feature(&self) -> Feature {
        Feature::Weather
    }

    async fn tick(&self) {
        verbose!(self.debug, "Syncing weather...");

        // A failed fetch counts as "no data" for this tick only.
        let (reading, failure) = match self
            .provider
            .fetch_current(&self.api_key, &self.location)
            .await
        {
            Ok(reading) => (reading, None),
            Err(err) => {
                if self.debug {
                    error!("There was an error when attempting to get weather information: {err}");
                } else {
                    error!("There was an error when attempting to get weather information");
                }
                (WeatherReading::no_data(), Some(err.to_string()))
            }
        };

        let flags = reading.flags();
        verbose!(
            self.debug,
            "Setting weather (rain: {}, thunder: {})...",
            flags.rain,
            flags.thunder
        );
        for target in self.host.eligible_environments() {
            self.host.set_weather_flags(&target, flags.rain, flags.thunder);
        }

        self.status.send_modify(|status| {
            status.ticks += 1;
            match failure {
                Some(message) => {
                    status.failed_fetches += 1;
                    status.last_error = Some(message);
                }
                None => status.last_synced_at = Some(Utc::now()),
            }
        });
    }
}
