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

mod config;
mod worlds;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use mimalloc::MiMalloc;
use world_sync::{EnvironmentHost, Feature, SyncEngine};

use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Keep simulated worlds in sync with real time and weather
#[derive(Parser, Debug)]
#[command(name = "realtime-sync", version, about)]
struct Cli {
    /// Configuration file to use instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force verbose output regardless of the `Debug` setting
    #[arg(long)]
    debug: bool,

    /// Print the default configuration file path and exit
    #[arg(long)]
    print_config_path: bool,
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let app_config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let debug = cli.debug || app_config.debug;
    init_logging(debug);

    // Ticks are cheap; one thread interleaves both sync tasks.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(app_config, debug))
}

async fn run(app_config: AppConfig, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let host = Arc::new(worlds::build(&app_config.worlds));
    info!(
        "Managing {} worlds ({} eligible for sync)",
        host.worlds().len(),
        host.eligible_environments().len()
    );

    let mut sync_config = app_config.sync_configuration();
    sync_config.debug = debug;

    let engine = SyncEngine::builder(sync_config, host.clone()).start().await;

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {err}");
    }

    let statuses = [Feature::Time, Feature::Weather].map(|f| (f, engine.status(f)));
    engine.stop().await;

    for (feature, status) in &statuses {
        info!("{}", worlds::describe_feature(*feature, status));
    }
    worlds::log_summary(&host);

    Ok(())
}
