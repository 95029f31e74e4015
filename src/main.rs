//! Muezzin - A prayer alert scheduler.
//!
//! This is the main entry point of muezzin, which turns the prayer times of a
//! location and the user's alert preferences into timed notifications.
//!
//! # Overview
//!
//! Muezzin keeps the notifications of today and tomorrow scheduled. Whenever
//! the day changes or a setting is modified, every pending notification is
//! cancelled and the whole schedule is rebuilt from scratch.
//!
//! # Features
//!
//! - **Prayer Alerts**: At each of the five prayers and at sunrise
//! - **Pre-Alerts and Iqama**: Some minutes before a prayer and at its iqama
//! - **Special Timings**: Morning and evening athkar, duha, last third of the night
//! - **Periodic Reminders**: Weekly or monthly reminders at a fixed clock time
//! - **Custom Alerts**: Any offset from any prayer
//! - **Sounds**: Per-alert sound with a fallback chain, played by an external player
//! - **Push Delivery**: Fired notifications posted to an ntfy compatible topic
//!
//! # Usage
//!
//! ```bash
//! # Run the scheduler
//! muezzin --config config.yaml --data ./muezzin-data
//!
//! # Print what would be scheduled
//! muezzin --config config.yaml --data ./muezzin-data preview
//!
//! # Change settings, picked up by a running daemon at its next check
//! muezzin --config config.yaml --data ./muezzin-data toggle duha on
//! muezzin --config config.yaml --data ./muezzin-data toggle last-third off --time -15
//! muezzin --config config.yaml --data ./muezzin-data select-time duha quarter-day
//! muezzin --config config.yaml --data ./muezzin-data set-location 21.4225 39.8262
//! ```
//!
//! # Architecture
//!
//! - [`alerts`] - Alert settings, custom alerts and their JSON persistence
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`daemon`] - Check loop and delivery wiring
//! - [`dispatch`] - Timer dispatcher, push notifier and permission gate
//! - [`prayers`] - Prayer times and the HTTP provider
//! - [`rescheduler`] - Rebuild-on-change protocol
//! - [`schedule`] - Schedule builder and the per-category strategies
//! - [`sounds`] - Sound catalog, resolver and audio session
//! - [`utils`] - Path and option parsing helpers
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)
//! - `MUEZZIN_*` - Configuration overrides, see [`config`]

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};

use crate::{
    alerts::{JsonSettingsStore, SettingsStore},
    config::Config,
    daemon::{Daemon, create_builder},
    prayers::Location,
    sounds::{AudioSession, SoundCatalog},
};

mod alerts;
mod config;
mod daemon;
mod dispatch;
mod prayers;
mod rescheduler;
mod schedule;
mod sounds;
mod utils;

/// Command-line arguments of muezzin.
///
/// # Examples
///
/// ```bash
/// muezzin --config config.yaml --data ./muezzin-data
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// See the [`config`] module for the expected format.
    #[arg(short, long)]
    config: String,

    /// Path to the directory holding the settings.
    ///
    /// This directory will contain:
    /// - `settings.json` - Alert settings, seeded with defaults on first start
    /// - `custom_alerts.json` - Custom alerts
    /// - `location.json` - Location set with `set-location`
    #[arg(short, long)]
    data: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scheduler until interrupted (default)
    Run,
    /// Build the schedule once and print it without scheduling anything
    Preview,
    /// Store the location prayer times are computed for
    SetLocation {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Select the timing option of a setting, e.g. `duha quarter-day`
    SelectTime {
        setting: String,
        #[arg(allow_hyphen_values = true)]
        time: String,
    },
    /// Enable or disable a setting, or one of its times with `--time`
    Toggle {
        setting: String,
        state: Switch,
        #[arg(long, allow_hyphen_values = true)]
        time: Option<String>,
    },
    /// Play a catalog sound, e.g. `adhan-makkah`
    Play { sound: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

/// Main entry point of muezzin.
///
/// Initializes logging, parses the arguments, loads the configuration and runs
/// the requested command. Failures are logged and end the process with a
/// non-zero status.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(JsonSettingsStore::new(args.data));
    let command = args.command.unwrap_or(Command::Run);

    if let Err(e) = run_command(command, config, store).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_command(
    command: Command,
    config: Config,
    store: Arc<JsonSettingsStore>,
) -> Result<(), anyhow::Error> {
    match command {
        Command::Run => {
            info!("starting muezzin {}...", env!("CARGO_PKG_VERSION"));
            Daemon::new(&config, store).start().await;
        }
        Command::Preview => preview(&config, store.as_ref()).await?,
        Command::SetLocation {
            latitude,
            longitude,
        } => {
            let location = Location {
                latitude,
                longitude,
            };
            if !location.is_valid() {
                bail!("invalid location {}", location);
            }
            store.save_location(&location).await?;
            println!("location set to {}", location);
        }
        Command::SelectTime { setting, time } => {
            let mut settings = store.load().await;
            let entry = settings
                .iter_mut()
                .find(|s| s.id == setting)
                .ok_or_else(|| anyhow!("unknown setting {}", setting))?;
            if !entry.select_alert_time(&time) {
                let options: Vec<&str> = entry.alert_times.iter().map(|t| t.id.as_str()).collect();
                bail!(
                    "unknown time {} for {}, expected one of: {}",
                    time,
                    setting,
                    options.join(", ")
                );
            }
            store.save(&settings).await?;
            println!("{} set to {}", setting, time);
        }
        Command::Toggle {
            setting,
            state,
            time,
        } => {
            let mut settings = store.load().await;
            let entry = settings
                .iter_mut()
                .find(|s| s.id == setting)
                .ok_or_else(|| anyhow!("unknown setting {}", setting))?;
            let enabled = matches!(state, Switch::On);
            let target = match time {
                Some(time) => {
                    if !entry.set_alert_time_enabled(&time, enabled) {
                        bail!("unknown time {} for {}", time, setting);
                    }
                    format!("{} {}", setting, time)
                }
                None => {
                    entry.enabled = enabled;
                    setting
                }
            };
            store.save(&settings).await?;
            println!("{} {}", target, if enabled { "enabled" } else { "disabled" });
        }
        Command::Play { sound } => play(&config, &sound).await?,
    }

    Ok(())
}

/// Prints the notifications a rebuild would schedule now.
async fn preview(config: &Config, store: &dyn SettingsStore) -> Result<(), anyhow::Error> {
    let location = match store.load_location().await {
        Some(location) => location,
        None => config
            .location
            .location()
            .context("no location configured, use set-location or the configuration file")?,
    };

    let builder = create_builder(config);
    let now = Utc::now();
    let settings = store.load().await;
    let custom_alerts = store.load_custom().await;

    let schedule = builder
        .build(&location, builder.today(now), now, &settings, &custom_alerts)
        .await?;
    let descriptors = schedule.descriptors;

    let timezone = config.location.timezone;
    for descriptor in &descriptors {
        println!(
            "{}  {:>7}  {:<10}  {}  [{}]",
            descriptor.scheduled_at.with_timezone(&timezone).format("%a %d %H:%M"),
            descriptor.id,
            descriptor.metadata.kind.channel(),
            descriptor.title,
            descriptor.sound_file.as_deref().unwrap_or("silent")
        );
    }
    println!("{} notifications", descriptors.len());
    if !schedule.missing_dates.is_empty() {
        println!("no prayer times for {:?}", schedule.missing_dates);
    }

    Ok(())
}

/// Plays a catalog sound until it ends.
async fn play(config: &Config, sound: &str) -> Result<(), anyhow::Error> {
    let catalog = SoundCatalog::builtin();
    let file = catalog
        .get(sound)
        .and_then(|entry| entry.path.clone())
        .ok_or_else(|| {
            let playable: Vec<&str> = catalog
                .sounds()
                .iter()
                .filter(|entry| entry.path.is_some())
                .map(|entry| entry.id.as_str())
                .collect();
            anyhow!(
                "{} is not a playable sound, expected one of: {}",
                sound,
                playable.join(", ")
            )
        })?;

    let mut session = AudioSession::new(
        config.notifications.player.clone(),
        PathBuf::from(&config.notifications.sounds_dir),
    );
    session.play(&file).await?;
    while session.is_playing() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    Ok(())
}
