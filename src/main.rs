/*
 *  main.rs
 *
 *  wxoled - weather at a glance
 *	(c) 2025-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use wxoled::config::{self, Cli};
use wxoled::display::{DisplayDriver, DisplayDriverFactory};
use wxoled::icons::IconResolver;
use wxoled::{Renderer, Scheduler, WeatherClient};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

async fn shutdown_requested() {
    if let Err(e) = signal_handler().await {
        error!("Signal handlers unavailable ({}), running until killed", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize the logger with the appropriate level based on debug flag
    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("{} - weather at a glance", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let cfg = config::load(&cli).inspect_err(|e| error!("{}", e))?;
    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        print!("{}", serde_yaml::to_string(&cfg.redacted())?);
        return Ok(());
    }

    let display_cfg = cfg.display();
    let mut driver = DisplayDriverFactory::create_from_config(&display_cfg)
        .inspect_err(|e| error!("{}", e))?;
    DisplayDriverFactory::bring_up(&mut driver, &display_cfg)
        .inspect_err(|e| error!("{}", e))?;

    let client = WeatherClient::new(cfg.weather_request()?)?;
    let (width, height) = driver.dimensions();
    let renderer = Renderer::new(IconResolver::new(cfg.icon_dir()), width, height);

    let preset = cfg.preset();
    let policy = cfg.fetch_policy();
    info!(
        "Preset {:?} on {:?}, refetch every {:?}, icons from {}",
        preset,
        preset.endpoint(),
        policy.interval,
        cfg.icon_dir().display()
    );

    let mut scheduler = Scheduler::new(client, driver, renderer, preset.plan(), policy, cfg.idle_sleep());
    if cli.once {
        let phase = scheduler.run_iteration().await;
        info!("Single pass finished: {:?}", phase);
    } else {
        info!("Entering main display loop");
        scheduler.run_until(shutdown_requested()).await;
    }

    if let Err(e) = scheduler.driver_mut().clear() {
        warn!("Could not blank the display: {}", e);
    }
    info!("Display cleared, exiting");
    Ok(())
}
