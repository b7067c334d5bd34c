//! MAA Console - Entry Point
//!
//! Lists the operator's devices, shows recent tasks and dispatches commands
//! to the MAA backend.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use maa_console::http::HttpClient;
use maa_console::logs::{init_logging, LogOptions};
use maa_console::settings::Settings;
use maa_console::sync::{SessionController, SessionOptions};
use maa_console::utils::version_info;
use maa_console::view::render;
use maa_console::workers::poller;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // --key=value
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // standalone flags like --watch
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to encode version info: {e}"),
        }
        return;
    }

    let settings = match load_settings(&cli_args).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(settings, &cli_args).await {
        error!("Console failed: {e:#}");
        std::process::exit(1);
    }
}

/// File, then `MAA_*` environment, then command line
async fn load_settings(cli_args: &HashMap<String, String>) -> anyhow::Result<Settings> {
    let mut settings = match cli_args.get("config") {
        Some(path) => Settings::from_file(Path::new(path))
            .await
            .with_context(|| format!("reading {}", path))?,
        None => Settings::default(),
    };
    settings.apply_env()?;

    if let Some(base_url) = cli_args.get("base-url") {
        settings.backend.base_url = base_url.clone();
    }
    if let Some(user_key) = cli_args.get("user") {
        settings.backend.user_key = user_key.clone();
    }
    settings.validate()?;
    Ok(settings)
}

async fn run(settings: Settings, cli_args: &HashMap<String, String>) -> anyhow::Result<()> {
    let client = HttpClient::new(&settings.backend)?;
    info!("Using backend {} as {}", client.base_url(), settings.backend.user_key);

    let user_key = settings.backend.user_key.clone();
    let session = SessionController::new(client, SessionOptions::from(&settings));

    // A failed refresh is already reflected in the rendered error line.
    let _ = session.sync().await;

    if let Some(device_id) = cli_args.get("device") {
        if session.select_device(device_id).await.is_err() {
            println!("{}", render(&session.snapshot(), &user_key));
            anyhow::bail!("device {} is not registered for {}", device_id, user_key);
        }
    }

    let dispatched = if cli_args.contains_key("link-start") {
        Some(session.start_default_routine().await)
    } else if let Some(stage) = cli_args.get("fight") {
        session.set_stage_input(stage.as_str());
        Some(session.run_stage().await)
    } else {
        None
    };

    println!("{}", render(&session.snapshot(), &user_key));

    match dispatched {
        Some(Ok(Some(task))) => info!("Task {} queued", task.task_uuid.simple()),
        Some(Ok(None)) => anyhow::bail!("no device selected, nothing was dispatched"),
        Some(Err(e)) => return Err(e.into()),
        None => {}
    }

    if cli_args.contains_key("watch") {
        let options = poller::Options {
            interval: Duration::from_secs(settings.polling_interval_secs),
            initial_delay: Duration::from_secs(settings.polling_interval_secs),
        };
        poller::run(
            &options,
            &session,
            tokio::time::sleep,
            |state| println!("{}", render(state, &user_key)),
            Box::pin(await_shutdown_signal()),
        )
        .await;
    }

    Ok(())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                error!("Unable to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
