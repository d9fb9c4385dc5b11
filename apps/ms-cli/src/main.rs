use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use ms_app::{AppError, AppResult, Console, ConsoleConfig, load_config};
use ms_core::NotificationLevel;
use ms_predict::PredictionOutcome;
use ms_readings::{ReadingMode, ReadingOutcome};
use ms_session::{ConnectionState, DeviceStatus, PollOutcome, SessionSnapshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ms-cli")]
#[command(about = "MetalliSense console - furnace connectivity, readings and dosing predictions", long_about = None)]
struct Cli {
    /// Console config YAML (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the connectivity service once
    Status,
    /// Open the device session
    Connect,
    /// Close the device session
    Disconnect,
    /// List selectable grades
    Grades,
    /// Show the element schema of a grade
    Elements {
        /// Grade name
        grade: String,
    },
    /// Generate a synthetic composition reading
    Reading {
        /// Grade name
        grade: String,
        /// metal-alone, scrap-alone or scrap-metal
        #[arg(long, default_value = "metal-alone")]
        mode: ReadingMode,
    },
    /// Request a dosing recommendation
    Predict {
        /// Grade name
        #[arg(long)]
        grade: Option<String>,
        /// Form field assignment, e.g. --set charge_weight_kg=800
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
        /// Open the device session first
        #[arg(long)]
        connect: bool,
    },
    /// Run the status polling loop and print every change
    Watch {
        /// How long to watch
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Config file plus command-line overrides, validated as a whole.
fn resolve_config(path: Option<&Path>, base_url: Option<String>) -> AppResult<ConsoleConfig> {
    let mut config = load_config(path)?;
    if let Some(base_url) = base_url {
        config.base_url = base_url;
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.base_url)?;
    let mut console = Console::from_config(config, Utc::now())?;

    let result = match cli.command {
        Commands::Status => cmd_status(&mut console).await,
        Commands::Connect => cmd_connect(&mut console).await,
        Commands::Disconnect => cmd_disconnect(&mut console).await,
        Commands::Grades => cmd_grades(&mut console).await,
        Commands::Elements { grade } => cmd_elements(&mut console, &grade).await,
        Commands::Reading { grade, mode } => cmd_reading(&mut console, &grade, mode).await,
        Commands::Predict {
            grade,
            fields,
            connect,
        } => cmd_predict(&mut console, grade.as_deref(), &fields, connect).await,
        Commands::Watch { seconds } => cmd_watch(&mut console, Duration::from_secs(seconds)).await,
    };
    print_notifications(&mut console);
    console.shutdown().await;
    result
}

async fn cmd_status(console: &mut Console) -> AppResult<()> {
    match console.refresh_status().await {
        PollOutcome::Unreachable(error) => println!("✗ Service unreachable: {}", error),
        PollOutcome::ReportedDisconnected => println!("Service reports disconnected"),
        PollOutcome::Connected { updated } => {
            println!("✓ Connected ({} device statuses reported)", updated)
        }
    }
    print_snapshot(&console.session().snapshot());
    Ok(())
}

async fn cmd_connect(console: &mut Console) -> AppResult<()> {
    console.connect().await?;
    print_snapshot(&console.session().snapshot());
    Ok(())
}

async fn cmd_disconnect(console: &mut Console) -> AppResult<()> {
    console.disconnect().await;
    print_snapshot(&console.session().snapshot());
    Ok(())
}

async fn cmd_grades(console: &mut Console) -> AppResult<()> {
    let list = console.refresh_grades().await;
    if let Some(error) = list.stale {
        return Err(error.into());
    }
    if list.grades.is_empty() {
        println!("No grades available");
    } else {
        println!("Grades:");
        for grade in &list.grades {
            println!("  {}", grade);
        }
    }
    Ok(())
}

async fn cmd_elements(console: &mut Console, grade: &str) -> AppResult<()> {
    console.select_grade(grade).await?;
    let elements = console.form().active_elements();
    if elements.is_empty() {
        println!("Grade {} exposes no elements", grade);
    } else {
        let symbols: Vec<&str> = elements.iter().map(|e| e.as_str()).collect();
        println!("Elements of {}: {}", grade, symbols.join(", "));
    }
    Ok(())
}

async fn cmd_reading(console: &mut Console, grade: &str, mode: ReadingMode) -> AppResult<()> {
    console.select_grade(grade).await?;
    console.set_mode(mode);
    let outcome = console.generate_reading().await?;
    if let ReadingOutcome::Mixed(report) = &outcome
        && report.is_total_failure()
    {
        return Err(AppError::Reading("both reading stages failed".to_string()));
    }

    println!("Form after {} reading:", mode);
    for (key, value) in console.form().iter().filter(|(key, _)| key.is_schema_driven()) {
        println!("  {:<12} {}", key.to_string(), value);
    }
    for key in ["zone1_temp", "timestamp"] {
        println!("  {:<12} {}", key, console.form().text(key));
    }
    Ok(())
}

async fn cmd_predict(
    console: &mut Console,
    grade: Option<&str>,
    fields: &[(String, String)],
    connect: bool,
) -> AppResult<()> {
    if connect {
        console.connect().await?;
    } else {
        console.refresh_status().await;
    }
    if let Some(grade) = grade {
        console.select_grade(grade).await?;
    }
    for (key, value) in fields {
        console.set_field(key, value.as_str());
    }

    match console.generate_prediction(Utc::now()).await {
        PredictionOutcome::Skipped(_) => {
            println!("Prediction skipped: device session is not connected");
        }
        PredictionOutcome::Live(result) | PredictionOutcome::Fallback(result) => {
            if result.synthetic {
                println!("! Optimizer unavailable, cached recommendation:");
            } else {
                println!("✓ Optimizer recommendation:");
            }
            let body = serde_json::to_string_pretty(&result.body)
                .map_err(|e| AppError::InvalidInput(format!("unprintable response: {}", e)))?;
            println!("{}", body);
        }
    }
    Ok(())
}

async fn cmd_watch(console: &mut Console, duration: Duration) -> AppResult<()> {
    console.start_polling();
    println!("Watching connectivity for {} s (Ctrl-C to stop)", duration.as_secs());

    let tick = console.config().poll_interval();
    let deadline = tokio::time::Instant::now() + duration;
    let mut last: Option<(ConnectionState, Vec<DeviceStatus>)> = None;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep_until(deadline.min(tokio::time::Instant::now() + tick)).await;

        let snapshot = console.session().snapshot();
        let state = (
            snapshot.connection,
            snapshot.devices.iter().map(|d| d.status).collect::<Vec<_>>(),
        );
        if last.as_ref() != Some(&state) {
            print_snapshot(&snapshot);
            last = Some(state);
        }
        // Device readings change on every sample, so only status changes are
        // compared above.
        if let Some(zones) = console.sample_telemetry(Utc::now()) {
            println!(
                "  zones: {:.1} / {:.1} / {:.1} °C",
                zones.zone1, zones.zone2, zones.zone3
            );
        }
    }

    if let Some(poller) = console.poller() {
        println!(
            "✓ {} polls, {} failures",
            poller.stats().polls(),
            poller.stats().failures()
        );
    }
    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!(
        "Connection: {} ({}/{} devices connected)",
        snapshot.connection.label(),
        snapshot.connected_devices(),
        snapshot.devices.len()
    );
    for device in &snapshot.devices {
        println!(
            "  [{}] {:<26} {:?}",
            device.id, device.display_name, device.status
        );
    }
}

fn print_notifications(console: &mut Console) {
    for notification in console.drain_notifications() {
        let marker = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "·",
            NotificationLevel::Warning => "!",
            NotificationLevel::Error => "✗",
        };
        match notification.detail {
            Some(detail) => eprintln!("{} {}: {}", marker, notification.title, detail),
            None => eprintln!("{} {}", marker, notification.title),
        }
    }
}
