//! Flora CLI - Command-line interface for Flora Health
//!
//! Commands:
//! - upload: Run files through the simulated upload flow
//! - report: Print the stored report
//! - insights: List the insight feed
//! - note: Add a personal note to the insight feed
//! - history: List or prune the upload history
//! - devices: List or toggle paired devices
//! - notifications: List, mark read or remove notifications
//! - settings: List or toggle preference switches
//! - ask: Ask the health assistant a question
//! - clear: Remove everything from the local store
//! - routes: Resolve a dashboard path

use clap::{Parser, Subcommand, ValueEnum};
use chrono::Utc;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use tracing_subscriber::EnvFilter;

use flora_health::assistant::HealthAssistant;
use flora_health::config::DEFAULT_LOG_FILTER;
use flora_health::devices::ConnectionStatus;
use flora_health::insights::metric_insights;
use flora_health::notifications::{format_timestamp, Notification};
use flora_health::routes::Route;
use flora_health::settings::{Settings, SettingsGroup};
use flora_health::upload::{NoticeLevel, UploadEvent, UploadStatus};
use flora_health::{
    DashboardConfig, DashboardError, FileMeta, FileStore, HealthReport, MockHealthDataProvider,
    ReportPipeline, UploadFlow, FLORA_VERSION,
};

/// Flora - personal health dashboard core
#[derive(Parser)]
#[command(name = "flora")]
#[command(author = "Flora Health")]
#[command(version = FLORA_VERSION)]
#[command(about = "Generate health reports and insights from uploaded files", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store file, overrides the configured path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and generate a report
    Upload {
        /// Files to upload (csv or json)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Seed for reproducible mock data
        #[arg(long)]
        seed: Option<u64>,

        /// Wait out the simulated delays instead of skipping them
        #[arg(long)]
        realtime: bool,

        /// Emit upload events as newline-delimited JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored report
    Report {
        /// Which report to print
        #[arg(long, default_value = "latest")]
        slot: ReportSlot,

        /// Output format
        #[arg(long, default_value = "summary")]
        format: OutputFormat,
    },

    /// List the insight feed
    Insights {
        /// Derive insights from the latest report's metrics instead
        #[arg(long)]
        metrics: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a personal note to the insight feed
    Note {
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// List or prune the upload history
    History {
        /// Remove the entry with this id
        #[arg(long, conflicts_with = "clear")]
        remove: Option<String>,

        /// Remove every entry
        #[arg(long)]
        clear: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List or toggle paired devices
    Devices {
        /// Toggle the connection of the device with this id
        #[arg(long)]
        toggle: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List, mark read or remove notifications
    Notifications {
        /// Mark every notification as read
        #[arg(long, conflicts_with = "remove")]
        mark_read: bool,

        /// Remove the notification with this id
        #[arg(long)]
        remove: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List or toggle preference switches
    Settings {
        /// Switch to toggle, as group.key (e.g. privacy.anonymousAnalytics)
        #[arg(long, conflicts_with = "reset")]
        toggle: Option<String>,

        /// Restore every switch to its default
        #[arg(long)]
        reset: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the health assistant a question
    Ask {
        /// Question text
        #[arg(required = true)]
        text: Vec<String>,

        /// Seed for a reproducible reply
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Remove every stored key
    Clear,

    /// Resolve a dashboard path, or list the known routes
    Routes {
        /// Path to resolve
        path: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum ReportSlot {
    /// Report shown on the dashboard
    Latest,
    /// Report of the most recent upload
    Current,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let error = CliError::from(e);
            eprintln!(
                "{}",
                serde_json::to_string(&error).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), FloraCliError> {
    let config = load_config(cli.config.as_deref(), cli.store)?;

    match cli.command {
        Commands::Upload {
            files,
            seed,
            realtime,
            json,
        } => cmd_upload(&config, &files, seed, realtime, json),

        Commands::Report { slot, format } => cmd_report(&config, slot, format),

        Commands::Insights { metrics, json } => cmd_insights(&config, metrics, json),

        Commands::Note { text } => cmd_note(&config, &text.join(" ")),

        Commands::History {
            remove,
            clear,
            json,
        } => cmd_history(&config, remove.as_deref(), clear, json),

        Commands::Devices { toggle, json } => cmd_devices(&config, toggle.as_deref(), json),

        Commands::Notifications {
            mark_read,
            remove,
            json,
        } => cmd_notifications(&config, mark_read, remove.as_deref(), json),

        Commands::Settings {
            toggle,
            reset,
            json,
        } => cmd_settings(&config, toggle.as_deref(), reset, json),

        Commands::Ask { text, seed } => cmd_ask(&text.join(" "), seed),

        Commands::Clear => cmd_clear(&config),

        Commands::Routes { path } => cmd_routes(path.as_deref()),
    }
}

fn load_config(
    path: Option<&Path>,
    store: Option<PathBuf>,
) -> Result<DashboardConfig, FloraCliError> {
    let mut config = match path {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(store) = store {
        config.store_path = store;
    }
    Ok(config)
}

fn open_pipeline(
    config: &DashboardConfig,
) -> Result<ReportPipeline<MockHealthDataProvider, FileStore>, FloraCliError> {
    let store = FileStore::open(&config.store_path)?;
    Ok(ReportPipeline::mock(store))
}

fn cmd_upload(
    config: &DashboardConfig,
    paths: &[PathBuf],
    seed: Option<u64>,
    realtime: bool,
    json: bool,
) -> Result<(), FloraCliError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(FileMeta::new(name, size));
    }

    let store = FileStore::open(&config.store_path)?;
    let provider = match seed {
        Some(seed) => MockHealthDataProvider::with_seed(seed),
        None => MockHealthDataProvider::new(),
    };
    let mut flow = UploadFlow::new(ReportPipeline::new(provider, store), config.clone())?;

    let selection = flow.select(files)?;
    if let Some(notice) = &selection.notice {
        for file in &selection.rejected {
            eprintln!("{}: {} ({})", notice.title, notice.description, file.name);
        }
    }

    let interactive = !json && atty::is(atty::Stream::Stderr);
    let output = EventPrinter { json, interactive };

    output.print(&flow.start()?)?;
    let tick = config.tick_interval();
    while !flow.is_settled() {
        if realtime {
            thread::sleep(tick);
        }
        let events = flow.advance(tick);
        output.print(&events)?;
    }

    if flow.status() == UploadStatus::Error {
        let message = flow.last_error().unwrap_or("processing failed").to_string();
        return Err(FloraCliError::UploadFailed(message));
    }

    if !json {
        if let Some(report) = flow.report() {
            println!();
            print!("{}", render_summary(report));
        }
    }
    Ok(())
}

/// Renders upload events as NDJSON on stdout or as a progress display on stderr
struct EventPrinter {
    json: bool,
    interactive: bool,
}

impl EventPrinter {
    fn print(&self, events: &[UploadEvent]) -> Result<(), FloraCliError> {
        if self.json {
            self.write_events(&mut io::stdout().lock(), events)
        } else {
            self.write_events(&mut io::stderr(), events)
        }
    }

    fn write_events<W: Write>(
        &self,
        out: &mut W,
        events: &[UploadEvent],
    ) -> Result<(), FloraCliError> {
        for event in events {
            if self.json {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
                continue;
            }

            match event {
                UploadEvent::Progress(p) if self.interactive => {
                    write!(out, "\rUploading... {:>3}%", p)?;
                    out.flush()?;
                    if *p == 100 {
                        writeln!(out)?;
                    }
                }
                UploadEvent::Progress(_) => {}
                UploadEvent::Status(UploadStatus::Processing) => {
                    writeln!(out, "Processing...")?;
                }
                UploadEvent::Status(_) => {}
                UploadEvent::Notice(notice) => {
                    let prefix = match notice.level {
                        NoticeLevel::Info => "[OK]",
                        NoticeLevel::Destructive => "[ERR]",
                    };
                    writeln!(out, "{} {}: {}", prefix, notice.title, notice.description)?;
                }
                UploadEvent::Navigate(path) => {
                    writeln!(out, "Report ready at {}", path)?;
                }
            }
        }
        Ok(())
    }
}

fn cmd_report(
    config: &DashboardConfig,
    slot: ReportSlot,
    format: OutputFormat,
) -> Result<(), FloraCliError> {
    let pipeline = open_pipeline(config)?;
    let report = match slot {
        ReportSlot::Latest => pipeline.latest_report(),
        ReportSlot::Current => pipeline.current_report(),
    }
    .ok_or(FloraCliError::NoReport)?;

    match format {
        OutputFormat::Summary => print!("{}", render_summary(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn render_summary(report: &HealthReport) -> String {
    let hr = &report.heart_rate;
    let sleep = &report.sleep;
    let activity = &report.activity;
    let bp = &report.blood_pressure;
    let files: Vec<&str> = report
        .metadata
        .file_info
        .iter()
        .map(|f| f.name.as_str())
        .collect();

    // Writing into a String cannot fail
    let mut out = String::new();
    let _ = writeln!(out, "Flora Health Report");
    let _ = writeln!(out, "===================");
    let _ = writeln!(
        out,
        "Processed: {}",
        report.metadata.processing_date.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "Files:     {}", files.join(", "));
    let _ = writeln!(
        out,
        "Data:      {} points, confidence {:.0}%",
        report.metadata.data_points,
        report.metadata.confidence_score * 100.0
    );

    let _ = writeln!(
        out,
        "\nHeart rate:     avg {} bpm, resting {}, range {}-{}",
        hr.average, hr.resting, hr.min, hr.max
    );
    let _ = writeln!(
        out,
        "Sleep:          {:.1} h (deep {:.1}, light {:.1}, REM {:.1}), efficiency {}%",
        sleep.average_duration,
        sleep.average_deep,
        sleep.average_light,
        sleep.average_rem,
        sleep.efficiency
    );
    let _ = writeln!(
        out,
        "Activity:       {} steps/day, {} active min, {} kcal",
        activity.average_steps, activity.average_active_minutes, activity.calories_burned
    );
    let _ = writeln!(
        out,
        "Blood pressure: {}/{} mmHg",
        bp.average_systolic, bp.average_diastolic
    );

    let _ = writeln!(out, "\nInsights:");
    for insight in &report.insights {
        let _ = writeln!(
            out,
            "  [{}] {} ({:.0}%)",
            insight.severity,
            insight.title,
            insight.confidence * 100.0
        );
        let _ = writeln!(out, "      {}", insight.description);
    }
    out
}

fn cmd_insights(config: &DashboardConfig, metrics: bool, json: bool) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;

    if metrics {
        let report = pipeline.latest_report().ok_or(FloraCliError::NoReport)?;
        let insights = metric_insights(&report);
        if json {
            println!("{}", serde_json::to_string_pretty(&insights)?);
        } else {
            for insight in &insights {
                println!("[{}] {}", insight.severity, insight.title);
                println!("    {}", insight.description);
            }
        }
        return Ok(());
    }

    let insights = pipeline.insights().load();
    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    } else if insights.is_empty() {
        println!("No insights yet. Upload a file to generate some.");
    } else {
        for insight in &insights {
            println!("[{}] {} ({})", insight.kind, insight.title, insight.time);
            println!("    {}", insight.description);
        }
    }
    Ok(())
}

fn cmd_note(config: &DashboardConfig, text: &str) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    let note = pipeline.insights().append_user_note(text)?;
    println!("{}", serde_json::to_string_pretty(&note)?);
    Ok(())
}

fn cmd_history(
    config: &DashboardConfig,
    remove: Option<&str>,
    clear: bool,
    json: bool,
) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    let mut history = pipeline.history();

    if clear {
        history.clear()?;
        println!("Upload history cleared");
        return Ok(());
    }

    if let Some(id) = remove {
        if !history.remove(id)? {
            return Err(FloraCliError::UnknownHistoryItem(id.to_string()));
        }
        println!("Removed {}", id);
        return Ok(());
    }

    let items = history.list();
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No uploads yet.");
    } else {
        for item in &items {
            println!(
                "{}  {:<28} {:>10} B  {:<4}  {:?}  {}",
                item.id,
                item.file_name,
                item.file_size,
                item.file_type.as_str(),
                item.status,
                item.upload_date.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

fn cmd_devices(
    config: &DashboardConfig,
    toggle: Option<&str>,
    json: bool,
) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    let mut registry = pipeline.devices();

    if let Some(id) = toggle {
        let device = registry.toggle(id)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&device)?);
        } else {
            println!("{} is now {:?}", device.name, device.status);
        }
        return Ok(());
    }

    let devices = registry.list();
    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        for device in &devices {
            let icon = match device.status {
                ConnectionStatus::Connected => "[ON] ",
                ConnectionStatus::Disconnected => "[OFF]",
            };
            println!(
                "{} {}  {:<20} battery {:>3}%  synced {}",
                icon, device.id, device.name, device.battery, device.last_sync
            );
        }
    }
    Ok(())
}

fn cmd_notifications(
    config: &DashboardConfig,
    mark_read: bool,
    remove: Option<&str>,
    json: bool,
) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    let mut feed = pipeline.notifications();

    if mark_read {
        let marked = feed.mark_all_read()?;
        println!("Marked {} notification(s) as read", marked);
        return Ok(());
    }

    if let Some(id) = remove {
        let removed = feed.remove(id)?;
        println!("Removed {}", removed.title);
        return Ok(());
    }

    let notifications = feed.list();
    if json {
        println!("{}", serde_json::to_string_pretty(&notifications)?);
    } else {
        print!("{}", render_notifications(&notifications));
    }
    Ok(())
}

fn render_notifications(notifications: &[Notification]) -> String {
    let now = Utc::now();
    let unread = notifications.iter().filter(|n| !n.read).count();

    let mut out = String::new();
    let _ = writeln!(out, "{} unread", unread);
    for notification in notifications {
        let marker = if notification.read { " " } else { "*" };
        let _ = writeln!(
            out,
            "{} {}  {} ({})",
            marker,
            notification.id,
            notification.title,
            format_timestamp(notification.timestamp, now)
        );
        let _ = writeln!(out, "    {}", notification.message);
    }
    out
}

fn cmd_settings(
    config: &DashboardConfig,
    toggle: Option<&str>,
    reset: bool,
    json: bool,
) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    let mut store = pipeline.settings();

    if reset {
        store.reset()?;
        println!("Settings restored to defaults");
        return Ok(());
    }

    if let Some(path) = toggle {
        let (group, key) = parse_setting_path(path)?;
        let value = store.toggle(group, key)?;
        println!("{}.{} = {}", group, key, value);
        return Ok(());
    }

    let settings = store.load();
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print!("{}", render_settings(&settings));
    }
    Ok(())
}

/// Split `group.key` into its parts
fn parse_setting_path(path: &str) -> Result<(SettingsGroup, &str), DashboardError> {
    let (group, key) = path
        .split_once('.')
        .ok_or_else(|| DashboardError::UnknownSetting {
            group: path.to_string(),
            key: String::new(),
        })?;
    Ok((group.parse()?, key))
}

fn render_settings(settings: &Settings) -> String {
    let mut out = String::new();
    for group in SettingsGroup::ALL {
        let _ = writeln!(out, "[{}]", group);
        for (key, value) in settings.flags(group) {
            let _ = writeln!(out, "  {:<30} {}", key, if value { "on" } else { "off" });
        }
    }
    out
}

fn cmd_ask(text: &str, seed: Option<u64>) -> Result<(), FloraCliError> {
    let mut assistant = match seed {
        Some(seed) => HealthAssistant::with_seed(seed),
        None => HealthAssistant::with_seed(rand::random()),
    };
    let reply = assistant.send(text)?;
    println!("{}", reply.content);
    Ok(())
}

fn cmd_clear(config: &DashboardConfig) -> Result<(), FloraCliError> {
    let mut pipeline = open_pipeline(config)?;
    pipeline.clear()?;
    println!("Cleared {}", config.store_path.display());
    Ok(())
}

fn cmd_routes(path: Option<&str>) -> Result<(), FloraCliError> {
    match path {
        Some(path) => {
            let route = Route::resolve(path);
            if route.is_not_found() {
                println!("404 {}", route);
            } else {
                println!("{:?} {}", route, route);
            }
        }
        None => {
            for route in Route::KNOWN {
                println!("{:<10} {:?}", route.path(), route);
            }
        }
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum FloraCliError {
    Dashboard(DashboardError),
    Io(io::Error),
    Json(serde_json::Error),
    NoReport,
    UploadFailed(String),
    UnknownHistoryItem(String),
}

impl From<DashboardError> for FloraCliError {
    fn from(e: DashboardError) -> Self {
        FloraCliError::Dashboard(e)
    }
}

impl From<io::Error> for FloraCliError {
    fn from(e: io::Error) -> Self {
        FloraCliError::Io(e)
    }
}

impl From<serde_json::Error> for FloraCliError {
    fn from(e: serde_json::Error) -> Self {
        FloraCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FloraCliError> for CliError {
    fn from(e: FloraCliError) -> Self {
        match e {
            FloraCliError::Dashboard(e) => {
                let (code, hint) = match &e {
                    DashboardError::NoFilesSelected => {
                        ("NO_FILES", Some("Select at least one .csv or .json file"))
                    }
                    DashboardError::EmptyNote => ("EMPTY_NOTE", Some("Provide some note text")),
                    DashboardError::EmptyMessage => {
                        ("EMPTY_MESSAGE", Some("Ask the assistant a question"))
                    }
                    DashboardError::UnknownDevice(_) => {
                        ("UNKNOWN_DEVICE", Some("Run 'flora devices' to list device ids"))
                    }
                    DashboardError::UnknownNotification(_) => (
                        "UNKNOWN_NOTIFICATION",
                        Some("Run 'flora notifications' to list notification ids"),
                    ),
                    DashboardError::UnknownSetting { .. } => (
                        "UNKNOWN_SETTING",
                        Some("Run 'flora settings' to list groups and keys"),
                    ),
                    DashboardError::ConfigError(_) => {
                        ("CONFIG_ERROR", Some("Check the configuration file"))
                    }
                    DashboardError::JsonError(_) => {
                        ("STORE_CORRUPT", Some("Run 'flora clear' or remove the store file"))
                    }
                    DashboardError::StorageError(_) => {
                        ("STORAGE_ERROR", Some("Check the store path and permissions"))
                    }
                    DashboardError::InvalidTransition { .. } | DashboardError::AnalysisError(_) => {
                        ("DASHBOARD_ERROR", None)
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
            FloraCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FloraCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FloraCliError::NoReport => CliError {
                code: "NO_REPORT".to_string(),
                message: "No report stored yet".to_string(),
                hint: Some("Run 'flora upload <files>' first".to_string()),
            },
            FloraCliError::UploadFailed(msg) => CliError {
                code: "UPLOAD_FAILED".to_string(),
                message: msg,
                hint: Some("An error occurred while processing your files".to_string()),
            },
            FloraCliError::UnknownHistoryItem(id) => CliError {
                code: "UNKNOWN_UPLOAD".to_string(),
                message: format!("No upload with id {}", id),
                hint: Some("Run 'flora history' to list upload ids".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use flora_health::notifications::default_notifications;
    use flora_health::upload::Notice;
    use pretty_assertions::assert_eq;

    fn sample_report() -> HealthReport {
        MockHealthDataProvider::with_seed(3).generate(&[
            FileMeta::new("report.csv", 1024),
            FileMeta::new("sleep_data.json", 2048),
        ])
    }

    fn render(printer: &EventPrinter, events: &[UploadEvent]) -> String {
        let mut out = Vec::new();
        printer.write_events(&mut out, events).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_store_after_subcommand() {
        let cli = Cli::try_parse_from(["flora", "upload", "a.csv", "--store", "s.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Commands::Upload { ref files, .. } if files.len() == 1));
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["flora", "upload"]).is_err());
    }

    #[test]
    fn test_summary_lists_every_section() {
        let report = sample_report();
        let summary = render_summary(&report);

        let bp = &report.blood_pressure;
        assert!(summary.contains(&format!(
            "Blood pressure: {}/{} mmHg",
            bp.average_systolic, bp.average_diastolic
        )));
        assert!(summary.contains(&format!("avg {} bpm", report.heart_rate.average)));
        assert!(summary.contains(&format!("{} steps/day", report.activity.average_steps)));
        assert!(summary.contains("Files:     report.csv, sleep_data.json"));
        for insight in &report.insights {
            assert!(summary.contains(&insight.title));
        }
    }

    #[test]
    fn test_plain_events() {
        let printer = EventPrinter {
            json: false,
            interactive: false,
        };
        let events = vec![
            UploadEvent::Status(UploadStatus::Uploading),
            UploadEvent::Progress(50),
            UploadEvent::Status(UploadStatus::Processing),
            UploadEvent::Notice(Notice {
                title: "Upload successful".to_string(),
                description: "1 file processed successfully.".to_string(),
                level: NoticeLevel::Info,
            }),
            UploadEvent::Navigate("/dashboard".to_string()),
        ];

        assert_eq!(
            render(&printer, &events),
            "Processing...\n\
             [OK] Upload successful: 1 file processed successfully.\n\
             Report ready at /dashboard\n"
        );
    }

    #[test]
    fn test_interactive_progress_line() {
        let printer = EventPrinter {
            json: false,
            interactive: true,
        };
        let output = render(&printer, &[UploadEvent::Progress(5), UploadEvent::Progress(100)]);
        assert_eq!(output, "\rUploading...   5%\rUploading... 100%\n");
    }

    #[test]
    fn test_json_events_are_one_per_line() {
        let printer = EventPrinter {
            json: true,
            interactive: false,
        };
        let events = vec![UploadEvent::Progress(5), UploadEvent::Status(UploadStatus::Success)];

        let output = render(&printer, &events);
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "progress");
        assert_eq!(lines[1]["value"], "success");
    }

    #[test]
    fn test_dashboard_errors_map_to_codes() {
        let cases = vec![
            (DashboardError::NoFilesSelected, "NO_FILES"),
            (DashboardError::EmptyNote, "EMPTY_NOTE"),
            (DashboardError::EmptyMessage, "EMPTY_MESSAGE"),
            (DashboardError::UnknownDevice("9".to_string()), "UNKNOWN_DEVICE"),
            (DashboardError::UnknownNotification("9".to_string()), "UNKNOWN_NOTIFICATION"),
            (
                DashboardError::UnknownSetting {
                    group: "ai".to_string(),
                    key: "x".to_string(),
                },
                "UNKNOWN_SETTING",
            ),
            (DashboardError::ConfigError("bad".to_string()), "CONFIG_ERROR"),
            (DashboardError::AnalysisError("bad".to_string()), "DASHBOARD_ERROR"),
        ];

        for (error, code) in cases {
            let message = error.to_string();
            let cli_error = CliError::from(FloraCliError::from(error));
            assert_eq!(cli_error.code, code);
            assert_eq!(cli_error.message, message);
        }
    }

    #[test]
    fn test_cli_specific_errors() {
        let no_report = CliError::from(FloraCliError::NoReport);
        assert_eq!(no_report.code, "NO_REPORT");
        assert!(no_report.hint.unwrap().contains("flora upload"));

        let unknown = CliError::from(FloraCliError::UnknownHistoryItem("abc".to_string()));
        assert_eq!(unknown.message, "No upload with id abc");

        let json = serde_json::to_value(CliError::from(FloraCliError::UploadFailed(
            "unreadable".to_string(),
        )))
        .unwrap();
        assert_eq!(json["code"], "UPLOAD_FAILED");
        assert_eq!(json["message"], "unreadable");
    }

    #[test]
    fn test_parse_setting_path() {
        let (group, key) = parse_setting_path("privacy.anonymousAnalytics").unwrap();
        assert_eq!(group, SettingsGroup::Privacy);
        assert_eq!(key, "anonymousAnalytics");

        assert!(parse_setting_path("privacy").is_err());
        assert!(parse_setting_path("profile.name").is_err());
    }

    #[test]
    fn test_render_settings_lists_groups() {
        let output = render_settings(&Settings::default());
        assert!(output.starts_with("[notification]\n"));
        assert!(output.contains("  lowPowerMode"));
        assert!(output.contains("[ai]"));
    }

    #[test]
    fn test_render_notifications_counts_unread() {
        let output = render_notifications(&default_notifications(Utc::now()));
        assert!(output.starts_with("2 unread\n"));
        assert!(output.contains("* 1  Sleep Goal Achieved (1h ago)"));
    }

    #[test]
    fn test_load_config_store_override() {
        let config = load_config(None, Some(PathBuf::from("custom.json"))).unwrap();
        assert_eq!(config.store_path, PathBuf::from("custom.json"));
        assert_eq!(config.progress_step, DashboardConfig::default().progress_step);
    }
}
