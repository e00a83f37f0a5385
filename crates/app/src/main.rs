use std::fmt;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock, ProgressService, TryItService, TutorialRunner};
use storage::repository::Storage;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, prelude::*};
use tutor_core::TutorialSettings;
use tutor_core::catalog;
use tutor_core::model::{Module, ModuleId};
use ui::{App, UiApp, build_app_context};

#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "Interactive desktop tutorials on how modern AI works", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database holding learner progress
    #[arg(long, global = true, env = "TUTOR_DB_URL", default_value = "sqlite://dev.sqlite3")]
    db: String,

    /// Log filter (e.g. `info`, `services=debug`); falls back to RUST_LOG
    #[arg(long, global = true, env = "TUTOR_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Launch the desktop app (default)
    Ui {
        /// Module to open right after launch
        #[arg(long, env = "TUTOR_MODULE")]
        module: Option<String>,

        /// Skip fades and animation delays
        #[arg(long, env = "TUTOR_REDUCED_MOTION")]
        reduced_motion: bool,
    },
    /// Forget persisted progress for one module, or for all modules
    Reset {
        #[arg(long)]
        module: Option<String>,
    },
}

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
    UnknownModule { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::UnknownModule { raw } => write!(f, "unknown module: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct DesktopApp {
    services: AppServices,
    initial_module: Option<ModuleId>,
}

impl UiApp for DesktopApp {
    fn modules(&self) -> Vec<Arc<Module>> {
        self.services.modules().to_vec()
    }

    fn settings(&self) -> TutorialSettings {
        self.services.settings()
    }

    fn initial_module(&self) -> Option<ModuleId> {
        self.initial_module.clone()
    }

    fn runner(&self) -> Arc<TutorialRunner> {
        self.services.runner()
    }

    fn progress(&self) -> Arc<ProgressService> {
        self.services.progress()
    }

    fn try_it(&self) -> Arc<TryItService> {
        self.services.try_it()
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = filter
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer())
        .init();
}

fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn known_module(raw: &str) -> Result<ModuleId, Box<dyn std::error::Error>> {
    let id = ModuleId::new(raw.trim())?;
    if catalog::find(&id)?.is_none() {
        return Err(ArgsError::UnknownModule {
            raw: raw.to_string(),
        }
        .into());
    }
    Ok(id)
}

async fn launch_ui(
    db_url: &str,
    module: Option<String>,
    reduced_motion: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let initial_module = module.as_deref().map(known_module).transpose()?;
    let settings = if reduced_motion {
        TutorialSettings::instant()
    } else {
        TutorialSettings::default()
    };
    let services = AppServices::new_sqlite(db_url, Clock::default_clock(), settings).await?;
    if !services.try_it().enabled() {
        tracing::info!("TUTOR_AI_API_KEY not set; try-it panels are disabled");
    }

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        services,
        initial_module,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Tutor")
            .with_always_on_top(false),
    );

    tracing::info!(db = %db_url, "launching desktop app");
    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

async fn reset(db_url: &str, module: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let module = module.as_deref().map(known_module).transpose()?;
    let storage = Storage::sqlite(db_url).await?;
    let progress = ProgressService::new(storage.stages, storage.activity);
    let removed = progress.reset(module.as_ref()).await?;
    match module {
        Some(id) => println!("cleared progress for {id} ({removed} record(s))"),
        None => println!("cleared progress for all modules ({removed} record(s))"),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let db_url = normalize_sqlite_url(&cli.db);
    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;

    match cli.command {
        None => launch_ui(&db_url, std::env::var("TUTOR_MODULE").ok(), false).await,
        Some(Command::Ui {
            module,
            reduced_motion,
        }) => launch_ui(&db_url, module, reduced_motion).await,
        Some(Command::Reset { module }) => reset(&db_url, module).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
