mod config;
mod registry;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use deptseed_core::{SeedCounts, SeedError, Table, redact_connection_string};
use deptseed_generate::{GenerateOptions, SeedGenerator};
use deptseed_load::{CommitMode, LoadError, LoadReport, OnRowError, SchemaMode};
use thiserror::Error;
use uuid::Uuid;

use config::{
    DEFAULT_CONFIG_FILE, EffectiveSettings, Overrides, SeedSettings, load_settings, resolve,
    resolve_generation, save_settings,
};
use registry::{
    LogFormat, RunContext, RunOutcome, RunReport, init_run_logging, start_run, write_report,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{}: {0}", .0.kind())]
    Seed(#[from] SeedError),
    #[error("{}: {0}", .0.seed_error().kind())]
    Load(#[from] LoadError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ResolveError> for CliError {
    fn from(err: config::ResolveError) -> Self {
        match err {
            config::ResolveError::Config(err) => CliError::Config(err),
            config::ResolveError::Seed(err) => CliError::Seed(err),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "deptseed",
    version,
    about = "Seed departments and employees with fake data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables and insert generated rows.
    Seed(SeedArgs),
    /// Print the rows a seed would insert, as JSON, without connecting.
    Preview(PreviewArgs),
    /// Write a starter config file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Config file (defaults to ./deptseed.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of departments (random in 3..=10 when omitted).
    #[arg(long, allow_negative_numbers = true)]
    departments: Option<i64>,
    /// Number of employees (random in 10..=50 when omitted).
    #[arg(long, allow_negative_numbers = true)]
    employees: Option<i64>,
    /// Seed for the fake data generator.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[command(flatten)]
    generate: GenerateArgs,
    /// ODBC connection string, postgres:// URL, or `memory:`.
    #[arg(long, env = "DEPTSEED_CONN", value_name = "CONNECTION_STRING")]
    conn: Option<String>,
    /// How to treat existing tables.
    #[arg(long, value_enum)]
    schema_mode: Option<SchemaMode>,
    /// Commit after every row or once at the end.
    #[arg(long, value_enum)]
    commit: Option<CommitMode>,
    /// What to do with rows the database rejects.
    #[arg(long, value_enum)]
    on_error: Option<OnRowError>,
    /// Load into an in-memory database instead of a real one.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Output directory for runs.
    #[arg(long, value_name = "DIR")]
    run_dir: Option<PathBuf>,
    /// Stderr log format: pretty or json.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
    /// Login timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    connect_timeout: Option<u32>,
    /// Skip the row-count check after loading.
    #[arg(long, default_value_t = false)]
    no_verify: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    /// Where to write the file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    path: PathBuf,
    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed(args) => run_seed(args).await,
        Command::Preview(args) => run_preview(args),
        Command::InitConfig(args) => run_init_config(args),
    }
}

async fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let settings = load_settings(args.generate.config.as_deref())?;
    let log_format = args.log_format;
    let effective = resolve(
        &settings,
        Overrides {
            conn: args.conn,
            seed: args.generate.seed,
            departments: args.generate.departments,
            employees: args.generate.employees,
            schema_mode: args.schema_mode,
            commit: args.commit,
            on_error: args.on_error,
            no_verify: args.no_verify,
            connect_timeout_secs: args.connect_timeout,
            run_dir: args.run_dir,
            dry_run: args.dry_run,
        },
    )?;

    let generator = SeedGenerator::new(GenerateOptions::with_seed(effective.seed));
    let counts = generator.resolve_counts(effective.departments, effective.employees)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: effective.target.engine().to_string(),
        seed: effective.seed,
        counts,
        dry_run: effective.dry_run,
        run_dir: effective.run_dir.clone(),
        options: effective.options.clone(),
        connection: redact_connection_string(&effective.connection),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path, log_format)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        engine = effective.target.engine(),
        seed = effective.seed,
        departments = counts.departments.get(),
        employees = counts.employees.get(),
        dry_run = effective.dry_run,
    );

    let timer = Instant::now();
    let outcome = load(&generator, counts, &effective).await;

    let report = match &outcome {
        Ok(load) => RunReport {
            run_id: run_id.clone(),
            outcome: RunOutcome::Success,
            finished_at: chrono::Utc::now().to_rfc3339(),
            error_kind: None,
            error: None,
            load: Some(load.clone()),
        },
        Err(err) => RunReport {
            run_id: run_id.clone(),
            outcome: RunOutcome::Failed,
            finished_at: chrono::Utc::now().to_rfc3339(),
            error_kind: Some(err.seed_error().kind().to_string()),
            error: Some(err.to_string()),
            load: err.report().cloned(),
        },
    };
    write_report(&run_paths, &report)?;

    let duration_ms = timer.elapsed().as_millis() as u64;
    match outcome {
        Ok(load) => {
            tracing::info!(
                event = "run_finished",
                status = "success",
                departments = load.table(Table::Department).inserted,
                employees = load.table(Table::Employee).inserted,
                duration_ms,
            );
            println!(
                "inserted {} departments and {} employees ({})",
                load.table(Table::Department).inserted,
                load.table(Table::Employee).inserted,
                run_paths.root.display()
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                event = "run_finished",
                status = "failed",
                kind = err.seed_error().kind(),
                error = %err,
                duration_ms,
            );
            Err(CliError::Load(err))
        }
    }
}

async fn load(
    generator: &SeedGenerator,
    counts: SeedCounts,
    effective: &EffectiveSettings,
) -> Result<LoadReport, LoadError> {
    let data = generator.generate(counts)?;
    deptseed_load::seed(&effective.target, &effective.options, &data).await
}

fn run_preview(args: PreviewArgs) -> Result<(), CliError> {
    let settings = load_settings(args.generate.config.as_deref())?;
    let generation = resolve_generation(
        &settings,
        &Overrides {
            seed: args.generate.seed,
            departments: args.generate.departments,
            employees: args.generate.employees,
            ..Overrides::default()
        },
    )?;

    let generator = SeedGenerator::new(GenerateOptions::with_seed(generation.seed));
    let counts = generator.resolve_counts(generation.departments, generation.employees)?;
    let data = generator.generate(counts)?;

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), CliError> {
    save_settings(&args.path, &SeedSettings::template(), args.force)?;
    println!("wrote {}", args.path.display());
    Ok(())
}
