//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use storage_lifecycle_helper::core::config::Config;
use storage_lifecycle_helper::core::errors::SlhError;
use storage_lifecycle_helper::inventory::loader::load_inventory;
use storage_lifecycle_helper::inventory::record::BucketRecord;
use storage_lifecycle_helper::lifecycle::classify::Classification;
use storage_lifecycle_helper::lifecycle::cost::{CostReport, CostRollup};
use storage_lifecycle_helper::lifecycle::engine::{LifecycleEngine, LifecycleReport};
use storage_lifecycle_helper::lifecycle::savings::SavingsReport;
use storage_lifecycle_helper::lifecycle::staleness::DATE_FORMAT;
use storage_lifecycle_helper::lifecycle::summary::SummaryRow;
use storage_lifecycle_helper::lifecycle::unused::UnusedBucket;
use storage_lifecycle_helper::logger::jsonl::{
    EventType, JsonlConfig, JsonlWriter, LogEntry, Severity,
};

/// Storage Lifecycle Helper — cost and lifecycle reports for bucket inventories.
#[derive(Debug, Parser)]
#[command(
    name = "slh",
    author,
    version,
    about = "Storage Lifecycle Helper - bucket cost and lifecycle reports",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Inventory JSON file (overrides `paths.inventory_file`).
    #[arg(short, long, global = true, value_name = "PATH")]
    inventory: Option<PathBuf>,
    /// Reference date for staleness. Defaults to today's local date.
    #[arg(long, global = true, value_name = "YYYY-MM-DD", value_parser = parse_as_of)]
    as_of: Option<NaiveDate>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Do not append to the JSONL activity log.
    #[arg(long, global = true)]
    no_log: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print every report section.
    Report(ReportArgs),
    /// Name, region, size and versioning of each bucket.
    Summary,
    /// Large buckets that have not been accessed for a long time.
    Unused(UnusedArgs),
    /// Projected monthly cost by region and by team.
    Cost(CostArgs),
    /// Split buckets into deletion queue and archival candidates.
    Classify(ClassifyArgs),
    /// Estimated savings from moving archival candidates to cold storage.
    Savings(SavingsArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
    /// Show version and optional build metadata.
    Version(VersionArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct UnusedArgs {
    /// Report buckets strictly larger than this many GB.
    #[arg(long, value_name = "GB")]
    unused_size_gb: Option<f64>,
    /// Report buckets idle for strictly more than this many days.
    #[arg(long, value_name = "DAYS")]
    unused_stale_days: Option<i64>,
}

#[derive(Debug, Clone, Args, Default)]
struct ClassifyArgs {
    /// Deletion requires a size strictly above this many GB.
    #[arg(long, value_name = "GB")]
    deletion_size_gb: Option<f64>,
    /// Deletion requires strictly more idle days than this.
    #[arg(long, value_name = "DAYS")]
    deletion_stale_days: Option<i64>,
    /// Archival requires a size strictly above this many GB.
    #[arg(long, value_name = "GB")]
    archival_size_gb: Option<f64>,
}

#[derive(Debug, Clone, Args, Default)]
struct CostArgs {
    /// Standard storage price in USD per GB-month.
    #[arg(long, value_name = "USD")]
    standard_rate: Option<f64>,
}

#[derive(Debug, Clone, Args, Default)]
struct RateArgs {
    /// Standard storage price in USD per GB-month.
    #[arg(long, value_name = "USD")]
    standard_rate: Option<f64>,
    /// Cold storage price in USD per GB-month.
    #[arg(long, value_name = "USD")]
    glacier_rate: Option<f64>,
}

#[derive(Debug, Clone, Args, Default)]
struct SavingsArgs {
    #[command(flatten)]
    classify: ClassifyArgs,
    #[command(flatten)]
    rates: RateArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct ReportArgs {
    #[command(flatten)]
    unused: UnusedArgs,
    #[command(flatten)]
    classify: ClassifyArgs,
    #[command(flatten)]
    rates: RateArgs,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Print the config file path in use.
    Path,
    /// Load and validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args, Default)]
struct VersionArgs {
    /// Include build metadata.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

trait ApplyOverrides {
    fn apply(&self, config: &mut Config);
}

impl ApplyOverrides for UnusedArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(v) = self.unused_size_gb {
            config.thresholds.unused_size_gb = v;
        }
        if let Some(v) = self.unused_stale_days {
            config.thresholds.unused_stale_days = v;
        }
    }
}

impl ApplyOverrides for ClassifyArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(v) = self.deletion_size_gb {
            config.thresholds.deletion_size_gb = v;
        }
        if let Some(v) = self.deletion_stale_days {
            config.thresholds.deletion_stale_days = v;
        }
        if let Some(v) = self.archival_size_gb {
            config.thresholds.archival_size_gb = v;
        }
    }
}

impl ApplyOverrides for CostArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(v) = self.standard_rate {
            config.rates.standard_usd_per_gb = v;
        }
    }
}

impl ApplyOverrides for RateArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(v) = self.standard_rate {
            config.rates.standard_usd_per_gb = v;
        }
        if let Some(v) = self.glacier_rate {
            config.rates.glacier_usd_per_gb = v;
        }
    }
}

impl ApplyOverrides for SavingsArgs {
    fn apply(&self, config: &mut Config) {
        self.classify.apply(config);
        self.rates.apply(config);
    }
}

impl ApplyOverrides for ReportArgs {
    fn apply(&self, config: &mut Config) {
        self.unused.apply(config);
        self.classify.apply(config);
        self.rates.apply(config);
    }
}

struct NoOverrides;

impl ApplyOverrides for NoOverrides {
    fn apply(&self, _config: &mut Config) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input: flags, config values.
    #[error("{0}")]
    User(String),
    /// Inventory or filesystem failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<SlhError> for CliError {
    fn from(error: SlhError) -> Self {
        match error {
            SlhError::InvalidConfig { .. }
            | SlhError::MissingConfig { .. }
            | SlhError::ConfigParse { .. } => Self::User(error.to_string()),
            _ => Self::Runtime(error.to_string()),
        }
    }
}

/// Everything one inventory command needs: effective config, records, clock, log.
struct Session {
    command: &'static str,
    config: Config,
    config_hash: Option<String>,
    inventory_path: PathBuf,
    records: Vec<BucketRecord>,
    today: NaiveDate,
    log: JsonlWriter,
}

impl Session {
    fn open(
        cli: &Cli,
        command: &'static str,
        overrides: &dyn ApplyOverrides,
    ) -> Result<Self, CliError> {
        let config = load_effective_config(cli, overrides)?;
        let mut log = if cli.no_log {
            JsonlWriter::disabled()
        } else {
            JsonlWriter::open(JsonlConfig::at(&config.paths.jsonl_log))
        };
        let config_hash = config.stable_hash().ok();
        let inventory_path = cli
            .inventory
            .clone()
            .unwrap_or_else(|| config.paths.inventory_file.clone());
        let today = cli
            .as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let records = match load_inventory(&inventory_path) {
            Ok(records) => records,
            Err(error) => {
                log.write_entry(&LogEntry::from_error(command, &error));
                return Err(error.into());
            }
        };

        let mut entry = LogEntry::new(EventType::InventoryLoaded, Severity::Info);
        entry.command = Some(command.to_string());
        entry.inventory = Some(inventory_path.display().to_string());
        entry.bucket_count = Some(records.len());
        entry.as_of = Some(today);
        entry.config_hash.clone_from(&config_hash);
        log.write_entry(&entry);

        Ok(Self {
            command,
            config,
            config_hash,
            inventory_path,
            records,
            today,
            log,
        })
    }

    fn engine(&self) -> LifecycleEngine {
        LifecycleEngine::from_config(&self.config)
    }

    /// Record a failed computation in the activity log and convert it.
    fn fail(&mut self, error: SlhError) -> CliError {
        let mut entry = LogEntry::from_error(self.command, &error);
        entry.inventory = Some(self.inventory_path.display().to_string());
        entry.as_of = Some(self.today);
        self.log.write_entry(&entry);
        error.into()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.log.close();
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Report(args) => run_report(cli, args),
        Command::Summary => run_summary(cli),
        Command::Unused(args) => run_unused(cli, args),
        Command::Cost(args) => run_cost(cli, args),
        Command::Classify(args) => run_classify(cli, args),
        Command::Savings(args) => run_savings(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Version(args) => emit_version(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_effective_config(cli: &Cli, overrides: &dyn ApplyOverrides) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli, "report", args)?;
    let report = match session.engine().evaluate(&session.records, session.today) {
        Ok(report) => report,
        Err(error) => return Err(session.fail(error)),
    };
    session.log.write_entry(&report_log_entry(&session, &report));

    match output_mode(cli) {
        OutputMode::Human => {
            print_summary(&report.summary);
            print_unused(&report.unused);
            print_costs(&report.costs);
            print_classification(&report.classification);
            print_savings(&report.savings);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "inventory": session.inventory_path.display().to_string(),
                "as_of": report.as_of,
                "bucket_count": report.bucket_count(),
                "total_cost_usd": report.costs.total(),
                "report": serde_json::to_value(&report)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_summary(cli: &Cli) -> Result<(), CliError> {
    let mut session = Session::open(cli, "summary", &NoOverrides)?;
    let rows = match session.engine().summary(&session.records) {
        Ok(rows) => rows,
        Err(error) => return Err(session.fail(error)),
    };

    match output_mode(cli) {
        OutputMode::Human => print_summary(&rows),
        OutputMode::Json => write_json_line(&json!({
            "command": "summary",
            "buckets": serde_json::to_value(&rows)?,
        }))?,
    }
    Ok(())
}

fn run_unused(cli: &Cli, args: &UnusedArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli, "unused", args)?;
    let engine = session.engine();
    let unused = match engine.unused(&session.records, session.today) {
        Ok(unused) => unused,
        Err(error) => return Err(session.fail(error)),
    };

    match output_mode(cli) {
        OutputMode::Human => print_unused(&unused),
        OutputMode::Json => write_json_line(&json!({
            "command": "unused",
            "as_of": session.today,
            "criteria": serde_json::to_value(engine.unused)?,
            "buckets": serde_json::to_value(&unused)?,
        }))?,
    }
    Ok(())
}

fn run_cost(cli: &Cli, args: &CostArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli, "cost", args)?;
    let engine = session.engine();
    let costs = match engine.costs(&session.records) {
        Ok(costs) => costs,
        Err(error) => return Err(session.fail(error)),
    };

    match output_mode(cli) {
        OutputMode::Human => print_costs(&costs),
        OutputMode::Json => write_json_line(&json!({
            "command": "cost",
            "standard_usd_per_gb": engine.rates.standard_usd_per_gb,
            "total_cost_usd": costs.total(),
            "by_region": serde_json::to_value(&costs.by_region)?,
            "by_team": serde_json::to_value(&costs.by_team)?,
        }))?,
    }
    Ok(())
}

fn run_classify(cli: &Cli, args: &ClassifyArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli, "classify", args)?;
    let engine = session.engine();
    let classification = match engine.classify(&session.records, session.today) {
        Ok(classification) => classification,
        Err(error) => return Err(session.fail(error)),
    };

    match output_mode(cli) {
        OutputMode::Human => print_classification(&classification),
        OutputMode::Json => write_json_line(&json!({
            "command": "classify",
            "as_of": session.today,
            "rules": serde_json::to_value(engine.rules)?,
            "deletion_queue": classification.deletion_queue,
            "archival_candidates": classification.archival_candidates,
        }))?,
    }
    Ok(())
}

fn run_savings(cli: &Cli, args: &SavingsArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli, "savings", args)?;
    let engine = session.engine();
    let computed = engine
        .classify(&session.records, session.today)
        .and_then(|classification| engine.savings(&session.records, &classification));
    let savings = match computed {
        Ok(savings) => savings,
        Err(error) => return Err(session.fail(error)),
    };

    match output_mode(cli) {
        OutputMode::Human => print_savings(&savings),
        OutputMode::Json => write_json_line(&json!({
            "command": "savings",
            "as_of": session.today,
            "standard_usd_per_gb": engine.rates.standard_usd_per_gb,
            "glacier_usd_per_gb": engine.rates.glacier_usd_per_gb,
            "total_usd": savings.total_usd,
            "buckets": serde_json::to_value(&savings.rows)?,
        }))?,
    }
    Ok(())
}

fn report_log_entry(session: &Session, report: &LifecycleReport) -> LogEntry {
    let mut entry = LogEntry::new(EventType::ReportGenerated, Severity::Info);
    entry.command = Some(session.command.to_string());
    entry.inventory = Some(session.inventory_path.display().to_string());
    entry.as_of = Some(report.as_of);
    entry.bucket_count = Some(report.bucket_count());
    entry.deletion_count = Some(report.classification.deletion_queue.len());
    entry.archival_count = Some(report.classification.archival_candidates.len());
    entry.total_cost_usd = Some(report.costs.total());
    entry.total_savings_usd = Some(report.savings.total_usd);
    entry.config_hash.clone_from(&session.config_hash);
    entry
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            match output_mode(cli) {
                OutputMode::Human => println!("{}", path.display()),
                OutputMode::Json => write_json_line(&json!({
                    "command": "config path",
                    "path": path.display().to_string(),
                    "exists": path.exists(),
                }))?,
            }
        }
        ConfigCommand::Show => {
            let config = load_effective_config(cli, &NoOverrides)?;
            match output_mode(cli) {
                OutputMode::Human => {
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("failed to render config: {e}")))?;
                    print!("{rendered}");
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "config show",
                    "config": serde_json::to_value(&config)?,
                    "hash": config.stable_hash()?,
                }))?,
            }
        }
        ConfigCommand::Validate => {
            let config = load_effective_config(cli, &NoOverrides)?;
            if !cli.no_log {
                let mut log = JsonlWriter::open(JsonlConfig::at(&config.paths.jsonl_log));
                let mut entry = LogEntry::new(EventType::ConfigLoaded, Severity::Info);
                entry.command = Some("config validate".to_string());
                entry.config_hash = config.stable_hash().ok();
                log.write_entry(&entry);
                log.close();
            }
            match output_mode(cli) {
                OutputMode::Human => println!(
                    "configuration OK: {}",
                    config.paths.config_file.display()
                ),
                OutputMode::Json => write_json_line(&json!({
                    "command": "config validate",
                    "valid": true,
                    "path": config.paths.config_file.display().to_string(),
                    "hash": config.stable_hash()?,
                }))?,
            }
        }
    }
    Ok(())
}

// ──────────────────────── human rendering ────────────────────────

fn print_header(title: &str) {
    println!("\n{}", format!("====== {title} ======").bold());
}

fn print_none() {
    println!("  {}", "(none)".dimmed());
}

fn print_summary(rows: &[SummaryRow]) {
    print_header("Bucket Summary");
    if rows.is_empty() {
        print_none();
    }
    for row in rows {
        println!(
            "Name: {}, Region: {}, Size: {} GB, Versioning: {}",
            row.name, row.region, row.size_gb, row.versioning
        );
    }
}

fn print_unused(unused: &[UnusedBucket]) {
    print_header("Unused Buckets");
    if unused.is_empty() {
        print_none();
    }
    for bucket in unused {
        println!(
            "Unused bucket {} with Size: {} GB not accessed in {} days",
            bucket.name.yellow(),
            bucket.size_gb,
            bucket.stale_days
        );
    }
}

fn print_rollup(title: &str, label: &str, rollup: &CostRollup) {
    print_header(title);
    if rollup.is_empty() {
        print_none();
    }
    for (key, cost) in rollup.iter() {
        println!("{label}: {key}, Cost: {}", format_money(cost));
    }
}

fn print_costs(costs: &CostReport) {
    print_rollup("Cost by region", "Region", &costs.by_region);
    print_rollup("Cost by team", "Team", &costs.by_team);
    println!("Total: {}", format_money(costs.total()).bold());
}

fn print_classification(classification: &Classification) {
    print_header("Deletion Queue");
    if classification.deletion_queue.is_empty() {
        print_none();
    }
    for name in &classification.deletion_queue {
        println!("- {}", name.red());
    }

    print_header("Glacier Candidates");
    if classification.archival_candidates.is_empty() {
        print_none();
    }
    for name in &classification.archival_candidates {
        println!("- {}", name.cyan());
    }
}

fn print_savings(savings: &SavingsReport) {
    print_header("Est Cost Savings moving to Glacier");
    if savings.rows.is_empty() {
        print_none();
    }
    for row in &savings.rows {
        println!("Bucket: {}, Savings: {}", row.name, format_money(row.savings_usd));
    }
    println!("Total: {}", format_money(savings.total_usd).bold().green());
}

fn format_money(usd: f64) -> String {
    format!("{usd:.2}$")
}

fn parse_as_of(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected a date as YYYY-MM-DD: {e}"))
}

fn emit_version(cli: &Cli, args: &VersionArgs) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let git_sha = option_env!("GIT_SHA").unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("slh {version}");
            if args.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("git_sha: {git_sha}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "slh",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                    "git_sha": git_sha,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SLH_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
