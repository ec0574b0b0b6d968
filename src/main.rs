use std::path::PathBuf;

use anyhow::{Context, Result};
use cdp_adapter::CdpContext;
use clap::{Args, Parser, Subcommand};
use pagescript_cli::{build_registry, load_config, AppConfig, AppResult, CallReport, ToolRunner};
use serde_json::json;
use tool_contract::{Content, ToolRegistry};
use tool_execute_js::TOOL_NAME;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pagescript - run JavaScript in a live browser tab
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled tools and their schemas
    Tools,

    /// Execute JavaScript in the current tab
    Exec(ExecArgs),

    /// Show build information
    Info,
}

#[derive(Args)]
struct ExecArgs {
    /// Script source
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    code: Option<String>,

    /// Read script source from a file
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Attach to a running browser instead of launching one
    #[arg(long, value_name = "WS_URL")]
    cdp_endpoint: Option<String>,

    /// Append a page-state section after the result
    #[arg(long)]
    capture_snapshot: Option<bool>,

    /// Tab index to run in (defaults to the first tab)
    #[arg(long)]
    tab: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug)?;

    let config = load_config(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    let result = match cli.command {
        Commands::Tools => cmd_tools(&config, cli.output),
        Commands::Exec(args) => cmd_exec(args, config, cli.output).await,
        Commands::Info => cmd_info(&config, cli.output),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn cmd_tools(config: &AppConfig, output: OutputFormat) -> Result<()> {
    let registry = build_registry(&config.tools)?;
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        }
        OutputFormat::Human => {
            for def in registry.definitions() {
                let kind = if def.schema.mutation_type.is_destructive() {
                    "destructive"
                } else {
                    "read-only"
                };
                println!(
                    "{} ({}) [{}, {}]\n  {}\n  required: {}",
                    def.schema.name,
                    def.schema.title,
                    def.capability,
                    kind,
                    def.schema.description,
                    def.schema.required_fields().join(", ")
                );
            }
        }
    }
    Ok(())
}

async fn cmd_exec(args: ExecArgs, mut config: AppConfig, output: OutputFormat) -> Result<()> {
    let code = match (args.code, args.file) {
        (Some(code), _) => code,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        (None, None) => anyhow::bail!("either --code or --file is required"),
    };
    if let Some(endpoint) = args.cdp_endpoint {
        config.browser.websocket_url = Some(endpoint);
    }
    if let Some(capture) = args.capture_snapshot {
        config.tools.capture_snapshot = capture;
    }

    let registry = build_registry(&config.tools)?;
    let context = connect(&config, args.tab).await?;
    info!(tabs = context.tabs().len(), "browser session ready");

    let report = run_once(&registry, &context, code).await;
    context.shutdown().await;
    print_report(&report?, output)
}

async fn connect(config: &AppConfig, tab: Option<usize>) -> AppResult<CdpContext> {
    let context = CdpContext::connect(config.browser.clone()).await?;
    if let Some(index) = tab {
        context.select_tab(index)?;
    }
    Ok(context)
}

async fn run_once(registry: &ToolRegistry, context: &CdpContext, code: String) -> AppResult<CallReport> {
    let runner = ToolRunner::new(registry, context);
    Ok(runner.call(TOOL_NAME, json!({ "code": code })).await?)
}

fn print_report(report: &CallReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => {
            for line in &report.code {
                println!("{}", line);
            }
            println!();
            for item in &report.output.content {
                match item {
                    Content::Text { text } => println!("{}", text),
                }
            }
        }
    }
    Ok(())
}

fn cmd_info(config: &AppConfig, output: OutputFormat) -> Result<()> {
    let registry = build_registry(&config.tools)?;
    let info = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "build_date": env!("BUILD_DATE"),
        "git_hash": env!("GIT_HASH"),
        "tools": registry.len(),
        "capture_snapshot": config.tools.capture_snapshot,
        "cdp_endpoint": config.browser.websocket_url,
    });
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Human => {
            println!("pagescript {}", env!("CARGO_PKG_VERSION"));
            println!("  build: {} ({})", env!("BUILD_DATE"), env!("GIT_HASH"));
            println!("  tools enabled: {}", registry.len());
            println!("  capture snapshot: {}", config.tools.capture_snapshot);
            if let Some(endpoint) = &config.browser.websocket_url {
                println!("  cdp endpoint: {}", endpoint);
            }
        }
    }
    Ok(())
}
