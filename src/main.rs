use clap::Parser;
use genterm::core::config::{self, CliOverrides, GentermConfig};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "genterm", about = "Terminal for generating Langflow components")]
struct Args {
    /// Langflow server URL (overrides LANGFLOW_BASE_URL and config)
    #[arg(long)]
    base_url: Option<String>,

    /// Validation retries per generation, 0-5
    #[arg(long)]
    max_retries: Option<u8>,

    /// Model provider forwarded to the assistant
    #[arg(short, long)]
    provider: Option<String>,

    /// Model name forwarded to the assistant
    #[arg(short, long = "model")]
    model_name: Option<String>,

    /// Keep prompt history across runs
    #[arg(long)]
    persist_history: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to genterm.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("genterm.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::error!("{}; falling back to defaults", e);
        GentermConfig::default()
    });
    let overrides = CliOverrides {
        base_url: args.base_url,
        max_retries: args.max_retries,
        provider: args.provider,
        model_name: args.model_name,
        persist_history: args.persist_history,
    };
    let resolved = config::resolve(&file_config, &overrides);

    log::info!(
        "genterm starting up against {} (max_retries={})",
        resolved.base_url,
        resolved.max_retries.get()
    );

    genterm::tui::run(resolved)
}
