use std::net::Ipv4Addr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use rootwalk_application::{NoopObserver, QueryObserver, RecordCache, Resolver};
use rootwalk_domain::{Question, RecordClass, RecordType};
use rootwalk_infrastructure::UdpTransport;

mod bootstrap;
mod verbose;

#[derive(Parser)]
#[command(name = "rootwalk")]
#[command(version)]
#[command(about = "Iterative DNS resolver that walks delegations from the root hints")]
struct Cli {
    /// Host name to resolve
    hostname: String,

    /// Record type to query, by name or numeric code
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "A")]
    record_type: RecordType,

    /// Start resolution from this server instead of the root hints
    #[arg(long, value_name = "IP")]
    server: Option<Ipv4Addr>,

    /// Print every query, response header and record as resolution proceeds
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Per-attempt receive timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Sends per server, including the first
    #[arg(long)]
    attempts: Option<u32>,

    /// CNAME indirection budget
    #[arg(long)]
    max_indirection: Option<i32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = bootstrap::CliOverrides {
        timeout_ms: cli.timeout_ms,
        attempts: cli.attempts,
        max_indirection: cli.max_indirection,
        log_level: cli.log_level.clone(),
        server: cli.server,
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let observer: Arc<dyn QueryObserver> = if cli.verbose {
        Arc::new(verbose::VerbosePrinter)
    } else {
        Arc::new(NoopObserver)
    };

    let cache = if config.resolver.root_hints.is_empty() {
        RecordCache::new()
    } else {
        RecordCache::with_hints(&config.resolver.root_hints)
    };
    let transport = UdpTransport::from_config(&config.resolver, observer.clone())?;
    let mut resolver = Resolver::new(cache, transport, observer);

    let question = Question::new(&cli.hostname, cli.record_type, RecordClass::IN);
    info!(question = %question, "starting lookup");

    let records = resolver
        .resolve(&question, config.resolver.max_indirection)
        .map_err(|err| match err.rcode_text() {
            Some(text) => anyhow::anyhow!("{err} ({text})"),
            None => anyhow::Error::new(err),
        })?;
    if records.is_empty() {
        println!("no records found for {question}");
    } else {
        for record in &records {
            println!("{record}");
        }
    }
    Ok(())
}
