//! Spot Chat - chat route server
//!
//! Serves the chat, model catalog and user profile endpoints.

use clap::Parser;
use spot_chat::config::{ServerConfig, DEFAULT_LISTEN, DEFAULT_MAX_DURATION_SECS};
use spot_chat::models::ProviderRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Spot Chat - model selection and chat dispatch server
#[derive(Parser, Debug)]
#[command(name = "spot-chat")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short, long, env = "SPOT_CHAT_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Base URL used to fetch /config/models.json (defaults to the request host)
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Time budget for a whole request, in seconds
    #[arg(long, env = "SPOT_CHAT_MAX_DURATION", default_value_t = DEFAULT_MAX_DURATION_SECS)]
    pub max_duration_secs: u64,

    /// Trust x-user-id / x-user-name / x-user-avatar headers from an auth proxy
    #[arg(long, env = "SPOT_CHAT_TRUSTED_AUTH_HEADERS")]
    pub trusted_auth_headers: bool,

    /// Trust x-base-url / x-url / x-host headers from a reverse proxy when resolving the base URL
    #[arg(long, env = "SPOT_CHAT_TRUSTED_PROXY_HEADERS")]
    pub trusted_proxy_headers: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn init_tracing(args: &Args) {
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug,hyper=info"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let config = ServerConfig::from_parts(
        &args.listen,
        args.base_url.as_deref(),
        args.max_duration_secs,
        args.trusted_auth_headers,
    )?
    .with_trusted_proxy_headers(args.trusted_proxy_headers);

    spot_chat::server::serve(config, ProviderRegistry::from_env()).await
}
