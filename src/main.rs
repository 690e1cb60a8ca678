use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use widget_inbox::config::{has_flag, ServerConfig};

const USAGE: &str = "widget server\n\nUSAGE:\n  widget_server [--host ADDR] [--http-port N] [--data-file PATH] [--session-ttl-secs N]\n\nOPTIONS:\n  --host ADDR             Bind address (env: WIDGET_HOST, default 0.0.0.0)\n  --http-port N           HTTP port (env: WIDGET_HTTP_PORT, default 3000)\n  --data-file PATH        Fixture JSON to load (env: WIDGET_DATA_FILE, default: demo dataset)\n  --session-ttl-secs N    Subscriber token lifetime (env: WIDGET_SESSION_TTL_SECS, default 86400)\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config = ServerConfig::from_env_and_args(&args)?;
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "startup",
        "widget server starting: RUST_LOG='{}', bind={}, data_file={:?}",
        rust_log,
        config.bind_addr(),
        config.data_file
    );

    widget_inbox::server::run(config).await
}
