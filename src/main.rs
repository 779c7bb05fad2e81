use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use trustscope::{Config, TrustVerifier, VerificationReport, VerificationRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs on stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustscope=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("trustscope v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let request_path = args
        .next()
        .context("usage: trustscope <request.json | -> [config.toml]")?;
    let config_path = args.next().unwrap_or_else(|| "trustscope.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        let config = Config::load(&config_path)?;
        info!("Config loaded from {}", config_path);
        config
    } else {
        info!("No config at {}, using defaults", config_path);
        Config::default()
    };

    let raw = if request_path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&request_path)
            .with_context(|| format!("Failed to read request file '{}'", request_path))?
    };
    let request: VerificationRequest =
        serde_json::from_str(&raw).context("Invalid verification request")?;

    let verifier = TrustVerifier::new(Arc::new(config))?;
    let result = verifier.verify(&request).await;

    let report = VerificationReport::from_result(&request, &result);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
