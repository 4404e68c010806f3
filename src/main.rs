use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// EduMatch Gateway — API gateway for the EduMatch microservices
#[derive(Parser)]
#[command(name = "edumatch-gateway", version, about)]
struct Cli {
    /// Path to configuration file (.hcl)
    #[arg(short, long, default_value = "gateway.hcl")]
    config: String,

    /// Override listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file without starting the gateway
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long, default_value = "gateway.hcl")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> edumatch_gateway::Result<()> {
    let cli = Cli::parse();

    // Handle validate subcommand early
    if let Some(Commands::Validate { config: config_path }) = &cli.command {
        return validate_config(config_path).await;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    tracing::info!("EduMatch Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if std::path::Path::new(&cli.config).exists() {
        tracing::info!(config = cli.config, "Loading configuration");
        edumatch_gateway::config::GatewayConfig::from_file(&cli.config).await?
    } else {
        tracing::warn!("Config file not found, using defaults");
        edumatch_gateway::config::GatewayConfig::default()
    };

    // Override listen address if provided
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    // Create and start the gateway
    let gateway = Arc::new(edumatch_gateway::Gateway::new(config)?);
    gateway.start().await?;

    tracing::info!("Gateway ready — press Ctrl+C to stop");

    // Wait for shutdown signal
    gateway.wait_for_shutdown().await;

    Ok(())
}

/// Validate a configuration file and print diagnostics
async fn validate_config(path: &str) -> edumatch_gateway::Result<()> {
    use std::path::Path;

    if !Path::new(path).exists() {
        eprintln!("✗ Config file not found: {}", path);
        std::process::exit(1);
    }

    // Parse
    let config = match edumatch_gateway::config::GatewayConfig::from_file(path).await {
        Ok(c) => {
            println!("✓ Config parsed successfully ({})", path);
            c
        }
        Err(e) => {
            eprintln!("✗ Parse error: {}", e);
            std::process::exit(1);
        }
    };

    // Validate
    if let Err(e) = config.validate() {
        eprintln!("✗ Validation error: {}", e);
        std::process::exit(1);
    }

    // Print summary
    println!("✓ Configuration is valid");
    println!();
    println!("  Listen:    {}", config.listen);
    println!("  Services:  {}", config.services.len());
    for (name, svc) in &config.services {
        println!(
            "    - {} → {}:{} (health: {})",
            name,
            svc.host,
            svc.port,
            svc.health_path.as_deref().unwrap_or("/health")
        );
    }
    println!("  Routes:    {}", config.routes.len());
    for (prefix, route) in &config.routes {
        println!("    - {} → {}", prefix, route.service);
    }

    Ok(())
}
