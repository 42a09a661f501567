mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use inmo_broadcast::BroadcastScheduler;
use inmo_commands::Dispatcher;
use inmo_core::config;
use inmo_core::traits::SystemClock;
use inmo_engine::Engine;
use inmo_services::{BackOffice, HttpTransport, StaticTemplates};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "inmo",
    version,
    about = "Inmo — asistente conversacional de back-office inmobiliario"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the assistant.
    Start,
    /// Check configuration and gateway connectivity.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            let backoffice = BackOffice::new(&cfg.services)?;
            let clients = backoffice.clients();
            let properties = backoffice.properties();
            let staff = backoffice.staff();

            let transport = Arc::new(HttpTransport::new(&cfg.transport)?);

            let engine = Engine::new(&cfg.session, Arc::new(SystemClock));
            let dispatcher = Dispatcher::new(
                clients.clone(),
                properties,
                staff.clone(),
                transport.clone(),
            );
            let scheduler = BroadcastScheduler::new(transport.clone(), cfg.broadcast.clone());

            println!("Inmo — iniciando asistente...");
            let gw = gateway::Gateway::new(
                cfg,
                engine,
                dispatcher,
                scheduler,
                transport,
                staff,
                clients,
                Arc::new(StaticTemplates),
            );
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Inmo — Status\n");
            println!("Config: {}", cli.config);
            println!("Oficina: {}", cfg.inmo.name);
            println!("Back office: {}", cfg.services.base_url);
            println!("Gateway: {}", cfg.transport.base_url);
            println!();

            let transport = HttpTransport::new(&cfg.transport)?;
            use inmo_core::traits::TransportConnector;
            let ready = transport.session_ready().await;
            println!(
                "  sesión de mensajería: {}",
                if ready { "lista" } else { "no disponible" }
            );
        }
    }

    Ok(())
}
