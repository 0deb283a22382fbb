use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leadgen_relay::config::service::ServiceConfig;
use leadgen_relay::graph::GraphClient;
use leadgen_relay::observability::metrics::get_metrics;
use leadgen_relay::resilience::retry::RetrySettings;
use leadgen_relay::server::server::{self, AppState};
use leadgen_relay::token::{inspect_identity, list_pages, Identity, TokenManager};
use leadgen_relay::utils::config_loader;
use leadgen_relay::utils::logging::{self, LogLevel};
use leadgen_relay::webhook::{CrmForwarder, LeadProcessor, WebhookState};
use reqwest::Client;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "leadgen-relay.yaml", global = true)]
    config: String,
    /// env file loaded before the config is expanded and rewritten with each
    /// refreshed page token; overrides `token.env_file` (default `.env`)
    #[arg(long, env = "ENV_FILE", global = true)]
    env_file: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum, global = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the webhook server with background token refresh (default)
    Serve,
    /// Probe and introspect the configured tokens, print JSON
    CheckToken,
    /// List the pages the system user manages, print JSON
    Pages,
    /// Run the token pipeline once and persist the result
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load env file and YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config, args.env_file.as_deref()).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Shared http client and graph client
    // -------------------------------

    let client = Client::builder()
        .timeout(Duration::from_millis(service_config.settings.http.timeout_ms))
        .build()
        .context("failed to build http client")?;
    let graph = GraphClient::new(client.clone(), &service_config.graph);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(service_config, client, graph).await,
        Command::CheckToken => check_token(&service_config, &graph).await,
        Command::Pages => pages(&service_config, &graph).await,
        Command::Refresh => refresh(&service_config, graph).await,
    }
}

async fn serve(service_config: ServiceConfig, client: Client, graph: GraphClient) -> Result<()> {
    // -------------------------------
    // 3. Token manager and background refresh
    // -------------------------------

    let tokens = Arc::new(TokenManager::from_config(graph.clone(), &service_config.token));
    info!("token manager ready: {:?}", tokens.identity());
    let refresh_task = tokens.start_background_refresh();

    // -------------------------------
    // 4. Webhook processing and http server
    // -------------------------------

    let processor = LeadProcessor::new(
        tokens,
        graph,
        CrmForwarder::new(client, service_config.crm.clone()),
        RetrySettings::from_config(service_config.settings.retry.as_ref()),
    );
    let state = AppState::new(
        get_metrics().await,
        WebhookState::new(&service_config.webhook, processor),
    );

    info!("Service starting...");
    let served = server::start(&service_config.settings, state, shutdown_signal()).await;

    refresh_task.stop().await;
    info!("Service stopped");
    served
}

async fn check_token(service_config: &ServiceConfig, graph: &GraphClient) -> Result<()> {
    let identity = Identity::from_config(&service_config.token);
    let reports = inspect_identity(graph, &identity).await;
    if reports.is_empty() {
        anyhow::bail!("no page or system user token configured");
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

async fn pages(service_config: &ServiceConfig, graph: &GraphClient) -> Result<()> {
    let identity = Identity::from_config(&service_config.token);
    let pages = list_pages(graph, &identity).await?;
    println!("{}", serde_json::to_string_pretty(&pages)?);

    match pages.first() {
        Some(page) if service_config.token.page_id.is_none() => {
            info!("set FACEBOOK_PAGE_ID={} to relay leads for {:?}", page.id, page.name);
        }
        Some(_) => {}
        None => anyhow::bail!("system user manages no pages"),
    }
    Ok(())
}

async fn refresh(service_config: &ServiceConfig, graph: GraphClient) -> Result<()> {
    let tokens = TokenManager::from_config(graph, &service_config.token);
    let outcome = tokens.force_refresh().await;

    let report = serde_json::json!({
        "outcome": outcome.label(),
        "token": outcome.credential().map(|c| c.preview()),
        "env_file": service_config.token.env_file,
        "env_key": service_config.token.env_key,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !outcome.is_live() {
        anyhow::bail!("no live page token could be obtained");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
