//! `rulectl` -- admin CLI for car pricing rules.
//!
//! Drives the same editors the rule screens use against a live Rule
//! Store, so every client-side check runs before anything is sent.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default                 | Description                 |
//! |---------------------------|----------|-------------------------|-----------------------------|
//! | `RULE_STORE_URL`          | no       | `http://localhost:3000` | Rule Store base URL         |
//! | `RULE_STORE_TOKEN`        | no       | --                      | Bearer token                |
//! | `RULE_STORE_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout (1-300) |

mod cars;
mod plans;
mod rules;

use std::sync::Arc;

use anyhow::Result;
use brokerage_events::EventBus;
use brokerage_store::{StoreClient, StoreConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rulectl")]
#[command(about = "Manage car pricing rules in the Rule Store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rule Store base URL
    #[arg(long, global = true, env = "RULE_STORE_URL")]
    store_url: Option<String>,

    /// Bearer token for the Rule Store
    #[arg(long, global = true, env = "RULE_STORE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "RULE_STORE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage car rules
    Rules {
        #[command(subcommand)]
        command: rules::RuleCommands,
    },

    /// Browse the car catalog
    Cars {
        #[command(subcommand)]
        command: cars::CarCommands,
    },

    /// Inspect insurance plans
    Plans {
        #[command(subcommand)]
        command: plans::PlanCommands,
    },
}

/// Shared handles passed to every command.
pub struct Context {
    pub store: Arc<StoreClient>,
    pub bus: Arc<EventBus>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = StoreConfig::from_lookup(|key| {
        let flag = match key {
            "RULE_STORE_URL" => cli.store_url.clone(),
            "RULE_STORE_TOKEN" => cli.token.clone(),
            "RULE_STORE_TIMEOUT_SECS" => cli.timeout_secs.map(|s| s.to_string()),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    })?;

    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        authenticated = config.token.is_some(),
        "Using Rule Store",
    );

    let ctx = Context {
        store: Arc::new(StoreClient::new(&config)?),
        bus: Arc::new(EventBus::default()),
    };

    match cli.command {
        Commands::Rules { command } => rules::handle_command(command, &ctx).await,
        Commands::Cars { command } => cars::handle_command(command, &ctx).await,
        Commands::Plans { command } => plans::handle_command(command, &ctx).await,
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rulectl=info,brokerage=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
