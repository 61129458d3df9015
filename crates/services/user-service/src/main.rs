//! User Service - command line access to the stored user routines.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::AppResult;
use user_service_lib::{config, UserApp};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "Call the stored user routines of a PostgreSQL database")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the routine group
    Setup,
    /// Drop the routine group
    Teardown,
    /// Create a user and print its id
    Create { name: String },
    /// Print the name of a user
    Get { id: i64 },
    /// Print every user, one per line
    List,
    /// Rename a user and print the affected count
    Update { id: i64, name: String },
    /// Delete a user and print the affected count
    Delete { id: i64 },
    /// Provision the group, run the user scenario, and drop the group
    Scenario {
        #[arg(long, default_value = "John Doe")]
        name: String,
        #[arg(long, default_value = "Jane Doe")]
        renamed: String,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli.command).await {
        tracing::error!(code = e.code(), error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> AppResult<()> {
    let app = UserApp::build(config::from_env()).await?;

    let outcome = execute(&app, command).await;
    if let Err(e) = app.shutdown().await {
        tracing::warn!(error = %e, "Connection shutdown failed");
    }
    outcome
}

async fn execute(app: &UserApp, command: Commands) -> AppResult<()> {
    match command {
        Commands::Setup => app.lifecycle.setup().await?,
        Commands::Teardown => app.lifecycle.teardown().await?,
        Commands::Create { name } => println!("{}", app.users.create(&name).await?),
        Commands::Get { id } => match app.users.get_by_id(id).await? {
            Some(name) => println!("{}", name),
            None => println!("user {} not found", id),
        },
        Commands::List => {
            for user in app.users.list_all().await? {
                println!("{}", user);
            }
        }
        Commands::Update { id, name } => println!("{}", app.users.update(id, &name).await?),
        Commands::Delete { id } => println!("{}", app.users.delete(id).await?),
        Commands::Scenario { name, renamed } => {
            let report = app.run_scenario(&name, &renamed).await?;
            for step in &report.steps {
                println!("{} -> {}", step.operation, step.outcome);
            }
        }
    }

    Ok(())
}
