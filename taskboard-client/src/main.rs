//! Taskboard command-line client
//!
//! # Usage
//!
//! ```bash
//! taskboard register --name Ana --email ana@example.com --password secret123
//! taskboard login --email ana@example.com --password secret123
//! taskboard tasks add "Write report" --description "Q3 numbers"
//! taskboard tasks list
//! taskboard tasks status 6f1c... in-progress
//! taskboard tasks rm 6f1c...
//! taskboard admin users
//! taskboard logout
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

mod commands;

use commands::Ctx;
use taskboard_client::{
    config::ClientConfig, types::TaskStatus, ApiClient, FileTokenStore, Session,
};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard command-line client", long_about = None)]
#[command(version)]
struct Cli {
    /// API base URL (overrides TASKBOARD_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and store the access token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage your tasks
    #[command(subcommand)]
    Tasks(TaskCommands),

    /// Administrator views
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Check that the API is reachable
    Health,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List your tasks, newest first
    List,

    /// Show one task
    Show { id: Uuid },

    /// Create a task
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Set a task's status (pending, in-progress, completed)
    Status { id: Uuid, status: TaskStatus },

    /// Delete a task
    Rm { id: Uuid },

    /// Count your tasks by status
    Stats,
}

#[derive(Subcommand)]
enum AdminCommands {
    /// All registered users
    Users,

    /// Every task of every user
    Tasks,
}

fn init_tracing() {
    // quiet by default; RUST_LOG=taskboard_client=debug shows request traces
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let client = ApiClient::new(&config.api_url)?;
    let mut session = Session::load(FileTokenStore::new(&config.token_file))
        .with_context(|| format!("Failed to read {}", config.token_file.display()))?;

    let ctx = Ctx {
        client: &client,
        session: &mut session,
    };

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(ctx, &name, &email, &password).await,
        Commands::Login { email, password } => commands::auth::login(ctx, &email, &password).await,
        Commands::Logout => commands::auth::logout(ctx),
        Commands::Whoami => commands::auth::whoami(ctx).await,
        Commands::Health => {
            let health = client.health().await?;
            println!(
                "{} (version {}, {} storage {})",
                health.status, health.version, health.backend, health.storage
            );
            Ok(())
        }
        Commands::Tasks(command) => match command {
            TaskCommands::List => commands::tasks::list(ctx).await,
            TaskCommands::Show { id } => commands::tasks::show(ctx, id).await,
            TaskCommands::Add { title, description } => {
                commands::tasks::add(ctx, &title, description.as_deref()).await
            }
            TaskCommands::Status { id, status } => {
                commands::tasks::set_status(ctx, id, status).await
            }
            TaskCommands::Rm { id } => commands::tasks::remove(ctx, id).await,
            TaskCommands::Stats => commands::tasks::stats(ctx).await,
        },
        Commands::Admin(command) => match command {
            AdminCommands::Users => commands::admin::users(ctx).await,
            AdminCommands::Tasks => commands::admin::tasks(ctx).await,
        },
    }
}
