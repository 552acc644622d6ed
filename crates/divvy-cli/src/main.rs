use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use divvy_core::{AccountService, ExpenseService, ExpenseView, TokenConfig, User, UserStore};
use divvy_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "divvy", version, about = "Divvy expense splitter admin tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user and print a token for it
    AddUser {
        /// Display name (must be unique)
        #[arg(short, long)]
        name: String,

        /// Password, at least 6 characters
        #[arg(short, long, env = "DIVVY_USER_PASSWORD", hide_env_values = true)]
        password: String,

        #[command(flatten)]
        token: TokenArgs,
    },

    /// Issue a fresh bearer token for an existing user
    Token {
        /// Display name of the user
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        token: TokenArgs,
    },

    /// List the expenses a user paid or is split into
    Expenses {
        /// Display name of the user
        #[arg(short, long)]
        name: String,

        /// Print the expenses as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args)]
struct TokenArgs {
    /// Signing secret shared with the server
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRES_IN_SECS")]
    expires_in_secs: Option<u64>,
}

impl TokenArgs {
    fn config(&self) -> Result<TokenConfig> {
        anyhow::ensure!(!self.jwt_secret.is_empty(), "JWT_SECRET must not be empty");
        let config = TokenConfig::new(self.jwt_secret.clone());
        Ok(match self.expires_in_secs {
            Some(0) => anyhow::bail!("JWT_EXPIRES_IN_SECS must be at least 1"),
            Some(secs) => config.with_ttl(Duration::from_secs(secs)),
            None => config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("divvy=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::AddUser {
            name,
            password,
            token,
        } => cmd_add_user(&db, &name, &password, &token.config()?).await,
        Commands::Token { name, token } => cmd_token(&db, &name, &token.config()?).await,
        Commands::Expenses { name, json } => cmd_expenses(&db, &name, json).await,
    }
}

/// Connect to PostgreSQL using DATABASE_URL and apply migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(db)
}

async fn find_user(db: &Database, name: &str) -> Result<User> {
    db.user_repo()
        .find_user_by_name(name)
        .await
        .map_err(|e| anyhow::anyhow!(e))?
        .with_context(|| format!("No user named '{name}'"))
}

async fn cmd_add_user(db: &Database, name: &str, password: &str, token: &TokenConfig) -> Result<()> {
    let accounts = AccountService::new(token, Arc::new(db.user_repo()));
    let session = accounts
        .register(name, password)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("Created user {} ({})", session.user.name, session.user.id);
    println!("{}", session.token);
    Ok(())
}

async fn cmd_token(db: &Database, name: &str, token: &TokenConfig) -> Result<()> {
    let user = find_user(db, name).await?;
    let accounts = AccountService::new(token, Arc::new(db.user_repo()));
    let token = accounts
        .issue_token(&user)
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(user_id = %user.id, "Issued token");
    println!("{token}");
    Ok(())
}

async fn cmd_expenses(db: &Database, name: &str, json: bool) -> Result<()> {
    let user = find_user(db, name).await?;
    let service = ExpenseService::new(Arc::new(db.user_repo()), Arc::new(db.expense_repo()));
    let expenses = service
        .list_for(&user)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expenses)?);
        return Ok(());
    }

    if expenses.is_empty() {
        println!("No expenses found for {}", user.name);
        return Ok(());
    }

    println!("Expenses for {}:\n", user.name);
    for expense in &expenses {
        print_expense(expense);
    }
    println!("\nTotal: {} expenses", expenses.len());

    Ok(())
}

fn print_expense(expense: &ExpenseView) {
    println!(
        "  {} {} {:>10.2}  paid by {}  ({})",
        expense.created_at.format("%Y-%m-%d %H:%M"),
        expense.description,
        expense.amount,
        expense.paid_by,
        expense.id,
    );
    for split in &expense.split_between {
        println!("      {:<20} {:>10.2}", split.username, split.share);
    }
}
