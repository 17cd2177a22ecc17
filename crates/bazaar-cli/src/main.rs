use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bazaar_core::auth::{TokenConfig, TokenService, hash_password};
use bazaar_core::user::{NewUser, Role};
use bazaar_core::validate;
use bazaar_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "bazaar", version, about = "Operator tools for the Bazaar admin backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create an account, e.g. the first admin
    CreateUser {
        /// Login email
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// One of admin, manager, user
        #[arg(short, long, default_value = "user")]
        role: Role,

        /// Password (reads from BAZAAR_PASSWORD env var if not provided)
        #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print a signed bearer token for an existing account
    IssueToken {
        /// Login email of the account
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bazaar=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => cmd_migrate().await?,
        Commands::CreateUser {
            email,
            name,
            role,
            password,
        } => cmd_create_user(&email, &name, role, &password).await?,
        Commands::IssueToken { email } => cmd_issue_token(&email).await?,
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().context("Database configuration is invalid")?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(db)
}

async fn cmd_migrate() -> Result<()> {
    let db = connect_db().await?;
    db.migrate().await.context("Migration failed")?;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn cmd_create_user(email: &str, name: &str, role: Role, password: &str) -> Result<()> {
    let email = validate::email(email)?;
    let name = validate::required("Name", name)?;
    validate::password(password)?;

    let db = connect_db().await?;
    db.migrate().await.context("Migration failed")?;

    let user = db
        .user_repo()
        .create(&NewUser {
            name,
            email,
            password_hash: hash_password(password)?,
            role,
        })
        .await
        .context("Failed to create user")?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    println!("{}", user.id);
    Ok(())
}

async fn cmd_issue_token(email: &str) -> Result<()> {
    let tokens = TokenService::new(&TokenConfig::from_env()?);
    let db = connect_db().await?;

    let email = validate::email(email)?;
    let Some(user) = db.user_repo().find_by_email(&email).await? else {
        bail!("No user with email {email}");
    };
    if !user.is_active {
        bail!("User {email} is disabled");
    }

    println!("{}", tokens.issue(&user)?);
    Ok(())
}
