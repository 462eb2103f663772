//! Operator CLI for link-locker.
//!
//! ```bash
//! admin token create --name "Landing bot"
//! admin token list
//! admin token revoke "Landing bot"     # or by numeric id
//! admin link show Ab3dEf6hIj9k
//! admin link delete Ab3dEf6hIj9k -y
//! admin stats
//! admin db check
//! ```
//!
//! Reads the same environment as the server. `TOKEN_SIGNING_SECRET` must
//! match the server's or created tokens will never authenticate.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;

use link_locker::application::services::{AuthService, LinkService};
use link_locker::config::{self, Config};
use link_locker::domain::entities::LockedLink;
use link_locker::domain::repositories::{ApiToken, TokenRepository};
use link_locker::infrastructure::cache::{CacheService, NullCache, RedisCache};
use link_locker::infrastructure::persistence::{PgLockedLinkRepository, PgTokenRepository};

const GENERATED_TOKEN_LEN: usize = 48;
const TIMESTAMP: &str = "%Y-%m-%d %H:%M";

#[derive(Parser)]
#[command(name = "admin", author, version, about = "Manage link-locker tokens and links")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bearer tokens for the /api routes
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
    /// Look up or remove a locked link by key
    Link {
        #[command(subcommand)]
        action: LinkCommand,
    },
    /// Link and token counts
    Stats,
    Db {
        #[command(subcommand)]
        action: DbCommand,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    Create {
        /// Label shown in `token list`
        #[arg(short, long)]
        name: Option<String>,
        /// Use this value instead of a generated one
        #[arg(short, long)]
        token: Option<String>,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    List,
    Revoke {
        /// Token name, or its numeric id
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum LinkCommand {
    Show {
        key: String,
    },
    Delete {
        key: String,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbCommand {
    /// Run `SELECT 1`
    Check,
    /// Server version and applied migrations
    Info,
}

/// Everything a command needs, built once from the environment.
struct Admin {
    pool: PgPool,
    config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = PgPool::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    let admin = Admin { pool, config };

    match cli.command {
        Command::Token { action } => admin.token(action).await,
        Command::Link { action } => admin.link(action).await,
        Command::Stats => admin.stats().await,
        Command::Db { action } => admin.db(action).await,
    }
}

impl Admin {
    fn tokens(&self) -> Arc<PgTokenRepository> {
        Arc::new(PgTokenRepository::new(Arc::new(self.pool.clone())))
    }

    /// `LinkService` over Postgres. With `with_cache`, deletions also drop
    /// the Redis entry so the visitor page stops serving the link at once.
    async fn links(&self, with_cache: bool) -> LinkService {
        let cache: Arc<dyn CacheService> = match (&self.config.redis_url, with_cache) {
            (Some(url), true) => match RedisCache::connect(url, self.config.cache_ttl_seconds).await {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    warn(&format!("Redis unavailable, cache not updated: {e}"));
                    Arc::new(NullCache::new())
                }
            },
            _ => Arc::new(NullCache::new()),
        };

        LinkService::new(
            Arc::new(PgLockedLinkRepository::new(Arc::new(self.pool.clone()))),
            cache,
            self.config.token_signing_secret.clone(),
            self.config.public_base_url.clone(),
        )
    }

    async fn token(&self, action: TokenCommand) -> Result<()> {
        let repo = self.tokens();
        match action {
            TokenCommand::Create { name, token, yes } => {
                let auth = AuthService::new(repo.clone(), self.config.token_signing_secret.clone());
                create_token(repo.as_ref(), &auth, &self.config.public_base_url, name, token, yes).await
            }
            TokenCommand::List => list_tokens(repo.as_ref()).await,
            TokenCommand::Revoke { name_or_id } => revoke_token(repo.as_ref(), &name_or_id).await,
        }
    }

    async fn link(&self, action: LinkCommand) -> Result<()> {
        let service = self.links(matches!(action, LinkCommand::Delete { .. })).await;
        let (key, delete, yes) = match action {
            LinkCommand::Show { key } => (key, false, false),
            LinkCommand::Delete { key, yes } => (key, true, yes),
        };

        let link = service
            .get(&key)
            .await
            .with_context(|| format!("Cannot load link {key}"))?;
        print_link(&link, &service.public_url(&link.key));

        if !delete {
            return Ok(());
        }
        if !yes && !confirm("Delete this link?", false)? {
            cancelled();
            return Ok(());
        }

        service.delete(&key).await.context("Failed to delete link")?;
        success("Link deleted");
        Ok(())
    }

    async fn stats(&self) -> Result<()> {
        heading("📊 Statistics");

        let totals = self
            .links(false)
            .await
            .totals(Utc::now().date_naive())
            .await
            .context("Failed to count links")?;
        let live_tokens = self
            .tokens()
            .list()
            .await
            .context("Failed to list tokens")?
            .iter()
            .filter(|t| !t.is_revoked())
            .count();

        for (label, value) in [
            ("Links", totals.total),
            ("Password protected", totals.password_protected),
            ("Expired", totals.expired),
            ("Live tokens", live_tokens as i64),
        ] {
            println!("  {:<20}{}", format!("{label}:"), value.to_string().bright_green().bold());
        }
        println!();
        Ok(())
    }

    async fn db(&self, action: DbCommand) -> Result<()> {
        match action {
            DbCommand::Check => {
                sqlx::query("SELECT 1")
                    .execute(&self.pool)
                    .await
                    .context("Database did not answer")?;
                success("Database connection OK");
            }
            DbCommand::Info => {
                heading("ℹ️  Database");
                let version: String = sqlx::query_scalar("SELECT version()")
                    .fetch_one(&self.pool)
                    .await?;
                let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                    .fetch_one(&self.pool)
                    .await
                    .context("Migrations table missing; start the server once")?;

                println!("  PostgreSQL: {}", version.bright_white());
                println!("  Migrations: {}", migrations.to_string().bright_white());
                println!();
            }
        }
        Ok(())
    }
}

/// Stores the keyed hash of a new token and prints the raw value once.
async fn create_token(
    repo: &dyn TokenRepository,
    auth: &AuthService,
    base_url: &str,
    name: Option<String>,
    raw: Option<String>,
    yes: bool,
) -> Result<()> {
    heading("🔑 New API token");

    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Landing bot")
            .interact_text()?,
    };
    let raw = match raw {
        Some(raw) if raw.len() < 16 => bail!("Custom tokens need at least 16 characters"),
        Some(raw) => raw,
        None => generate_token(),
    };

    println!("  Name:  {}", name.cyan());
    println!("  Token: {}", raw.bright_yellow().bold());
    println!();
    println!("{}", "  Copy the token now, it cannot be shown again.".red().bold());
    println!();

    if !yes && !confirm("Store this token?", true)? {
        cancelled();
        return Ok(());
    }

    let stored = repo
        .insert(&name, &auth.hash_token(&raw))
        .await
        .context("Failed to store token")?;

    success(&format!("Token #{} stored", stored.id));
    println!(
        "  curl -H \"Authorization: Bearer {}\" {}/api/links/<key>",
        raw.bright_yellow(),
        base_url.trim_end_matches('/')
    );
    println!();
    Ok(())
}

async fn list_tokens(repo: &dyn TokenRepository) -> Result<()> {
    heading("📋 API tokens");

    let tokens = repo.list().await.context("Failed to list tokens")?;
    if tokens.is_empty() {
        warn("No tokens yet. Create one with `admin token create`.");
        return Ok(());
    }

    println!(
        "  {:<5} {:<28} {:<17} {:<17} {}",
        "ID".bold(),
        "Name".bold(),
        "Created".bold(),
        "Last used".bold(),
        "Status".bold()
    );
    for token in &tokens {
        let last_used = token
            .last_used_at
            .map_or_else(|| "never".to_string(), |t| t.format(TIMESTAMP).to_string());
        let status = if token.is_revoked() {
            "revoked".red()
        } else {
            "live".green()
        };
        println!(
            "  {:<5} {:<28} {:<17} {:<17} {}",
            token.id,
            token.name.cyan(),
            token.created_at.format(TIMESTAMP).to_string().bright_black(),
            last_used.bright_black(),
            status
        );
    }
    println!();
    Ok(())
}

async fn revoke_token(repo: &dyn TokenRepository, name_or_id: &str) -> Result<()> {
    heading("🔒 Revoke API token");

    let Some(token) = lookup_token(repo, name_or_id).await? else {
        bail!("No token named or numbered {name_or_id:?}");
    };
    if token.is_revoked() {
        warn(&format!("{} is already revoked", token.name));
        return Ok(());
    }

    println!("  {} (#{})", token.name.cyan(), token.id);
    if !confirm("Revoke this token?", false)? {
        cancelled();
        return Ok(());
    }

    repo.revoke(token.id).await.context("Failed to revoke token")?;
    success("Token revoked");
    Ok(())
}

async fn lookup_token(repo: &dyn TokenRepository, name_or_id: &str) -> Result<Option<ApiToken>> {
    if let Some(token) = repo.find_by_name(name_or_id).await? {
        return Ok(Some(token));
    }
    let Ok(id) = name_or_id.parse::<i64>() else {
        return Ok(None);
    };
    Ok(repo.list().await?.into_iter().find(|t| t.id == id))
}

fn print_link(link: &LockedLink, url: &str) {
    heading("🔗 Locked link");
    println!("  Key:     {}", link.key.cyan());
    println!("  URL:     {}", url.bright_white());
    println!("  Title:   {}", link.display_title());
    println!("  Created: {}", link.created_at.format(TIMESTAMP).to_string().bright_black());

    println!("\n  {}", "Actions".bold());
    if link.actions.is_empty() {
        println!("    {}", "none, targets open immediately".bright_black());
    }
    for (n, action) in link.actions.iter().enumerate() {
        println!("    {}. {:<22} {}", n + 1, action.label(), action.target.bright_black());
    }

    println!("\n  {}", "Targets".bold());
    for (slot, target) in &link.targets {
        println!("    {:<7} {}", slot.field_name(), target);
    }

    let advanced = &link.advanced;
    println!("\n  {}", "Advance option".bold());
    println!("    Password: {}", if link.has_password() { "set" } else { "none" });
    if let Some(expires_on) = advanced.expires_on {
        let state = if link.is_expired_on(Utc::now().date_naive()) {
            "expired".red()
        } else {
            "open".green()
        };
        println!("    Expires:  {expires_on} ({state})");
    }
    if let Some(note) = &advanced.note {
        println!("    Note:     {note}");
    }
    if let Some(thumbnail) = &advanced.thumbnail {
        println!("    Thumb:    {thumbnail}");
    }
    println!("    Style:    {}", advanced.button_style.as_str());
    println!();
}

fn heading(text: &str) {
    println!("{}\n", text.bright_blue().bold());
}

fn success(text: &str) {
    println!("{} {}\n", "✅".green(), text.green().bold());
}

fn warn(text: &str) {
    println!("{} {}", "⚠️ ".yellow(), text.yellow());
}

fn cancelled() {
    println!("{}", "❌ Cancelled".red());
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
}

fn generate_token() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_TOKEN_LEN)
        .map(char::from)
        .collect()
}
