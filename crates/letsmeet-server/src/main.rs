//! `LetsMeet` operator CLI
//!
//! Runs the event, session, and schedule operations against a local
//! database. Output is JSON on stdout (this is a CLI binary, not debug
//! output); logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use letsmeet_core::Interval;
use letsmeet_core::config::load_config;
use letsmeet_core::tracing_init::{default_filter, init_tracing};

use letsmeet_server::auth::{Argon2Credentials, TokenService};
use letsmeet_server::Error;
use letsmeet_server::server::cookie::{RefreshCookie, refresh_token_from_header};
use letsmeet_server::server::{AuthService, CreateEventRequest, EventService, SessionGrant};
use letsmeet_server::storage::EventDatabase;

#[derive(Parser, Debug)]
#[command(name = "letsmeet")]
#[command(version, about = "LetsMeet - find a time that works for everyone")]
struct Cli {
    /// JSON settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to SQLite database file.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an event and sign in as its admin.
    CreateEvent {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Candidate interval as START/END. Repeatable.
        #[arg(long = "interval")]
        intervals: Vec<Interval>,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LETSMEET_PASSWORD", hide_env_values = true)]
        password: String,
        /// Organizer availability, if different from the candidate intervals.
        #[arg(long = "owner-interval")]
        owner_intervals: Vec<Interval>,
    },
    /// Join an event with an availability schedule.
    Register {
        event: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LETSMEET_PASSWORD", hide_env_values = true)]
        password: String,
        /// Available interval as START/END. Repeatable.
        #[arg(long = "interval")]
        intervals: Vec<Interval>,
    },
    /// Sign in to an event.
    Login {
        event: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LETSMEET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Exchange a refresh token for a new token pair.
    Refresh {
        #[arg(long, env = "LETSMEET_REFRESH_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// `Cookie` header value carrying the refresh token.
        #[arg(long, env = "LETSMEET_REFRESH_COOKIE", hide_env_values = true, conflicts_with = "token")]
        cookie: Option<String>,
    },
    /// Revoke a user's refresh token.
    Logout {
        event: String,
        #[arg(short, long)]
        username: String,
    },
    /// Show an event with everyone's availability.
    Show { event: String },
    /// Replace your own availability.
    EditSchedule {
        event: String,
        #[arg(short, long)]
        username: String,
        #[arg(long, env = "LETSMEET_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        #[arg(long = "interval")]
        intervals: Vec<Interval>,
    },
    /// Replace the event's candidate intervals (admin only).
    EditIntervals {
        event: String,
        #[arg(short, long)]
        username: String,
        #[arg(long, env = "LETSMEET_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        #[arg(long = "interval")]
        intervals: Vec<Interval>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.db_path {
        config.server.database_path = Some(path);
    }
    config.server.log_json |= cli.log_json;
    config.validate()?;

    init_tracing(
        &default_filter(&config.server.log_level),
        config.server.log_json,
    )?;

    let db_path = config
        .database_path()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine database path. Use --db-path"))?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        path = %db_path.display(),
        "Opening event database"
    );
    let db = EventDatabase::open(&db_path).await?;

    let tokens = Arc::new(TokenService::from_config(&config.auth));
    let credentials = Arc::new(Argon2Credentials::from_config(&config.auth)?);
    let events = Arc::new(EventService::new(db, &config.identifiers));
    let auth = AuthService::new(Arc::clone(&events), tokens, credentials);

    run(cli.command, &auth, &events).await
}

async fn run(command: Command, auth: &AuthService, events: &EventService) -> anyhow::Result<()> {
    match command {
        Command::CreateEvent {
            title,
            description,
            intervals,
            username,
            password,
            owner_intervals,
        } => {
            let grant = auth
                .create_event(CreateEventRequest {
                    title,
                    description,
                    intervals,
                    username,
                    password,
                    owner_intervals: (!owner_intervals.is_empty()).then_some(owner_intervals),
                })
                .await?;
            print_grant(&grant)
        }
        Command::Register {
            event,
            username,
            password,
            intervals,
        } => {
            let grant = auth.register(&event, &username, &password, &intervals).await?;
            print_grant(&grant)
        }
        Command::Login {
            event,
            username,
            password,
        } => {
            let grant = auth
                .login(&event, &username, &password)
                .await
                .map_err(|e| rejected("Login", e))?;
            print_grant(&grant)
        }
        Command::Refresh { token, cookie } => {
            let token = refresh_token(token, cookie.as_deref())?;
            let grant = auth
                .refresh(&token)
                .await
                .map_err(|e| rejected("Refresh", e))?;
            print_grant(&grant)
        }
        Command::Logout { event, username } => {
            auth.logout(&event, &username).await;
            print_json(&json!({
                "loggedOut": true,
                "setCookie": RefreshCookie::cleared(&event).to_string(),
            }))
        }
        Command::Show { event } => print_json(&events.get_event(&event).await?),
        Command::EditSchedule {
            event,
            username,
            access_token,
            intervals,
        } => {
            let header = format!("Bearer {access_token}");
            auth.update_schedule(Some(&header), &event, &username, &intervals)
                .await
                .map_err(|e| rejected("Schedule update", e))?;
            print_json(&events.get_event(&event).await?)
        }
        Command::EditIntervals {
            event,
            username,
            access_token,
            intervals,
        } => {
            let header = format!("Bearer {access_token}");
            auth.update_event_intervals(Some(&header), &event, &username, &intervals)
                .await
                .map_err(|e| rejected("Interval update", e))?;
            print_json(&events.get_event(&event).await?)
        }
    }
}

/// Refresh token from `--token`, or from the `refresh_token` cookie.
fn refresh_token(token: Option<String>, cookie: Option<&str>) -> anyhow::Result<String> {
    if let Some(token) = token {
        return Ok(token);
    }
    cookie
        .and_then(refresh_token_from_header)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("No refresh token. Use --token or --cookie"))
}

/// Authentication rejections are reported with their public message only.
fn rejected(action: &str, err: Error) -> anyhow::Error {
    if err.is_auth_failure() {
        warn!(action, error = %err, "Request rejected");
        anyhow::anyhow!("{action} failed: {}", err.public_message())
    } else {
        anyhow::Error::new(err).context(format!("{action} failed"))
    }
}

fn print_grant(grant: &SessionGrant) -> anyhow::Result<()> {
    print_json(&json!({
        "response": grant.response,
        "refreshToken": grant.refresh_token,
        "setCookie": grant.refresh_cookie().to_string(),
    }))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut out = io::stdout();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn refresh_token_prefers_flag_then_cookie() {
        assert_eq!(
            refresh_token(Some("tok".into()), Some("refresh_token=other")).unwrap(),
            "tok"
        );
        assert_eq!(
            refresh_token(None, Some("theme=dark; refresh_token=abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
        assert!(refresh_token(None, Some("theme=dark")).is_err());
        assert!(refresh_token(None, None).is_err());
    }

    #[test]
    fn refresh_accepts_cookie_flag() {
        let cli = Cli::try_parse_from([
            "letsmeet",
            "refresh",
            "--cookie",
            "refresh_token=abc; other=1",
        ])
        .unwrap();
        let Command::Refresh { token, cookie } = cli.command else {
            panic!("expected refresh");
        };
        assert_eq!(refresh_token(token, cookie.as_deref()).unwrap(), "abc");

        assert!(
            Cli::try_parse_from(["letsmeet", "refresh", "--token", "a", "--cookie", "b"]).is_err()
        );
    }

    #[test]
    fn auth_rejections_hide_which_field_was_wrong() {
        let unknown = rejected("Login", Error::UserNotFound).to_string();
        let wrong = rejected("Login", Error::InvalidCredentials).to_string();
        assert_eq!(unknown, "Login failed: Invalid credentials");
        assert_eq!(unknown, wrong);

        let other = rejected("Login", Error::UsernameTaken);
        assert_eq!(other.to_string(), "Login failed");
        assert!(other.downcast_ref::<Error>().is_some());
    }
}
