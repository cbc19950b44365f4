//! DocGenie - terminal client for the DocGenie chat service
//!
//! Log in, hold conversations with the document assistant and look up users,
//! either through one-shot commands or the interactive TUI.

mod api;
mod config;
mod models;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::DocGenieClient;
use config::Config;
use tui::log_capture::LogBuffer;

#[derive(Parser)]
#[command(name = "docgenie")]
#[command(about = "Terminal client for the DocGenie chat service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend origin (overrides DOCGENIE_SERVER and the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the user id
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Forget the remembered user
    Logout,

    /// Show the configured server and remembered user
    Status,

    /// List a user's conversations
    Conversations {
        /// User id (defaults to the logged-in user)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Show a user's most recent conversation
    Latest {
        /// User id (defaults to the logged-in user)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Print the messages of a conversation
    Read {
        /// Conversation id (from `conversations` output)
        conversation_id: i64,
    },

    /// Send a message and print the reply
    Send {
        /// Conversation id (from `conversations` output)
        #[arg(short, long)]
        to: i64,

        /// Message content
        message: String,
    },

    /// Create a conversation
    Create {
        /// Conversation title
        title: String,

        /// Owner user id (defaults to the logged-in user)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Rename a conversation
    Rename {
        /// Conversation id
        conversation_id: i64,

        /// New title
        title: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        conversation_id: i64,
    },

    /// Show a user's profile and permissions
    User {
        /// User id
        user_id: i64,
    },

    /// Launch the terminal user interface
    Tui {
        /// Open the chat view for this user instead of the login form
        #[arg(short, long)]
        user: Option<i64>,
    },
}

/// Pick the user for a command: explicit id, else the remembered login.
fn resolve_user(explicit: Option<i64>, config: &Config) -> Result<i64> {
    explicit
        .or(config.last_user_id)
        .context("No user given and nobody is logged in; run `docgenie login` or pass --user")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The TUI owns the terminal, so its logs go to the
    // debug pane instead of stderr.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let log_buffer = LogBuffer::new();
    if matches!(cli.command, Commands::Tui { .. }) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(log_buffer.clone()),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    let mut config = Config::load()?;
    let server_url = config.server_url(cli.server.as_deref());
    tracing::debug!("Using server {}", server_url);

    if let Commands::Tui { user } = cli.command {
        let start_user = user.or(config.last_user_id);
        return tui::run(config, server_url, start_user, log_buffer).await;
    }

    let client = DocGenieClient::new(&server_url)?;

    match cli.command {
        Commands::Login { email, password } => {
            tracing::info!("Logging in...");
            api::login(&client, &mut config, &email, &password).await?;
        }
        Commands::Logout => {
            config.forget_user()?;
            println!("Logged out.");
        }
        Commands::Status => {
            println!("Server: {}", server_url);
            match config.last_user_id {
                Some(id) => println!("User:   {}", id),
                None => println!("User:   (not logged in)"),
            }
        }
        Commands::Conversations { user } => {
            let user_id = resolve_user(user, &config)?;
            api::list_conversations(&client, user_id).await?;
        }
        Commands::Latest { user } => {
            let user_id = resolve_user(user, &config)?;
            api::show_latest(&client, user_id).await?;
        }
        Commands::Read { conversation_id } => {
            api::read_messages(&client, conversation_id).await?;
        }
        Commands::Send { to, message } => {
            tracing::info!("Sending message...");
            api::send_message(&client, to, &message).await?;
        }
        Commands::Create { title, user } => {
            let user_id = resolve_user(user, &config)?;
            api::create_conversation(&client, user_id, &title).await?;
        }
        Commands::Rename {
            conversation_id,
            title,
        } => {
            api::rename_conversation(&client, conversation_id, &title).await?;
        }
        Commands::Delete { conversation_id } => {
            api::delete_conversation(&client, conversation_id).await?;
        }
        Commands::User { user_id } => {
            api::show_user(&client, user_id).await?;
        }
        Commands::Tui { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::parse_from(["docgenie", "--server", "http://h:1", "send", "--to", "3", "hi"]);
        assert_eq!(cli.server.as_deref(), Some("http://h:1"));
        match cli.command {
            Commands::Send { to, message } => {
                assert_eq!(to, 3);
                assert_eq!(message, "hi");
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_resolve_user() {
        let mut config = Config::default();
        assert!(resolve_user(None, &config).is_err());
        config.last_user_id = Some(7);
        assert_eq!(resolve_user(None, &config).unwrap(), 7);
        assert_eq!(resolve_user(Some(9), &config).unwrap(), 9);
    }
}
