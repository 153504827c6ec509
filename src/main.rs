mod commands;
mod error;
mod models;
mod store;
#[cfg(test)]
mod testing;
mod tui;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{Session, add, delete, list, menu, switch};
use models::{AccountDraft, load_settings};
use std::process::ExitCode;
use store::KeyringStore;
use tracing_subscriber::EnvFilter;
use tui::Terminal;
use utils::{GlobalGitConfig, check_git_installed};

#[derive(Parser)]
#[command(
    name = "git-accounts",
    about = "Git Accounts Manager — keep GitHub identities in the system keychain and switch between them",
    version
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Keychain namespace prefix (defaults to the `service` setting)
    #[arg(long, global = true, value_name = "PREFIX")]
    service: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a GitHub account; missing fields are prompted for
    Add {
        github_user: Option<String>,
        github_email: Option<String>,
        /// Name used for commits (defaults to the GitHub username)
        commit_name: Option<String>,
        /// Email used for commits (defaults to the GitHub email)
        commit_email: Option<String>,
        /// Personal access token
        token: Option<String>,
    },
    /// Browse, edit and export saved accounts
    List {
        /// Print the accounts without any prompts
        #[arg(long)]
        plain: bool,
    },
    /// Set the global git identity from a saved account
    Use {
        /// Account to use (interactive selection when omitted)
        github_user: Option<String>,
    },
    /// Delete a saved account
    Delete {
        /// Account to delete (interactive selection when omitted)
        github_user: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("GIT_ACCOUNTS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    let mut settings = load_settings();
    if let Some(service) = cli.service {
        settings.service = service;
    }

    let needs_git = matches!(cli.command, None | Some(Commands::Use { .. }));
    if needs_git {
        check_git_installed()?;
    }

    let store = KeyringStore::new(settings.service.clone());
    let mut session = Session::new(store, GlobalGitConfig, Terminal::new(), settings);

    match cli.command {
        None => menu::run(&mut session),
        Some(Commands::Add {
            github_user,
            github_email,
            commit_name,
            commit_email,
            token,
        }) => {
            let draft = AccountDraft {
                github_user: github_user.unwrap_or_default(),
                github_email: github_email.unwrap_or_default(),
                commit_name: commit_name.unwrap_or_default(),
                commit_email: commit_email.unwrap_or_default(),
                token: token.unwrap_or_default(),
            };
            if draft.is_complete() {
                add::save(&mut session, &draft)?;
            } else {
                add::run(&mut session, draft)?;
            }
        }
        Some(Commands::List { plain: true }) => list::print_plain(&mut session)?,
        Some(Commands::List { plain: false }) => {
            list::run(&mut session)?;
        }
        Some(Commands::Use { github_user }) => {
            match github_user {
                Some(user) => switch::run_named(&mut session, &user)?,
                None => switch::run(&mut session)?,
            };
        }
        Some(Commands::Delete { github_user, yes }) => {
            match github_user {
                Some(user) => delete::run_named(&mut session, &user, yes)?,
                None => delete::run(&mut session)?,
            };
        }
    }
    Ok(())
}
