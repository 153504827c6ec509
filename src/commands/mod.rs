pub mod add;
pub mod delete;
pub mod list;
pub mod menu;
pub mod switch;

use crate::error::{AppError, Result};
use crate::models::{AccountRecord, Settings, deserialize, serialize};
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::GitConfig;
use colored::Colorize;

pub const BACK_TO_MENU: &str = "Back to Main Menu";

/// Outcome of one interactive flow or one step inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Done(T),
    /// Abort this step and return to the caller. Nothing is persisted.
    Cancel,
    /// Abort the whole flow and return to the top-level menu.
    Back,
}

/// An entry read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    Valid(AccountRecord),
    /// The blob for this account id could not be decoded.
    Corrupted(String),
}

impl Stored {
    pub fn id(&self) -> &str {
        match self {
            Stored::Valid(record) => &record.github_user,
            Stored::Corrupted(id) => id,
        }
    }

    /// `user (email)` or the corrupted placeholder.
    pub fn label(&self) -> String {
        match self {
            Stored::Valid(record) => record.summary(),
            Stored::Corrupted(id) => corrupted_label(id),
        }
    }
}

pub fn corrupted_label(id: &str) -> String {
    format!("{} {}", id, "(corrupted data)".red())
}

/// Everything a flow talks to: the keychain, git and the terminal.
pub struct Session<S, G, P> {
    pub store: S,
    pub git: G,
    pub ui: P,
    pub settings: Settings,
}

impl<S: SecretStore, G: GitConfig, P: Prompter> Session<S, G, P> {
    pub fn new(store: S, git: G, ui: P, settings: Settings) -> Self {
        Self {
            store,
            git,
            ui,
            settings,
        }
    }

    /// Every stored account. Blobs that cannot be read or decoded become
    /// `Stored::Corrupted` instead of failing the whole listing.
    pub fn load_accounts(&self) -> Result<Vec<Stored>> {
        let secrets = self.store.list_secrets()?;
        Ok(secrets
            .into_iter()
            .map(|(id, blob)| match blob.and_then(|blob| deserialize(&id, &blob)) {
                Ok(record) => Stored::Valid(record),
                Err(e) => {
                    tracing::warn!(account = %id, error = %e, "corrupted account data");
                    Stored::Corrupted(id)
                }
            })
            .collect())
    }

    pub fn find(&self, github_user: &str) -> Result<AccountRecord> {
        match self.store.get_secret(github_user)? {
            Some(blob) => deserialize(github_user, &blob),
            None => Err(AppError::NotFound(github_user.to_string())),
        }
    }

    pub fn exists(&self, github_user: &str) -> Result<bool> {
        Ok(self.store.get_secret(github_user)?.is_some())
    }

    /// Insert or overwrite the record keyed by its `github_user`.
    pub fn upsert(&mut self, record: &AccountRecord) -> Result<()> {
        let blob = serialize(record)?;
        self.store.set_secret(&record.github_user, &blob)?;
        tracing::debug!(account = %record.github_user, "account saved");
        Ok(())
    }

    pub fn no_accounts(&mut self) {
        self.say_warn("No saved accounts.");
    }

    pub fn say_ok(&mut self, msg: &str) {
        self.ui.say(&format!("  {} {}", "✓".green().bold(), msg));
    }

    pub fn say_warn(&mut self, msg: &str) {
        self.ui.say(&format!("  {} {}", "⚠".yellow(), msg));
    }

    pub fn say_err(&mut self, msg: &str) {
        self.ui.say(&format!("  {} {}", "✗".red().bold(), msg));
    }

    pub fn say_dim(&mut self, msg: &str) {
        self.ui.say(&format!("  {}", msg.dimmed()));
    }

    pub fn heading(&mut self, title: &str) {
        self.ui.say("");
        self.ui.say(&format!("  {}", title.bold()));
        self.ui.say(&format!("  {}", "─".repeat(48).dimmed()));
    }
}
