use crate::error::{AppError, MissingFields, Result};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_SERVICE: &str = "git-accounts";

/// One stored GitHub identity. Serialized with the same camelCase keys that
/// the export file uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub github_user: String,
    pub github_email: String,
    #[serde(default)]
    pub commit_name: String,
    #[serde(default)]
    pub commit_email: String,
    pub token: String,
}

impl AccountRecord {
    /// `user (email)`
    pub fn summary(&self) -> String {
        format!("{} ({})", self.github_user, self.github_email)
    }

    /// `user (email) | Commits: name (email)`
    pub fn commit_summary(&self) -> String {
        format!(
            "{} | Commits: {} ({})",
            self.summary(),
            self.commit_name,
            self.commit_email
        )
    }

    pub fn masked_token(&self) -> String {
        mask(&self.token)
    }

    pub fn to_draft(&self) -> AccountDraft {
        AccountDraft {
            github_user: self.github_user.clone(),
            github_email: self.github_email.clone(),
            commit_name: self.commit_name.clone(),
            commit_email: self.commit_email.clone(),
            token: self.token.clone(),
        }
    }
}

/// `*` once per character of the secret.
pub fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Editable fields of a record, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    GithubUser,
    GithubEmail,
    CommitName,
    CommitEmail,
    Token,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::GithubUser,
        Field::GithubEmail,
        Field::CommitName,
        Field::CommitEmail,
        Field::Token,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::GithubUser => "githubUser",
            Field::GithubEmail => "githubEmail",
            Field::CommitName => "commitName",
            Field::CommitEmail => "commitEmail",
            Field::Token => "token",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::GithubUser => "GitHub Username",
            Field::GithubEmail => "GitHub Email",
            Field::CommitName => "Commit Name",
            Field::CommitEmail => "Commit Email",
            Field::Token => "Token",
        }
    }
}

/// A possibly incomplete set of record fields: prompt answers, CLI arguments
/// or the working copy of an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDraft {
    pub github_user: String,
    pub github_email: String,
    pub commit_name: String,
    pub commit_email: String,
    pub token: String,
}

impl AccountDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::GithubUser => &self.github_user,
            Field::GithubEmail => &self.github_email,
            Field::CommitName => &self.commit_name,
            Field::CommitEmail => &self.commit_email,
            Field::Token => &self.token,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        // Tokens are kept verbatim, everything else is trimmed.
        let value = match field {
            Field::Token => value,
            _ => value.trim().to_string(),
        };
        match field {
            Field::GithubUser => self.github_user = value,
            Field::GithubEmail => self.github_email = value,
            Field::CommitName => self.commit_name = value,
            Field::CommitEmail => self.commit_email = value,
            Field::Token => self.token = value,
        }
    }

    /// Whether every required field is filled in.
    pub fn is_complete(&self) -> bool {
        validate_for_create(self).is_ok()
    }
}

/// Check the required fields and resolve commit name/email defaults.
pub fn validate_for_create(draft: &AccountDraft) -> std::result::Result<AccountRecord, MissingFields> {
    let github_user = draft.github_user.trim();
    let github_email = draft.github_email.trim();

    let mut missing = Vec::new();
    if github_user.is_empty() {
        missing.push(Field::GithubUser.key());
    }
    if github_email.is_empty() {
        missing.push(Field::GithubEmail.key());
    }
    if draft.token.is_empty() {
        missing.push(Field::Token.key());
    }
    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    let commit_name = match draft.commit_name.trim() {
        "" => github_user,
        name => name,
    };
    let commit_email = match draft.commit_email.trim() {
        "" => github_email,
        email => email,
    };

    Ok(AccountRecord {
        github_user: github_user.to_string(),
        github_email: github_email.to_string(),
        commit_name: commit_name.to_string(),
        commit_email: commit_email.to_string(),
        token: draft.token.clone(),
    })
}

pub fn serialize(record: &AccountRecord) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

/// Decode a stored blob. Anything that would not pass `validate_for_create`
/// is reported as corrupted data for `account`.
pub fn deserialize(account: &str, blob: &str) -> Result<AccountRecord> {
    let parse_err = |source: serde_json::Error| AppError::Parse {
        account: account.to_string(),
        source,
    };
    let raw: AccountRecord = serde_json::from_str(blob).map_err(parse_err)?;
    validate_for_create(&raw.to_draft())
        .map_err(|missing| parse_err(serde_json::Error::custom(missing)))
}

// ─── Settings ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Keychain namespace prefix.
    pub service: String,
    /// Ask before writing a plaintext export.
    pub confirm_export: bool,
    /// Where exports go; the working directory when unset.
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            confirm_export: true,
            export_dir: None,
        }
    }
}

impl Settings {
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DEFAULT_SERVICE).join("settings.json"))
}

/// Load `settings.json` from the user config directory, falling back to
/// defaults when it is missing or unreadable.
pub fn load_settings() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match fs::read_to_string(&path) {
        Ok(data) => parse_settings(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read settings");
            Settings::default()
        }
    }
}

fn parse_settings(data: &str) -> Result<Settings> {
    Ok(serde_json::from_str(data)?)
}
