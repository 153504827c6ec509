//! Test doubles for the store, git and prompt seams.

use crate::error::{AppError, Result};
use crate::models::{AccountDraft, AccountRecord, DEFAULT_SERVICE, serialize, validate_for_create};
use crate::store::{ListedSecret, SecretStore, make_key};
use crate::tui::Prompter;
use crate::utils::GitConfig;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

pub fn record(user: &str, email: &str, token: &str) -> AccountRecord {
    validate_for_create(&AccountDraft {
        github_user: user.into(),
        github_email: email.into(),
        token: token.into(),
        ..AccountDraft::default()
    })
    .unwrap()
}

fn locked() -> AppError {
    AppError::Store(keyring::Error::PlatformFailure(Box::new(
        std::io::Error::other("keychain locked"),
    )))
}

/// In-memory store keyed by the same namespaced keys the keychain uses.
pub struct MemoryStore {
    prefix: String,
    pub entries: BTreeMap<String, String>,
    pub fail: bool,
    /// Account ids whose blob fails to read while listing.
    pub unreadable: BTreeSet<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_SERVICE.to_string(),
            entries: BTreeMap::new(),
            fail: false,
            unreadable: BTreeSet::new(),
        }
    }
}

impl MemoryStore {
    pub fn with(records: &[AccountRecord]) -> Self {
        let mut store = Self::default();
        for r in records {
            store.put_raw(&r.github_user, &serialize(r).unwrap());
        }
        store
    }

    pub fn put_raw(&mut self, account: &str, blob: &str) {
        self.entries
            .insert(make_key(&self.prefix, account), blob.to_string());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn blob(&self, account: &str) -> Option<&String> {
        self.entries.get(&make_key(&self.prefix, account))
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(locked());
        }
        Ok(())
    }
}

impl SecretStore for MemoryStore {
    fn set_secret(&mut self, account: &str, blob: &str) -> Result<()> {
        self.check()?;
        self.put_raw(account, blob);
        Ok(())
    }

    fn get_secret(&self, account: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.blob(account).cloned())
    }

    fn delete_secret(&mut self, account: &str) -> Result<()> {
        self.check()?;
        self.entries.remove(&make_key(&self.prefix, account));
        Ok(())
    }

    fn list_secrets(&self) -> Result<Vec<ListedSecret>> {
        self.check()?;
        let namespace = format!("{}:", self.prefix);
        Ok(self
            .entries
            .iter()
            .filter_map(|(key, blob)| {
                let id = key.strip_prefix(&namespace)?;
                let blob = if self.unreadable.contains(id) {
                    Err(locked())
                } else {
                    Ok(blob.clone())
                };
                Some((id.to_string(), blob))
            })
            .collect())
    }
}

/// Records every `set_global` call in order.
#[derive(Default)]
pub struct RecordingGit {
    pub calls: Vec<(String, String)>,
    values: HashMap<String, String>,
    fail: bool,
}

impl RecordingGit {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_identity(name: &str, email: &str) -> Self {
        let mut git = Self::default();
        git.values.insert("user.name".into(), name.into());
        git.values.insert("user.email".into(), email.into());
        git
    }
}

impl GitConfig for RecordingGit {
    fn set_global(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::Git(format!("could not lock config file for {key}")));
        }
        self.calls.push((key.to_string(), value.to_string()));
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_global(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug, Clone)]
pub enum Answer {
    /// Select the first item containing this text.
    Pick(&'static str),
    /// Type this into a text or password prompt.
    Text(&'static str),
    Yes,
    No,
    /// Esc at any prompt.
    Esc,
}

/// Answers prompts from a queue and captures everything printed.
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub prompts: Vec<String>,
    pub output: Vec<String>,
    /// Items offered by the most recent select.
    pub last_items: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        colored::control::set_override(false);
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
            output: Vec::new(),
            last_items: Vec::new(),
        }
    }

    pub fn finished(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn printed(&self, text: &str) -> bool {
        self.output.iter().any(|line| line.contains(text))
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {prompt}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, prompt: &str, items: &[String], _default: usize) -> Option<usize> {
        self.last_items = items.to_vec();
        match self.next(prompt) {
            Answer::Pick(text) => Some(
                items
                    .iter()
                    .position(|item| item.contains(text))
                    .unwrap_or_else(|| panic!("no item containing {text:?} in {items:?}")),
            ),
            Answer::Esc => None,
            other => panic!("select {prompt:?} got {other:?}"),
        }
    }

    fn input(&mut self, prompt: &str, default: &str) -> Option<String> {
        match self.next(prompt) {
            Answer::Text("") => Some(default.to_string()),
            Answer::Text(text) => Some(text.to_string()),
            Answer::Esc => None,
            other => panic!("input {prompt:?} got {other:?}"),
        }
    }

    fn password(&mut self, prompt: &str) -> Option<String> {
        match self.next(prompt) {
            Answer::Text(text) => Some(text.to_string()),
            Answer::Esc => None,
            other => panic!("password {prompt:?} got {other:?}"),
        }
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Option<bool> {
        match self.next(prompt) {
            Answer::Yes => Some(true),
            Answer::No => Some(false),
            Answer::Esc => None,
            other => panic!("confirm {prompt:?} got {other:?}"),
        }
    }

    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}
