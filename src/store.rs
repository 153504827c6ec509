use crate::error::Result;
use keyring::Entry;

/// Keychain user name of the entry that lists every stored account id.
const INDEX_ACCOUNT: &str = "__index__";

/// One listed account: its id and the outcome of reading its blob.
pub type ListedSecret = (String, Result<String>);

/// Opaque secret blobs keyed by account id.
pub trait SecretStore {
    fn set_secret(&mut self, account: &str, blob: &str) -> Result<()>;
    fn get_secret(&self, account: &str) -> Result<Option<String>>;
    /// Deleting an id that is not stored is not an error.
    fn delete_secret(&mut self, account: &str) -> Result<()>;
    /// Every stored account ordered by id. A blob that cannot be read is
    /// reported for that id only.
    fn list_secrets(&self) -> Result<Vec<ListedSecret>>;
}

/// Helper to construct the namespaced keychain service for an account
pub fn make_key(prefix: &str, account: &str) -> String {
    format!("{}:{}", prefix, account)
}

/// Decode the index entry. A malformed index is treated as empty so the
/// next write replaces it.
fn parse_index(data: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(data) {
        Ok(mut ids) => {
            ids.sort();
            ids.dedup();
            ids
        }
        Err(e) => {
            tracing::warn!(error = %e, "account index is malformed, rebuilding it");
            Vec::new()
        }
    }
}

/// `ids` with `account` added, or `None` if it is already there.
fn index_with(ids: &[String], account: &str) -> Option<Vec<String>> {
    if ids.iter().any(|id| id == account) {
        return None;
    }
    let mut ids = ids.to_vec();
    ids.push(account.to_string());
    ids.sort();
    Some(ids)
}

/// `ids` without `account`, or `None` if it was not there.
fn index_without(ids: &[String], account: &str) -> Option<Vec<String>> {
    if !ids.iter().any(|id| id == account) {
        return None;
    }
    Some(ids.iter().filter(|id| *id != account).cloned().collect())
}

/// Accounts stored in the system keychain.
///
/// Each account lives in its own entry (`service = "<prefix>:<account>"`,
/// `user = <account>`). The keyring crate has no enumeration API, so the set
/// of known ids is kept as a JSON array in one more entry under the bare
/// prefix.
pub struct KeyringStore {
    prefix: String,
}

impl KeyringStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn entry(&self, account: &str) -> Result<Entry> {
        Ok(Entry::new(&make_key(&self.prefix, account), account)?)
    }

    fn index_entry(&self) -> Result<Entry> {
        Ok(Entry::new(&self.prefix, INDEX_ACCOUNT)?)
    }

    fn read_index(&self) -> Result<Vec<String>> {
        match self.index_entry()?.get_password() {
            Ok(data) => Ok(parse_index(&data)),
            Err(keyring::Error::NoEntry) => Ok(Vec::new()),
            Err(keyring::Error::BadEncoding(_)) => {
                tracing::warn!("account index is not valid UTF-8, rebuilding it");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_index(&self, ids: &[String]) -> Result<()> {
        let entry = self.index_entry()?;
        if ids.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        entry.set_password(&serde_json::to_string(ids)?)?;
        Ok(())
    }
}

impl SecretStore for KeyringStore {
    fn set_secret(&mut self, account: &str, blob: &str) -> Result<()> {
        tracing::debug!(account, "writing keychain entry");
        self.entry(account)?.set_password(blob)?;

        if let Some(ids) = index_with(&self.read_index()?, account) {
            self.write_index(&ids)?;
        }
        Ok(())
    }

    fn get_secret(&self, account: &str) -> Result<Option<String>> {
        match self.entry(account)?.get_password() {
            Ok(blob) => Ok(Some(blob)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_secret(&mut self, account: &str) -> Result<()> {
        tracing::debug!(account, "deleting keychain entry");
        match self.entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }

        if let Some(ids) = index_without(&self.read_index()?, account) {
            self.write_index(&ids)?;
        }
        Ok(())
    }

    fn list_secrets(&self) -> Result<Vec<ListedSecret>> {
        let mut secrets = Vec::new();
        for id in self.read_index()? {
            match self.get_secret(&id) {
                Ok(Some(blob)) => secrets.push((id, Ok(blob))),
                Ok(None) => tracing::warn!(account = %id, "indexed account has no keychain entry"),
                Err(e) => secrets.push((id, Err(e))),
            }
        }
        Ok(secrets)
    }
}
