use crate::error::{AppError, Result};
use crate::models::AccountRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn check_git_installed() -> Result<()> {
    match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(AppError::GitMissing),
    }
}

/// Global git configuration, the owner of the active identity.
pub trait GitConfig {
    fn set_global(&mut self, key: &str, value: &str) -> Result<()>;
    fn get_global(&self, key: &str) -> Option<String>;
}

/// Runs `git config --global`.
pub struct GlobalGitConfig;

impl GitConfig for GlobalGitConfig {
    fn set_global(&mut self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key, "git config --global");
        let output = Command::new("git")
            .args(["config", "--global", key, value])
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::Git(if stderr.is_empty() {
                format!("could not set {key}")
            } else {
                stderr
            }));
        }
        Ok(())
    }

    fn get_global(&self, key: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["config", "--global", "--get", key])
            .output()
            .ok()?;
        if output.status.success() {
            let val = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if val.is_empty() { None } else { Some(val) }
        } else {
            None
        }
    }
}

/// Make `name`/`email` the global commit identity. Name first, then email.
pub fn apply_identity(git: &mut dyn GitConfig, name: &str, email: &str) -> Result<()> {
    git.set_global("user.name", name)?;
    git.set_global("user.email", email)?;
    Ok(())
}

/// The current global `(user.name, user.email)`, when both are set.
pub fn active_identity(git: &dyn GitConfig) -> Option<(String, String)> {
    Some((git.get_global("user.name")?, git.get_global("user.email")?))
}

pub fn is_active(record: &AccountRecord, active: Option<&(String, String)>) -> bool {
    active.is_some_and(|(name, email)| *name == record.commit_name && *email == record.commit_email)
}

/// Path of the plaintext export for `record` inside `dir`.
pub fn export_path(dir: &Path, record: &AccountRecord) -> Result<PathBuf> {
    let name = &record.github_user;
    let plain = Path::new(name)
        .file_name()
        .is_some_and(|file| file == name.as_str());
    if !plain || name.contains(['/', '\\']) {
        return Err(AppError::InvalidName(name.clone()));
    }
    Ok(dir.join(format!("{name}.json")))
}

/// Write the full record, token included, as pretty JSON. Existing files are
/// replaced. On Unix the file is only readable by its owner.
pub fn export_record(dir: &Path, record: &AccountRecord) -> Result<PathBuf> {
    let path = export_path(dir, record)?;
    let data = serde_json::to_string_pretty(record)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&path)?;
    file.write_all(data.as_bytes())?;
    file.write_all(b"\n")?;

    #[cfg(unix)]
    {
        // mode() only applies on creation
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    tracing::debug!(account = %record.github_user, path = %path.display(), "exported account");
    Ok(path)
}
