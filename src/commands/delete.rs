use super::{BACK_TO_MENU, Flow, Session, Stored};
use crate::error::{AppError, Result};
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::GitConfig;
use colored::Colorize;

/// Pick a stored account and remove it after confirmation.
pub fn run<S, G, P>(s: &mut Session<S, G, P>) -> Result<Flow<String>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let accounts = s.load_accounts()?;
    if accounts.is_empty() {
        s.no_accounts();
        return Ok(Flow::Cancel);
    }

    let mut items: Vec<String> = accounts.iter().map(Stored::label).collect();
    items.push(BACK_TO_MENU.dimmed().to_string());

    let selected = s
        .ui
        .select("Select an account to delete", &items, 0)
        .and_then(|index| accounts.get(index));
    match selected {
        Some(account) => confirm_and_delete(s, account.id().to_string()),
        None => {
            s.say_dim("Returning to Main Menu...");
            Ok(Flow::Cancel)
        }
    }
}

/// Delete a stored account by its GitHub username. `yes` skips the
/// confirmation prompt.
pub fn run_named<S, G, P>(s: &mut Session<S, G, P>, github_user: &str, yes: bool) -> Result<Flow<String>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    if !s.exists(github_user)? {
        return Err(AppError::NotFound(github_user.to_string()));
    }
    if yes {
        remove(s, github_user.to_string())
    } else {
        confirm_and_delete(s, github_user.to_string())
    }
}

fn confirm_and_delete<S, G, P>(s: &mut Session<S, G, P>, id: String) -> Result<Flow<String>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let prompt = format!("Are you sure you want to delete {}?", id.yellow());
    if s.ui.confirm(&prompt, false) == Some(true) {
        remove(s, id)
    } else {
        s.say_dim("Delete canceled, returning to main menu...");
        Ok(Flow::Cancel)
    }
}

fn remove<S, G, P>(s: &mut Session<S, G, P>, id: String) -> Result<Flow<String>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    s.store.delete_secret(&id)?;
    s.say_ok(&format!("Account deleted: {id}"));
    Ok(Flow::Done(id))
}
