use super::{Session, add, delete, list, switch};
use crate::error::Result;
use crate::models::AccountDraft;
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::GitConfig;
use colored::Colorize;

const ACTIONS: [&str; 6] = [
    "Add Account",
    "List Accounts",
    "Use Account",
    "Delete Account",
    "Tutorial",
    "Exit",
];

const TUTORIAL: &[&str] = &[
    "This tool keeps several GitHub accounts in your system keychain.",
    "",
    "  Add Account     Save a new GitHub account (username, email, token)",
    "  List Accounts   View, edit or export saved accounts",
    "  Use Account     Set the global git user.name / user.email",
    "  Delete Account  Remove a saved account",
    "",
    "Every menu has \"Back to Main Menu\"; Esc cancels the current step.",
];

/// Top-level interactive loop. Failures inside a flow are reported and the
/// menu is shown again.
pub fn run<S, G, P>(s: &mut Session<S, G, P>)
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    s.ui.say("");
    s.ui.say(&format!(
        "  {} {}",
        "Git Accounts Manager".bold(),
        format!("v{}", VERSION).dimmed()
    ));
    s.ui.say(&format!(
        "  {}",
        "↑↓ select · Enter confirm · Esc back".dimmed()
    ));

    let items = ACTIONS.map(String::from);
    loop {
        s.ui.say("");
        let result = match s.ui.select("Select an action", &items, 0) {
            Some(0) => add::run(s, AccountDraft::default()).map(drop),
            Some(1) => list::run(s).map(drop),
            Some(2) => switch::run(s).map(drop),
            Some(3) => delete::run(s).map(drop),
            Some(4) => {
                tutorial(s);
                Ok(())
            }
            _ => break,
        };
        report(s, result);
    }
}

fn report<S, G, P>(s: &mut Session<S, G, P>, result: Result<()>)
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    if let Err(e) = result {
        tracing::debug!(error = ?e, "flow failed");
        s.say_err(&e.to_string());
    }
}

fn tutorial<S, G, P>(s: &mut Session<S, G, P>)
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    s.heading("Git Accounts Manager Tutorial");
    for line in TUTORIAL {
        s.ui.say(&format!("  {line}"));
    }
    s.ui.say("");
    s.ui.confirm("Press Enter to continue to the Main Menu", true);
}
