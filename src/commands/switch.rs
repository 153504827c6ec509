use super::{BACK_TO_MENU, Flow, Session, Stored, corrupted_label};
use crate::error::Result;
use crate::models::AccountRecord;
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::{GitConfig, active_identity, apply_identity, is_active};
use colored::Colorize;

/// Pick a stored account and make its commit identity the global git identity.
pub fn run<S, G, P>(s: &mut Session<S, G, P>) -> Result<Flow<AccountRecord>>
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

    let active = active_identity(&s.git);
    let mut items: Vec<String> = accounts
        .iter()
        .map(|account| match account {
            Stored::Valid(record) if is_active(record, active.as_ref()) => {
                format!("{} {}", record.commit_summary(), "(active)".green())
            }
            Stored::Valid(record) => record.commit_summary(),
            Stored::Corrupted(id) => corrupted_label(id),
        })
        .collect();
    items.push(BACK_TO_MENU.dimmed().to_string());

    let Some(index) = s.ui.select("Select an account to use", &items, 0) else {
        return Ok(Flow::Cancel);
    };
    match accounts.into_iter().nth(index) {
        Some(Stored::Valid(record)) => apply(s, record),
        Some(Stored::Corrupted(id)) => {
            s.say_err(&format!("Account '{id}' has corrupted data and cannot be used."));
            Ok(Flow::Cancel)
        }
        None => {
            s.say_dim("Returning to Main Menu.");
            Ok(Flow::Cancel)
        }
    }
}

/// Switch to a stored account by its GitHub username.
pub fn run_named<S, G, P>(s: &mut Session<S, G, P>, github_user: &str) -> Result<Flow<AccountRecord>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let record = s.find(github_user)?;
    apply(s, record)
}

fn apply<S, G, P>(s: &mut Session<S, G, P>, record: AccountRecord) -> Result<Flow<AccountRecord>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    apply_identity(&mut s.git, &record.commit_name, &record.commit_email)?;
    tracing::debug!(account = %record.github_user, "global git identity switched");

    s.say_ok(&format!(
        "Using GitHub account: {}",
        record.summary().cyan()
    ));
    s.say_ok(&format!(
        "Commit config: {} ({})",
        record.commit_name, record.commit_email
    ));
    Ok(Flow::Done(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::session;
    use crate::error::AppError;
    use crate::models::{AccountDraft, validate_for_create};
    use crate::testing::Answer::{Esc, Pick};
    use crate::testing::{RecordingGit, record};

    fn alice_with_work_identity() -> AccountRecord {
        validate_for_create(&AccountDraft {
            github_user: "alice".into(),
            github_email: "a@x.com".into(),
            commit_name: "Alice Work".into(),
            commit_email: "alice@work.io".into(),
            token: "t".into(),
        })
        .unwrap()
    }

    #[test]
    fn applies_commit_pair_once_name_then_email() {
        let mut s = session(
            &[record("alice", "a@x.com", "tok123"), record("bob", "b@x.com", "t")],
            vec![Pick("alice (a@x.com) | Commits: alice (a@x.com)")],
        );
        let flow = run(&mut s).unwrap();

        assert!(matches!(flow, Flow::Done(ref r) if r.github_user == "alice"));
        assert_eq!(
            s.git.calls,
            vec![
                ("user.name".to_string(), "alice".to_string()),
                ("user.email".to_string(), "a@x.com".to_string()),
            ]
        );
    }

    #[test]
    fn uses_commit_identity_not_github_identity() {
        let mut s = session(&[alice_with_work_identity()], vec![Pick("alice")]);
        run(&mut s).unwrap();
        assert_eq!(s.git.calls[0].1, "Alice Work");
        assert_eq!(s.git.calls[1].1, "alice@work.io");
        assert!(s.ui.printed("Commit config: Alice Work (alice@work.io)"));
    }

    #[test]
    fn back_and_escape_have_no_side_effects() {
        let mut s = session(&[record("alice", "a@x.com", "t")], vec![Pick(BACK_TO_MENU)]);
        assert_eq!(run(&mut s).unwrap(), Flow::Cancel);
        assert!(s.git.calls.is_empty());

        let mut s = session(&[record("alice", "a@x.com", "t")], vec![Esc]);
        assert_eq!(run(&mut s).unwrap(), Flow::Cancel);
        assert!(s.git.calls.is_empty());
    }

    #[test]
    fn empty_store_does_not_prompt() {
        let mut s = session(&[], vec![]);
        assert_eq!(run(&mut s).unwrap(), Flow::Cancel);
        assert!(s.ui.prompts.is_empty());
        assert!(s.ui.printed("No saved accounts."));
    }

    #[test]
    fn git_failure_propagates() {
        let mut s = session(&[record("alice", "a@x.com", "t")], vec![Pick("alice")]);
        s.git = RecordingGit::failing();
        assert!(matches!(run(&mut s), Err(AppError::Git(_))));
    }

    #[test]
    fn current_identity_is_marked_active() {
        let mut s = session(
            &[record("alice", "a@x.com", "t"), record("bob", "b@x.com", "t")],
            vec![Esc],
        );
        s.git = RecordingGit::with_identity("bob", "b@x.com");
        run(&mut s).unwrap();

        assert!(s.ui.last_items[1].ends_with("(active)"));
        assert!(!s.ui.last_items[0].contains("(active)"));
    }

    #[test]
    fn corrupted_entry_cannot_be_used() {
        let mut s = session(&[], vec![Pick("broken")]);
        s.store.put_raw("broken", "[]");
        assert_eq!(run(&mut s).unwrap(), Flow::Cancel);
        assert!(s.git.calls.is_empty());
    }

    #[test]
    fn named_switch() {
        let mut s = session(&[record("alice", "a@x.com", "t")], vec![]);
        assert!(matches!(run_named(&mut s, "alice").unwrap(), Flow::Done(_)));
        assert_eq!(s.git.calls.len(), 2);
        assert!(matches!(run_named(&mut s, "nobody"), Err(AppError::NotFound(_))));
    }
}
