use super::{Flow, Session};
use crate::error::Result;
use crate::models::{AccountDraft, AccountRecord, Field, validate_for_create};
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::GitConfig;

/// Prompt for every field, pre-filled from `prefill`, then validate and save.
pub fn run<S, G, P>(s: &mut Session<S, G, P>, prefill: AccountDraft) -> Result<Flow<AccountRecord>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    s.heading("Add GitHub Account");

    let Some(draft) = prompt_fields(&mut s.ui, &prefill) else {
        s.say_dim("Add canceled. Returning to main menu...");
        return Ok(Flow::Cancel);
    };
    save(s, &draft)
}

/// Validate and upsert without prompting. A draft with missing required
/// fields writes nothing and resolves to `Cancel`.
pub fn save<S, G, P>(s: &mut Session<S, G, P>, draft: &AccountDraft) -> Result<Flow<AccountRecord>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    match validate_for_create(draft) {
        Ok(record) => {
            s.upsert(&record)?;
            s.say_ok(&format!("Account saved: {}", record.summary()));
            Ok(Flow::Done(record))
        }
        Err(missing) => {
            s.say_err(&format!("Add canceled: {missing}"));
            Ok(Flow::Cancel)
        }
    }
}

fn prompt_fields(ui: &mut impl Prompter, prefill: &AccountDraft) -> Option<AccountDraft> {
    let prompts = [
        (Field::GithubUser, "GitHub username"),
        (Field::GithubEmail, "GitHub email"),
        (Field::CommitName, "Commit name (Enter to use GitHub username)"),
        (Field::CommitEmail, "Commit email (Enter to use GitHub email)"),
    ];

    let mut draft = AccountDraft::default();
    for (field, prompt) in prompts {
        let value = ui.input(prompt, prefill.get(field))?;
        draft.set(field, value);
    }

    let token = if prefill.token.is_empty() {
        ui.password("Personal Access Token (PAT)")?
    } else {
        ui.password("Personal Access Token (PAT, Enter to keep current)")?
    };
    draft.set(
        Field::Token,
        if token.is_empty() {
            prefill.token.clone()
        } else {
            token
        },
    );
    Some(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::session;
    use crate::models::deserialize;
    use crate::testing::Answer::{Esc, Text};
    use crate::testing::record;

    fn fields(user: &'static str, email: &'static str, token: &'static str) -> Vec<crate::testing::Answer> {
        vec![Text(user), Text(email), Text(""), Text(""), Text(token)]
    }

    #[test]
    fn add_fills_commit_defaults() {
        let mut s = session(&[], fields("alice", "a@x.com", "tok123"));
        let flow = run(&mut s, AccountDraft::default()).unwrap();

        let stored = deserialize("alice", s.store.blob("alice").unwrap()).unwrap();
        assert_eq!(flow, Flow::Done(stored.clone()));
        assert_eq!(stored, record("alice", "a@x.com", "tok123"));
        assert_eq!(stored.commit_name, "alice");
        assert_eq!(stored.commit_email, "a@x.com");
        assert!(s.store.contains_key("git-accounts:alice"));
        assert!(s.ui.printed("Account saved: alice (a@x.com)"));
    }

    #[test]
    fn adding_same_user_twice_keeps_latest() {
        let mut s = session(
            &[],
            [fields("alice", "a@x.com", "first"), fields("alice", "new@x.com", "second")].concat(),
        );
        run(&mut s, AccountDraft::default()).unwrap();
        run(&mut s, AccountDraft::default()).unwrap();

        assert_eq!(s.store.entries.len(), 1);
        let stored = deserialize("alice", s.store.blob("alice").unwrap()).unwrap();
        assert_eq!(stored.github_email, "new@x.com");
        assert_eq!(stored.token, "second");
    }

    #[test]
    fn empty_token_writes_nothing() {
        let original = record("alice", "a@x.com", "keep");
        let mut s = session(std::slice::from_ref(&original), fields("alice", "changed@x.com", ""));
        let before = s.store.entries.clone();

        let flow = run(&mut s, AccountDraft::default()).unwrap();

        assert_eq!(flow, Flow::Cancel);
        assert_eq!(s.store.entries, before);
        assert!(s.ui.printed("Add canceled: missing token"));
    }

    #[test]
    fn escape_cancels_without_writing() {
        let mut s = session(&[], vec![Text("alice"), Esc]);
        assert_eq!(run(&mut s, AccountDraft::default()).unwrap(), Flow::Cancel);
        assert!(s.store.entries.is_empty());
    }

    #[test]
    fn prefill_supplies_defaults_and_keeps_token() {
        let prefill = AccountDraft {
            github_user: "bob".into(),
            github_email: "b@x.com".into(),
            token: "ghp_keep".into(),
            ..AccountDraft::default()
        };
        let mut s = session(&[], vec![Text(""), Text(""), Text("Bobby"), Text(""), Text("")]);
        run(&mut s, prefill).unwrap();

        let stored = deserialize("bob", s.store.blob("bob").unwrap()).unwrap();
        assert_eq!(stored.commit_name, "Bobby");
        assert_eq!(stored.commit_email, "b@x.com");
        assert_eq!(stored.token, "ghp_keep");
    }

    #[test]
    fn save_without_prompts() {
        let draft = AccountDraft {
            github_user: "carol".into(),
            github_email: "c@x.com".into(),
            commit_name: "Carol C".into(),
            commit_email: "carol@work.io".into(),
            token: "t".into(),
        };
        let mut s = session(&[], vec![]);
        let flow = save(&mut s, &draft).unwrap();
        assert!(matches!(flow, Flow::Done(ref r) if r.commit_email == "carol@work.io"));
        assert!(s.ui.prompts.is_empty());
    }
}
