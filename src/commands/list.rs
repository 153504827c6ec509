use super::{BACK_TO_MENU, Flow, Session, Stored, corrupted_label};
use crate::error::Result;
use crate::models::{AccountDraft, AccountRecord, Field, mask, validate_for_create};
use crate::store::SecretStore;
use crate::tui::Prompter;
use crate::utils::{GitConfig, export_path, export_record};
use colored::Colorize;

/// Where the list/view/edit flow currently is.
enum State {
    /// Choosing an account from the list.
    Browsing,
    /// Showing one account's details.
    Viewing(AccountRecord),
    /// Picking fields to change. `saved` is what the store holds; `working`
    /// collects edits until Save & Exit.
    Editing {
        saved: AccountRecord,
        working: AccountDraft,
    },
    /// Changing one field of the working copy.
    EditingField {
        saved: AccountRecord,
        working: AccountDraft,
        field: Field,
    },
}

enum Step {
    Go(State),
    Leave(Flow<()>),
}

const EDIT: &str = "Edit";
const EXPORT: &str = "Export JSON";
const BACK_TO_LIST: &str = "Back to Account List";
const SAVE_EXIT: &str = "Save & Exit";
const CANCEL: &str = "Cancel";

/// Browse, view, edit and export stored accounts until the user leaves.
pub fn run<S, G, P>(s: &mut Session<S, G, P>) -> Result<Flow<()>>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    if s.load_accounts()?.is_empty() {
        s.no_accounts();
        return Ok(Flow::Done(()));
    }

    let mut state = State::Browsing;
    loop {
        let step = match state {
            State::Browsing => browse(s)?,
            State::Viewing(record) => view(s, record)?,
            State::Editing { saved, working } => edit(s, saved, working)?,
            State::EditingField {
                saved,
                working,
                field,
            } => edit_field(s, saved, working, field)?,
        };
        match step {
            Step::Go(next) => state = next,
            Step::Leave(flow) => return Ok(flow),
        }
    }
}

/// One line per account, `user (email) | Commits: name (email)`.
pub fn print_plain<S, G, P>(s: &mut Session<S, G, P>) -> Result<()>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let accounts = s.load_accounts()?;
    if accounts.is_empty() {
        s.no_accounts();
        return Ok(());
    }
    s.ui.say(&format!("  {}", "Saved accounts:".bold()));
    for account in &accounts {
        let line = match account {
            Stored::Valid(record) => record.commit_summary(),
            Stored::Corrupted(id) => corrupted_label(id),
        };
        s.ui.say(&format!("  - {line}"));
    }
    Ok(())
}

/// Detail lines for one record. The token is only ever shown masked.
pub fn render_details(record: &AccountRecord) -> Vec<String> {
    vec![
        String::new(),
        format!("  {}", "Account details".bold()),
        format!("  {:<17} {}", "GitHub Username:".dimmed(), record.github_user),
        format!("  {:<17} {}", "GitHub Email:".dimmed(), record.github_email),
        format!("  {:<17} {}", "Commit Name:".dimmed(), record.commit_name),
        format!("  {:<17} {}", "Commit Email:".dimmed(), record.commit_email),
        format!("  {:<17} {}", "Token:".dimmed(), record.masked_token()),
        String::new(),
    ]
}

fn browse<S, G, P>(s: &mut Session<S, G, P>) -> Result<Step>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let accounts = s.load_accounts()?;
    if accounts.is_empty() {
        s.no_accounts();
        return Ok(Step::Leave(Flow::Done(())));
    }

    let mut items: Vec<String> = accounts.iter().map(Stored::label).collect();
    items.push(BACK_TO_MENU.dimmed().to_string());

    let Some(index) = s.ui.select("Select an account to view/edit", &items, 0) else {
        return Ok(Step::Leave(Flow::Cancel));
    };
    match accounts.into_iter().nth(index) {
        Some(Stored::Valid(record)) => Ok(Step::Go(State::Viewing(record))),
        Some(Stored::Corrupted(id)) => {
            s.say_err(&format!("Account '{id}' has corrupted data and cannot be shown."));
            Ok(Step::Go(State::Browsing))
        }
        None => Ok(Step::Leave(Flow::Back)),
    }
}

fn view<S, G, P>(s: &mut Session<S, G, P>, record: AccountRecord) -> Result<Step>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    for line in render_details(&record) {
        s.ui.say(&line);
    }

    let items = [EDIT, EXPORT, BACK_TO_LIST, BACK_TO_MENU].map(String::from);
    match s.ui.select("Select an action", &items, 0) {
        Some(0) => {
            let working = record.to_draft();
            Ok(Step::Go(State::Editing {
                saved: record,
                working,
            }))
        }
        Some(1) => {
            export(s, &record);
            Ok(Step::Go(State::Viewing(record)))
        }
        Some(3) => Ok(Step::Leave(Flow::Back)),
        _ => Ok(Step::Go(State::Browsing)),
    }
}

fn edit<S, G, P>(s: &mut Session<S, G, P>, saved: AccountRecord, working: AccountDraft) -> Result<Step>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let mut items: Vec<String> = Field::ALL
        .iter()
        .map(|&field| {
            let value = match field {
                Field::Token => mask(working.get(field)),
                _ => working.get(field).to_string(),
            };
            format!("{:<17} {}", format!("{}:", field.label()).dimmed(), value)
        })
        .collect();
    items.push(SAVE_EXIT.green().to_string());
    items.push(CANCEL.to_string());
    items.push(BACK_TO_MENU.dimmed().to_string());

    let fields = Field::ALL.len();
    match s.ui.select("Select a field to edit", &items, 0) {
        Some(i) if i < fields => Ok(Step::Go(State::EditingField {
            saved,
            working,
            field: Field::ALL[i],
        })),
        Some(i) if i == fields => save_edit(s, saved, working),
        Some(i) if i == fields + 2 => Ok(Step::Leave(Flow::Back)),
        _ => {
            s.say_dim("Edit canceled, returning to account view.");
            Ok(Step::Go(State::Viewing(saved)))
        }
    }
}

fn edit_field<S, G, P>(
    s: &mut Session<S, G, P>,
    saved: AccountRecord,
    mut working: AccountDraft,
    field: Field,
) -> Result<Step>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let value = match field {
        Field::Token => s
            .ui
            .password("New token (Enter to keep current)")
            .map(|t| if t.is_empty() { working.token.clone() } else { t }),
        _ => s
            .ui
            .input(&format!("Edit {}", field.label()), working.get(field)),
    };
    let Some(value) = value else {
        return Ok(Step::Go(State::Editing { saved, working }));
    };

    let items = ["Save", CANCEL, BACK_TO_MENU].map(String::from);
    match s.ui.select("Do you want to save or cancel?", &items, 0) {
        Some(0) => {
            working.set(field, value);
            s.say_ok(&format!("{} updated", field.label()));
        }
        Some(2) => return Ok(Step::Leave(Flow::Back)),
        _ => s.say_dim(&format!("Edit of {} canceled", field.label())),
    }
    Ok(Step::Go(State::Editing { saved, working }))
}

/// Persist the working copy. A renamed account is written under its new id
/// before the old entry is removed.
fn save_edit<S, G, P>(s: &mut Session<S, G, P>, saved: AccountRecord, working: AccountDraft) -> Result<Step>
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let record = match validate_for_create(&working) {
        Ok(record) => record,
        Err(missing) => {
            s.say_err(&format!("Cannot save: {missing}"));
            return Ok(Step::Go(State::Editing { saved, working }));
        }
    };

    let renamed = record.github_user != saved.github_user;
    if renamed && s.exists(&record.github_user)? {
        let prompt = format!(
            "Account '{}' already exists. Overwrite?",
            record.github_user.yellow()
        );
        if s.ui.confirm(&prompt, false) != Some(true) {
            s.say_dim("Save canceled.");
            return Ok(Step::Go(State::Editing { saved, working }));
        }
    }

    s.upsert(&record)?;
    if renamed {
        s.store.delete_secret(&saved.github_user)?;
    }
    s.say_ok(&format!("Account updated: {}", record.github_user));
    Ok(Step::Go(State::Viewing(record)))
}

/// Write `<githubUser>.json`, warning first because the token is included.
fn export<S, G, P>(s: &mut Session<S, G, P>, record: &AccountRecord)
where
    S: SecretStore,
    G: GitConfig,
    P: Prompter,
{
    let dir = s.settings.export_dir();
    let path = match export_path(&dir, record) {
        Ok(path) => path,
        Err(e) => {
            s.say_err(&format!("Export failed: {e}"));
            return;
        }
    };

    if s.settings.confirm_export {
        s.say_warn("The export contains your token in plaintext.");
        if path.exists() {
            s.say_warn(&format!("{} exists and will be overwritten.", path.display()));
        }
        let prompt = format!("Write {}?", path.display());
        if s.ui.confirm(&prompt, false) != Some(true) {
            s.say_dim("Export canceled.");
            return;
        }
    }

    match export_record(&dir, record) {
        Ok(path) => s.say_ok(&format!("Account exported to {}", path.display())),
        Err(e) => s.say_err(&format!("Export failed: {e}")),
    }
}
