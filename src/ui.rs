// UI layer: a line-based prompt using `dialoguer`. Each line is parsed into
// a `Command` and dispatched against the application context. Errors are
// printed and the prompt continues; only `exit` ends the loop.

use anyhow::Result;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use thiserror::Error;

use crate::context::App;
use crate::store::CredentialStore;
use crate::transport::Transport;

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    AccountCreate { username: String },
    AccountLogin { username: String, token: String },
    AccountToken,
    AccountInfo,
    Help,
    Exit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("There are not enough arguments")]
    NotEnoughArguments,
    #[error("Unknown command \"{0}\", type \"help\" to list the commands")]
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((first, rest)) = args.split_first() else {
            return Ok(Command::Empty);
        };

        match *first {
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            "account" => parse_account(rest),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_account(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [] => Err(ParseError::NotEnoughArguments),
        ["create", username, ..] => Ok(Command::AccountCreate {
            username: username.to_string(),
        }),
        ["create"] => Err(ParseError::NotEnoughArguments),
        ["login", username, token, ..] => Ok(Command::AccountLogin {
            username: username.to_string(),
            token: token.to_string(),
        }),
        ["login", ..] => Err(ParseError::NotEnoughArguments),
        ["token", ..] => Ok(Command::AccountToken),
        ["info", ..] => Ok(Command::AccountInfo),
        [other, ..] => Err(ParseError::Unknown(format!("account {}", other))),
    }
}

/// Whether the prompt loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

const HELP: &str = "\
Commands:
  status                          show the game API status
  account create <username>       create an account and save its token
  account login <username> <token> log in with an existing account
  account token                   show the saved username and token
  account info                    show credits, ships and loans
  help                            show this message
  exit                            leave";

/// Main interactive loop. Reads a line, runs it, repeats until `exit`.
pub fn prompt_loop<T: Transport, S: CredentialStore>(app: &mut App<T, S>) -> Result<()> {
    let mut stdout = std::io::stdout();
    check_account(app, &mut stdout)?;

    let mut confirm = |message: &str| -> Result<bool> {
        Ok(Confirm::new().with_prompt(message).default(false).interact()?)
    };

    loop {
        let line: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()?;

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                continue;
            }
        };

        if handle_command(app, command, &mut stdout, &mut confirm)? == Flow::Exit {
            return Ok(());
        }
    }
}

/// Greet the user according to the stored credential.
pub fn check_account<T, S: CredentialStore>(app: &App<T, S>, out: &mut dyn Write) -> Result<()> {
    let user = app.store.fetch();
    if user.is_complete() {
        writeln!(out, "You've logged in as {}", user.username)?;
    } else {
        writeln!(
            out,
            "You haven't set an username and/or token, you can create an account by typing \"account create <username>\""
        )?;
        writeln!(
            out,
            "If you have an account, you can log in with \"account login <username> <token>\""
        )?;
    }
    Ok(())
}

/// Run one command. `confirm` asks the user a yes/no question.
pub fn handle_command<T: Transport, S: CredentialStore>(
    app: &mut App<T, S>,
    command: Command,
    out: &mut dyn Write,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<Flow> {
    match command {
        Command::Status => handle_status(app, out)?,
        Command::AccountCreate { username } => handle_create(app, &username, out, confirm)?,
        Command::AccountLogin { username, token } => {
            handle_login(app, &username, &token, out, confirm)?
        }
        Command::AccountToken => handle_token(app, out)?,
        Command::AccountInfo => handle_info(app, out)?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Exit => return Ok(Flow::Exit),
        Command::Empty => {}
    }
    Ok(Flow::Continue)
}

fn handle_status<T: Transport, S>(app: &App<T, S>, out: &mut dyn Write) -> Result<()> {
    match with_spinner("Fetching status...", || app.client.fetch_status()) {
        Ok(status) => writeln!(out, "{}", status.status)?,
        Err(e) => writeln!(out, "Failed to fetch status: {}", e)?,
    }
    Ok(())
}

/// Create an account, save it locally and switch the client to it.
/// A stored identity is only replaced after confirmation.
fn handle_create<T: Transport, S: CredentialStore>(
    app: &mut App<T, S>,
    username: &str,
    out: &mut dyn Write,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<()> {
    // Creating a new account replaces the saved one, so ask first.
    let stored = app.store.fetch();
    if stored.is_complete() {
        writeln!(
            out,
            "You are already logged in as {}, are you sure you want to create another account?",
            stored.username
        )?;
        writeln!(
            out,
            "The token will be lost, cancel this command and use \"account token\" to retrieve your token."
        )?;
        if !confirm("Confirm")? {
            return Ok(());
        }
    }

    // API errors (e.g. a taken username) stop here, before the store is touched.
    let token = match with_spinner("Creating account...", || app.client.create_account(username)) {
        Ok(token) => token,
        Err(e) => {
            writeln!(out, "Could not create that account: {}", e)?;
            return Ok(());
        }
    };

    // The account exists remotely now. If saving fails, print the token so
    // the user can still log in with it later.
    if let Err(e) = app.store.upsert(username, &token) {
        writeln!(out, "The account has been created but failed to save: {}.", e)?;
        writeln!(out, "Save this token to try again with \"account login\".")?;
        writeln!(out, "Token: {}", token)?;
        return Ok(());
    }

    // Switch the client over so the new account can be used right away.
    app.client.set_auth(username, &token);
    writeln!(out, "Created account! Username: {} Token: {}", username, token)?;
    writeln!(out, "Make sure to keep that token safe")?;
    Ok(())
}

/// Verify a username/token pair against the API, then save it.
/// The previous credential is put back whenever the login does not go through.
fn handle_login<T: Transport, S: CredentialStore>(
    app: &mut App<T, S>,
    username: &str,
    token: &str,
    out: &mut dyn Write,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<()> {
    // Try the new pair on the client; keep the old one to put back on failure.
    let previous = app.client.credential().clone();
    app.client.set_auth(username, token);

    if let Err(e) = with_spinner("Verifying account...", || app.client.fetch_account()) {
        writeln!(out, "Could not verify username/token pair: {}", e)?;
        app.client.set_auth(&previous.username, &previous.token);
        return Ok(());
    }

    // Any saved identity is overwritten below, even for the same username
    // (its token would be lost), so ask before going on.
    let stored = app.store.fetch();
    if stored.is_complete() {
        writeln!(
            out,
            "You are already logged in as {}, are you sure you want to login as {}?",
            stored.username, username
        )?;
        writeln!(
            out,
            "The token will be lost, cancel this command and use \"account token\" to retrieve your token."
        )?;
        if !confirm("Confirm")? {
            // Declined: the client goes back to the saved identity.
            app.client.set_auth(&stored.username, &stored.token);
            return Ok(());
        }
    }

    if let Err(e) = app.store.upsert(username, token) {
        writeln!(out, "Failed to save the account: {}.", e)?;
        return Ok(());
    }
    writeln!(out, "Successfully logged in as {}.", username)?;
    Ok(())
}

fn handle_token<T, S: CredentialStore>(app: &App<T, S>, out: &mut dyn Write) -> Result<()> {
    let user = app.store.fetch();
    if !user.is_complete() {
        writeln!(out, "You haven't logged in yet.")?;
    } else {
        writeln!(
            out,
            "Logged in with username: {}, token: {}.",
            user.username, user.token
        )?;
    }
    Ok(())
}

fn handle_info<T: Transport, S>(app: &App<T, S>, out: &mut dyn Write) -> Result<()> {
    match with_spinner("Fetching account...", || app.client.fetch_account()) {
        Ok(fetched) => {
            let user = fetched.user;
            writeln!(out, "Username: {}", user.username)?;
            writeln!(out, "Credits: {}", user.credits)?;
            writeln!(out, "Ships: {}", user.ships.len())?;
            writeln!(out, "Loans: {}", user.loans.len())?;
        }
        Err(e) => writeln!(out, "Could not fetch account: {}", e)?,
    }
    Ok(())
}

/// Show a spinner on the terminal while `f` runs.
fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}
