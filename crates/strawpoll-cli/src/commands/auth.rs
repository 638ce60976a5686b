use anyhow::{Context as _, Result};
use std::io::{BufRead, IsTerminal};

use crate::cli::{AuthCommand, SetKeyArgs};
use crate::credentials::{self, KeySource};
use crate::exit::CliError;

const KEY_PAGE: &str = "https://strawpoll.com/account/settings";

pub fn run(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::SetKey(args) => set_key(args),
        AuthCommand::Status => status(),
        AuthCommand::Remove => remove(),
    }
}

fn set_key(args: SetKeyArgs) -> Result<()> {
    let key = if args.stdin {
        read_first_line(std::io::stdin().lock())?
    } else {
        if !std::io::stdin().is_terminal() {
            return Err(
                CliError::usage("not a terminal; use --stdin to read the key from a pipe").into(),
            );
        }
        dialoguer::Password::new()
            .with_prompt("Enter your StrawPoll API key")
            .interact()
            .context("read API key")?
    };

    credentials::store_key(&key)?;
    println!("API key stored successfully.");
    println!("Get your API key from {KEY_PAGE}");
    Ok(())
}

fn read_first_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).context("read from stdin")?;
    Ok(line.trim().to_string())
}

fn status() -> Result<()> {
    match credentials::resolve() {
        Some((key, KeySource::Environment)) => {
            let masked = credentials::mask(&key);
            println!("API key: set via {} ({masked})", KeySource::Environment);
        }
        Some((key, KeySource::Keyring)) => {
            let masked = credentials::mask(&key);
            println!("API key: stored in {} ({masked})", KeySource::Keyring);
        }
        None => {
            println!("API key: not configured");
            println!();
            println!("Run 'strawpoll auth set-key' to configure your API key.");
            println!("Get your API key from {KEY_PAGE}");
        }
    }
    Ok(())
}

fn remove() -> Result<()> {
    if credentials::remove_key()? {
        println!("API key removed.");
    } else {
        println!("No API key was stored.");
    }
    Ok(())
}
