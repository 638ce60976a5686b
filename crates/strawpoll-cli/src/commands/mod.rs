use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use std::io::IsTerminal;
use strawpoll_api::{poll_url, resolve_poll_id, Client};
use strawpoll_core::options::{append_options, check_option_count, remove_positions, text_options};
use strawpoll_core::parse_deadline;
use strawpoll_models::{
    DuplicationChecking, Pagination, Poll, PollConfig, PollOption, ResultsVisibility,
};
use tokio_util::sync::CancellationToken;

use crate::build_info::BuildInfo;
use crate::cli::{Command, ConfirmArgs, OptionUpdateArgs, PollRef, SharedPollArgs};
use crate::config::ConfigFile;
use crate::credentials;
use crate::exit::CliError;
use crate::output::Output;

mod auth;
mod completion;
mod config;
mod meeting;
mod poll;
mod ranking;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub output: Output,
    pub cancel: CancellationToken,
    pub build: BuildInfo,
}

impl Context {
    /// API client for the configured key. Fails with exit status 3 when no
    /// key is available.
    pub fn client(&self) -> Result<Client> {
        let key = credentials::require_key()?;
        Client::new(Some(key)).context("create API client")
    }
}

pub async fn run(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Poll(cmd) => poll::run(cmd, ctx).await,
        Command::Meeting(cmd) => meeting::run(cmd, ctx).await,
        Command::Ranking(cmd) => ranking::run(cmd, ctx).await,
        Command::Auth(cmd) => auth::run(cmd),
        Command::Config(cmd) => config::run(cmd, ctx),
        Command::Completion(args) => completion::run(args),
        Command::Version => {
            println!("strawpoll {}", ctx.build);
            Ok(())
        }
    }
}

/// Poll ID from a bare ID or any recognised poll URL.
fn target_id(target: &PollRef) -> Result<String, CliError> {
    let id = resolve_poll_id(&target.poll);
    if id.is_empty() {
        return Err(CliError::usage("poll ID or URL is required"));
    }
    Ok(id)
}

/// Ask before a destructive action. Without a terminal the caller must
/// pass `--force`.
fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::usage(
            "cannot prompt for confirmation without a terminal; pass --force",
        )
        .into());
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("read confirmation")
}

/// Confirm, delete, and report on stderr. `noun` names the poll kind in
/// messages, e.g. `meeting poll`.
async fn delete_confirmed(args: ConfirmArgs, ctx: &Context, noun: &str) -> Result<()> {
    let id = target_id(&args.target)?;
    if !args.force && !confirm(&format!("Delete {noun} {id}? This cannot be undone."))? {
        eprintln!("Aborted.");
        return Ok(());
    }
    let client = ctx.client()?;
    client.delete_poll(&id, &ctx.cancel).await?;
    eprintln!("{} {id} deleted.", sentence_case(noun));
    Ok(())
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn created_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `ID`, `Title`, `URL` for a freshly created poll.
fn created_fields(poll: &Poll) -> Vec<(&'static str, String)> {
    vec![
        ("ID", poll.id.clone()),
        ("Title", poll.title.clone()),
        ("URL", poll_url(&poll.id)),
    ]
}

fn summary_fields(poll: &Poll) -> Vec<(&'static str, String)> {
    vec![
        ("ID", poll.id.clone()),
        ("Title", poll.title.clone()),
        (
            "Type",
            poll.poll_type
                .map(|kind| kind.label().to_string())
                .unwrap_or_default(),
        ),
        ("URL", poll_url(&poll.id)),
        ("Options", poll.poll_options.len().to_string()),
        ("Votes", poll.vote_count().to_string()),
    ]
}

fn page_footer(pagination: &Pagination, shown: &str) -> String {
    format!(
        "Page {}/{} ({shown})",
        pagination.page,
        pagination.total_pages()
    )
}

/// Settings common to multiple-choice and ranking polls. An explicit flag
/// wins over the config file, which wins over the built-in default.
fn shared_config(
    args: &SharedPollArgs,
    config: &ConfigFile,
    now: DateTime<Utc>,
) -> Result<PollConfig> {
    let deadline_at = args
        .deadline
        .as_deref()
        .map(|raw| parse_deadline(raw, now))
        .transpose()?;

    Ok(PollConfig {
        duplication_checking: Some(
            args.dupcheck
                .or(config.dupcheck)
                .unwrap_or(DuplicationChecking::Ip),
        ),
        results_visibility: Some(
            args.results_visibility
                .or(config.results_visibility)
                .unwrap_or(ResultsVisibility::Always),
        ),
        is_private: Some(args.is_private.or(config.is_private).unwrap_or(false)),
        allow_comments: Some(
            args.allow_comments
                .or(config.allow_comments)
                .unwrap_or(false),
        ),
        deadline_at,
        ..PollConfig::default()
    })
}

fn require_update(args: &OptionUpdateArgs) -> Result<(), CliError> {
    if args.title.is_none() && args.add_option.is_empty() && args.remove_option.is_empty() {
        return Err(CliError::usage("specify at least one field to update"));
    }
    Ok(())
}

/// Apply removals, then additions, to the current option list.
fn edit_text_options(
    existing: Vec<PollOption>,
    add: &[String],
    remove: &[u32],
) -> Result<Vec<PollOption>> {
    let mut options = remove_positions(existing, remove);
    append_options(&mut options, text_options(add));
    check_option_count(options.len())?;
    Ok(options)
}
