use anyhow::Result;
use chrono::{DateTime, Utc};
use strawpoll_api::{poll_url, ListKind};
use strawpoll_core::meeting::{location_label, options_preview, timezone_label};
use strawpoll_core::options::{append_options, meeting_options};
use strawpoll_core::{build_grid, parse_deadline, resolve_timezone, CoreError, Table, Tz};
use strawpoll_models::{
    CreatePollRequest, EditVotePermissions, Poll, PollConfig, PollMeta, PollType,
    UpdatePollRequest, VoteType,
};

use super::{created_date, created_fields, delete_confirmed, page_footer, target_id, Context};
use crate::cli::{
    MeetingCommand, MeetingCreateArgs, MeetingResultsArgs, MeetingUpdateArgs, PageArgs, PollRef,
};
use crate::exit::CliError;

pub async fn run(command: MeetingCommand, ctx: &Context) -> Result<()> {
    match command {
        MeetingCommand::Create(args) => create(args, ctx).await,
        MeetingCommand::Get(target) => get(target, ctx).await,
        MeetingCommand::Results(args) => results(args, ctx).await,
        MeetingCommand::Update(args) => update(args, ctx).await,
        MeetingCommand::Delete(args) => delete_confirmed(args, ctx, "meeting poll").await,
        MeetingCommand::List(args) => list(args, ctx).await,
    }
}

/// An explicit zone must be valid. Without one, `$TZ` is used when it names
/// a known zone, else UTC.
fn creation_timezone(explicit: Option<&str>, env_tz: Option<&str>) -> Result<Tz, CoreError> {
    if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
        return parse_timezone(name);
    }
    Ok(env_tz
        .map(|name| name.trim().trim_start_matches(':'))
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(Tz::UTC))
}

fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn meeting_request(
    args: &MeetingCreateArgs,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<CreatePollRequest> {
    if args.date.is_empty() && args.range.is_empty() {
        return Err(CliError::usage("specify at least one --date or --range").into());
    }
    let options = meeting_options(&args.date, &args.range, tz)?;
    let deadline_at = args
        .deadline
        .as_deref()
        .map(|raw| parse_deadline(raw, now))
        .transpose()?;

    Ok(CreatePollRequest {
        title: args.title.clone(),
        poll_type: Some(PollType::Meeting),
        poll_options: options,
        poll_config: Some(PollConfig {
            vote_type: Some(VoteType::ParticipantGrid),
            is_multiple_choice: Some(true),
            require_voter_names: Some(true),
            allow_indeterminate: Some(args.allows_maybe()),
            duplication_checking: Some(args.dupcheck),
            edit_vote_permissions: Some(EditVotePermissions::AdminVoter),
            deadline_at,
            ..PollConfig::default()
        }),
        poll_meta: Some(PollMeta {
            description: non_empty(args.description.as_deref()),
            location: non_empty(args.location.as_deref()),
            timezone: Some(tz.name().to_string()),
            ..PollMeta::default()
        }),
    })
}

async fn create(args: MeetingCreateArgs, ctx: &Context) -> Result<()> {
    let env_tz = std::env::var("TZ").ok();
    let tz = creation_timezone(args.tz.as_deref(), env_tz.as_deref())?;
    let request = meeting_request(&args, tz, Utc::now())?;

    let client = ctx.client()?;
    let poll = client.create_poll(request, &ctx.cancel).await?;
    ctx.output.record(&created_fields(&poll), &poll)
}

fn meeting_fields(poll: &Poll) -> Vec<(&'static str, String)> {
    let tz = resolve_timezone(poll.timezone()).tz;
    vec![
        ("ID", poll.id.clone()),
        ("Title", poll.title.clone()),
        ("Location", location_label(poll)),
        ("Timezone", timezone_label(poll)),
        ("Options", options_preview(poll, tz)),
        ("Votes", poll.vote_count().to_string()),
    ]
}

async fn get(target: PollRef, ctx: &Context) -> Result<()> {
    let id = target_id(&target)?;
    let client = ctx.client()?;
    let poll = client.get_poll(&id, &ctx.cancel).await?;
    ctx.output.record(&meeting_fields(&poll), &poll)
}

async fn results(args: MeetingResultsArgs, ctx: &Context) -> Result<()> {
    let id = target_id(&args.target)?;
    let client = ctx.client()?;
    let poll = client.get_poll(&id, &ctx.cancel).await?;
    let results = client.get_poll_results(&id, &ctx.cancel).await?;

    let zone = resolve_timezone(poll.timezone());
    if let Some(name) = &zone.unknown {
        eprintln!("warning: unknown timezone {name:?}, using UTC");
    }

    let mut grid = build_grid(&poll.poll_options, &results.poll_participants, zone.tz);
    if !args.original_order {
        grid.sort_by_availability();
    }
    ctx.output.table(&grid.table, &results)
}

fn meeting_update_request(
    args: &MeetingUpdateArgs,
    current: Option<&Poll>,
) -> Result<UpdatePollRequest> {
    let explicit_tz = non_empty(args.tz.as_deref())
        .map(|name| parse_timezone(&name))
        .transpose()?;
    let location = non_empty(args.location.as_deref());

    let mut request = UpdatePollRequest {
        title: non_empty(args.title.as_deref()),
        ..UpdatePollRequest::default()
    };
    if location.is_some() || explicit_tz.is_some() {
        request.poll_meta = Some(PollMeta {
            location,
            timezone: explicit_tz.map(|tz| tz.name().to_string()),
            ..PollMeta::default()
        });
    }

    if let Some(current) = current {
        // Ranges are read in the explicit zone, else the poll's own.
        let tz = explicit_tz.unwrap_or_else(|| resolve_timezone(current.timezone()).tz);
        let added = meeting_options(&args.add_date, &args.add_range, tz)?;
        let mut options = current.poll_options.clone();
        append_options(&mut options, added);
        request.poll_options = options;
    }
    Ok(request)
}

fn wants_new_options(args: &MeetingUpdateArgs) -> bool {
    !args.add_date.is_empty() || !args.add_range.is_empty()
}

async fn update(args: MeetingUpdateArgs, ctx: &Context) -> Result<()> {
    let nothing = non_empty(args.title.as_deref()).is_none()
        && non_empty(args.location.as_deref()).is_none()
        && non_empty(args.tz.as_deref()).is_none()
        && !wants_new_options(&args);
    if nothing {
        return Err(CliError::usage("specify at least one field to update").into());
    }

    let id = target_id(&args.target)?;
    let client = ctx.client()?;
    let current = if wants_new_options(&args) {
        Some(client.get_poll(&id, &ctx.cancel).await?)
    } else {
        None
    };
    let request = meeting_update_request(&args, current.as_ref())?;

    let poll = client.update_poll(&id, &request, &ctx.cancel).await?;
    eprintln!("Meeting poll updated: {}", poll_url(&poll.id));
    ctx.output.record(&meeting_fields(&poll), &poll)
}

async fn list(args: PageArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let response = client
        .list_my_polls(ListKind::Created, args.page, args.limit, &ctx.cancel)
        .await?;

    let meetings: Vec<&Poll> = response
        .data
        .iter()
        .filter(|poll| poll.is_type(PollType::Meeting))
        .collect();
    if meetings.is_empty() {
        eprintln!("No meeting polls found.");
        return Ok(());
    }

    let mut table = Table::new(["ID", "Title", "Location", "Options", "Votes", "Created"]);
    for poll in &meetings {
        table.push_row([
            poll.id.clone(),
            poll.title.clone(),
            location_label(poll),
            poll.poll_options.len().to_string(),
            poll.vote_count().to_string(),
            created_date(poll.created_at),
        ]);
    }
    ctx.output.table(&table, &meetings)?;

    let shown = format!("{} meeting polls shown", meetings.len());
    eprintln!("{}", page_footer(&response.pagination, &shown));
    Ok(())
}
