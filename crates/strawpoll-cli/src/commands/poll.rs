use anyhow::Result;
use chrono::{DateTime, Utc};
use strawpoll_core::options::{check_option_count, text_options};
use strawpoll_core::results::{participants_table, results_table};
use strawpoll_core::Table;
use strawpoll_models::{
    CreatePollRequest, EditVotePermissions, PollConfig, PollType, UpdatePollRequest,
};

use super::{
    confirm, created_date, created_fields, delete_confirmed, edit_text_options, page_footer,
    require_update, shared_config, summary_fields, target_id, Context,
};
use crate::cli::{
    ConfirmArgs, ListArgs, OptionUpdateArgs, PollCommand, PollCreateArgs, PollRef,
    PollResultsArgs,
};
use crate::config::ConfigFile;

pub async fn run(command: PollCommand, ctx: &Context) -> Result<()> {
    match command {
        PollCommand::Create(args) => create(args, ctx).await,
        PollCommand::Get(target) => get(target, ctx).await,
        PollCommand::Results(args) => results(args, ctx).await,
        PollCommand::Update(args) => update(args, ctx).await,
        PollCommand::Delete(args) => delete_confirmed(args, ctx, "poll").await,
        PollCommand::Reset(args) => reset(args, ctx).await,
        PollCommand::List(args) => list(args, ctx).await,
    }
}

async fn create(args: PollCreateArgs, ctx: &Context) -> Result<()> {
    check_option_count(args.options.len())?;
    let config = ConfigFile::load_or_default();
    let request = CreatePollRequest {
        title: args.title.clone(),
        poll_type: Some(PollType::MultipleChoice),
        poll_options: text_options(&args.options),
        poll_config: Some(poll_config(&args, &config, Utc::now())?),
        poll_meta: None,
    };

    let client = ctx.client()?;
    let poll = client.create_poll(request, &ctx.cancel).await?;
    ctx.output.record(&created_fields(&poll), &poll)
}

/// Full settings for a new multiple-choice poll.
fn poll_config(
    args: &PollCreateArgs,
    config: &ConfigFile,
    now: DateTime<Utc>,
) -> Result<PollConfig> {
    let mut poll_config = shared_config(&args.shared, config, now)?;
    poll_config.hide_participants = Some(
        args.hide_participants
            .or(config.hide_participants)
            .unwrap_or(false),
    );
    poll_config.allow_vpn_users = Some(args.allow_vpn.or(config.allow_vpn_users).unwrap_or(true));
    poll_config.edit_vote_permissions = Some(
        args.edit_vote_permissions
            .or(config.edit_vote_permissions)
            .unwrap_or(EditVotePermissions::AdminVoter),
    );
    poll_config.allow_other_option = Some(args.allow_other);
    poll_config.require_voter_names = Some(args.require_names);
    poll_config.randomize_options = Some(args.randomize);
    if args.is_multiple_choice {
        poll_config.is_multiple_choice = Some(true);
        poll_config.multiple_choice_min = args.multiple_choice_min.filter(|n| *n > 0);
        poll_config.multiple_choice_max = args.multiple_choice_max.filter(|n| *n > 0);
    }
    Ok(poll_config)
}

async fn get(target: PollRef, ctx: &Context) -> Result<()> {
    let id = target_id(&target)?;
    let client = ctx.client()?;
    let poll = client.get_poll(&id, &ctx.cancel).await?;
    ctx.output.record(&summary_fields(&poll), &poll)
}

async fn results(args: PollResultsArgs, ctx: &Context) -> Result<()> {
    let id = target_id(&args.target)?;
    let client = ctx.client()?;
    let results = client.get_poll_results(&id, &ctx.cancel).await?;

    if ctx.output.is_json() {
        return ctx.output.json(&results);
    }
    ctx.output.table(&results_table(&results), &results)?;
    if args.participants && !results.poll_participants.is_empty() {
        ctx.output.gap()?;
        ctx.output
            .table(&participants_table(&results), &results.poll_participants)?;
    }
    Ok(())
}

async fn update(args: OptionUpdateArgs, ctx: &Context) -> Result<()> {
    require_update(&args)?;
    let id = target_id(&args.target)?;
    let client = ctx.client()?;

    let mut request = UpdatePollRequest {
        title: args.title.clone(),
        ..UpdatePollRequest::default()
    };
    if !args.add_option.is_empty() || !args.remove_option.is_empty() {
        let current = client.get_poll(&id, &ctx.cancel).await?;
        request.poll_options =
            edit_text_options(current.poll_options, &args.add_option, &args.remove_option)?;
    }

    let poll = client.update_poll(&id, &request, &ctx.cancel).await?;
    ctx.output.record(&summary_fields(&poll), &poll)
}

async fn reset(args: ConfirmArgs, ctx: &Context) -> Result<()> {
    let id = target_id(&args.target)?;
    if !args.force && !confirm(&format!("Reset results for poll {id}? This cannot be undone."))? {
        eprintln!("Aborted.");
        return Ok(());
    }
    let client = ctx.client()?;
    client.reset_poll_results(&id, &ctx.cancel).await?;
    eprintln!("Poll {id} results reset.");
    Ok(())
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let response = client
        .list_my_polls(args.kind, args.page.page, args.page.limit, &ctx.cancel)
        .await?;

    let mut table = Table::new(["ID", "Title", "Type", "Votes", "Created"]);
    for poll in &response.data {
        table.push_row([
            poll.id.clone(),
            poll.title.clone(),
            poll.poll_type
                .map(|kind| kind.label().to_string())
                .unwrap_or_default(),
            poll.vote_count().to_string(),
            created_date(poll.created_at),
        ]);
    }
    ctx.output.table(&table, &response)?;

    let total = response.pagination.total;
    eprintln!("{}", page_footer(&response.pagination, &format!("{total} polls")));
    Ok(())
}
