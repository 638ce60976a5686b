use anyhow::Result;
use chrono::{DateTime, Utc};
use strawpoll_api::ListKind;
use strawpoll_core::options::{check_option_count, text_options};
use strawpoll_core::{RankingReport, Table};
use strawpoll_models::{CreatePollRequest, Poll, PollMeta, PollType, UpdatePollRequest};

use super::{
    created_date, created_fields, delete_confirmed, edit_text_options, page_footer,
    require_update, shared_config, summary_fields, target_id, Context,
};
use crate::cli::{
    OptionUpdateArgs, PageArgs, PollRef, RankingCommand, RankingCreateArgs, RankingResultsArgs,
};
use crate::config::ConfigFile;

pub async fn run(command: RankingCommand, ctx: &Context) -> Result<()> {
    match command {
        RankingCommand::Create(args) => create(args, ctx).await,
        RankingCommand::Get(target) => get(target, ctx).await,
        RankingCommand::Results(args) => results(args, ctx).await,
        RankingCommand::Update(args) => update(args, ctx).await,
        RankingCommand::Delete(args) => delete_confirmed(args, ctx, "ranking poll").await,
        RankingCommand::List(args) => list(args, ctx).await,
    }
}

fn ranking_request(
    args: &RankingCreateArgs,
    config: &ConfigFile,
    now: DateTime<Utc>,
) -> Result<CreatePollRequest> {
    check_option_count(args.options.len())?;
    let description = args
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());

    Ok(CreatePollRequest {
        title: args.title.clone(),
        poll_type: Some(PollType::Ranking),
        poll_options: text_options(&args.options),
        poll_config: Some(shared_config(&args.shared, config, now)?),
        poll_meta: description.map(|text| PollMeta {
            description: Some(text.to_string()),
            ..PollMeta::default()
        }),
    })
}

async fn create(args: RankingCreateArgs, ctx: &Context) -> Result<()> {
    let config = ConfigFile::load_or_default();
    let request = ranking_request(&args, &config, Utc::now())?;

    let client = ctx.client()?;
    let poll = client.create_poll(request, &ctx.cancel).await?;
    ctx.output.record(&created_fields(&poll), &poll)
}

async fn get(target: PollRef, ctx: &Context) -> Result<()> {
    let id = target_id(&target)?;
    let client = ctx.client()?;
    let poll = client.get_poll(&id, &ctx.cancel).await?;
    ctx.output.record(&summary_fields(&poll), &poll)
}

async fn results(args: RankingResultsArgs, ctx: &Context) -> Result<()> {
    let id = target_id(&args.target)?;
    let client = ctx.client()?;
    let results = client.get_poll_results(&id, &ctx.cancel).await?;
    let report = RankingReport::from_results(&results);

    if ctx.output.is_json() {
        return ctx.output.json(&report);
    }
    ctx.output.table(&report.score_table(), &report)?;
    if args.verbose_breakdown && !report.options.is_empty() {
        ctx.output.gap()?;
        ctx.output.table(&report.breakdown_table(), &report)?;
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

async fn list(args: PageArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let response = client
        .list_my_polls(ListKind::Created, args.page, args.limit, &ctx.cancel)
        .await?;

    let rankings: Vec<&Poll> = response
        .data
        .iter()
        .filter(|poll| poll.is_type(PollType::Ranking))
        .collect();
    if rankings.is_empty() {
        eprintln!("No ranking polls found.");
        return Ok(());
    }

    let mut table = Table::new(["ID", "Title", "Options", "Votes", "Created"]);
    for poll in &rankings {
        table.push_row([
            poll.id.clone(),
            poll.title.clone(),
            poll.poll_options.len().to_string(),
            poll.vote_count().to_string(),
            created_date(poll.created_at),
        ]);
    }
    ctx.output.table(&table, &rankings)?;

    let shown = format!("{} ranking polls shown", rankings.len());
    eprintln!("{}", page_footer(&response.pagination, &shown));
    Ok(())
}
