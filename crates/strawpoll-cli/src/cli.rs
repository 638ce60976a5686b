//! Command-line surface.
//!
//! Settings that also live in the config file are `Option`s here so a flag
//! given explicitly can be told apart from one left at its default.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use strawpoll_api::ListKind;
use strawpoll_models::{DuplicationChecking, EditVotePermissions, ResultsVisibility};

/// Create and manage StrawPoll polls from the command line
///
/// Examples:
///   strawpoll poll create "Lunch?" Pizza Sushi Tacos
///   strawpoll meeting create "Sync" --date 2024-08-13 --range "2024-08-14 10:00-11:00"
///   strawpoll ranking results https://strawpoll.com/NPgxkzPqrn2
#[derive(Debug, Parser)]
#[command(name = "strawpoll")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Output JSON to stdout
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Output plain TSV (for scripting)
    #[arg(long, global = true)]
    pub plain: bool,

    /// Disable colors
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log requests and retries to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Multiple-choice polls
    #[command(subcommand)]
    Poll(PollCommand),
    /// Meeting (availability) polls
    #[command(subcommand)]
    Meeting(MeetingCommand),
    /// Ranking polls
    #[command(subcommand)]
    Ranking(RankingCommand),
    /// Manage the API key
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Manage default poll settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completion(CompletionArgs),
    /// Show version information
    Version,
}

#[derive(Debug, Subcommand)]
pub enum PollCommand {
    /// Create a multiple-choice poll
    Create(PollCreateArgs),
    /// Get poll details
    Get(PollRef),
    /// View poll results
    Results(PollResultsArgs),
    /// Update a poll
    Update(OptionUpdateArgs),
    /// Delete a poll
    Delete(ConfirmArgs),
    /// Reset poll results
    Reset(ConfirmArgs),
    /// List your polls
    List(ListArgs),
}

#[derive(Debug, Subcommand)]
pub enum MeetingCommand {
    /// Create a meeting poll
    Create(MeetingCreateArgs),
    /// Get meeting poll details
    Get(PollRef),
    /// View the availability grid
    Results(MeetingResultsArgs),
    /// Update a meeting poll
    Update(MeetingUpdateArgs),
    /// Delete a meeting poll
    Delete(ConfirmArgs),
    /// List your meeting polls
    List(PageArgs),
}

#[derive(Debug, Subcommand)]
pub enum RankingCommand {
    /// Create a ranking poll
    Create(RankingCreateArgs),
    /// Get ranking poll details
    Get(PollRef),
    /// View Borda-count results
    Results(RankingResultsArgs),
    /// Update a ranking poll
    Update(OptionUpdateArgs),
    /// Delete a ranking poll
    Delete(ConfirmArgs),
    /// List your ranking polls
    List(PageArgs),
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store the API key in the system keyring
    SetKey(SetKeyArgs),
    /// Show where the API key comes from
    Status,
    /// Remove the stored API key
    Remove,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the current configuration
    Show,
    /// Set a configuration value
    Set(ConfigSetArgs),
    /// Show the configuration file path
    Path,
}

#[derive(Debug, Clone, Args)]
pub struct PollRef {
    /// Poll ID or URL
    #[arg(value_name = "ID|URL")]
    pub poll: String,
}

#[derive(Debug, Clone, Args)]
pub struct ConfirmArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Polls per page
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Which polls to list: created or participated
    #[arg(long = "type", default_value_t = ListKind::Created)]
    pub kind: ListKind,

    #[command(flatten)]
    pub page: PageArgs,
}

// Settings shared by multiple-choice and ranking polls that can also come
// from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct SharedPollArgs {
    /// Duplicate vote checking: ip, session, none [default: ip]
    #[arg(long)]
    pub dupcheck: Option<DuplicationChecking>,

    /// Hide from public listings
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub is_private: Option<bool>,

    /// Results visibility: always, after_deadline, after_vote, hidden [default: always]
    #[arg(long, alias = "results-vis")]
    pub results_visibility: Option<ResultsVisibility>,

    /// Allow comments on the poll
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_comments: Option<bool>,

    /// Deadline as RFC 3339 or a duration like 24h or 1h30m
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct PollCreateArgs {
    /// Poll title
    pub title: String,

    /// Poll options (2-30)
    #[arg(required = true, value_name = "OPTIONS")]
    pub options: Vec<String>,

    #[command(flatten)]
    pub shared: SharedPollArgs,

    /// Allow selecting multiple options
    #[arg(long)]
    pub is_multiple_choice: bool,

    /// Minimum selections (with --is-multiple-choice)
    #[arg(long, requires = "is_multiple_choice")]
    pub multiple_choice_min: Option<u32>,

    /// Maximum selections (with --is-multiple-choice)
    #[arg(long, requires = "is_multiple_choice")]
    pub multiple_choice_max: Option<u32>,

    /// Allow voters to add options
    #[arg(long)]
    pub allow_other: bool,

    /// Require voter names
    #[arg(long)]
    pub require_names: bool,

    /// Hide participant names
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub hide_participants: Option<bool>,

    /// Allow VPN users [default: true]
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_vpn: Option<bool>,

    /// Who can edit votes: admin, admin_voter, voter, nobody [default: admin_voter]
    #[arg(long, alias = "edit-vote-perms")]
    pub edit_vote_permissions: Option<EditVotePermissions>,

    /// Randomize option order
    #[arg(long)]
    pub randomize: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PollResultsArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// Show a per-participant breakdown
    #[arg(short, long)]
    pub participants: bool,
}

// Title and text-option edits for multiple-choice and ranking polls.
#[derive(Debug, Clone, Args)]
pub struct OptionUpdateArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// New poll title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Add an option (repeatable)
    #[arg(short, long = "add-option", value_name = "TEXT")]
    pub add_option: Vec<String>,

    /// Remove the option at a position (repeatable)
    #[arg(short, long = "remove-option", value_name = "POSITION")]
    pub remove_option: Vec<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct MeetingCreateArgs {
    /// Meeting poll title
    pub title: String,

    /// All-day date as YYYY-MM-DD (repeatable)
    #[arg(short, long, value_name = "DATE")]
    pub date: Vec<String>,

    /// Time slot as "YYYY-MM-DD HH:MM-HH:MM"; the end is optional (repeatable)
    #[arg(short, long, value_name = "RANGE")]
    pub range: Vec<String>,

    /// IANA timezone, e.g. Europe/Berlin [default: $TZ, else UTC]
    #[arg(long)]
    pub tz: Option<String>,

    /// Meeting location
    #[arg(long)]
    pub location: Option<String>,

    /// Poll description
    #[arg(long)]
    pub description: Option<String>,

    /// Allow "if need be" answers (default)
    #[arg(long, overrides_with = "no_allow_maybe")]
    pub allow_maybe: bool,

    /// Only allow yes/no answers
    #[arg(long, overrides_with = "allow_maybe")]
    pub no_allow_maybe: bool,

    /// Duplicate vote checking: ip, session, none
    #[arg(long, default_value_t = DuplicationChecking::None)]
    pub dupcheck: DuplicationChecking,

    /// Deadline as RFC 3339 or a duration like 24h or 1h30m
    #[arg(long)]
    pub deadline: Option<String>,
}

impl MeetingCreateArgs {
    pub fn allows_maybe(&self) -> bool {
        !self.no_allow_maybe
    }
}

#[derive(Debug, Clone, Args)]
pub struct MeetingResultsArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// Keep poll order instead of best availability first
    #[arg(long)]
    pub original_order: bool,
}

#[derive(Debug, Clone, Args)]
pub struct MeetingUpdateArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// New poll title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Meeting location
    #[arg(long)]
    pub location: Option<String>,

    /// IANA timezone for the poll and for parsing --add-range
    #[arg(long)]
    pub tz: Option<String>,

    /// Add an all-day date YYYY-MM-DD (repeatable)
    #[arg(short = 'd', long, value_name = "DATE")]
    pub add_date: Vec<String>,

    /// Add a time slot "YYYY-MM-DD HH:MM-HH:MM" (repeatable)
    #[arg(short = 'r', long, value_name = "RANGE")]
    pub add_range: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RankingCreateArgs {
    /// Poll title
    pub title: String,

    /// Options to rank (2-30)
    #[arg(required = true, value_name = "OPTIONS")]
    pub options: Vec<String>,

    #[command(flatten)]
    pub shared: SharedPollArgs,

    /// Poll description
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RankingResultsArgs {
    #[command(flatten)]
    pub target: PollRef,

    /// Also show how often each option landed at each rank
    #[arg(long)]
    pub verbose_breakdown: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SetKeyArgs {
    /// Read the key from stdin instead of prompting
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ConfigSetArgs {
    /// Configuration key
    pub key: String,
    /// Configuration value
    pub value: String,
}

#[derive(Debug, Clone, Args)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("strawpoll").chain(args.iter().copied()))
            .unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["poll", "get", "abc", "--json", "-v"]);
        assert!(cli.global.json);
        assert!(cli.global.verbose);
        match cli.command {
            Command::Poll(PollCommand::Get(target)) => assert_eq!(target.poll, "abc"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_backed_flags_stay_unset_unless_given() {
        let cli = parse(&["poll", "create", "Lunch?", "Pizza", "Sushi"]);
        let Command::Poll(PollCommand::Create(args)) = cli.command else {
            panic!("expected poll create");
        };
        assert_eq!(args.options, vec!["Pizza", "Sushi"]);
        assert_eq!(args.shared.dupcheck, None);
        assert_eq!(args.shared.is_private, None);
        assert_eq!(args.allow_vpn, None);
    }

    #[test]
    fn bare_and_explicit_bool_flags() {
        let cli = parse(&[
            "poll",
            "create",
            "Lunch?",
            "A",
            "B",
            "--is-private",
            "--allow-vpn=false",
            "--dupcheck",
            "session",
            "--results-vis",
            "after_vote",
        ]);
        let Command::Poll(PollCommand::Create(args)) = cli.command else {
            panic!("expected poll create");
        };
        assert_eq!(args.shared.is_private, Some(true));
        assert_eq!(args.allow_vpn, Some(false));
        assert_eq!(args.shared.dupcheck, Some(DuplicationChecking::Session));
        assert_eq!(
            args.shared.results_visibility,
            Some(ResultsVisibility::AfterVote)
        );
    }

    #[test]
    fn wire_enums_reject_unknown_values() {
        let err = Cli::try_parse_from([
            "strawpoll", "poll", "create", "t", "a", "b", "--dupcheck", "cookie",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("ip, session, none"));
    }

    #[test]
    fn allow_maybe_negation() {
        let cli = parse(&["meeting", "create", "Sync", "--date", "2024-08-13"]);
        let Command::Meeting(MeetingCommand::Create(args)) = cli.command else {
            panic!("expected meeting create");
        };
        assert!(args.allows_maybe());
        assert_eq!(args.dupcheck, DuplicationChecking::None);

        let cli = parse(&["meeting", "create", "Sync", "-d", "2024-08-13", "--no-allow-maybe"]);
        let Command::Meeting(MeetingCommand::Create(args)) = cli.command else {
            panic!("expected meeting create");
        };
        assert!(!args.allows_maybe());

        let cli = parse(&[
            "meeting",
            "create",
            "Sync",
            "-d",
            "2024-08-13",
            "--no-allow-maybe",
            "--allow-maybe",
        ]);
        let Command::Meeting(MeetingCommand::Create(args)) = cli.command else {
            panic!("expected meeting create");
        };
        assert!(args.allows_maybe());
    }

    #[test]
    fn list_defaults() {
        let cli = parse(&["poll", "list"]);
        let Command::Poll(PollCommand::List(args)) = cli.command else {
            panic!("expected poll list");
        };
        assert_eq!(args.kind, ListKind::Created);
        assert_eq!(args.page.page, 1);
        assert_eq!(args.page.limit, 20);
    }

    #[test]
    fn repeatable_update_flags() {
        let cli = parse(&["ranking", "update", "abc", "-a", "X", "-a", "Y", "-r", "0", "-r", "2"]);
        let Command::Ranking(RankingCommand::Update(args)) = cli.command else {
            panic!("expected ranking update");
        };
        assert_eq!(args.add_option, vec!["X", "Y"]);
        assert_eq!(args.remove_option, vec![0, 2]);
    }

    #[test]
    fn create_needs_options() {
        assert!(Cli::try_parse_from(["strawpoll", "poll", "create", "Lunch?"]).is_err());
    }
}
