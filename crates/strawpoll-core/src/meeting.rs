//! Availability grid for meeting polls.
//!
//! Timeslots are rows and participants are columns, followed by a `Total`
//! column. Rows can be reordered so the slots most people can attend come
//! first.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use strawpoll_models::{OptionType, Poll, PollOption, PollParticipant};

use crate::table::Table;

pub const SLOT_HEADER: &str = "Slot";
pub const TOTAL_HEADER: &str = "Total";

const VOTE_NO: i64 = 0;
const VOTE_YES: i64 = 1;
const VOTE_MAYBE: i64 = 2;

const DATE_FORMAT: &str = "%a %b %-d";
const CLOCK_FORMAT: &str = "%H:%M";

/// Timezone used to render a poll's time ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTimezone {
    pub tz: Tz,
    /// Name that failed to load, if the poll carried one and UTC was used
    /// instead. Callers should surface this to the user.
    pub unknown: Option<String>,
}

/// Load the poll's IANA timezone, falling back to UTC.
pub fn resolve_timezone(name: Option<&str>) -> PollTimezone {
    let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) else {
        return PollTimezone {
            tz: Tz::UTC,
            unknown: None,
        };
    };
    match name.parse::<Tz>() {
        Ok(tz) => PollTimezone { tz, unknown: None },
        Err(_) => {
            tracing::debug!(timezone = name, "unknown timezone, using UTC");
            PollTimezone {
                tz: Tz::UTC,
                unknown: Some(name.to_string()),
            }
        }
    }
}

/// Human-readable label for one meeting option, e.g. `Tue Aug 13` or
/// `Tue Aug 13 10:00-11:00` (start only when the range has no end). Falls
/// back to the raw value when the option cannot be interpreted.
pub fn format_timeslot(option: &PollOption, tz: Tz) -> String {
    match option.option_type {
        Some(OptionType::Date) => {
            let raw = option
                .date
                .as_deref()
                .filter(|date| !date.is_empty())
                .unwrap_or(&option.value);
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|_| option.value.clone())
        }
        Some(OptionType::TimeRange) => {
            let local = |ts: i64| DateTime::from_timestamp(ts, 0).map(|at| at.with_timezone(&tz));
            let Some(start) = option.start_time.and_then(local) else {
                return option.value.clone();
            };
            match option.end_time.and_then(local) {
                Some(end) => format!(
                    "{} {}-{}",
                    start.format(DATE_FORMAT),
                    start.format(CLOCK_FORMAT),
                    end.format(CLOCK_FORMAT)
                ),
                None => format!("{} {}", start.format(DATE_FORMAT), start.format(CLOCK_FORMAT)),
            }
        }
        _ => option.value.clone(),
    }
}

/// Display label for a single meeting vote.
pub fn vote_label(vote: Option<i64>) -> String {
    match vote {
        None => "-".to_string(),
        Some(VOTE_YES) => "Yes".to_string(),
        Some(VOTE_NO) => "No".to_string(),
        Some(VOTE_MAYBE) => "Maybe".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Yes/maybe tally for one timeslot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub yes: u64,
    pub maybe: u64,
    pub total: u64,
}

impl Availability {
    pub fn count(participants: &[PollParticipant], option_index: usize) -> Self {
        let mut tally = Self {
            total: participants.len() as u64,
            ..Self::default()
        };
        for participant in participants {
            match participant.vote_at(option_index) {
                Some(VOTE_YES) => tally.yes += 1,
                Some(VOTE_MAYBE) => tally.maybe += 1,
                _ => {}
            }
        }
        tally
    }

    /// A single yes outweighs any number of maybes.
    pub fn score(&self) -> u64 {
        self.yes * 1000 + self.maybe
    }

    /// `yes/total`, or `yes+maybe/total` once anyone answered maybe.
    pub fn summary(&self) -> String {
        if self.maybe > 0 {
            format!("{}+{}/{}", self.yes, self.maybe, self.total)
        } else {
            format!("{}/{}", self.yes, self.total)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingGrid {
    pub table: Table,
    /// Availability score per row, kept aligned with `table.rows`.
    pub scores: Vec<u64>,
}

impl MeetingGrid {
    /// Best availability first. Equal scores keep their poll order.
    pub fn sort_by_availability(&mut self) {
        let rows = std::mem::take(&mut self.table.rows);
        let scores = std::mem::take(&mut self.scores);
        let mut paired: Vec<(u64, Vec<String>)> = scores.into_iter().zip(rows).collect();
        // `sort_by` is stable.
        paired.sort_by(|a, b| b.0.cmp(&a.0));
        (self.scores, self.table.rows) = paired.into_iter().unzip();
    }
}

/// One row per option, one column per participant, plus a `Total` column.
pub fn build_grid(options: &[PollOption], participants: &[PollParticipant], tz: Tz) -> MeetingGrid {
    let headers = std::iter::once(SLOT_HEADER.to_string())
        .chain(participants.iter().map(|p| p.display_name().to_string()))
        .chain(std::iter::once(TOTAL_HEADER.to_string()));
    let mut table = Table::new(headers);
    let mut scores = Vec::with_capacity(options.len());

    for (index, option) in options.iter().enumerate() {
        let availability = Availability::count(participants, index);
        let row = std::iter::once(format_timeslot(option, tz))
            .chain(participants.iter().map(|p| vote_label(p.vote_at(index))))
            .chain(std::iter::once(availability.summary()));
        table.push_row(row);
        scores.push(availability.score());
    }

    MeetingGrid { table, scores }
}

/// `Tue Aug 13 (+2 more)` style preview of a meeting's options.
pub fn options_preview(poll: &Poll, tz: Tz) -> String {
    match poll.poll_options.as_slice() {
        [] => "0".to_string(),
        [only] => format_timeslot(only, tz),
        [first, rest @ ..] => format!("{} (+{} more)", format_timeslot(first, tz), rest.len()),
    }
}

pub fn location_label(poll: &Poll) -> String {
    poll.location().unwrap_or("-").to_string()
}

pub fn timezone_label(poll: &Poll) -> String {
    poll.timezone().unwrap_or("UTC").to_string()
}
