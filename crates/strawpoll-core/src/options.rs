//! Building and editing option lists.
//!
//! Positions are always `0..len` with no gaps; every helper here keeps it
//! that way.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::collections::HashSet;
use strawpoll_models::{OptionType, PollOption};

use crate::error::CoreError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";
const CLOCK_FORMAT: &str = "%H:%M";

pub fn check_option_count(count: usize) -> Result<(), CoreError> {
    if (MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::OptionCount {
            min: MIN_OPTIONS,
            max: MAX_OPTIONS,
            got: count,
        })
    }
}

/// Plain text options positioned in the given order.
pub fn text_options<S: AsRef<str>>(values: &[S]) -> Vec<PollOption> {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| PollOption::text(value.as_ref(), position as u32))
        .collect()
}

/// All-day option from `YYYY-MM-DD`.
pub fn parse_date_option(input: &str) -> Result<PollOption, CoreError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(input.to_string()))?;
    Ok(PollOption {
        option_type: Some(OptionType::Date),
        value: input.to_string(),
        date: Some(input.to_string()),
        ..PollOption::default()
    })
}

/// Time-range option from `YYYY-MM-DD HH:MM-HH:MM`. The end is optional,
/// so `YYYY-MM-DD HH:MM` gives an open-ended slot. Times are read in `tz`.
pub fn parse_time_range(input: &str, tz: Tz) -> Result<PollOption, CoreError> {
    let input = input.trim();
    let (date_part, time_part) = input.split_once(' ').ok_or_else(|| {
        CoreError::time_range(input, "expected 'YYYY-MM-DD HH:MM-HH:MM' or 'YYYY-MM-DD HH:MM'")
    })?;
    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| CoreError::time_range(input, format!("invalid date '{date_part}'")))?;

    let (start_raw, end_raw) = match time_part.trim().split_once('-') {
        Some((start, end)) => (start.trim(), Some(end.trim()).filter(|end| !end.is_empty())),
        None => (time_part.trim(), None),
    };

    let start = local_timestamp(input, date, start_raw, tz, "start")?;
    let end = end_raw
        .map(|raw| local_timestamp(input, date, raw, tz, "end"))
        .transpose()?;
    if let Some(end) = end {
        if end <= start {
            return Err(CoreError::time_range(input, "end time must be after start time"));
        }
    }

    Ok(PollOption {
        option_type: Some(OptionType::TimeRange),
        value: input.to_string(),
        start_time: Some(start),
        end_time: end,
        ..PollOption::default()
    })
}

fn local_timestamp(
    input: &str,
    date: NaiveDate,
    clock: &str,
    tz: Tz,
    which: &str,
) -> Result<i64, CoreError> {
    let time = NaiveTime::parse_from_str(clock, CLOCK_FORMAT).map_err(|_| {
        CoreError::time_range(input, format!("invalid {which} time '{clock}': expected HH:MM"))
    })?;
    // Ambiguous wall-clock times during a DST fold take the earlier instant.
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|at| at.timestamp())
        .ok_or_else(|| {
            CoreError::time_range(input, format!("{which} time {clock} does not exist in {tz}"))
        })
}

/// Meeting options: dates first, then ranges, positioned from 0.
pub fn meeting_options<D, R>(dates: &[D], ranges: &[R], tz: Tz) -> Result<Vec<PollOption>, CoreError>
where
    D: AsRef<str>,
    R: AsRef<str>,
{
    let mut options = Vec::with_capacity(dates.len() + ranges.len());
    let parsed_dates = dates
        .iter()
        .map(|date| parse_date_option(date.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    append_options(&mut options, parsed_dates);
    let parsed_ranges = ranges
        .iter()
        .map(|range| parse_time_range(range.as_ref(), tz))
        .collect::<Result<Vec<_>, _>>()?;
    append_options(&mut options, parsed_ranges);
    Ok(options)
}

/// Add options after the existing ones.
pub fn append_options(options: &mut Vec<PollOption>, new: impl IntoIterator<Item = PollOption>) {
    for mut option in new {
        option.position = options.len() as u32;
        options.push(option);
    }
}

/// Drop options whose position is listed and renumber the rest.
pub fn remove_positions(options: Vec<PollOption>, positions: &[u32]) -> Vec<PollOption> {
    let remove: HashSet<u32> = positions.iter().copied().collect();
    let mut kept: Vec<PollOption> = options
        .into_iter()
        .filter(|option| !remove.contains(&option.position))
        .collect();
    kept.sort_by_key(|option| option.position);
    for (index, option) in kept.iter_mut().enumerate() {
        option.position = index as u32;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(options: &[PollOption]) -> Vec<u32> {
        options.iter().map(|option| option.position).collect()
    }

    fn values(options: &[PollOption]) -> Vec<&str> {
        options.iter().map(|option| option.value.as_str()).collect()
    }

    #[test]
    fn option_count_bounds() {
        assert!(check_option_count(2).is_ok());
        assert!(check_option_count(30).is_ok());
        assert_eq!(
            check_option_count(1).unwrap_err().to_string(),
            "poll requires 2-30 options, got 1"
        );
        assert!(check_option_count(31).is_err());
    }

    #[test]
    fn text_options_are_sequential() {
        let options = text_options(&["a", "b", "c"]);
        assert_eq!(positions(&options), vec![0, 1, 2]);
        assert_eq!(options[0].option_type, Some(OptionType::Text));
    }

    #[test]
    fn date_option_validates_format() {
        let option = parse_date_option("2024-08-13").unwrap();
        assert_eq!(option.option_type, Some(OptionType::Date));
        assert_eq!(option.date.as_deref(), Some("2024-08-13"));

        assert_eq!(
            parse_date_option("13/08/2024"),
            Err(CoreError::InvalidDate("13/08/2024".into()))
        );
        assert!(parse_date_option("2024-02-30").is_err());
    }

    #[test]
    fn time_range_in_utc_and_zone() {
        let option = parse_time_range("2024-08-13 10:00-11:00", Tz::UTC).unwrap();
        assert_eq!(option.option_type, Some(OptionType::TimeRange));
        assert_eq!(option.start_time, Some(1_723_543_200));
        assert_eq!(option.end_time, Some(1_723_546_800));
        assert_eq!(option.value, "2024-08-13 10:00-11:00");

        let berlin = parse_time_range("2024-08-13 10:00-11:00", chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(berlin.start_time, Some(1_723_536_000));
        assert_eq!(berlin.end_time, Some(1_723_539_600));
    }

    #[test]
    fn time_range_end_is_optional() {
        let option = parse_time_range("2024-08-13 10:00", Tz::UTC).unwrap();
        assert_eq!(option.start_time, Some(1_723_543_200));
        assert_eq!(option.end_time, None);

        let dangling = parse_time_range("2024-08-13 10:00-", Tz::UTC).unwrap();
        assert_eq!(dangling.end_time, None);
    }

    #[test]
    fn time_range_rejects_bad_input() {
        assert!(parse_time_range("2024-08-13", Tz::UTC).is_err());
        assert!(parse_time_range("2024-13-01 10:00", Tz::UTC).is_err());
        assert!(parse_time_range("2024-08-13 25:00", Tz::UTC).is_err());
        assert!(parse_time_range("2024-08-13 10:00-9:0x", Tz::UTC).is_err());
        assert!(parse_time_range("2024-08-13 11:00-10:00", Tz::UTC).is_err());
    }

    #[test]
    fn time_range_in_dst_gap_is_rejected() {
        let err = parse_time_range("2024-03-31 02:30", chrono_tz::Europe::Berlin).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn meeting_options_put_dates_before_ranges() {
        let options = meeting_options(
            &["2024-08-14"],
            &["2024-08-13 10:00-11:00", "2024-08-12 09:00"],
            Tz::UTC,
        )
        .unwrap();
        assert_eq!(positions(&options), vec![0, 1, 2]);
        assert_eq!(options[0].option_type, Some(OptionType::Date));
        assert_eq!(options[1].option_type, Some(OptionType::TimeRange));
    }

    #[test]
    fn append_continues_numbering() {
        let mut options = text_options(&["a", "b"]);
        append_options(&mut options, text_options(&["c", "d"]));
        assert_eq!(positions(&options), vec![0, 1, 2, 3]);
        assert_eq!(values(&options), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn remove_renumbers_survivors() {
        let options = text_options(&["a", "b", "c", "d"]);
        let kept = remove_positions(options, &[1, 3, 7]);
        assert_eq!(values(&kept), vec!["a", "c"]);
        assert_eq!(positions(&kept), vec![0, 1]);
    }

    #[test]
    fn remove_then_append() {
        let mut options = remove_positions(text_options(&["a", "b", "c"]), &[0]);
        append_options(&mut options, [PollOption::text("z", 99)]);
        assert_eq!(values(&options), vec!["b", "c", "z"]);
        assert_eq!(positions(&options), vec![0, 1, 2]);
    }
}
