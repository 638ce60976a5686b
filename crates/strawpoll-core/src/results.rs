use strawpoll_models::PollResults;

use crate::table::Table;

/// Option, votes and share of all votes cast.
pub fn results_table(results: &PollResults) -> Table {
    let total = results.vote_count;
    let mut table = Table::new(["Option", "Votes", "Percentage"]);
    for option in &results.poll_options {
        let votes = option.votes();
        let share = if total > 0 {
            votes as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        table.push_row([option.value.clone(), votes.to_string(), format!("{share:.1}%")]);
    }
    table
}

/// One row per participant with an `x` under every option they picked.
pub fn participants_table(results: &PollResults) -> Table {
    let headers = std::iter::once("Name".to_string())
        .chain(results.poll_options.iter().map(|option| option.value.clone()));
    let mut table = Table::new(headers);
    for participant in &results.poll_participants {
        let marks = (0..results.poll_options.len()).map(|index| {
            match participant.vote_at(index) {
                Some(vote) if vote >= 1 => "x".to_string(),
                _ => String::new(),
            }
        });
        table.push_row(std::iter::once(participant.display_name().to_string()).chain(marks));
    }
    table
}
