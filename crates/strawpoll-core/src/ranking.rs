//! Borda count scoring for ranking polls.
//!
//! Each participant's vote for an option is the 0-based rank they gave it.
//! With `n` options, first place earns `n` points and last place earns 1.

use serde::Serialize;
use strawpoll_models::{PollParticipant, PollResults};

use crate::table::Table;

/// Rank stored for `option_index`, if it is a valid position among `n`.
fn rank_of(participant: &PollParticipant, option_index: usize, n: usize) -> Option<usize> {
    participant
        .vote_at(option_index)
        .and_then(|rank| usize::try_from(rank).ok())
        .filter(|rank| *rank < n)
}

/// Borda score per option. Missing or out-of-range ranks add nothing.
pub fn borda_scores(option_count: usize, participants: &[PollParticipant]) -> Vec<u64> {
    (0..option_count)
        .map(|index| {
            participants
                .iter()
                .filter_map(|p| rank_of(p, index, option_count))
                .map(|rank| (option_count - rank) as u64)
                .sum()
        })
        .collect()
}

/// `breakdown[option][rank]` counts how many participants put `option` at
/// `rank`.
pub fn position_breakdown(option_count: usize, participants: &[PollParticipant]) -> Vec<Vec<u64>> {
    let mut breakdown = vec![vec![0u64; option_count]; option_count];
    for participant in participants {
        for (index, counts) in breakdown.iter_mut().enumerate() {
            if let Some(rank) = rank_of(participant, index, option_count) {
                counts[rank] += 1;
            }
        }
    }
    breakdown
}

/// Highest score any single option can reach.
pub fn max_score(option_count: usize, participant_count: usize) -> u64 {
    (option_count * participant_count) as u64
}

/// Share of the maximum score, 0 when nothing can be scored.
pub fn percentage(score: u64, max_score: u64) -> f64 {
    if max_score == 0 {
        return 0.0;
    }
    score as f64 / max_score as f64 * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOption {
    pub id: String,
    pub value: String,
    pub score: u64,
    pub percentage: f64,
    pub positions: Vec<u64>,
}

/// Results enriched with scores, in poll option order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub id: String,
    #[serde(rename = "voteCount")]
    pub vote_count: u64,
    #[serde(rename = "participantCount")]
    pub participant_count: u64,
    pub options: Vec<RankedOption>,
}

impl RankingReport {
    pub fn from_results(results: &PollResults) -> Self {
        let n = results.poll_options.len();
        let participants = &results.poll_participants;
        let scores = borda_scores(n, participants);
        let breakdown = position_breakdown(n, participants);
        let max = max_score(n, participants.len());

        let options = results
            .poll_options
            .iter()
            .zip(scores)
            .zip(breakdown)
            .map(|((option, score), positions)| RankedOption {
                id: option.id.clone().unwrap_or_default(),
                value: option.value.clone(),
                score,
                percentage: percentage(score, max),
                positions,
            })
            .collect();

        Self {
            id: results.id.clone(),
            vote_count: results.vote_count,
            participant_count: results.participant_count,
            options,
        }
    }

    /// Option, score and percentage, best first.
    pub fn score_table(&self) -> Table {
        let mut ranked: Vec<&RankedOption> = self.options.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        let mut table = Table::new(["Option", "Score", "Percentage"]);
        for option in ranked {
            table.push_row([
                option.value.clone(),
                option.score.to_string(),
                format!("{:.1}%", option.percentage),
            ]);
        }
        table
    }

    /// Per-option counts for each rank, headed `#1`, `#2`, ...
    pub fn breakdown_table(&self) -> Table {
        let headers = std::iter::once("Option".to_string())
            .chain((1..=self.options.len()).map(|rank| format!("#{rank}")));
        let mut table = Table::new(headers);
        for option in &self.options {
            let row = std::iter::once(option.value.clone())
                .chain(option.positions.iter().map(u64::to_string));
            table.push_row(row);
        }
        table
    }
}
