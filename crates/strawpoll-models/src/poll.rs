use serde::{Deserialize, Deserializer, Serialize};

use crate::wire::{
    DuplicationChecking, EditVotePermissions, OptionType, PollType, ResultsVisibility, VoteType,
};

/// Fallback display name for participants who did not leave one.
pub const ANONYMOUS: &str = "Anonymous";

/// Read JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Poll {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub poll_type: Option<PollType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll_options: Vec<PollOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_config: Option<PollConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_meta: Option<PollMeta>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub reset_at: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

impl Poll {
    /// Total votes as reported by the poll metadata, zero when absent.
    pub fn vote_count(&self) -> u64 {
        self.poll_meta
            .as_ref()
            .and_then(|meta| meta.vote_count)
            .unwrap_or(0)
    }

    /// IANA timezone name attached to the poll, if any.
    pub fn timezone(&self) -> Option<&str> {
        self.poll_meta
            .as_ref()
            .and_then(|meta| meta.timezone.as_deref())
            .filter(|tz| !tz.is_empty())
    }

    pub fn location(&self) -> Option<&str> {
        self.poll_meta
            .as_ref()
            .and_then(|meta| meta.location.as_deref())
            .filter(|loc| !loc.is_empty())
    }

    pub fn is_type(&self, poll_type: PollType) -> bool {
        self.poll_type == Some(poll_type)
    }
}

/// A single votable entry.
///
/// `value` is free text for text options, `YYYY-MM-DD` for date options and
/// the original user input for time ranges (whose bounds live in
/// `start_time`/`end_time` as Unix seconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_votes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_write_in: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl PollOption {
    pub fn text(value: impl Into<String>, position: u32) -> Self {
        Self {
            option_type: Some(OptionType::Text),
            value: value.into(),
            position,
            ..Self::default()
        }
    }

    pub fn votes(&self) -> u64 {
        self.vote_count.unwrap_or(0)
    }
}

/// Poll settings. Every field is optional: `None` means "let the service
/// decide", which is not the same as `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<VoteType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_indeterminate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_other_option: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_vpn_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplication_checking: Option<DuplicationChecking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_vote_permissions: Option<EditVotePermissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_participants: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multiple_choice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_choices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_choice_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_choice_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_winners: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomize_options: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_voter_names: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_visibility: Option<ResultsVisibility>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// IANA timezone, e.g. `Europe/Berlin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Read-only counters, never sent back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollResults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i64,
    // The results endpoint uses camelCase for these two counters.
    #[serde(rename = "voteCount", default, deserialize_with = "null_as_default")]
    pub vote_count: u64,
    #[serde(rename = "participantCount", default, deserialize_with = "null_as_default")]
    pub participant_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll_options: Vec<PollOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll_participants: Vec<PollParticipant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollParticipant {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_edit_allowed: bool,
    /// One entry per option, in option order. Meeting polls use
    /// 1 = yes, 0 = no, 2 = maybe; ranking polls store the 0-based rank.
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll_votes: Vec<Option<i64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
}

impl PollParticipant {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            ANONYMOUS
        } else {
            &self.name
        }
    }

    /// Vote recorded for the option at `index`, `None` when absent.
    pub fn vote_at(&self, index: usize) -> Option<i64> {
        self.poll_votes.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub title: String,
    /// Left unset, the client sends `multiple_choice`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub poll_type: Option<PollType>,
    pub poll_options: Vec<PollOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_config: Option<PollConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_meta: Option<PollMeta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePollRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poll_options: Vec<PollOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_config: Option<PollConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_meta: Option<PollMeta>,
}

impl UpdatePollRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.poll_options.is_empty()
            && self.poll_config.is_none()
            && self.poll_meta.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn poll_decodes_meeting_payload() {
        let raw = json!({
            "id": "NPgxkzPqrn2",
            "title": "Team sync",
            "type": "meeting",
            "poll_options": [
                {"id": "a", "type": "date", "value": "2024-08-13", "position": 0, "date": "2024-08-13"},
                {"id": "b", "type": "time_range", "value": "x", "position": 1,
                 "start_time": 1723543200, "end_time": 1723546800}
            ],
            "poll_meta": {"timezone": "Europe/Berlin", "vote_count": 4},
            "created_at": 1723500000,
            "updated_at": null,
            "version": "v1"
        });
        let poll: Poll = serde_json::from_value(raw).expect("decode");
        assert!(poll.is_type(PollType::Meeting));
        assert_eq!(poll.poll_options.len(), 2);
        assert_eq!(poll.poll_options[1].option_type, Some(OptionType::TimeRange));
        assert_eq!(poll.poll_options[1].start_time, Some(1_723_543_200));
        assert_eq!(poll.timezone(), Some("Europe/Berlin"));
        assert_eq!(poll.vote_count(), 4);
        assert_eq!(poll.updated_at, None);
    }

    #[test]
    fn unset_config_fields_are_not_serialized() {
        let config = PollConfig {
            is_private: Some(false),
            ..PollConfig::default()
        };
        let value = serde_json::to_value(&config).expect("encode");
        assert_eq!(value, json!({"is_private": false}));
    }

    #[test]
    fn results_use_camel_case_counters() {
        let raw = json!({
            "id": "abc",
            "voteCount": 7,
            "participantCount": 3,
            "poll_options": [],
            "poll_participants": [
                {"id": "p1", "name": "", "poll_votes": [1, null, 2], "created_at": 0}
            ]
        });
        let results: PollResults = serde_json::from_value(raw).expect("decode");
        assert_eq!(results.vote_count, 7);
        assert_eq!(results.participant_count, 3);
        let participant = &results.poll_participants[0];
        assert_eq!(participant.display_name(), ANONYMOUS);
        assert_eq!(participant.vote_at(0), Some(1));
        assert_eq!(participant.vote_at(1), None);
        assert_eq!(participant.vote_at(9), None);
    }

    #[test]
    fn null_participant_fields_fall_back_to_defaults() {
        let raw = json!({
            "id": "abc",
            "voteCount": null,
            "participantCount": 1,
            "poll_options": [{"id": "o1", "type": "text", "value": null, "position": 0}],
            "poll_participants": [
                {"id": null, "name": null, "country_code": null, "is_edit_allowed": null,
                 "poll_votes": [0, 1], "created_at": null}
            ]
        });
        let results: PollResults = serde_json::from_value(raw).expect("decode");
        assert_eq!(results.vote_count, 0);
        assert_eq!(results.poll_options[0].value, "");
        let participant = &results.poll_participants[0];
        assert_eq!(participant.display_name(), ANONYMOUS);
        assert_eq!(participant.country_code, "");
        assert!(!participant.is_edit_allowed);
        assert_eq!(participant.vote_at(1), Some(1));
    }

    #[test]
    fn poll_of_unlisted_type_still_decodes() {
        let raw = json!({
            "id": "img1",
            "title": null,
            "type": "image_poll",
            "poll_options": [{"type": "image", "value": "cat.png", "position": 0}],
            "poll_config": {"vote_type": "weighted", "results_visibility": "always"},
            "created_at": 1723500000,
            "version": null
        });
        let poll: Poll = serde_json::from_value(raw).expect("decode");
        assert_eq!(poll.poll_type, Some(PollType::Unknown));
        assert!(!poll.is_type(PollType::Meeting));
        assert_eq!(poll.title, "");
        assert_eq!(poll.poll_options[0].option_type, Some(OptionType::Unknown));
        let config = poll.poll_config.expect("config");
        assert_eq!(config.vote_type, Some(VoteType::Unknown));
        assert_eq!(config.results_visibility, Some(ResultsVisibility::Always));
    }

    #[test]
    fn empty_update_request_serializes_to_empty_object() {
        let req = UpdatePollRequest::default();
        assert!(req.is_empty());
        assert_eq!(serde_json::to_value(&req).expect("encode"), json!({}));
    }
}
