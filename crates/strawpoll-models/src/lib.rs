pub mod pagination;
pub mod poll;
pub mod wire;

pub use pagination::{Pagination, PollListResponse};
pub use poll::{
    CreatePollRequest, Poll, PollConfig, PollMeta, PollOption, PollParticipant, PollResults,
    UpdatePollRequest,
};
pub use wire::{
    DuplicationChecking, EditVotePermissions, OptionType, PollType, ResultsVisibility, VoteType,
};
