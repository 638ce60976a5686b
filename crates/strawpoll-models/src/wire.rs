//! String enums as they travel on the wire.
//!
//! The service documentation disagrees with the live API in two places
//! (`hidden` vs `never`, `ranking` vs `ranked_choice`); the values here are
//! the ones the API actually accepts.
//!
//! Responses may carry values this crate does not know yet. Those decode as
//! `Unknown` instead of failing the whole payload; parsing user input with
//! `FromStr` only accepts the listed values.

use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
            /// A value the service sent that is not listed above.
            #[serde(other, rename = "unknown")]
            Unknown,
        }

        impl $name {
            /// Every value accepted from user input. Excludes `Unknown`.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unknown => "unknown",
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                $(
                    if normalized == $wire {
                        return Ok($name::$variant);
                    }
                )+
                let expected: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                Err(format!(
                    "invalid value '{}' (expected one of: {})",
                    s.trim(),
                    expected.join(", ")
                ))
            }
        }
    };
}

wire_enum! {
    PollType {
        MultipleChoice => "multiple_choice",
        Meeting => "meeting",
        Ranking => "ranking",
    }
}

impl PollType {
    /// Human-friendly label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            PollType::MultipleChoice => "Multiple Choice",
            PollType::Meeting => "Meeting",
            PollType::Ranking => "Ranking",
            PollType::Unknown => "Other",
        }
    }
}

wire_enum! {
    /// Interpretation of [`crate::PollOption::value`].
    OptionType {
        Text => "text",
        Date => "date",
        TimeRange => "time_range",
    }
}

wire_enum! {
    VoteType {
        Default => "default",
        ParticipantGrid => "participant_grid",
    }
}

wire_enum! {
    DuplicationChecking {
        Ip => "ip",
        Session => "session",
        None => "none",
    }
}

wire_enum! {
    ResultsVisibility {
        Always => "always",
        AfterDeadline => "after_deadline",
        AfterVote => "after_vote",
        Hidden => "hidden",
    }
}

wire_enum! {
    EditVotePermissions {
        Admin => "admin",
        AdminVoter => "admin_voter",
        Voter => "voter",
        Nobody => "nobody",
    }
}
