//! Display-oriented computations over poll data: meeting availability,
//! ranking scores, result tables and option editing.

pub mod deadline;
pub mod error;
pub mod meeting;
pub mod options;
pub mod ranking;
pub mod results;
pub mod table;

pub use chrono_tz::Tz;
pub use deadline::parse_deadline;
pub use error::CoreError;
pub use meeting::{build_grid, resolve_timezone, MeetingGrid, PollTimezone};
pub use ranking::RankingReport;
pub use table::Table;
