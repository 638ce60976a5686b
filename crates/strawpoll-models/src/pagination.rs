use serde::{Deserialize, Serialize};

use crate::poll::{null_as_default, Poll};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

impl Pagination {
    /// Number of pages, never less than one. A zero limit counts as a
    /// single page instead of dividing by zero.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(self.limit).max(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Poll>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(total: u64, limit: u64) -> u64 {
        Pagination {
            page: 1,
            limit,
            total,
        }
        .total_pages()
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(pages(45, 20), 3);
        assert_eq!(pages(40, 20), 2);
        assert_eq!(pages(1, 20), 1);
    }

    #[test]
    fn total_pages_is_guarded() {
        assert_eq!(pages(0, 20), 1);
        assert_eq!(pages(45, 0), 1);
        assert_eq!(pages(0, 0), 1);
    }
}
