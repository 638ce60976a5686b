use std::fmt;
use std::str::FromStr;

use strawpoll_models::{
    CreatePollRequest, Poll, PollListResponse, PollResults, PollType, UpdatePollRequest,
};
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::error::{ApiError, ResultExt};

/// Which of the caller's polls to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListKind {
    #[default]
    Created,
    Participated,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Created => "created",
            ListKind::Participated => "participated",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(ListKind::Created),
            "participated" => Ok(ListKind::Participated),
            other => Err(format!(
                "invalid list type '{other}' (expected one of: created, participated)"
            )),
        }
    }
}

impl Client {
    /// POST /polls. An unset poll type is sent as `multiple_choice`.
    pub async fn create_poll(
        &self,
        mut request: CreatePollRequest,
        cancel: &CancellationToken,
    ) -> Result<Poll, ApiError> {
        request.poll_type.get_or_insert(PollType::MultipleChoice);
        self.post("/polls", &request, cancel)
            .await
            .context("create poll")
    }

    pub async fn get_poll(&self, id: &str, cancel: &CancellationToken) -> Result<Poll, ApiError> {
        self.get(&poll_path(id), cancel).await.context("get poll")
    }

    pub async fn get_poll_results(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<PollResults, ApiError> {
        self.get(&format!("{}/results", poll_path(id)), cancel)
            .await
            .context("get poll results")
    }

    pub async fn delete_poll(&self, id: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.delete(&poll_path(id), cancel)
            .await
            .context("delete poll")
    }

    pub async fn update_poll(
        &self,
        id: &str,
        request: &UpdatePollRequest,
        cancel: &CancellationToken,
    ) -> Result<Poll, ApiError> {
        self.put(&poll_path(id), request, cancel)
            .await
            .context("update poll")
    }

    /// DELETE /polls/{id}/results clears every vote but keeps the poll.
    pub async fn reset_poll_results(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ApiError> {
        self.delete(&format!("{}/results", poll_path(id)), cancel)
            .await
            .context("reset poll results")
    }

    pub async fn list_my_polls(
        &self,
        kind: ListKind,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<PollListResponse, ApiError> {
        let path = format!("/users/@me/polls?type={kind}&page={page}&limit={limit}");
        self.get(&path, cancel).await.context("list polls")
    }
}

fn poll_path(id: &str) -> String {
    format!("/polls/{id}")
}
