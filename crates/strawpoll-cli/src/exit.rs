use strawpoll_api::ApiError;
use strawpoll_core::CoreError;
use thiserror::Error;

pub const SUCCESS: i32 = 0;
pub const ERROR: i32 = 1;
pub const USAGE: i32 = 2;
pub const AUTH: i32 = 3;
pub const API: i32 = 4;
pub const RATE_LIMIT: i32 = 5;

/// Failures raised by the command layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("authentication required: no API key configured (run 'strawpoll auth set-key' or set STRAWPOLL_API_KEY)")]
    MissingApiKey,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }
}

/// Map an error chain to a process exit status.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            return api_exit_code(api);
        }
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return match cli {
                CliError::Usage(_) => USAGE,
                CliError::MissingApiKey => AUTH,
            };
        }
        if cause.downcast_ref::<CoreError>().is_some() {
            return USAGE;
        }
    }
    ERROR
}

fn api_exit_code(err: &ApiError) -> i32 {
    match err.root() {
        ApiError::Auth { .. } => AUTH,
        ApiError::RateLimited { .. } => RATE_LIMIT,
        ApiError::Status { .. } => API,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::time::Duration;

    fn wrapped(err: ApiError) -> anyhow::Error {
        Err::<(), _>(err.context("get poll"))
            .context("meeting results")
            .unwrap_err()
    }

    #[test]
    fn api_errors_map_through_context() {
        let auth = ApiError::Auth {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(exit_code(&wrapped(auth)), AUTH);

        let limited = ApiError::RateLimited {
            message: "slow down".into(),
            retry_after: Duration::from_secs(3),
        };
        assert_eq!(exit_code(&wrapped(limited)), RATE_LIMIT);

        let status = ApiError::Status {
            status: 404,
            message: "Poll not found".into(),
        };
        assert_eq!(exit_code(&wrapped(status)), API);

        assert_eq!(exit_code(&wrapped(ApiError::Cancelled)), ERROR);
    }

    #[test]
    fn cli_and_validation_errors() {
        assert_eq!(exit_code(&CliError::MissingApiKey.into()), AUTH);
        assert_eq!(exit_code(&CliError::usage("specify a field").into()), USAGE);
        assert_eq!(
            exit_code(&CoreError::InvalidDate("tomorrow".into()).into()),
            USAGE
        );
        assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), ERROR);
    }

    #[test]
    fn message_chain_reads_outside_in() {
        let err = wrapped(ApiError::Status {
            status: 404,
            message: "Poll not found".into(),
        });
        assert_eq!(
            format!("{err:#}"),
            "meeting results: get poll: api error (404): Poll not found"
        );
    }
}
