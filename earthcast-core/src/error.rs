use thiserror::Error;

/// Everything that can go wrong between sending a request and holding a
/// normalized value.
///
/// The public fetcher methods log these and hand back `None`/empty results;
/// the `try_*` variants return them as-is.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {service} failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    HttpStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed {service} response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },

    #[error("cannot parse timestamp '{value}': {reason}")]
    Parse { value: String, reason: String },
}

impl FetchError {
    pub(crate) fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            service,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(value: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Parse {
            value: value.to_string(),
            reason: err.to_string(),
        }
    }
}
