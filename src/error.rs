use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

/// Failures that abort a run before any probe is dispatched.
///
/// Per-probe failures never show up here; they are captured into the
/// probe's outcome and classified like any other result.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("API key is not set; pass --api-key or export {0}")]
    MissingApiKey(&'static str),

    #[error("invalid endpoint URL `{url}`: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
