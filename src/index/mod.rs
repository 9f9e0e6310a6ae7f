use crate::releases::ReleaseMap;
use thiserror::Error;

mod pypi;
pub use pypi::{Pypi, parse_releases};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("`{url}` does not exist")]
    NotFound { url: String },
    #[error("unexpected response code {code} from `{url}`")]
    Status { url: String, code: u32 },
    #[error("failed to fetch `{url}`: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("malformed response from `{url}`: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where a project's release history comes from.
pub trait ReleaseSource: Sync {
    fn releases(&self, name: &str) -> Result<ReleaseMap, FetchError>;
}

impl<F> ReleaseSource for F
where
    F: Fn(&str) -> Result<ReleaseMap, FetchError> + Sync,
{
    fn releases(&self, name: &str) -> Result<ReleaseMap, FetchError> {
        self(name)
    }
}
