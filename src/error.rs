use thiserror::Error;

/// Network or API failure while talking to the archive service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed payload from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("archive location {0} does not end in a YYYY/MM segment")]
    ArchiveLocation(String),
    #[error("failed to start fetch workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown result code `{0}`")]
    UnknownResult(String),
    #[error("annotation has no `{0}` tag")]
    MissingTag(String),
    #[error("malformed timezone `{0}`")]
    MalformedTimezone(String),
    #[error("malformed date `{0}`")]
    MalformedDate(String),
    #[error("malformed time `{0}`")]
    MalformedTime(String),
    #[error("malformed time control `{0}`")]
    MalformedTimeControl(String),
    #[error("field `{0}` has the wrong type")]
    MalformedField(&'static str),
}

/// A raw game record that could not be turned into a `GameRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("game {url}: {kind}")]
pub struct ParseError {
    pub url: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(url: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
