//! Error taxonomy for the publishing pipeline.
//!
//! Two classes of failure exist:
//!
//! - [`Error`]: anything that goes wrong talking to the news, image, text
//!   generation or publishing services, plus local configuration and I/O
//!   problems. These propagate and abort the pipeline of the topic being
//!   processed.
//! - [`VideoServiceError`]: the declared failure class of the video search
//!   service. It is always recovered where it is raised (the article simply
//!   ships without a video) and never reaches the batch driver.
//!
//! An empty search result is never an error; it is an empty `Vec` or `None`.

use std::fmt;
use thiserror::Error;

/// The external service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    News,
    Images,
    TextGeneration,
    Publishing,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::News => "news search",
            Service::Images => "image search",
            Service::TextGeneration => "text generation",
            Service::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Failures that abort a topic's pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{service} request failed: {source}")]
    Request {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} response could not be decoded: {source}")]
    Decode {
        service: Service,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} reported an error: {message}")]
    Api { service: Service, message: String },

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("malformed XML-RPC payload: {0}")]
    Xml(String),

    #[error("invalid {service} url: {source}")]
    Url {
        service: Service,
        #[source]
        source: url::ParseError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn request(service: Service) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Error::Request { service, source }
    }

    pub(crate) fn decode(service: Service) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Error::Decode { service, source }
    }
}

/// The declared failure of the video search service.
#[derive(Debug, Error)]
pub enum VideoServiceError {
    #[error("video search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("video search returned {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("video search response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid video search url: {0}")]
    Url(#[source] url::ParseError),
}
