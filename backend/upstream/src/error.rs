use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream {endpoint} answered {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("Malformed payload from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read credential file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed credential file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}
