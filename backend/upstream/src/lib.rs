//! # Upstream
//!
//! Client for the evaluation service both backends proxy.
//!
//! ## Endpoints
//!
//! All relative to the configured base URL, all requiring a bearer token.
//!
//! - `users`: `{ "users": { "<id>": "<name>" } }`
//! - `users/<id>/posts`: `{ "posts": [ { "id": <int>, ... } ] }`
//! - `posts/<id>/comments`: `{ "comments": [ ... ] }`
//! - `primes`, `even`, `fibo`, `rand`: `{ "numbers": [ ... ] }`
//!
//! ## Semantics
//!
//! - One attempt per call, no retries
//! - Every call is bounded by the configured timeout
//! - Transport errors, non-2xx answers and malformed bodies all surface as [`FetchError`]

pub mod client;
pub mod credential;
pub mod error;
pub mod models;

pub use client::{Client, DEFAULT_TIMEOUT, UpstreamConfig};
pub use credential::{Credential, load_credential, resolve_credential};
pub use error::{CredentialError, FetchError};
pub use models::{
    CommentsPayload, DEFAULT_BASE_URL, NumberKind, Observation, Post, PostId, Resource, User,
};
