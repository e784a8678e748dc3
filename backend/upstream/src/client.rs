use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    credential::Credential,
    error::FetchError,
    models::{
        CommentsPayload, DEFAULT_BASE_URL, NumberKind, NumbersPayload, Observation, Post,
        PostsPayload, Resource, User, UsersPayload,
    },
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub credential: Option<Credential>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credential: None,
        }
    }
}

/// Single-attempt client for the evaluation service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl Client {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Builder)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential: config.credential.clone(),
        })
    }

    pub fn url(&self, resource: &Resource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }

    pub async fn fetch<T: DeserializeOwned>(&self, resource: &Resource) -> Result<T, FetchError> {
        let endpoint = self.url(resource);
        debug!("GET {endpoint}");

        let mut request = self.http.get(&endpoint);
        if let Some(credential) = &self.credential {
            request = request.header(AUTHORIZATION, format!("Bearer {}", credential.bearer()));
        }

        let response = request.send().await.map_err(|source| {
            warn!("Request to {endpoint} failed: {source}");
            FetchError::Request {
                endpoint: endpoint.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream {endpoint} answered {status}");
            return Err(FetchError::Status { endpoint, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Malformed payload from {endpoint}: {e}");
            FetchError::Decode {
                endpoint,
                reason: e.to_string(),
            }
        })
    }

    pub async fn users(&self) -> Result<Vec<User>, FetchError> {
        let payload: UsersPayload = self.fetch(&Resource::Users).await?;

        Ok(payload.into_users())
    }

    pub async fn user_posts(&self, user_id: &str) -> Result<Vec<Post>, FetchError> {
        let payload: PostsPayload = self
            .fetch(&Resource::UserPosts(user_id.to_string()))
            .await?;

        Ok(payload.posts)
    }

    pub async fn post_comments(&self, post_id: &str) -> Result<CommentsPayload, FetchError> {
        self.fetch(&Resource::PostComments(post_id.to_string()))
            .await
    }

    pub async fn numbers(&self, kind: NumberKind) -> Result<Vec<Observation>, FetchError> {
        let resource = Resource::Numbers(kind);
        let payload: NumbersPayload = self.fetch(&resource).await?;

        payload
            .numbers
            .into_iter()
            .map(|raw| {
                let shown = raw.to_string();
                Observation::new(kind, raw).ok_or_else(|| FetchError::Decode {
                    endpoint: self.url(&resource),
                    reason: format!("{shown} is not a finite number"),
                })
            })
            .collect()
    }
}
