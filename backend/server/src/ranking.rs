//! # Ranking
//!
//! Users by post count, posts by recency or by comment count.
//!
//! Every ranking needs the full user list plus one posts fetch per user.
//! Popular posts add one comments fetch per post. Fetches go through
//! [`fan_out`] so any single failure discards the whole ranking.
use std::str::FromStr;

use serde::Serialize;
use upstream::{Client, FetchError, Post};

use crate::fanout::fan_out;

pub const TOP_USERS: usize = 5;
pub const LATEST_POSTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPostCount {
    pub id: String,
    pub name: String,
    pub posts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: Post,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostType {
    #[default]
    Latest,
    Popular,
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(PostType::Latest),
            "popular" => Ok(PostType::Popular),
            other => Err(other.to_string()),
        }
    }
}

/// Highest post counts first. Equal counts keep their enumeration order.
pub fn top_users(mut counts: Vec<UserPostCount>, limit: usize) -> Vec<UserPostCount> {
    counts.sort_by(|a, b| b.posts.cmp(&a.posts));
    counts.truncate(limit);
    counts
}

pub fn latest_posts(mut posts: Vec<RankedPost>, limit: usize) -> Vec<RankedPost> {
    posts.sort_by(|a, b| b.post.id.value().cmp(&a.post.id.value()));
    posts.truncate(limit);
    posts
}

/// Every post tied at the highest comment count, in input order.
pub fn popular_posts(posts: Vec<RankedPost>) -> Vec<RankedPost> {
    let Some(max) = posts.iter().map(comment_count).max() else {
        return Vec::new();
    };

    posts
        .into_iter()
        .filter(|post| comment_count(post) == max)
        .collect()
}

fn comment_count(post: &RankedPost) -> usize {
    post.comment_count.unwrap_or(0)
}

pub async fn user_post_counts(
    client: &Client,
    fanout_limit: usize,
) -> Result<Vec<UserPostCount>, FetchError> {
    let users = client.users().await?;

    fan_out(users, fanout_limit, |user| async move {
        let posts = client.user_posts(&user.id).await?;

        Ok::<_, FetchError>(UserPostCount {
            id: user.id,
            name: user.name,
            posts: posts.len(),
        })
    })
    .await
}

pub async fn all_posts(
    client: &Client,
    fanout_limit: usize,
) -> Result<Vec<RankedPost>, FetchError> {
    let users = client.users().await?;

    let per_user = fan_out(users, fanout_limit, |user| async move {
        let posts = client.user_posts(&user.id).await?;

        Ok::<_, FetchError>(
            posts
                .into_iter()
                .map(|post| RankedPost {
                    post,
                    username: user.name.clone(),
                    comment_count: None,
                })
                .collect::<Vec<_>>(),
        )
    })
    .await?;

    Ok(per_user.into_iter().flatten().collect())
}

pub async fn with_comment_counts(
    client: &Client,
    posts: Vec<RankedPost>,
    fanout_limit: usize,
) -> Result<Vec<RankedPost>, FetchError> {
    fan_out(posts, fanout_limit, |mut post| async move {
        let comments = client.post_comments(&post.post.id.to_string()).await?;
        post.comment_count = Some(comments.comment_count());

        Ok::<_, FetchError>(post)
    })
    .await
}
