use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use upstream::NumberKind;

use crate::{
    error::AppError,
    ranking::{
        LATEST_POSTS, PostType, TOP_USERS, all_posts, latest_posts, popular_posts, top_users,
        user_post_counts, with_comment_counts,
    },
    state::{NumbersState, RankingState},
};

#[derive(Deserialize)]
pub struct PostsQuery {
    #[serde(rename = "type")]
    post_type: Option<String>,
}

pub async fn top_users_handler(
    State(state): State<Arc<RankingState>>,
) -> Result<impl IntoResponse, AppError> {
    let counts = user_post_counts(&state.client, state.config.fanout_limit)
        .await
        .map_err(AppError::upstream("Failed to fetch users"))?;

    let top = top_users(counts, TOP_USERS);

    Ok((StatusCode::OK, Json(json!({ "top_users": top }))))
}

pub async fn posts_handler(
    State(state): State<Arc<RankingState>>,
    Query(query): Query<PostsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let post_type = match query.post_type.as_deref().filter(|t| !t.is_empty()) {
        None => PostType::default(),
        Some(raw) => raw.parse().map_err(AppError::InvalidPostType)?,
    };

    let fanout_limit = state.config.fanout_limit;
    let posts = all_posts(&state.client, fanout_limit)
        .await
        .map_err(AppError::upstream("Failed to fetch posts"))?;

    let body = match post_type {
        PostType::Latest => json!({ "latest_posts": latest_posts(posts, LATEST_POSTS) }),
        PostType::Popular => {
            let counted = with_comment_counts(&state.client, posts, fanout_limit)
                .await
                .map_err(AppError::upstream("Failed to fetch comments"))?;

            json!({ "popular_posts": popular_posts(counted) })
        }
    };

    Ok((StatusCode::OK, Json(body)))
}

pub async fn comments_handler(
    State(state): State<Arc<RankingState>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let comments = state
        .client
        .post_comments(&post_id)
        .await
        .map_err(AppError::upstream(format!(
            "Failed to fetch comments for post {post_id}"
        )))?;

    Ok((StatusCode::OK, Json(comments)))
}

pub async fn numbers_handler(
    State(state): State<Arc<NumbersState>>,
    Path(type_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind =
        NumberKind::from_code(&type_code).ok_or(AppError::InvalidNumberType(type_code))?;

    let batch = state
        .client
        .numbers(kind)
        .await
        .map_err(AppError::upstream("Failed to fetch numbers"))?;

    let report = state.window.ingest_batch(batch);

    #[cfg(feature = "verbose")]
    info!("{kind}: window now {:?}", report.window_curr_state);

    info!(
        "Ingested {} {kind}, window holds {}, avg {}",
        report.numbers.len(),
        report.window_curr_state.len(),
        report.avg
    );

    Ok((StatusCode::OK, Json(report)))
}
