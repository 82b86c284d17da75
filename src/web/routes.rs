use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::throttle;
use super::AppState;
use crate::db;
use crate::db::{Category, Post, PostFilter, PostWithComments, VoteCounts};
use crate::pagination::Page;
use crate::validate::{self, CommentInput, PostInput};

/// Create the router with all routes, grouped by throttle scope.
pub fn router(state: AppState) -> Router<AppState> {
    let posts = Router::new()
        .route("/posts/", get(list_posts).post(create_post))
        .route("/posts/by/:title/:author/", get(post_by_title_author))
        .route(
            "/posts/:post_id/",
            get(post_detail).put(update_post).delete(delete_post),
        )
        .route(
            "/posts/:post_id/comments/",
            get(list_comments).post(create_comment),
        )
        .route(
            "/posts/:post_id/comments/:comment_id/",
            get(comment_detail).put(update_comment).delete(delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            throttle::posts_scope,
        ));

    let votes = Router::new()
        .route("/posts/:post_id/vote/", post(vote_post))
        .route_layer(middleware::from_fn_with_state(state, throttle::votes_scope));

    Router::new()
        .merge(posts)
        .merge(votes)
        .route("/healthz", get(health))
}

/// Paginated list body: total matching count plus the current page's items.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    count: i64,
    results: Vec<T>,
}

// ========== Posts ==========

async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<PageResponse<Post>>> {
    let filter = filter_from_params(&params)?;
    let page = Page::from_params(
        params.get("page").map(String::as_str),
        params.get("page_size").map(String::as_str),
    );

    let count = db::count_posts(state.db.pool(), &filter).await?;
    // A page past the end yields an empty result list with 200, not an error.
    let results = db::list_posts(state.db.pool(), &filter, page.limit(), page.offset()).await?;

    Ok(Json(PageResponse { count, results }))
}

/// Build the list filter from query parameters. Empty values are treated as
/// absent; a category outside the enumeration is a bad request rather than
/// an empty match.
fn filter_from_params(params: &HashMap<String, String>) -> Result<PostFilter, ApiError> {
    let mut filter = PostFilter::default();

    if let Some(author) = params.get("author").filter(|v| !v.is_empty()) {
        filter.author = Some(author.clone());
    }
    if let Some(title) = params.get("title").filter(|v| !v.is_empty()) {
        filter.title = Some(title.clone());
    }
    if let Some(category) = params.get("category").filter(|v| !v.is_empty()) {
        let category = Category::parse(category).ok_or_else(|| {
            ApiError::BadRequest(format!("\"{category}\" is not a valid category."))
        })?;
        filter.category = Some(category.as_str().to_string());
    }

    Ok(filter)
}

async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<PostWithComments>> {
    db::get_post_with_comments(state.db.pool(), post_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn post_by_title_author(
    State(state): State<AppState>,
    Path((title, author)): Path<(String, String)>,
) -> ApiResult<Json<Post>> {
    db::get_post_by_title_author(state.db.pool(), &title, &author)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> ApiResult<(StatusCode, Json<PostWithComments>)> {
    let new_post = validate::validate_post(&input).map_err(ApiError::Validation)?;
    let post = db::insert_post(state.db.pool(), &new_post).await?;

    tracing::info!(post_id = post.id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(PostWithComments {
            post,
            comments: Vec::new(),
        }),
    ))
}

async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(input): Json<PostInput>,
) -> ApiResult<Json<PostWithComments>> {
    let new_post = validate::validate_post(&input).map_err(ApiError::Validation)?;

    let post = db::update_post(state.db.pool(), post_id, &new_post)
        .await?
        .ok_or(ApiError::NotFound)?;
    let comments = db::list_comments(state.db.pool(), post_id).await?;

    Ok(Json(PostWithComments { post, comments }))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if db::delete_post(state.db.pool(), post_id).await? {
        tracing::info!(post_id, "Post deleted with its comments");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn vote_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<VoteCounts>> {
    let field = validate::parse_vote_flag(&body).map_err(ApiError::BadRequest)?;

    db::increment_vote(state.db.pool(), post_id, field)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

// ========== Comments ==========

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<Json<Vec<db::Comment>>> {
    if !db::post_exists(state.db.pool(), post_id).await? {
        return Err(ApiError::NotFound);
    }

    let comments = db::list_comments(state.db.pool(), post_id).await?;
    Ok(Json(comments))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(input): Json<CommentInput>,
) -> ApiResult<(StatusCode, Json<db::Comment>)> {
    if !db::post_exists(state.db.pool(), post_id).await? {
        return Err(ApiError::NotFound);
    }

    let new_comment = validate::validate_comment(&input).map_err(ApiError::Validation)?;
    let comment = db::insert_comment(state.db.pool(), post_id, &new_comment).await?;

    tracing::info!(post_id, comment_id = comment.id, "Comment created");

    Ok((StatusCode::CREATED, Json(comment)))
}

async fn comment_detail(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<Json<db::Comment>> {
    db::get_comment(state.db.pool(), post_id, comment_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn update_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(input): Json<CommentInput>,
) -> ApiResult<Json<db::Comment>> {
    let new_comment = validate::validate_comment(&input).map_err(ApiError::Validation)?;

    db::update_comment(state.db.pool(), post_id, comment_id, &new_comment)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn delete_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    if db::delete_comment(state.db.pool(), post_id, comment_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// ========== Misc ==========

async fn health() -> &'static str {
    "OK"
}
