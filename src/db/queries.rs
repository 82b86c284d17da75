use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::models::{Comment, NewComment, NewPost, Post, PostWithComments, VoteCounts, VoteField};

/// Current UTC time as an RFC 3339 string with microsecond precision, so
/// `updated_at` visibly advances even for back-to-back mutations.
fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ========== Filtering ==========

/// Optional filter parameters for listing posts. Values are assumed to be
/// already validated (in particular `category` holds a stored enumeration
/// value).
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match on author.
    pub author: Option<String>,
    /// Case-insensitive substring match on title.
    pub title: Option<String>,
    /// Exact match on category.
    pub category: Option<String>,
}

impl PostFilter {
    /// Compose the WHERE clause and its bind values. Present predicates are
    /// ANDed; no predicates means every post matches.
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut fragments = Vec::new();
        let mut binds = Vec::new();

        if let Some(author) = &self.author {
            fragments.push(r"author LIKE ? ESCAPE '\'");
            binds.push(format!("%{}%", escape_like(author)));
        }
        if let Some(title) = &self.title {
            fragments.push(r"title LIKE ? ESCAPE '\'");
            binds.push(format!("%{}%", escape_like(title)));
        }
        if let Some(category) = &self.category {
            fragments.push("category = ?");
            binds.push(category.clone());
        }

        if fragments.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", fragments.join(" AND ")), binds)
        }
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', r"\\").replace('%', r"\%").replace('_', r"\_")
}

// ========== Posts ==========

/// Insert a new post, returning the stored row.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<Post> {
    let now = now_utc();
    sqlx::query_as(
        r"
        INSERT INTO posts (title, content, author, category, likes, dislikes, created_at, updated_at)
        VALUES (?, ?, ?, ?, 0, 0, ?, ?)
        RETURNING *
        ",
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.author)
    .bind(post.category.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
    .context("Failed to insert post")
}

/// Get a post by id.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// Get a post by id with its comments nested, in comment id order.
pub async fn get_post_with_comments(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<PostWithComments>> {
    let Some(post) = get_post(pool, id).await? else {
        return Ok(None);
    };
    let comments = list_comments(pool, id).await?;
    Ok(Some(PostWithComments { post, comments }))
}

/// Get the first post matching a title and author exactly.
pub async fn get_post_by_title_author(
    pool: &SqlitePool,
    title: &str,
    author: &str,
) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE title = ? AND author = ? ORDER BY id ASC LIMIT 1")
        .bind(title)
        .bind(author)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post by title and author")
}

/// Fully update a post's fields. Returns the updated row, or `None` if the
/// post does not exist. Counters and `created_at` are untouched.
pub async fn update_post(pool: &SqlitePool, id: i64, post: &NewPost) -> Result<Option<Post>> {
    sqlx::query_as(
        r"
        UPDATE posts
        SET title = ?, content = ?, author = ?, category = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        ",
    )
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.author)
    .bind(post.category.as_str())
    .bind(now_utc())
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to update post")
}

/// Delete a post. Comments are removed by the FK cascade within the same
/// statement. Returns whether a row was deleted.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

/// List posts matching the filter, in id ascending order.
pub async fn list_posts(
    pool: &SqlitePool,
    filter: &PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>> {
    let (where_sql, binds) = filter.where_clause();
    let sql = format!("SELECT * FROM posts{where_sql} ORDER BY id ASC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as(&sql);
    for value in &binds {
        query = query.bind(value);
    }

    query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")
}

/// Count posts matching the filter.
pub async fn count_posts(pool: &SqlitePool, filter: &PostFilter) -> Result<i64> {
    let (where_sql, binds) = filter.where_clause();
    let sql = format!("SELECT COUNT(*) FROM posts{where_sql}");

    let mut query = sqlx::query_scalar(&sql);
    for value in &binds {
        query = query.bind(value);
    }

    query.fetch_one(pool).await.context("Failed to count posts")
}

/// Atomically increment one of a post's vote counters.
///
/// The `+1` happens inside a single UPDATE so concurrent votes are never
/// lost to read-modify-write races; RETURNING gives the post-increment
/// counter values. Returns `None` if the post does not exist.
pub async fn increment_vote(
    pool: &SqlitePool,
    id: i64,
    field: VoteField,
) -> Result<Option<VoteCounts>> {
    let sql = match field {
        VoteField::Likes => {
            r"
            UPDATE posts SET likes = likes + 1, updated_at = ?
            WHERE id = ?
            RETURNING likes, dislikes
            "
        }
        VoteField::Dislikes => {
            r"
            UPDATE posts SET dislikes = dislikes + 1, updated_at = ?
            WHERE id = ?
            RETURNING likes, dislikes
            "
        }
    };

    sqlx::query_as(sql)
        .bind(now_utc())
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to increment vote counter")
}

/// Check whether a post exists.
pub async fn post_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check post existence")
}

// ========== Comments ==========

/// List a post's comments in id ascending order.
pub async fn list_comments(pool: &SqlitePool, post_id: i64) -> Result<Vec<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE post_id = ? ORDER BY id ASC")
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")
}

/// Get a comment by id, constrained to the stated post.
pub async fn get_comment(
    pool: &SqlitePool,
    post_id: i64,
    comment_id: i64,
) -> Result<Option<Comment>> {
    sqlx::query_as("SELECT * FROM comments WHERE id = ? AND post_id = ?")
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch comment")
}

/// Insert a new comment under a post, returning the stored row.
pub async fn insert_comment(
    pool: &SqlitePool,
    post_id: i64,
    comment: &NewComment,
) -> Result<Comment> {
    let now = now_utc();
    sqlx::query_as(
        r"
        INSERT INTO comments (post_id, content, author, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        ",
    )
    .bind(post_id)
    .bind(&comment.content)
    .bind(&comment.author)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
    .context("Failed to insert comment")
}

/// Fully update a comment's fields. Returns the updated row, or `None` if
/// no comment with that id belongs to the stated post.
pub async fn update_comment(
    pool: &SqlitePool,
    post_id: i64,
    comment_id: i64,
    comment: &NewComment,
) -> Result<Option<Comment>> {
    sqlx::query_as(
        r"
        UPDATE comments
        SET content = ?, author = ?, updated_at = ?
        WHERE id = ? AND post_id = ?
        RETURNING *
        ",
    )
    .bind(&comment.content)
    .bind(&comment.author)
    .bind(now_utc())
    .bind(comment_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await
    .context("Failed to update comment")
}

/// Delete a comment, constrained to the stated post. Returns whether a row
/// was deleted.
pub async fn delete_comment(pool: &SqlitePool, post_id: i64, comment_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ? AND post_id = ?")
        .bind(comment_id)
        .bind(post_id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}
