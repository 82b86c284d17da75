//! Integration tests for the vote endpoint and the atomicity of the
//! counter increment.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use blog_post_api::config::Config;
use blog_post_api::db::{increment_vote, insert_post, Category, Database, NewPost, VoteField};
use blog_post_api::web::{create_app, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_app() -> (Router, Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");

    let config = Config {
        database_path: db_path,
        web_host: "127.0.0.1".to_string(),
        web_port: 0,
    };

    let app = create_app(AppState::new(config, db.clone()));
    (app, db, temp_dir)
}

async fn create_post(db: &Database) -> i64 {
    let new_post = NewPost {
        title: "Post".to_string(),
        content: "X".to_string(),
        author: "Alice".to_string(),
        category: Category::Other,
    };
    insert_post(db.pool(), &new_post)
        .await
        .expect("Failed to insert post")
        .id
}

fn vote_request(post_id: i64, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/posts/{post_id}/vote/"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_like_and_dislike_increment_counters() {
    let (app, db, _temp_dir) = setup_app().await;
    let post_id = create_post(&db).await;

    let response = app
        .clone()
        .oneshot(vote_request(post_id, &json!({"like": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let counters = body_json(response).await;
    assert_eq!(counters, json!({"likes": 1, "dislikes": 0}));

    let response = app
        .oneshot(vote_request(post_id, &json!({"like": false})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let counters = body_json(response).await;
    assert_eq!(counters, json!({"likes": 1, "dislikes": 1}));
}

#[tokio::test]
async fn test_string_flags_are_accepted_case_insensitively() {
    let (app, db, _temp_dir) = setup_app().await;
    let post_id = create_post(&db).await;

    let response = app
        .clone()
        .oneshot(vote_request(post_id, &json!({"like": "TRUE"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["likes"], 1);

    let response = app
        .oneshot(vote_request(post_id, &json!({"like": "False"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["dislikes"], 1);
}

#[tokio::test]
async fn test_vote_advances_updated_at_but_not_created_at() {
    let (app, db, _temp_dir) = setup_app().await;
    let post_id = create_post(&db).await;

    let fetch = |app: Router| async move {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/posts/{post_id}/"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        body_json(response).await
    };

    let before = fetch(app.clone()).await;

    let response = app
        .clone()
        .oneshot(vote_request(post_id, &json!({"like": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = fetch(app).await;
    assert_eq!(after["created_at"], before["created_at"]);
    assert_ne!(after["updated_at"], before["updated_at"]);
}

#[tokio::test]
async fn test_invalid_flags_rejected_without_mutation() {
    let (app, db, _temp_dir) = setup_app().await;
    let post_id = create_post(&db).await;

    for body in [json!({}), json!({"like": null}), json!({"like": "maybe"}), json!({"like": 1})] {
        let response = app
            .clone()
            .oneshot(vote_request(post_id, &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let error = body_json(response).await;
        assert_eq!(error["error"], "`like` must be true or false.");
    }

    // Counters are untouched after every rejection.
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/posts/{post_id}/"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let post = body_json(response).await;
    assert_eq!(post["likes"], 0);
    assert_eq!(post["dislikes"], 0);
}

#[tokio::test]
async fn test_vote_on_missing_post_is_404() {
    let (app, _db, _temp_dir) = setup_app().await;

    let response = app
        .oneshot(vote_request(999, &json!({"like": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_votes_are_never_lost() {
    let (_app, db, _temp_dir) = setup_app().await;
    let post_id = create_post(&db).await;

    const LIKES: usize = 20;
    const DISLIKES: usize = 10;

    let mut handles = Vec::new();
    for i in 0..(LIKES + DISLIKES) {
        let pool = db.pool().clone();
        let field = if i < LIKES {
            VoteField::Likes
        } else {
            VoteField::Dislikes
        };
        handles.push(tokio::spawn(async move {
            increment_vote(&pool, post_id, field)
                .await
                .expect("Vote failed")
                .expect("Post disappeared");
        }));
    }
    for handle in handles {
        handle.await.expect("Vote task panicked");
    }

    let counters = increment_vote(db.pool(), post_id, VoteField::Likes)
        .await
        .expect("Final vote failed")
        .expect("Post disappeared");
    assert_eq!(counters.likes as usize, LIKES + 1);
    assert_eq!(counters.dislikes as usize, DISLIKES);
}
