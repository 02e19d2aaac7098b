use blog_api::{
    AppConfig, AppState, create_router,
    repository::{RepositoryState, SqliteRepository},
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
}

// Boots the full router on an ephemeral port against a private in-memory
// database. One connection, so every request shares the same data.
async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite in tests");
    SqliteRepository::create_schema(&pool)
        .await
        .expect("Failed to create schema in tests");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

async fn signup(client: &reqwest::Client, address: &str, id: &str) -> reqwest::Response {
    client
        .post(format!("{address}/auth/signup"))
        .json(&serde_json::json!({ "id": id, "name": id, "password": "1234" }))
        .send()
        .await
        .unwrap()
}

async fn signin_token(client: &reqwest::Client, address: &str, id: &str) -> String {
    let response = client
        .post(format!("{address}/auth/signin"))
        .form(&[("username", id), ("password", "1234")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client.get(&app.address).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "I'm Alive!");
}

#[tokio::test]
async fn test_signup_then_conflict() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = signup(&client, &app.address, "heumsi").await;
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "heumsi");
    assert_eq!(body["name"], "heumsi");
    // The digest must never appear in a response.
    assert!(body.get("password").is_none());

    let response = signup(&client, &app.address, "heumsi").await;
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "User already exist");
}

#[tokio::test]
async fn test_signin_wrong_password() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    signup(&client, &app.address, "heumsi").await;

    let response = client
        .post(format!("{}/auth/signin", app.address))
        .form(&[("username", "heumsi"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Password is incorrect");
}

#[tokio::test]
async fn test_protected_route_requires_bearer() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/users/me", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn test_signup_signin_post_flow() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    signup(&client, &app.address, "heumsi").await;
    let token = signin_token(&client, &app.address, "heumsi").await;

    // Create a post with the bearer token.
    let response = client
        .post(format!("{}/posts", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "first post", "content": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(location.starts_with("/posts/"));

    // The new resource is readable without authentication and carries the
    // author reference plus hypermedia links.
    let response = client
        .get(format!("{}{}", app.address, location))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "first post");
    assert_eq!(body["data"]["user"]["id"], "heumsi");
    assert_eq!(body["data"]["user"]["name"], "heumsi");
    let rels: Vec<&str> = body["data"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert!(rels.contains(&"self"));
    assert!(rels.contains(&"comments"));
    assert!(rels.contains(&"feedbacks"));
}

#[tokio::test]
async fn test_me_reflects_store_state() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    signup(&client, &app.address, "heumsi").await;
    let token = signin_token(&client, &app.address, "heumsi").await;

    let response = client
        .get(format!("{}/users/me", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "heumsi");
    assert_eq!(body["role"], "COMMON");
}

#[tokio::test]
async fn test_list_envelope_and_limit_cap() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["offset"], 0);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["total"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["links"][0]["rel"], "self");

    // Asking for more than the cap is a validation failure, not a clamp.
    let response = client
        .get(format!("{}/posts?limit=101", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_versioned_mount_requires_media_type() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Without the JSON:API media type the versioned mount refuses.
    let response = client
        .get(format!("{}/v1/posts", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 406);

    // With it, the same endpoint answers and its links keep the prefix.
    let response = client
        .get(format!("{}/v1/posts", app.address))
        .header("accept", "application/vnd.api+json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let self_href = body["links"][0]["href"].as_str().unwrap();
    assert!(self_href.starts_with("/v1/posts"));

    // The unversioned mount carries no Accept requirement.
    let response = client
        .get(format!("{}/posts", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_comment_and_feedback_flow() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    signup(&client, &app.address, "heumsi").await;
    let token = signin_token(&client, &app.address, "heumsi").await;

    let response = client
        .post(format!("{}/posts", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "a", "content": "body" }))
        .send()
        .await
        .unwrap();
    let post: serde_json::Value = response.json().await.unwrap();
    let post_id = post["data"]["id"].as_i64().unwrap();

    // Comment on it.
    let response = client
        .post(format!("{}/comments", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "postId": post_id, "content": "nice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let comment: serde_json::Value = response.json().await.unwrap();
    assert_eq!(comment["data"]["post"]["id"], post_id);

    // Commenting on a missing post is a 404.
    let response = client
        .post(format!("{}/comments", app.address))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "postId": 999, "content": "nice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Like the post, then flip to dislike.
    let response = client
        .post(format!("{}/feedbacks/posts/{post_id}/like", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let feedback: serde_json::Value = response.json().await.unwrap();
    assert_eq!(feedback["data"]["like"], true);
    let feedback_id = feedback["data"]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/feedbacks/posts/{post_id}/dislike", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let flipped: serde_json::Value = response.json().await.unwrap();
    assert_eq!(flipped["data"]["id"], feedback_id);
    assert_eq!(flipped["data"]["like"], false);

    // The public listing shows the single row, scoped by post.
    let response = client
        .get(format!(
            "{}/feedbacks/posts?post_id={post_id}",
            app.address
        ))
        .send()
        .await
        .unwrap();
    let listing: serde_json::Value = response.json().await.unwrap();
    assert_eq!(listing["pagination"]["total"], 1);

    // Withdraw it.
    let response = client
        .delete(format!("{}/feedbacks/posts/{feedback_id}", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}
