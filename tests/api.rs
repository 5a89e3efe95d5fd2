use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use songvault::{
    app::build_app,
    config::AppConfig,
    state::AppState,
    users::{NewUser, Role, User},
};

struct TestApp {
    state: AppState,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let state = AppState::in_memory().await.expect("state");
        let router = build_app(state.clone());
        Self { state, router }
    }

    async fn with_config(config: AppConfig) -> Self {
        let state = AppState::from_config(config).await.expect("state");
        let router = build_app(state.clone());
        Self { state, router }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.expect("response");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();
        self.send(req).await
    }

    async fn token_for(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers a regular user and returns `(id, token)`.
    async fn user(&self, name: &str, email: &str) -> (i64, String) {
        let (status, body) = self.register(name, email, "secret123").await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let token = self.token_for(email, "secret123").await;
        (body["id"].as_i64().unwrap(), token)
    }

    async fn admin(&self) -> (i64, String) {
        let hash = self.state.hasher.hash("adminpass").unwrap();
        let user = User::create(
            &self.state.db,
            NewUser {
                name: "Admin",
                email: "admin@example.com",
                password_hash: &hash,
                role: Role::Admin,
            },
        )
        .await
        .unwrap();
        let token = self.token_for("admin@example.com", "adminpass").await;
        (user.id, token)
    }

    async fn song(&self, token: &str, title: &str, artist: &str, genre: &str) -> i64 {
        let (status, body) = self
            .json(
                Method::POST,
                "/songs",
                Some(token),
                Some(json!({
                    "title": title,
                    "artist": artist,
                    "duration": 240,
                    "year": 1999,
                    "genre": genre,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "song create failed: {body}");
        body["id"].as_i64().unwrap()
    }

    async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.state.db)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let (status, body) = app.json(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn register_returns_public_view() {
    let app = TestApp::new().await;
    let (status, body) = app
        .register("  Alice  ", " alice@example.com ", "secret123")
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "user");
    assert_eq!(body["active"], true);
    assert!(body.get("password_hash").is_none());
    assert!(body["registered_at"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app.register("Alice", "alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.register("Other", "alice@example.com", "another1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("already registered"));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn invalid_registration_is_unprocessable() {
    let app = TestApp::new().await;
    let (status, body) = app.register("A", "alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = app.register("Alice", "not-an-email", "secret123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.register("Alice", "alice@example.com", "123").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "Alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.count("users").await, 0);
}

fn register_request(name: &str, email: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "name": name, "email": email, "password": "secret123" }).to_string(),
        ))
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_on_file_database_conflict_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::for_tests();
    config.database_url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("songvault.db").display()
    );
    config.max_connections = 10;
    let app = TestApp::with_config(config).await;

    for round in 0..10 {
        let email = format!("racer{round}@example.com");
        let mut handles = Vec::new();
        for n in 0..8 {
            let router = app.router.clone();
            let req = register_request(&format!("Racer {n}"), &email);
            handles.push(tokio::spawn(async move {
                router.oneshot(req).await.unwrap().status()
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                StatusCode::BAD_REQUEST => {}
                other => panic!("unexpected status {other} in round {round}"),
            }
        }
        assert_eq!(created, 1, "round {round}");
    }
    assert_eq!(app.count("users").await, 10);
}

#[tokio::test]
async fn login_issues_bearer_token() {
    let app = TestApp::new().await;
    app.register("Alice", "alice@example.com", "secret123").await;

    let (status, body) = app.login("alice@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["rol"], "user");
    let token = body["access_token"].as_str().unwrap();

    let (status, me) = app.json(Method::GET, "/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");

    let (status, verify) = app.json(Method::GET, "/auth/verify", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verify["valid"], true);
    assert_eq!(verify["role"], "user");
}

#[tokio::test]
async fn login_json_matches_form_login() {
    let app = TestApp::new().await;
    app.register("Alice", "alice@example.com", "secret123").await;
    let (status, body) = app
        .json(
            Method::POST,
            "/auth/login-json",
            None,
            Some(json!({ "email": "alice@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("Alice", "alice@example.com", "secret123").await;

    let (s1, b1) = app.login("alice@example.com", "wrongpass").await;
    let (s2, b2) = app.login("nobody@example.com", "secret123").await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1["detail"], b2["detail"]);
}

#[tokio::test]
async fn missing_or_garbage_token_is_unauthorized() {
    let app = TestApp::new().await;

    let req = Request::builder().uri("/songs").body(Body::empty()).unwrap();
    let res = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let (status, body) = app
        .json(Method::GET, "/songs", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn token_of_deleted_user_is_unauthorized() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app
        .json(Method::DELETE, &format!("/users/{bob_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json(Method::GET, "/auth/me", Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_does_not_follow_a_reused_email() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.user("Alice", "a@example.com").await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/users/{alice_id}"),
            Some(&alice),
            Some(json!({ "email": "a2@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.register("Bob", "a@example.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.json(Method::GET, "/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");

    // Bob's own token is unaffected.
    let bob = app.token_for("a@example.com", "secret123").await;
    let (status, me) = app.json(Method::GET, "/auth/me", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Bob");
}

#[tokio::test]
async fn inactive_user_is_forbidden() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/users/{bob_id}"),
            Some(&admin),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    // Existing token stops working.
    let (status, _) = app.json(Method::GET, "/songs", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Fresh login is refused too.
    let (status, _) = app.login("bob@example.com", "secret123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_admins_manage_users() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app.json(Method::GET, "/users", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .json(Method::GET, &format!("/users/{bob_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .json(Method::DELETE, &format!("/users/{bob_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.json(Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app
        .json(
            Method::POST,
            "/users",
            Some(&admin),
            Some(json!({
                "name": "Carol",
                "email": "carol@example.com",
                "password": "secret123",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");

    let (status, _) = app.json(Method::GET, "/users/999", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_cannot_update_each_other() {
    let app = TestApp::new().await;
    let (alice_id, _) = app.user("Alice", "alice@example.com").await;
    let (_, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/users/{alice_id}"),
            Some(&bob),
            Some(json!({ "name": "Hacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn self_update_keeps_unsent_fields() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/users/{bob_id}"),
            Some(&bob),
            Some(json!({ "name": "Robert" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Robert");
    assert_eq!(body["email"], "bob@example.com");
    assert_eq!(body["role"], "user");

    // Password left untouched.
    app.token_for("bob@example.com", "secret123").await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/users/{bob_id}"),
            Some(&bob),
            Some(json!({ "password": "newsecret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.token_for("bob@example.com", "newsecret").await;
}

#[tokio::test]
async fn regular_user_cannot_promote_self() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/users/{bob_id}"),
            Some(&bob),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, me) = app.json(Method::GET, "/auth/me", Some(&bob), None).await;
    assert_eq!(me["role"], "user");
}

#[tokio::test]
async fn email_change_to_taken_address_conflicts() {
    let app = TestApp::new().await;
    app.user("Alice", "alice@example.com").await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/users/{bob_id}"),
            Some(&bob),
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn song_crud() {
    let app = TestApp::new().await;
    let (_, bob) = app.user("Bob", "bob@example.com").await;
    let id = app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;

    let (status, body) = app
        .json(Method::GET, &format!("/songs/{id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Teardrop");
    assert_eq!(body["album"], Value::Null);

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/songs/{id}"),
            Some(&bob),
            Some(json!({ "album": "Mezzanine", "genre": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["album"], "Mezzanine");
    assert_eq!(body["genre"], Value::Null);
    assert_eq!(body["title"], "Teardrop");
    assert_eq!(body["year"], 1999);

    let (status, body) = app.json(Method::GET, "/songs", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .json(Method::DELETE, &format!("/songs/{id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .json(Method::GET, &format!("/songs/{id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn song_validation() {
    let app = TestApp::new().await;
    let (_, bob) = app.user("Bob", "bob@example.com").await;

    let (status, _) = app
        .json(
            Method::POST,
            "/songs",
            Some(&bob),
            Some(json!({ "title": "Long", "artist": "X", "duration": 7201 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .json(
            Method::POST,
            "/songs",
            Some(&bob),
            Some(json!({ "title": "Old", "artist": "X", "duration": 100, "year": 1899 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .json(
            Method::POST,
            "/songs",
            Some(&bob),
            Some(json!({ "title": "   ", "artist": "X", "duration": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.json(Method::GET, "/songs/abc", Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.count("songs").await, 0);
}

#[tokio::test]
async fn search_filters_are_case_insensitive() {
    let app = TestApp::new().await;
    let (_, bob) = app.user("Bob", "bob@example.com").await;
    app.song(&bob, "Bohemian Rhapsody", "Queen", "Rock").await;
    app.song(&bob, "Under Pressure", "Queen", "Rock").await;
    app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;

    let (status, body) = app
        .json(Method::GET, "/songs/search?artist=queen", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .json(Method::GET, "/songs/search?title=RHAP&genre=rock", Some(&bob), None)
        .await;
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "Bohemian Rhapsody");

    // Genre is an exact match, not a substring one.
    let (_, body) = app
        .json(Method::GET, "/songs/search?genre=trip", Some(&bob), None)
        .await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = app.json(Method::GET, "/songs/search", Some(&bob), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn duplicate_favorite_is_rejected() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let song_id = app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;
    let body = json!({ "user_id": bob_id, "song_id": song_id });

    let (status, _) = app
        .json(Method::POST, "/favorites", Some(&bob), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .json(Method::POST, "/favorites", Some(&bob), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/users/{bob_id}/favorites/{song_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.count("favorites").await, 1);
}

#[tokio::test]
async fn favorite_requires_existing_song() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let (status, _) = app
        .json(
            Method::POST,
            "/favorites",
            Some(&bob),
            Some(json!({ "user_id": bob_id, "song_id": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorites_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin().await;
    let (alice_id, alice) = app.user("Alice", "alice@example.com").await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let song_id = app.song(&alice, "Teardrop", "Massive Attack", "Trip Hop").await;

    // Bob cannot mark for Alice.
    let (status, _) = app
        .json(
            Method::POST,
            "/favorites",
            Some(&bob),
            Some(json!({ "user_id": alice_id, "song_id": song_id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, fav) = app
        .json(
            Method::POST,
            "/favorites",
            Some(&alice),
            Some(json!({ "user_id": alice_id, "song_id": song_id })),
        )
        .await;
    let fav_id = fav["id"].as_i64().unwrap();
    app.json(
        Method::POST,
        &format!("/users/{bob_id}/favorites/{song_id}"),
        Some(&bob),
        None,
    )
    .await;

    let (_, list) = app.json(Method::GET, "/favorites", Some(&bob), None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["user_id"], bob_id);

    let (_, list) = app.json(Method::GET, "/favorites", Some(&admin), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, _) = app
        .json(Method::GET, &format!("/favorites/{fav_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .json(Method::DELETE, &format!("/favorites/{fav_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .json(
            Method::GET,
            &format!("/users/{alice_id}/favorites"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, details) = app
        .json(Method::GET, &format!("/favorites/{fav_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["user"]["email"], "alice@example.com");
    assert_eq!(details["song"]["title"], "Teardrop");

    let (status, _) = app
        .json(Method::DELETE, &format!("/favorites/{fav_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.count("favorites").await, 1);
}

#[tokio::test]
async fn deleting_song_removes_its_favorites() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let doomed = app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;
    let kept = app.song(&bob, "Angel", "Massive Attack", "Trip Hop").await;
    for song_id in [doomed, kept] {
        let (status, _) = app
            .json(
                Method::POST,
                &format!("/users/{bob_id}/favorites/{song_id}"),
                Some(&bob),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app
        .json(Method::DELETE, &format!("/songs/{doomed}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, songs) = app
        .json(Method::GET, &format!("/users/{bob_id}/favorites"), Some(&bob), None)
        .await;
    let songs = songs.as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["id"], kept);
}

#[tokio::test]
async fn deleting_user_removes_their_favorites() {
    let app = TestApp::new().await;
    let (_, admin) = app.admin().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let song_id = app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;
    app.json(
        Method::POST,
        &format!("/users/{bob_id}/favorites/{song_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(app.count("favorites").await, 1);

    let (status, _) = app
        .json(Method::DELETE, &format!("/users/{bob_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.count("favorites").await, 0);
    assert_eq!(app.count("songs").await, 1);
}

#[tokio::test]
async fn unmark_missing_favorite_is_not_found() {
    let app = TestApp::new().await;
    let (bob_id, bob) = app.user("Bob", "bob@example.com").await;
    let song_id = app.song(&bob, "Teardrop", "Massive Attack", "Trip Hop").await;
    let (status, _) = app
        .json(
            Method::DELETE,
            &format!("/users/{bob_id}/favorites/{song_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_login_and_collect_favorites() {
    let app = TestApp::new().await;
    let (status, user) = app.register("Dana", "dana@example.com", "hunter22").await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["id"].as_i64().unwrap();
    let token = app.token_for("dana@example.com", "hunter22").await;

    let song_id = app.song(&token, "Windowlicker", "Aphex Twin", "Electronic").await;
    let (status, _) = app
        .json(
            Method::POST,
            "/favorites",
            Some(&token),
            Some(json!({ "user_id": user_id, "song_id": song_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, songs) = app
        .json(
            Method::GET,
            &format!("/users/{user_id}/favorites"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = songs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Windowlicker"]);
}
