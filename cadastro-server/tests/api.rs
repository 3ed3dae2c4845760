//! End-to-end API scenarios against a real PostgreSQL.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p cadastro-server -- --ignored
//!
//! Every test bootstraps its own schema, so row counts are exact.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cadastro_server::docstore::{DocumentPath, MemoryDocumentStore};
use cadastro_server::models::SchemaName;
use cadastro_server::{
    build_router, AppState, ConnectionManager, DatabaseConfig, ServerConfig, SslMode, UpdatePolicy,
};

struct TestApp {
    router: Router,
    mirror: Arc<MemoryDocumentStore>,
    state: Arc<AppState>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(MemoryDocumentStore::new(), UpdatePolicy::Lenient).await
    }

    async fn with(mirror: MemoryDocumentStore, policy: UpdatePolicy) -> Self {
        Self::with_tables(mirror, policy, &[]).await
    }

    /// Run `setup` statements first (`{schema}` is substituted); the bootstrap
    /// then leaves any table they created alone.
    async fn with_tables(mirror: MemoryDocumentStore, policy: UpdatePolicy, setup: &[&str]) -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let schema = format!("test_{}", uuid::Uuid::new_v4().simple());

        if !setup.is_empty() {
            let pool = sqlx::PgPool::connect(&url).await.expect("database reachable");
            sqlx::query(&format!("CREATE SCHEMA {schema}"))
                .execute(&pool)
                .await
                .expect("create schema");
            for statement in setup {
                sqlx::query(&statement.replace("{schema}", &schema))
                    .execute(&pool)
                    .await
                    .expect("setup statement");
            }
            pool.close().await;
        }

        let mut config = DatabaseConfig::new(url);
        config.ssl_mode = SslMode::Prefer;
        config.schema = SchemaName::new(&schema).expect("valid schema");
        config.bootstrap_schema = true;

        let mirror = Arc::new(mirror);
        let state = Arc::new(
            AppState::new(ConnectionManager::new(config), mirror.clone())
                .with_update_policy(policy),
        );
        // Build the pool (and the schema) up front
        state.db.pool().await.expect("database reachable");

        let router = build_router(state.clone(), &ServerConfig::default()).expect("router");
        Self {
            router,
            mirror,
            state,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn list(&self, uri: &str) -> Vec<Value> {
        let response = self.send("GET", uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        match json_body(response).await {
            Value::Array(rows) => rows,
            other => panic!("expected array, got {other}"),
        }
    }

    async fn teardown(self) {
        let pool = self.state.db.pool().await.expect("pool");
        let drop = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.state.db.schema());
        sqlx::query(&drop).execute(pool).await.expect("drop schema");
        self.state.db.close().await;
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn raw_body(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
#[ignore = "requires database"]
async fn personal_data_create_echoes_input_and_mirrors() {
    let app = TestApp::new().await;
    let input = json!({
        "nome": "Alice",
        "sobrenome": "Souza",
        "data_nascimento": "1990-01-01",
        "cpf": "12345678900",
        "usuario": "alice"
    });

    let response = app.send("POST", "/api/dados-pessoais", Some(input.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["postgres"], input);
    assert!(body["firebase"]["write_time"].is_string());

    let doc = app
        .mirror
        .get(&DocumentPath::personal_data("alice").unwrap())
        .expect("mirror document");
    assert_eq!(doc["primeiro_nome"], "Alice");
    assert_eq!(doc["cpf"], "12345678900");
    assert!(!doc.contains_key("usuario"));

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn mirror_failure_rolls_back_insert() {
    let app = TestApp::with(
        MemoryDocumentStore::failing("document store unavailable"),
        UpdatePolicy::Lenient,
    )
    .await;

    let response = app
        .send(
            "POST",
            "/api/dados-pessoais",
            Some(json!({ "usuario": "bob", "nome": "Bob" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = json_body(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("document store unavailable"));

    assert!(app.list("/api/dados-pessoais").await.is_empty());

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn unmirrorable_usuario_rolls_back_insert() {
    let app = TestApp::new().await;

    let response = app
        .send("POST", "/api/dados-pessoais", Some(json!({ "usuario": "a/b" })))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.list("/api/dados-pessoais").await.is_empty());
    assert!(app.mirror.is_empty());

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn personal_data_update_and_delete_leave_mirror_alone() {
    let app = TestApp::new().await;
    app.send(
        "POST",
        "/api/dados-pessoais",
        Some(json!({ "usuario": "carol", "nome": "Carol" })),
    )
    .await;

    let response = app
        .send(
            "PUT",
            "/api/dados-pessoais",
            Some(json!({ "usuario": "carol", "nome": "Caroline" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["nome"], "Caroline");

    let response = app.send("DELETE", "/api/dados-pessoais/carol", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["deleted"]["usuario"], "carol");

    let doc = app
        .mirror
        .get(&DocumentPath::personal_data("carol").unwrap())
        .expect("mirror document survives");
    assert_eq!(doc["primeiro_nome"], "Carol");

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_of_missing_contact_is_empty_200() {
    let app = TestApp::new().await;

    let response = app
        .send(
            "PUT",
            "/api/contato",
            Some(json!({ "login": "ghost", "email": "g@example.com" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(raw_body(response).await.is_empty());
    assert!(app.list("/api/contato").await.is_empty());

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn strict_policy_turns_missed_update_into_404() {
    let app = TestApp::with(MemoryDocumentStore::new(), UpdatePolicy::Strict).await;

    let response = app
        .send("PUT", "/api/salario", Some(json!({ "login": "ghost", "transacao": "+1" })))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_of_missing_salary_is_404() {
    let app = TestApp::new().await;
    app.send("POST", "/api/salario", Some(json!({ "login": "alice", "transacao": "+1" })))
        .await;

    let response = app.send("DELETE", "/api/salario/nobody", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.list("/api/salario").await.len(), 1);

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn list_reflects_creates_minus_deletes() {
    let app = TestApp::new().await;

    for i in 0..5 {
        let response = app
            .send(
                "POST",
                "/api/contato",
                Some(json!({ "login": format!("user{i}"), "email": format!("user{i}@example.com") })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    for i in 0..2 {
        let response = app.send("DELETE", &format!("/api/contato/user{i}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.list("/api/contato").await.len(), 3);

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_key_is_500() {
    let app = TestApp::new().await;
    let body = json!({ "login": "dup", "transacao": "+1" });

    let first = app.send("POST", "/api/salario", Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.send("POST", "/api/salario", Some(body)).await;
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = json_body(second).await["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("failed to create salary: "));

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn concurrent_contact_updates_never_mix_fields() {
    let app = TestApp::new().await;
    app.send("POST", "/api/contato", Some(json!({ "login": "race" })))
        .await;

    let a = json!({
        "login": "race",
        "email": "a@example.com",
        "telefone": "111",
        "redes_sociais": "@a"
    });
    let b = json!({
        "login": "race",
        "email": "b@example.com",
        "telefone": "222",
        "redes_sociais": "@b"
    });

    for _ in 0..10 {
        let (ra, rb) = tokio::join!(
            app.send("PUT", "/api/contato", Some(a.clone())),
            app.send("PUT", "/api/contato", Some(b.clone())),
        );
        assert_eq!(ra.status(), StatusCode::OK);
        assert_eq!(rb.status(), StatusCode::OK);

        let rows = app.list("/api/contato").await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0] == a || rows[0] == b, "mixed row: {}", rows[0]);
    }

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn salary_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .send("POST", "/api/salario", Some(json!({ "login": "alice", "transacao": "+100" })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "login": "alice", "transacao": "+100" })
    );

    let response = app
        .send("PUT", "/api/salario", Some(json!({ "login": "alice", "transacao": "+50" })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "login": "alice", "transacao": "+50" })
    );

    let response = app.send("DELETE", "/api/salario/alice", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["deleted"],
        json!({ "login": "alice", "transacao": "+50" })
    );

    let response = app.send("DELETE", "/api/salario/alice", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn numeric_values_are_coerced_by_the_store() {
    let app = TestApp::new().await;

    let response = app
        .send("POST", "/api/salario", Some(json!({ "login": "alice", "transacao": 100 })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "login": "alice", "transacao": "100" })
    );

    app.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn externally_typed_columns_are_respected() {
    let app = TestApp::with_tables(
        MemoryDocumentStore::new(),
        UpdatePolicy::Lenient,
        &[
            "CREATE TABLE {schema}.dados_pessoais (
                usuario TEXT PRIMARY KEY,
                nome TEXT,
                sobrenome TEXT,
                data_nascimento DATE,
                cpf BIGINT,
                criado_em TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            "CREATE TABLE {schema}.salario (login INTEGER PRIMARY KEY, transacao NUMERIC)",
        ],
    )
    .await;

    let response = app
        .send(
            "POST",
            "/api/dados-pessoais",
            Some(json!({ "usuario": "a", "data_nascimento": "1990-01-01", "cpf": "12345678900" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["postgres"]["data_nascimento"], "1990-01-01");
    assert_eq!(body["postgres"]["cpf"], 12345678900u64);
    assert!(body["postgres"]["criado_em"].is_string());

    let doc = app
        .mirror
        .get(&DocumentPath::personal_data("a").unwrap())
        .expect("mirror document");
    assert_eq!(doc["data_nascimento"], "1990-01-01");

    let response = app
        .send("POST", "/api/salario", Some(json!({ "login": 7, "transacao": "12.50" })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await, json!({ "login": 7, "transacao": 12.50 }));

    let response = app
        .send("PUT", "/api/salario", Some(json!({ "login": "7", "transacao": 20 })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["transacao"], 20);

    let response = app.send("DELETE", "/api/salario/7", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send("POST", "/api/salario", Some(json!({ "login": "seven" })))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    app.teardown().await;
}
