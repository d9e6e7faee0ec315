use std::sync::Arc;

use anyhow::Result;
use careeros::auth::TokenService;
use careeros::core::{CareerAssistant, Database, LanguageModel, Turn};
use careeros::web::build_rocket;
use rocket::http::Method::{self, Delete, Get, Post, Put};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};

const SECRET: &str = "integration-secret";

/// Answers every prompt with the same text.
struct CannedModel(&'static str);

#[rocket::async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, _turns: &[Turn]) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct DownModel;

#[rocket::async_trait]
impl LanguageModel for DownModel {
    async fn generate(&self, _turns: &[Turn]) -> Result<String> {
        anyhow::bail!("connection reset by peer")
    }
}

async fn client_with(assistant: CareerAssistant) -> Client {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let tokens = TokenService::new(SECRET, chrono::Duration::days(7));
    let figment = rocket::Config::figment().merge(("log_level", "off"));
    Client::tracked(build_rocket(figment, db, tokens, assistant))
        .await
        .unwrap()
}

async fn client() -> Client {
    client_with(CareerAssistant::new(None)).await
}

fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

async fn json_of(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.unwrap()
}

async fn register(client: &Client, email: &str) -> String {
    let response = client
        .post("/api/auth/register")
        .header(ContentType::JSON)
        .body(json!({"email": email, "password": "pw-123"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body = json_of(response).await;
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn send(
    client: &Client,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (Status, Value) {
    let mut request = client.req(method, uri.to_string()).header(bearer(token));
    if let Some(body) = body {
        request = request.header(ContentType::JSON).body(body.to_string());
    }
    let response = request.dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}


#[rocket::async_test]
async fn register_login_and_me() {
    let client = client().await;
    let token = register(&client, "ada@example.com").await;

    let (status, me) = send(&client, Get, "/api/auth/me", &token, None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(me["email"], "ada@example.com");
    assert!(me["id"].as_i64().unwrap() > 0);

    let response = client
        .post("/api/auth/login")
        .header(ContentType::JSON)
        .body(json!({"email": "ada@example.com", "password": "pw-123"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert!(json_of(response).await["access_token"].is_string());
}

#[rocket::async_test]
async fn duplicate_registration_is_rejected() {
    let client = client().await;
    register(&client, "dup@example.com").await;

    let response = client
        .post("/api/auth/register")
        .header(ContentType::JSON)
        .body(json!({"email": "dup@example.com", "password": "other"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = json_of(response).await;
    assert_eq!(body["error"], "Email already registered");
    assert_eq!(body["type"], "error");
    assert_eq!(body["success"], false);
}

#[rocket::async_test]
async fn invalid_registration_input() {
    let client = client().await;
    for body in [
        json!({"email": "not-an-email", "password": "pw"}),
        json!({"email": "ok@example.com", "password": ""}),
    ] {
        let response = client
            .post("/api/auth/register")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }
}

#[rocket::async_test]
async fn wrong_password_is_unauthorized() {
    let client = client().await;
    register(&client, "ada@example.com").await;

    for (email, password) in [("ada@example.com", "nope"), ("ghost@example.com", "pw-123")] {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({"email": email, "password": password}).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.headers().get_one("WWW-Authenticate"), Some("Bearer"));
        assert_eq!(json_of(response).await["error"], "Incorrect email or password");
    }
}

#[rocket::async_test]
async fn protected_routes_require_a_valid_token() {
    let client = client().await;

    let response = client.get("/api/auth/me").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(response.headers().get_one("WWW-Authenticate"), Some("Bearer"));
    assert_eq!(json_of(response).await["error_code"], "MISSING_TOKEN");

    let (status, body) = send(&client, Get, "/api/achievements", "garbage", None).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body["error"], "Could not validate credentials");

    // Well-signed token for a user that does not exist.
    let orphan = TokenService::new(SECRET, chrono::Duration::hours(1))
        .issue_token(9999)
        .unwrap();
    let (status, _) = send(&client, Get, "/api/profile", &orphan, None).await;
    assert_eq!(status, Status::Unauthorized);

    let expired = TokenService::new(SECRET, chrono::Duration::hours(1))
        .issue_token_with_lifetime(1, chrono::Duration::seconds(-60))
        .unwrap();
    let (status, _) = send(&client, Get, "/api/auth/me", &expired, None).await;
    assert_eq!(status, Status::Unauthorized);
}

#[rocket::async_test]
async fn profile_is_created_with_account_and_replaced_on_update() {
    let client = client().await;
    let token = register(&client, "jane@example.com").await;

    let (status, profile) = send(&client, Get, "/api/profile", &token, None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(profile["email"], "jane@example.com");
    assert_eq!(profile["branding_color"], "#000000");
    assert_eq!(profile["branding_font"], "Inter");
    assert_eq!(profile["target_roles"], json!([]));
    assert_eq!(profile["values"], json!([]));

    let (status, updated) = send(
        &client,
        Put,
        "/api/profile",
        &token,
        Some(json!({
            "name": "Jane Doe",
            "summary": "Platform engineer",
            "target_roles": ["SRE", "Platform Engineer"],
            "values": null
        })),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(updated["name"], "Jane Doe");
    assert_eq!(updated["target_roles"], json!(["SRE", "Platform Engineer"]));
    assert_eq!(updated["values"], json!([]));
    // Fields left out of a replace are cleared.
    assert_eq!(updated["email"], Value::Null);

    let (_, fetched) = send(&client, Get, "/api/profile", &token, None).await;
    assert_eq!(fetched["name"], "Jane Doe");
}

#[rocket::async_test]
async fn achievements_crud_and_ownership() {
    let client = client().await;
    let owner = register(&client, "owner@example.com").await;
    let intruder = register(&client, "intruder@example.com").await;

    let (status, first) = send(
        &client,
        Post,
        "/api/achievements",
        &owner,
        Some(json!({
            "core_task": "Migrated billing to Postgres",
            "impact_metric": "Cut invoice latency 60%",
            "skills_used": ["Go", "SQL"],
            "year": 2023
        })),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(first["skills_used"], json!(["Go", "SQL"]));
    assert_eq!(first["tags"], json!([]));
    assert_eq!(first["verification_level"], "Medium");
    let first_id = first["id"].as_i64().unwrap();

    let (_, second) = send(
        &client,
        Post,
        "/api/achievements",
        &owner,
        Some(json!({"core_task": "Ran the on-call rotation"})),
    )
    .await;
    let second_id = second["id"].as_i64().unwrap();

    let (_, listed) = send(&client, Get, "/api/achievements", &owner, None).await;
    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second_id, first_id]);

    let (_, theirs) = send(&client, Get, "/api/achievements", &intruder, None).await;
    assert_eq!(theirs, json!([]));

    let uri = format!("/api/achievements/{}", first_id);
    let (status, body) = send(
        &client,
        Put,
        &uri,
        &intruder,
        Some(json!({"core_task": "hijacked"})),
    )
    .await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error"], "Achievement not found");
    let (status, _) = send(&client, Delete, &uri, &intruder, None).await;
    assert_eq!(status, Status::NotFound);

    let (status, updated) = send(
        &client,
        Put,
        &uri,
        &owner,
        Some(json!({"core_task": "Migrated billing to Postgres 16", "skills_used": ["SQL"]})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(updated["core_task"], "Migrated billing to Postgres 16");
    assert_eq!(updated["skills_used"], json!(["SQL"]));

    let (status, ack) = send(&client, Delete, &uri, &owner, None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(ack["message"], "Achievement deleted");

    let (status, _) = send(&client, Delete, &uri, &owner, None).await;
    assert_eq!(status, Status::NotFound);
}

#[rocket::async_test]
async fn achievement_validation() {
    let client = client().await;
    let token = register(&client, "v@example.com").await;

    let (status, body) = send(
        &client,
        Post,
        "/api/achievements",
        &token,
        Some(json!({"impact_metric": "40%"})),
    )
    .await;
    assert_eq!(status, Status::UnprocessableEntity);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &client,
        Post,
        "/api/achievements",
        &token,
        Some(json!({"core_task": "   "})),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
}

#[rocket::async_test]
async fn application_status_pipeline() {
    let client = client().await;
    let token = register(&client, "seeker@example.com").await;

    let (status, created) = send(
        &client,
        Post,
        "/api/applications",
        &token,
        Some(json!({"job_title": "Staff Engineer", "company": "Initech"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(created["status"], "saved");
    assert_eq!(created["applied_at"], Value::Null);
    let uri = format!("/api/applications/{}", created["id"]);

    let (_, applied) = send(
        &client,
        Put,
        &uri,
        &token,
        Some(json!({"job_title": "Staff Engineer", "company": "Initech", "status": "applied"})),
    )
    .await;
    assert_eq!(applied["status"], "applied");
    let stamp = applied["applied_at"].clone();
    assert!(stamp.is_string());

    let (_, interviewing) = send(
        &client,
        Put,
        &uri,
        &token,
        Some(json!({"job_title": "Staff Engineer", "company": "Initech", "status": "interview"})),
    )
    .await;
    assert_eq!(interviewing["status"], "interview");
    assert_eq!(interviewing["applied_at"], stamp);

    let (status, _) = send(
        &client,
        Put,
        &uri,
        &token,
        Some(json!({"status": "ghosted"})),
    )
    .await;
    assert_eq!(status, Status::UnprocessableEntity);

    let (status, ack) = send(&client, Delete, &uri, &token, None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(ack["message"], "Application deleted");
}

#[rocket::async_test]
async fn chat_without_api_key() {
    let client = client().await;
    let token = register(&client, "chat@example.com").await;

    let (status, reply) = send(
        &client,
        Post,
        "/api/chat",
        &token,
        Some(json!({"message": "I led a migration"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        reply["response"],
        "AI features require a Gemini API key. Please configure GEMINI_API_KEY in the environment."
    );
    assert_eq!(reply["achievement_extracted"], Value::Null);

    let (_, history) = send(&client, Get, "/api/chat/history", &token, None).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "I led a migration");
    assert_eq!(messages[1]["role"], "assistant");

    let (status, ack) = send(&client, Delete, "/api/chat/history", &token, None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(ack["message"], "Chat history cleared");
    let (_, history) = send(&client, Get, "/api/chat/history", &token, None).await;
    assert_eq!(history["messages"], json!([]));
}

#[rocket::async_test]
async fn chat_captures_achievement() {
    let model = CannedModel(
        "Great result!\n```json\n{\"achievement_extracted\": {\"core_task\": \"Automated release notes\", \"impact_metric\": \"Saved 4 hours a week\", \"skills_used\": [\"Python\"]}}\n```",
    );
    let client = client_with(CareerAssistant::new(Some(Arc::new(model) as Arc<dyn LanguageModel>))).await;
    let token = register(&client, "coach@example.com").await;

    let (status, reply) = send(
        &client,
        Post,
        "/api/chat",
        &token,
        Some(json!({"message": "I automated our release notes"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(reply["response"], "Great result!\n\n✓ Achievement captured!");
    assert_eq!(reply["achievement_extracted"]["core_task"], "Automated release notes");

    let (_, achievements) = send(&client, Get, "/api/achievements", &token, None).await;
    let achievements = achievements.as_array().unwrap();
    assert_eq!(achievements.len(), 1);
    assert_eq!(achievements[0]["impact_metric"], "Saved 4 hours a week");
    assert_eq!(achievements[0]["skills_used"], json!(["Python"]));

    let (_, history) = send(&client, Get, "/api/chat/history", &token, None).await;
    assert_eq!(
        history["messages"][1]["content"],
        "Great result!\n\n✓ Achievement captured!"
    );
}

#[rocket::async_test]
async fn model_outage_is_a_bad_gateway() {
    let client = client_with(CareerAssistant::new(Some(Arc::new(DownModel) as Arc<dyn LanguageModel>))).await;
    let token = register(&client, "down@example.com").await;

    let (status, body) = send(
        &client,
        Post,
        "/api/chat",
        &token,
        Some(json!({"message": "hello"})),
    )
    .await;
    assert_eq!(status, Status::BadGateway);
    assert_eq!(body["error_code"], "AI_SERVICE_ERROR");

    let (status, _) = send(
        &client,
        Post,
        "/api/tailor",
        &token,
        Some(json!({"job_description": "Rust engineer"})),
    )
    .await;
    assert_eq!(status, Status::BadGateway);
}

#[rocket::async_test]
async fn ai_endpoints_without_api_key() {
    let client = client().await;
    let token = register(&client, "ai@example.com").await;

    let (status, tailored) = send(
        &client,
        Post,
        "/api/tailor",
        &token,
        Some(json!({"job_description": "Senior Rust engineer"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        tailored,
        json!({
            "tailored_summary": "AI features require a Gemini API key.",
            "selected_achievements": [],
            "match_score": 0,
            "suggestions": ["Configure GEMINI_API_KEY to enable AI features"]
        })
    );

    let (status, draft) = send(
        &client,
        Post,
        "/api/extract-profile",
        &token,
        Some(json!({"resume_text": "Jane Doe\nSRE"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        draft,
        json!({"error": "AI features require a Gemini API key. Please configure GEMINI_API_KEY."})
    );
}

#[rocket::async_test]
async fn tailor_uses_callers_achievements() {
    let model = CannedModel(
        r#"{"tailored_summary": "Fit.", "selected_achievements": [{"id": 1, "relevance_reason": "direct match"}, {"id": 777, "relevance_reason": "made up"}], "match_score": 88, "suggestions": []}"#,
    );
    let client = client_with(CareerAssistant::new(Some(Arc::new(model) as Arc<dyn LanguageModel>))).await;
    let token = register(&client, "fit@example.com").await;
    send(
        &client,
        Post,
        "/api/achievements",
        &token,
        Some(json!({"core_task": "Built the search index"})),
    )
    .await;

    let (status, result) = send(
        &client,
        Post,
        "/api/tailor",
        &token,
        Some(json!({"job_description": "Search engineer"})),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(result["match_score"], 88);
    assert_eq!(
        result["selected_achievements"],
        json!([{"id": 1, "relevance_reason": "direct match"}])
    );
}

#[rocket::async_test]
async fn healthz_and_preflight() {
    let client = client().await;

    let response = client.get("/healthz").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_of(response).await, json!({"status": "ok"}));

    let response = client
        .options("/api/achievements/12")
        .header(Header::new("Origin", "http://localhost:3000"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("http://localhost:3000")
    );
    assert!(response
        .headers()
        .get_one("Access-Control-Allow-Methods")
        .unwrap()
        .contains("DELETE"));

    let response = client.get("/api/nowhere").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_of(response).await["error_code"], "NOT_FOUND");
}
