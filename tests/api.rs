//! API endpoint integration tests

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{FAKE_MP3, FakeSynthesizer, FakeTranscriber, TestApp, file_count, json_body};

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let (status, json) = json_body(app.get("/health", None).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = TestApp::new();

    let (status, json) = json_body(app.get("/ready", None).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["audio_dir"]["status"], "ok");
    assert_eq!(json["checks"]["upload_dir"]["status"], "ok");
}

#[tokio::test]
async fn test_start_speaks_prompt() {
    let app = TestApp::new();

    let (status, json) = app.post("/start", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prompt"], "Would you like to practice colors today?");
    assert_eq!(json["sessionId"], "default");
    assert!(json.get("hintVideoUrl").is_none());

    let url = json["audioUrl"].as_str().unwrap();
    assert!(url.starts_with("/audio/"));
    assert!(url.ends_with(".mp3"));
    assert_eq!(file_count(app.audio_dir.path()), 1);
}

#[tokio::test]
async fn test_full_practice_flow() {
    let app = TestApp::new();
    let session = Some("learner-1");

    let (status, _) = app.post("/start", None, session).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .post("/user-response", Some(json!({ "response": " Yes. " })), session)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prompt"],
        "Great! Let's start with the color green. Can you show me the sign for green?"
    );

    let (status, json) = app.post("/help", None, session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prompt"],
        "No worries! Here's a hint. Watch the video showing the sign for green."
    );
    assert_eq!(json["hintVideoUrl"], "/videos/green.mp4");

    let (status, json) = app.post("/retry", None, session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prompt"],
        "Now, give it another try! Show me the sign for green!"
    );
    assert!(json.get("hintVideoUrl").is_none());

    let (status, json) = json_body(app.get("/session", session).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessionId"], "learner-1");
    assert_eq!(json["phase"], "hint_given");
    assert_eq!(json["currentColor"], "green");
    assert_eq!(json["lastResponse"], "yes.");
    assert_eq!(json["helpRequested"], true);

    assert_eq!(app.synthesizer.calls(), 4);
    assert_eq!(file_count(app.audio_dir.path()), 4);
}

#[tokio::test]
async fn test_help_without_color_is_rejected() {
    let app = TestApp::new();

    for path in ["/help", "/retry"] {
        let (status, json) = app.post(path, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(json["error"], "No color is currently being practiced");
        assert_eq!(json["code"], "no_active_color");
    }

    assert_eq!(app.synthesizer.calls(), 0);
    assert_eq!(file_count(app.audio_dir.path()), 0);
}

#[tokio::test]
async fn test_decline_then_help_is_rejected() {
    let app = TestApp::new();

    let (status, json) = app
        .post("/user-response", Some(json!({ "response": "No" })), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prompt"],
        "Okay, let me know when you're ready to practice!"
    );

    let (status, _) = app.post("/help", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unrecognized_reply_keeps_color() {
    let app = TestApp::new();

    app.post("/user-response", Some(json!({ "response": "yes" })), None)
        .await;
    let (status, json) = app
        .post("/user-response", Some(json!({ "response": "maybe" })), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["prompt"],
        "I'm sorry, I didn't quite understand that. Would you like to practice colors today?"
    );

    let (_, snapshot) = json_body(app.get("/session", None).await).await;
    assert_eq!(snapshot["phase"], "awaiting_confirmation");
    assert_eq!(snapshot["currentColor"], "green");
    assert_eq!(snapshot["lastResponse"], "maybe");

    // The color survives, so a hint is still available
    let (status, _) = app.post("/help", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_response_is_rejected() {
    let app = TestApp::new();

    let bodies = [Some(json!({})), Some(json!({ "response": null })), None];
    for body in bodies {
        let (status, json) = app.post("/user-response", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No response provided");
    }

    assert_eq!(app.synthesizer.calls(), 0);
}

#[tokio::test]
async fn test_synthesis_failure_still_advances_state() {
    let app = TestApp::with(FakeSynthesizer::failing(), FakeTranscriber::returning(""));

    let (status, json) = app
        .post("/user-response", Some(json!({ "response": "yes" })), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate audio");
    assert_eq!(json["code"], "synthesis_failed");
    assert_eq!(file_count(app.audio_dir.path()), 0);

    let (_, snapshot) = json_body(app.get("/session", None).await).await;
    assert_eq!(snapshot["phase"], "practicing");
    assert_eq!(snapshot["currentColor"], "green");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = TestApp::new();

    app.post("/user-response", Some(json!({ "response": "yes" })), Some("alice"))
        .await;

    let (status, _) = app.post("/help", None, Some("alice")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post("/help", None, Some("bob")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The shared session is untouched as well
    let (status, _) = app.post("/help", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_session_header_is_rejected() {
    let app = TestApp::new();

    let (status, json) = app.post("/start", None, Some("   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn test_generated_audio_is_served() {
    let app = TestApp::new();

    let (_, json) = app.post("/start", None, None).await;
    let url = json["audioUrl"].as_str().unwrap();

    let response = app.get(url, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], FAKE_MP3);
}

#[tokio::test]
async fn test_unknown_audio_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/audio/does-not-exist.mp3", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_are_tracked_in_store() {
    let app = TestApp::new();

    app.post("/start", None, Some("tracked")).await;

    let id = sign_coach::SessionId::parse("tracked").unwrap();
    let session = app.state.sessions.get(&id).expect("session should exist");
    let session = session.lock().await;
    assert_eq!(
        session.dialogue().phase,
        sign_coach::Phase::AwaitingConfirmation
    );
}

#[tokio::test]
async fn test_session_lookup_does_not_create() {
    let app = TestApp::new();

    let (status, json) = json_body(app.get("/session", Some("ghost")).await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "session_not_found");

    let id = sign_coach::SessionId::parse("ghost").unwrap();
    assert!(app.state.sessions.get(&id).is_none());
    assert!(app.state.sessions.is_empty());
}

#[tokio::test]
async fn test_full_registry_refuses_new_sessions() {
    let app = TestApp::with_max_sessions(2);

    for id in ["a", "b"] {
        let (status, _) = app
            .post("/user-response", Some(json!({ "response": "yes" })), Some(id))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = app
        .post("/user-response", Some(json!({ "response": "yes" })), Some("c"))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "session_limit");
    assert_eq!(app.synthesizer.calls(), 2);

    // Sessions that already exist keep their state
    let (status, _) = app.post("/help", None, Some("a")).await;
    assert_eq!(status, StatusCode::OK);

    // Once a slot frees up, the new session keeps its state across requests
    app.state
        .sessions
        .remove(&sign_coach::SessionId::parse("b").unwrap());
    let (status, _) = app
        .post("/user-response", Some(json!({ "response": "yes" })), Some("c"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = app.post("/help", None, Some("c")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hintVideoUrl"], "/videos/green.mp4");
}
