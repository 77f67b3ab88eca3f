use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::multipart::Form;
use serde_json::Value;

use crate::helpers::{spawn_app, video_part, ScriptedAgent, ScriptedNarrator};

#[tokio::test]
async fn analyze_returns_cop_for_a_good_deal() {
    let app = spawn_app(
        ScriptedAgent::replying("**Lime GameBoy Color.** At $25 that's a great price.\n\n- Sold listings sit around $80"),
        ScriptedNarrator::speaking(b"ID3 fake mp3"),
    )
    .await;
    let form = Form::new()
        .part("video", video_part("gameboy.mp4"))
        .text("price", "25.00");

    let response = app.post_analyze(form).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["verdict"], "COP");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("<strong>Lime GameBoy Color.</strong>"));
    assert_eq!(body["audio"], BASE64.encode(b"ID3 fake mp3"));
    assert!(!body["session_id"].as_str().unwrap().is_empty());

    let turns = app.agent.turns.lock().unwrap();
    assert_eq!(turns.len(), 1);
    assert!(turns[0].prompt.contains("I saw this item for $25.00"));
    assert_eq!(turns[0].media_type, "video/mp4");
    assert!(turns[0].video_len > 0);
}

#[tokio::test]
async fn analyze_returns_drop_when_any_negative_phrase_appears() {
    let app = spawn_app(
        ScriptedAgent::replying("Seller says good deal, but it's overpriced. Walk away."),
        ScriptedNarrator::speaking(b"audio"),
    )
    .await;
    let form = Form::new()
        .part("video", video_part("lamp.mov"))
        .text("price", "120");

    let body: Value = app.post_analyze(form).await.json().await.unwrap();

    assert_eq!(body["verdict"], "DROP");
    assert_eq!(app.agent.turns.lock().unwrap()[0].media_type, "video/quicktime");
}

#[tokio::test]
async fn analyze_without_price_is_rejected() {
    let app = spawn_app(ScriptedAgent::replying("great price"), ScriptedNarrator::silent()).await;
    let form = Form::new().part("video", video_part("gameboy.mp4"));

    let response = app.post_analyze(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Price is required");
    assert!(app.agent.turns.lock().unwrap().is_empty());
}

#[tokio::test]
async fn analyze_rejects_invalid_prices() {
    let app = spawn_app(ScriptedAgent::replying("great price"), ScriptedNarrator::silent()).await;
    let test_cases = vec![
        ("twenty", "Invalid price format"),
        ("0", "Price must be greater than 0"),
        ("-5.00", "Price must be greater than 0"),
    ];

    for (price, expected) in test_cases {
        let form = Form::new()
            .part("video", video_part("gameboy.mp4"))
            .text("price", price);

        let response = app.post_analyze(form).await;

        assert_eq!(400, response.status().as_u16(), "price {}", price);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], expected, "price {}", price);
    }
}

#[tokio::test]
async fn analyze_rejects_disallowed_extension() {
    let app = spawn_app(ScriptedAgent::replying("great price"), ScriptedNarrator::silent()).await;
    let form = Form::new()
        .part("video", video_part("gameboy.gif"))
        .text("price", "25.00");

    let response = app.post_analyze(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Invalid file type. Allowed: mp4, avi, mov, mkv, webm"
    );
}

#[tokio::test]
async fn analyze_without_video_is_rejected() {
    let app = spawn_app(ScriptedAgent::replying("great price"), ScriptedNarrator::silent()).await;
    let form = Form::new().text("price", "25.00");

    let response = app.post_analyze(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No video file uploaded");
}

#[tokio::test]
async fn analyze_with_empty_file_name_is_rejected() {
    let app = spawn_app(ScriptedAgent::replying("great price"), ScriptedNarrator::silent()).await;
    let form = Form::new()
        .part("video", video_part(""))
        .text("price", "25.00");

    let response = app.post_analyze(form).await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No video selected");
    assert!(app.agent.turns.lock().unwrap().is_empty());
}

#[tokio::test]
async fn narration_failure_still_returns_the_verdict() {
    let app = spawn_app(
        ScriptedAgent::replying("Not sure what this is, send a closer shot."),
        ScriptedNarrator::silent(),
    )
    .await;
    let form = Form::new()
        .part("video", video_part("mystery.webm"))
        .text("price", "9.99");

    let response = app.post_analyze(form).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["verdict"], "REVIEW");
    assert!(body["audio"].is_null());
}

#[tokio::test]
async fn agent_failure_is_an_internal_error() {
    let app = spawn_app(ScriptedAgent::failing(), ScriptedNarrator::silent()).await;
    let form = Form::new()
        .part("video", video_part("gameboy.mp4"))
        .text("price", "25.00");

    let response = app.post_analyze(form).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "AgentError: model returned an empty reply");
    assert_eq!(
        body["message"],
        "An error occurred while analyzing the video. Please try again."
    );
}

#[tokio::test]
async fn client_session_id_is_used_and_echoed() {
    let app = spawn_app(ScriptedAgent::replying("fair price"), ScriptedNarrator::silent()).await;
    let form = Form::new()
        .part("video", video_part("gameboy.mkv"))
        .text("price", "25.00")
        .text("session_id", "shopper-42");

    let body: Value = app.post_analyze(form).await.json().await.unwrap();

    assert_eq!(body["session_id"], "shopper-42");
    assert_eq!(app.agent.turns.lock().unwrap()[0].session, "shopper-42");
}
