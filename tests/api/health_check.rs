use crate::helpers::{spawn_app, ScriptedAgent, ScriptedNarrator};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app(ScriptedAgent::replying("ok"), ScriptedNarrator::silent()).await;

    let response = app
        .client
        .get(format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}
