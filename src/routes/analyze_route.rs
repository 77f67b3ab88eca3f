use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{post, web, HttpResponse};
use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;

use crate::{
    domain::{
        format_message_for_display, validate_video_file_name, AskingPrice, Verdict, VideoUpload,
    },
    error::AnalyzeError,
    services::{AgentRuntime, AppraisalTurn, Narrator, SessionId},
};

#[derive(MultipartForm)]
pub struct AnalyzeForm {
    video: Option<TempFile>,
    price: Option<Text<String>>,
    session_id: Option<Text<String>>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    verdict: Verdict,
    message: String,
    audio: Option<String>,
    session_id: String,
}

#[post("/analyze")]
async fn analyze(
    MultipartForm(form): MultipartForm<AnalyzeForm>,
    agent: web::Data<dyn AgentRuntime>,
    narrator: web::Data<dyn Narrator>,
) -> Result<HttpResponse, AnalyzeError> {
    let video = form
        .video
        .ok_or_else(|| AnalyzeError::Validation("No video file uploaded".to_string()))?;
    let format =
        validate_video_file_name(video.file_name.as_deref()).map_err(AnalyzeError::Validation)?;
    let price = AskingPrice::parse(form.price.as_ref().map(|p| p.0.as_str()))
        .map_err(AnalyzeError::Validation)?;
    let session = SessionId::from_client(form.session_id.as_ref().map(|s| s.0.as_str()));

    // The temp file is removed when `video` drops at the end of the request.
    let bytes = tokio::fs::read(video.file.path())
        .await
        .context("Failed to read uploaded video")?;
    let upload = VideoUpload {
        file_name: video.file_name.clone().unwrap_or_default(),
        format,
        bytes,
    };

    log::info!(
        "Analyzing {} ({} bytes) at ${} for session {}",
        upload.file_name,
        upload.bytes.len(),
        price.as_str(),
        session
    );

    let reply = agent
        .appraise(&session, AppraisalTurn::for_listing(&price, upload))
        .await?;
    log::info!("Agent reply received ({} chars)", reply.len());

    let verdict = Verdict::from_reply(&reply);
    let message = format_message_for_display(&reply);
    log::info!("Verdict: {}", verdict.as_str());

    let audio = match narrator.narrate(&reply).await {
        Ok(audio) => {
            log::info!("Narration generated ({} bytes)", audio.len());
            Some(BASE64.encode(audio))
        }
        Err(e) => {
            log::error!("Narration failed, continuing without audio: {}", e);
            None
        }
    };

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        verdict,
        message,
        audio,
        session_id: session.to_string(),
    }))
}
