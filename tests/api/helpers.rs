use std::{
    net::TcpListener,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thriftscout::{
    services::{AgentError, AgentRuntime, AppraisalTurn, NarrationError, Narrator, SessionId},
    startup::run,
};

pub struct RecordedTurn {
    pub session: String,
    pub prompt: String,
    pub media_type: String,
    pub video_len: usize,
}

/// Stands in for the model: answers every turn with the same text.
pub struct ScriptedAgent {
    reply: Option<String>,
    pub turns: Mutex<Vec<RecordedTurn>>,
}

impl ScriptedAgent {
    pub fn replying(text: &str) -> Self {
        ScriptedAgent {
            reply: Some(text.to_string()),
            turns: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        ScriptedAgent {
            reply: None,
            turns: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl AgentRuntime for ScriptedAgent {
    async fn appraise(
        &self,
        session: &SessionId,
        turn: AppraisalTurn,
    ) -> Result<String, AgentError> {
        self.turns.lock().unwrap().push(RecordedTurn {
            session: session.to_string(),
            prompt: turn.prompt,
            media_type: turn.media_type,
            video_len: turn.video.len(),
        });
        self.reply.clone().ok_or(AgentError::EmptyReply)
    }
}

pub struct ScriptedNarrator {
    audio: Option<Vec<u8>>,
}

impl ScriptedNarrator {
    pub fn speaking(audio: &[u8]) -> Self {
        ScriptedNarrator {
            audio: Some(audio.to_vec()),
        }
    }

    pub fn silent() -> Self {
        ScriptedNarrator { audio: None }
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn narrate(&self, _text: &str) -> Result<Vec<u8>, NarrationError> {
        self.audio.clone().ok_or(NarrationError::EmptyAudio)
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub agent: Arc<ScriptedAgent>,
}

impl TestApp {
    pub async fn post_analyze(&self, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}/analyze", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn video_part(file_name: &str) -> Part {
    Part::bytes(b"\x00\x00\x00\x18ftypmp42 tiny test clip".to_vec()).file_name(file_name.to_string())
}

pub async fn spawn_app(agent: ScriptedAgent, narrator: ScriptedNarrator) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let agent = Arc::new(agent);

    let server = run(
        listener,
        agent.clone(),
        Arc::new(narrator),
        PathBuf::from("static"),
        10 * 1024 * 1024,
    )
    .expect("Failed to bind address");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        agent,
    }
}
