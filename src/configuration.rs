use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

use crate::services::LocatorStrategy;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeys,
    pub browser: BrowserSettings,
    pub marketplace: MarketplaceSettings,
    pub agent: AgentSettings,
    pub narration: NarrationSettings,
    pub upload: UploadSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Deserialize, Clone)]
pub struct ApiKeys {
    pub gemini: String,
    pub elevenlabs: String,
}

#[derive(Deserialize, Clone)]
pub struct BrowserSettings {
    /// Address of the WebDriver server (chromedriver / selenium).
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_sessions: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub launch_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub element_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub session_timeout_secs: u64,
}

impl BrowserSettings {
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

#[derive(Deserialize, Clone)]
pub struct MarketplaceSettings {
    pub entry_url: Url,
    pub search_input: String,
    pub search_button: String,
    pub strategy: LocatorStrategy,
    pub card: String,
    pub title: String,
    pub price: String,
}

#[derive(Deserialize, Clone)]
pub struct AgentSettings {
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_iterations: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_history_turns: usize,
    /// Sessions whose history is kept; the least recently used is evicted.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_conversations: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct NarrationSettings {
    pub base_url: Url,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct UploadSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_size_bytes: usize,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No working directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_APPLICATION__PORT=5001 sets `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
