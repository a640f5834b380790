use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// One entry of the model catalog. Ids are 1-based ordinals; the
/// catalog is a fixed ordered sequence looked up by selector.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelProfile {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub filename: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvisioningConfig {
    pub name: String,
    pub tagline: String,
    pub llm: LlmSettings,
    pub voice: VoiceSettings,
    pub memory: MemorySettings,
    pub server: ServerSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeploySettings>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmSettings {
    pub model_type: String,
    pub model_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VoiceSettings {
    pub whisper_model: String,
    pub tts_model: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemorySettings {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeploySettings {
    pub domain: String,
    #[serde(default = "default_deploy_user")]
    pub user: String,
}

fn default_deploy_user() -> String {
    "leona".to_string()
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            domain: String::new(),
            user: default_deploy_user(),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            name: "LEONA".to_string(),
            tagline: "Always One Call Away".to_string(),
            llm: LlmSettings {
                model_type: "llama_cpp".to_string(),
                model_path: "data/models/model.gguf".to_string(),
            },
            voice: VoiceSettings {
                whisper_model: "base".to_string(),
                tts_model: "tts_models/en/ljspeech/tacotron2-DDC".to_string(),
            },
            memory: MemorySettings {
                db_path: "data/memory/leona.db".to_string(),
            },
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            deploy: None,
        }
    }
}

/// The probed host. Built once at the start of a run, read-only after.
#[derive(Debug, Serialize, Clone)]
pub struct DeploymentTarget {
    pub python: String,
    pub python_version: String,
    pub os: String,
    pub privileged: bool,
    pub pip_available: bool,
    pub existing_install: bool,
}

#[derive(Debug, Serialize)]
pub struct MaterializeReport {
    pub root: String,
    pub created_dirs: Vec<String>,
    pub config_path: String,
    pub env_path: Option<String>,
    pub secret_preserved: bool,
}

#[derive(Debug, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub version: String,
    pub status: String,
    pub attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct InstallReport {
    pub interpreter: String,
    pub packages: Vec<PackageStatus>,
}

#[derive(Debug, Serialize)]
pub struct DownloadReport {
    pub model: String,
    pub filename: String,
    pub path: String,
    pub bytes_written: u64,
    pub sha256: String,
    pub verified: bool,
    pub already_present: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct UpReport {
    pub stages: Vec<CheckItem>,
}

#[derive(Debug, Serialize)]
pub struct DeployReport {
    pub service: String,
    pub domain: String,
    pub checks: Vec<CheckItem>,
    pub firewall: Vec<String>,
    pub certificate: String,
    pub health: Option<HealthReport>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub url: String,
    pub status: Option<u16>,
    pub ok: bool,
    pub attempts: u32,
}
