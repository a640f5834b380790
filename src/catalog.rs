//! The model catalog: a fixed ordered list of downloadable weight
//! profiles, selected by 1-based ordinal. A catalog file given with
//! `--catalog` replaces the built-in table (same JSON shape).

use crate::domain::models::ModelProfile;
use crate::error::SelectionError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

fn profile(id: u32, name: &str, url: &str, filename: &str, size_bytes: u64) -> ModelProfile {
    ModelProfile {
        id,
        name: name.to_string(),
        url: url.to_string(),
        filename: filename.to_string(),
        size_bytes,
        sha256: None,
    }
}

pub fn builtin() -> Vec<ModelProfile> {
    vec![
        profile(
            1,
            "TinyLlama 1.1B Chat",
            "https://huggingface.co/TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF/resolve/main/tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf",
            "tinyllama.gguf",
            669_000_000,
        ),
        profile(
            2,
            "Qwen 1.5 1.8B Chat",
            "https://modelscope.cn/models/qwen/Qwen1.5-1.8B-Chat-GGUF/resolve/main/qwen1_5-1_8b-chat-q4_k_m.gguf",
            "qwen-1.8b-chat.gguf",
            1_250_000_000,
        ),
        profile(
            3,
            "Phi-2 2.7B",
            "https://huggingface.co/TheBloke/phi-2-GGUF/resolve/main/phi-2.Q4_K_M.gguf",
            "phi2.gguf",
            1_700_000_000,
        ),
        profile(
            4,
            "Mistral 7B Instruct v0.2",
            "https://huggingface.co/TheBloke/Mistral-7B-Instruct-v0.2-GGUF/resolve/main/mistral-7b-instruct-v0.2.Q4_K_M.gguf",
            "mistral.gguf",
            4_400_000_000,
        ),
    ]
}

#[derive(Deserialize)]
struct CatalogFile {
    models: Vec<ModelProfile>,
}

pub fn load(source: Option<&Path>) -> Result<Vec<ModelProfile>, SelectionError> {
    let models = match source {
        None => builtin(),
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                SelectionError::UnreadableCatalog {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            })?;
            let file: CatalogFile =
                serde_json::from_str(&raw).map_err(|e| SelectionError::UnreadableCatalog {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
            file.models
        }
    };
    validate(&models)?;
    Ok(models)
}

pub fn validate(models: &[ModelProfile]) -> Result<(), SelectionError> {
    if models.is_empty() {
        return Err(SelectionError::EmptyCatalog);
    }
    let mut ids = HashSet::new();
    let mut filenames = HashSet::new();
    for m in models {
        if !ids.insert(m.id) {
            return Err(SelectionError::DuplicateId(m.id));
        }
        if !filenames.insert(m.filename.as_str()) {
            return Err(SelectionError::DuplicateFilename(m.filename.clone()));
        }
    }
    Ok(())
}

/// Validate a raw selector against the catalog. Anything that does not
/// parse to a listed ordinal is rejected before any side effect.
pub fn select<'a>(models: &'a [ModelProfile], raw: &str) -> Result<&'a ModelProfile, SelectionError> {
    let given = raw.trim();
    let invalid = || SelectionError::InvalidChoice {
        given: given.to_string(),
        max: models.len(),
    };
    let id: u32 = given.parse().map_err(|_| invalid())?;
    models.iter().find(|m| m.id == id).ok_or_else(invalid)
}
