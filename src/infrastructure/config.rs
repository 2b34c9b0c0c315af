//! Application configuration

use std::env;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::domain::value_objects::UserId;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    pub storage: StorageConfig,

    /// Shared secret for `/api/internal/*` routes; internal routes are
    /// closed when unset
    pub internal_api_key: Option<String>,

    pub ai: AiConfig,

    /// Maximum number of characters of a body kept in an audit entry
    pub audit_body_limit: usize,

    /// Largest request body accepted, in bytes
    pub max_body_bytes: usize,

    /// Account that owns the public library and every ingested asset
    pub library_owner_id: UserId,
}

/// Same cap axum applies to its body extractors
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Storage backend selection
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// "sqlite" or "memory"
    pub backend: String,
    pub database_url: String,
}

/// OpenAI-compatible provider settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env::var("VTT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),

            storage: StorageConfig {
                backend: env::var("VTT_STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
                database_url: env::var("VTT_DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://./data/vtt_tools.db".to_string()),
            },

            internal_api_key: env::var("VTT_INTERNAL_API_KEY").ok().filter(|k| !k.is_empty()),

            ai: AiConfig {
                base_url: env::var("VTT_AI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("VTT_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                api_key: env::var("VTT_AI_API_KEY").ok().filter(|k| !k.is_empty()),
            },

            audit_body_limit: env::var("VTT_AUDIT_BODY_LIMIT")
                .unwrap_or_else(|_| "4096".to_string())
                .parse()
                .context("VTT_AUDIT_BODY_LIMIT must be a non-negative integer")?,

            max_body_bytes: match env::var("VTT_MAX_BODY_BYTES") {
                Ok(value) => value
                    .parse()
                    .context("VTT_MAX_BODY_BYTES must be a non-negative integer")?,
                Err(_) => DEFAULT_MAX_BODY_BYTES,
            },

            library_owner_id: match env::var("VTT_LIBRARY_OWNER_ID") {
                Ok(value) => Uuid::parse_str(&value)
                    .context("VTT_LIBRARY_OWNER_ID must be a UUID")?
                    .into(),
                Err(_) => UserId::from_uuid(Uuid::nil()),
            },
        })
    }

    /// Configuration backed by in-memory storage
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            storage: StorageConfig {
                backend: "memory".to_string(),
                database_url: String::new(),
            },
            internal_api_key: None,
            ai: AiConfig {
                base_url: "http://localhost:11434/v1".to_string(),
                model: "llama3.2".to_string(),
                api_key: None,
            },
            audit_body_limit: 4096,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            library_owner_id: UserId::new(),
        }
    }
}
