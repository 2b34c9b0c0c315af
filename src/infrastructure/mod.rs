//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory document stores
//! - HTTP: REST API routes and middleware
//! - Auth: caller identity from trusted gateway headers
//! - AI client: OpenAI-compatible text generation
//! - Config: Application configuration
//! - State: Shared application state

pub mod ai_client;
pub mod auth;
pub mod config;
pub mod http;
pub mod middleware;
pub mod persistence;
pub mod state;
