pub mod audio;
pub mod auth;
pub mod email;
pub mod llm;
pub mod observability;
pub mod persistence;
