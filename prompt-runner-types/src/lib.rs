//! Wire types for the Gemini `generateContent` call.

pub mod config;
pub mod content;
pub mod enums;
pub mod models;
pub mod response;
