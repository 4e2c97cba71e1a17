//! Chat module - Gemini-powered conversational front-end
//!
//! - Streaming replies through the [`provider::Provider`] trait
//! - Explicit, per-run [`session::ChatSession`] history

pub mod provider;
pub mod session;

pub use provider::{GeminiChatProvider, Provider, StreamEvent};
pub use session::{ChatSession, ChatTurn, Speaker};
