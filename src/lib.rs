// src/lib.rs

pub mod api;
pub mod chat;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod repl;
pub mod scoring;
pub mod table;

pub use error::ScreenerError;
