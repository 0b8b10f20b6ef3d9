pub mod config;
pub mod error;
pub mod feed;
pub mod intelligence;
pub mod llm;
pub mod models;
pub mod search;
pub mod services;
