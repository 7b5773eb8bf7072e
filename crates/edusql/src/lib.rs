#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod sqlite;
pub mod synthesize;
pub mod validate;

pub use cli::app::{Cli, Command};
pub use pipeline::Pipeline;
