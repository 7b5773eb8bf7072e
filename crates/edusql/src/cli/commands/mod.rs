pub mod ask;
pub mod chat;
pub mod console;
pub mod init_db;
pub mod schema;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

pub(crate) fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    if !config.database_path.exists() {
        tracing::warn!(
            path = %config.database_path.display(),
            "database file does not exist; run `edusql init-db` first"
        );
    }
    Pipeline::from_config(config).context("failed to configure language model client")
}
