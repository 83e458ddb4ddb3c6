//! Publishing into a local (or mounted, web-served) directory.

use std::path::{Path, PathBuf};
use tracing::info;

use super::PublishedMap;
use crate::config::LocalConfig;
use crate::error::MapResult;

pub struct LocalPublisher {
    output_dir: PathBuf,
    public_base_url: Option<String>,
}

impl LocalPublisher {
    pub fn new(config: LocalConfig) -> Self {
        Self {
            output_dir: config.output_dir,
            public_base_url: config.public_base_url,
        }
    }

    pub async fn publish(&self, path: &Path, file_name: &str) -> MapResult<PublishedMap> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let target = self.output_dir.join(file_name);
        tokio::fs::copy(path, &target).await?;
        info!("Copied map to {}", target.display());

        let url = match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), file_name),
            None => std::path::absolute(&target)
                .unwrap_or(target)
                .display()
                .to_string(),
        };
        Ok(PublishedMap { url, file_id: None })
    }
}
