//! Delivery of rendered documents to shared storage.

mod drive;
mod local;

pub use drive::{resolve_token, DriveUploader};
pub use local::LocalPublisher;

use std::path::Path;

use crate::config::{PublishBackend, PublishConfig};
use crate::error::MapResult;

/// Where a published document ended up.
#[derive(Debug, Clone)]
pub struct PublishedMap {
    pub url: String,
    /// Storage-side identifier, when the backend has one
    pub file_id: Option<String>,
}

pub enum Publisher {
    Drive(DriveUploader),
    Local(LocalPublisher),
}

impl Publisher {
    pub fn from_config(config: &PublishConfig) -> MapResult<Self> {
        Ok(match config.backend {
            PublishBackend::Drive => Publisher::Drive(DriveUploader::new(config.drive.clone())?),
            PublishBackend::Local => Publisher::Local(LocalPublisher::new(config.local.clone())),
        })
    }

    pub async fn publish(&self, path: &Path, file_name: &str) -> MapResult<PublishedMap> {
        match self {
            Publisher::Drive(drive) => drive.publish(path, file_name).await,
            Publisher::Local(local) => local.publish(path, file_name).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Publisher::Drive(_) => "drive",
            Publisher::Local(_) => "local",
        }
    }
}
