use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// Remote file storage scoped by team, such as the platform's team files.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Copy `remote_path` of `team_id` to `local_path`, replacing any file there.
    async fn download(&self, team_id: u64, remote_path: &str, local_path: &Path) -> Result<()>;
}
