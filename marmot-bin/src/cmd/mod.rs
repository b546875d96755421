use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Notify;

pub(crate) use resolve::CommandResolve;

mod resolve;

#[async_trait::async_trait]
pub(crate) trait Executable: 'static + Send + Sync {
    async fn execute(&self, shutdown: Arc<Notify>) -> Result<()>;
}
