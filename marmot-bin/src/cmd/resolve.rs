use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Notify;

use marmot_core::{Addressable, Target};

use crate::bootstrap::{parse_targets, Bootstrap};

#[derive(Serialize)]
struct Row<'a> {
    url: &'a str,
    host: &'a str,
    addr: Option<&'a str>,
}

impl<'a> From<&'a Target> for Row<'a> {
    fn from(value: &'a Target) -> Self {
        Self {
            url: value.url().as_str(),
            host: value.host(),
            addr: value.addr(),
        }
    }
}

pub(crate) struct CommandResolve {
    config: Option<PathBuf>,
    file: Option<PathBuf>,
    json: bool,
    targets: Vec<String>,
}

impl CommandResolve {
    pub(crate) fn new(
        config: Option<PathBuf>,
        file: Option<PathBuf>,
        json: bool,
        targets: Vec<String>,
    ) -> Self {
        Self {
            config,
            file,
            json,
            targets,
        }
    }

    async fn lines(&self, bt: &Bootstrap) -> Result<Vec<String>> {
        let mut lines = Clone::clone(&self.targets);

        if let Some(path) = &self.file {
            let s = tokio::fs::read_to_string(path).await?;
            lines.extend(s.lines().map(|it| it.to_string()));
        }

        // fallback to targets of configuration
        if lines.is_empty() {
            lines.extend_from_slice(bt.targets());
        }

        Ok(lines)
    }
}

#[async_trait]
impl super::Executable for CommandResolve {
    async fn execute(&self, shutdown: Arc<Notify>) -> Result<()> {
        let c = Bootstrap::load(self.config.as_deref()).await?;
        let bt = Bootstrap::try_from(c)?;

        let lines = self.lines(&bt).await?;
        let mut targets = parse_targets(lines.iter().map(|it| it.as_str()));
        if targets.is_empty() {
            bail!("no target found");
        }

        tokio::select! {
            _ = bt.resolver().resolve_all_targets(&mut targets) => (),
            _ = shutdown.notified() => {
                warn!("resolving is cancelled");
                return Ok(());
            }
        }

        if self.json {
            let rows: Vec<Row<'_>> = targets.iter().map(Row::from).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            for next in &targets {
                println!("{}", next);
            }
        }

        Ok(())
    }
}
