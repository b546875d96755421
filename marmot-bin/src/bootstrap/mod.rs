use std::path::Path;

use marmot_core::{BatchResolver, CachedResolver, TargetResolver};
use marmot_etc::Config;

pub(crate) use targets::parse_targets;

mod targets;

pub(crate) struct Bootstrap {
    c: Config,
    resolver: TargetResolver,
}

impl Bootstrap {
    pub(crate) async fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => {
                let b = tokio::fs::read(path).await?;
                let c = Config::from_yaml(&b[..])?;
                info!("load configuration from '{}' ok", path.display());
                Ok(c)
            }
            None => Ok(Config::default()),
        }
    }

    pub(crate) fn targets(&self) -> &[String] {
        &self.c.targets
    }

    pub(crate) fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }
}

impl TryFrom<Config> for Bootstrap {
    type Error = anyhow::Error;

    fn try_from(mut c: Config) -> Result<Self, Self::Error> {
        c.resolver.apply_env();

        let cached = CachedResolver::try_from(&c.resolver)?;
        debug!(
            "build resolver: nameservers={:?}, system={}, cache_size={}",
            &c.resolver.nameservers, c.resolver.system, c.resolver.cache_size
        );

        let resolver = TargetResolver::from(BatchResolver::from(cached));

        Ok(Self { c, resolver })
    }
}
