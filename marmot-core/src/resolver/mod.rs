use std::net::IpAddr;

use url::Url;

pub use batch::{BatchResolver, BatchResult};
pub use dns::{AddressCache, CachedResolver};
pub use safe::{Resolution, SafeResolver};
pub use upstream::{HickoryUpstream, HickoryUpstreamBuilder};

use crate::error::Error;
use crate::Result;

mod batch;
mod dns;
mod safe;
mod upstream;

/// The upstream which answers DNS queries, eg: a set of nameservers.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Queries all addresses of the host, in the order of the answer.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>>;
}

#[async_trait::async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolves the host into a single textual ip address.
    async fn resolve(&self, host: &str) -> Result<String>;

    async fn resolve_url(&self, url: &Url) -> Result<String> {
        match crate::target::host_of(url) {
            Some(host) => self.resolve(&host).await,
            None => Err(Error::InvalidTarget(
                url.to_string().into(),
                "no host found".into(),
            )),
        }
    }
}
