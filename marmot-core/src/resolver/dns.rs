use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use marmot_etc::{ResolverConfig, DEFAULT_CACHE_SIZE};
use marmot_util::is_address;

use crate::error::Error;
use crate::Result;

use super::{HickoryUpstreamBuilder, Resolver, Upstream};

/// A bounded LRU cache of resolved addresses, keyed by hostname.
///
/// Entries never expire, they are only evicted when the capacity is exceeded.
/// The cache is cheap to clone, all clones share the same entries.
#[derive(Clone)]
pub struct AddressCache {
    capacity: usize,
    inner: Cache<String, String, ahash::RandomState>,
}

impl AddressCache {
    pub fn new(capacity: usize) -> AddressCache {
        let capacity = usize::max(1, capacity);
        let inner = Cache::builder()
            .max_capacity(capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .build_with_hasher(ahash::RandomState::default());
        Self { capacity, inner }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, host: &str) -> Option<String> {
        self.inner.get(host).await
    }

    /// Caches the address, evicting the least recently used entry if the cache is full.
    pub async fn put(&self, host: String, addr: String) {
        self.inner.insert(host, addr).await;
        self.sync().await;
    }

    pub fn contains(&self, host: &str) -> bool {
        self.inner.contains_key(host)
    }

    /// Returns the number of entries after all pending evictions are applied.
    pub async fn len(&self) -> usize {
        self.sync().await;
        self.inner.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Applies pending maintenance, including capacity eviction.
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Returns the cached address, or runs `init` and caches its success.
    /// Concurrent callers of the same host share one `init`.
    async fn get_or_try_insert_with<F>(
        &self,
        host: &str,
        init: F,
    ) -> std::result::Result<String, Arc<Error>>
    where
        F: std::future::Future<Output = Result<String>>,
    {
        self.inner.try_get_with(host.to_string(), init).await
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        AddressCache::new(DEFAULT_CACHE_SIZE)
    }
}

/// A resolver which caches the first address of each hostname in memory.
pub struct CachedResolver {
    upstream: Arc<dyn Upstream>,
    cache: AddressCache,
}

impl CachedResolver {
    pub fn new(upstream: Arc<dyn Upstream>, cache: AddressCache) -> CachedResolver {
        Self { upstream, cache }
    }

    pub fn cache(&self) -> &AddressCache {
        &self.cache
    }
}

impl TryFrom<&ResolverConfig> for CachedResolver {
    type Error = Error;

    fn try_from(c: &ResolverConfig) -> std::result::Result<Self, Self::Error> {
        if c.cache_size == 0 {
            return Err(Error::InvalidConfig("cache_size must be positive".into()));
        }
        let upstream = HickoryUpstreamBuilder::try_from(c)?.build()?;
        Ok(CachedResolver::new(
            Arc::new(upstream),
            AddressCache::new(c.cache_size),
        ))
    }
}

#[async_trait::async_trait]
impl Resolver for CachedResolver {
    async fn resolve(&self, host: &str) -> Result<String> {
        if is_address(host) {
            return Ok(host.to_string());
        }

        if let Some(addr) = self.cache.get(host).await {
            debug!("resolve '{}' from cache: {}", host, &addr);
            return Ok(addr);
        }

        let addr = self
            .cache
            .get_or_try_insert_with(host, inner_resolve(self.upstream.as_ref(), host))
            .await
            .map_err(|e| match e.as_ref() {
                Error::DnsResolution { reason, .. } => {
                    Error::dns(host.to_string(), Clone::clone(reason))
                }
                other => Error::dns(host.to_string(), other.to_string()),
            })?;

        // moka defers eviction, apply it to stay within the capacity
        self.cache.sync().await;

        Ok(addr)
    }
}

#[inline]
async fn inner_resolve(upstream: &dyn Upstream, host: &str) -> Result<String> {
    let ips = upstream.lookup(host).await?;
    match ips.first() {
        Some(ip) => {
            debug!("resolve '{}' ok: {} of {:?}", host, ip, &ips);
            Ok(ip.to_string())
        }
        None => Err(Error::dns(host.to_string(), "no address in answer")),
    }
}
