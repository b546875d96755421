use std::sync::Arc;

use ahash::{HashMap, HashSet};
use tokio::task::JoinSet;

use marmot_util::is_address;

use super::{CachedResolver, Resolution, SafeResolver};

/// Resolved addresses of a batch, one `(host, addr)` pair per input host in
/// the input order. An unresolved host maps to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult(Vec<(String, String)>);

impl BatchResult {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the address of the host, or None if the host was not in the batch.
    pub fn get(&self, host: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == host)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }
}

impl IntoIterator for BatchResult {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolves many hosts concurrently, each distinct host is resolved once.
#[derive(Clone)]
pub struct BatchResolver {
    inner: Arc<SafeResolver>,
}

impl BatchResolver {
    pub fn new(inner: SafeResolver) -> BatchResolver {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub async fn resolve_all<S>(&self, hosts: &[S]) -> BatchResult
    where
        S: AsRef<str>,
    {
        let unresolved: HashSet<&str> = hosts
            .iter()
            .map(|it| it.as_ref())
            .filter(|it| !is_address(it))
            .collect();

        // spawn all before joining any
        let mut joins = JoinSet::new();
        for host in &unresolved {
            let host = host.to_string();
            let inner = Clone::clone(&self.inner);
            joins.spawn(async move {
                let res = inner.resolve_safe(&host).await;
                (host, res)
            });
        }

        let mut ips: HashMap<String, String> = Default::default();
        while let Some(next) = joins.join_next().await {
            match next {
                Ok((host, Resolution::Resolved(addr))) => {
                    ips.insert(host, addr);
                }
                Ok((_, Resolution::Unreachable(_))) => (),
                Err(e) => error!("resolve task is broken: {}", e),
            }
        }

        info!(
            "resolve batch finish: hosts={}, distinct={}, resolved={}",
            hosts.len(),
            unresolved.len(),
            ips.len()
        );

        let pairs = hosts
            .iter()
            .map(|it| {
                let host = it.as_ref();
                let addr = match ips.get(host) {
                    Some(addr) => Clone::clone(addr),
                    None => host.to_string(),
                };
                (host.to_string(), addr)
            })
            .collect();

        BatchResult(pairs)
    }
}

impl From<SafeResolver> for BatchResolver {
    fn from(value: SafeResolver) -> Self {
        BatchResolver::new(value)
    }
}

impl From<CachedResolver> for BatchResolver {
    fn from(value: CachedResolver) -> Self {
        BatchResolver::new(SafeResolver::from(value))
    }
}
