use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ahash::{HashMap, HashSet};
use url::{Host, Url};

use marmot_util::is_address;

use crate::error::Error;
use crate::resolver::BatchResolver;

/// Something with a host which should be resolved into an address.
pub trait Addressable {
    fn host(&self) -> &str;

    /// A resolved one is never touched by [`TargetResolver`].
    fn is_resolved(&self) -> bool;

    fn set_addr(&mut self, addr: String);
}

/// A network target, eg: `https://example.com:8443`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    host: String,
    resolved: bool,
    addr: Option<String>,
}

impl Target {
    /// Creates a target, which is resolved already if its host is an ip address.
    pub fn new(url: Url) -> crate::Result<Target> {
        let host = host_of(&url)
            .ok_or_else(|| Error::InvalidTarget(url.to_string().into(), "no host found".into()))?;

        let (resolved, addr) = if is_address(&host) {
            (true, Some(Clone::clone(&host)))
        } else {
            (false, None)
        };

        Ok(Self {
            url,
            host,
            resolved,
            addr,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn addr(&self) -> Option<&str> {
        self.addr.as_deref()
    }
}

impl Addressable for Target {
    fn host(&self) -> &str {
        &self.host
    }

    fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn set_addr(&mut self, addr: String) {
        self.addr = Some(addr);
    }
}

impl FromStr for Target {
    type Err = Error;

    /// Parses a target from an url, a bare `host[:port]` is treated as `tcp://host[:port]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidTarget("".into(), "empty target".into()));
        }

        let url = if s.contains("://") {
            Url::parse(s)
        } else {
            Url::parse(&format!("tcp://{}", s))
        }
        .map_err(|e| Error::InvalidTarget(s.to_string().into(), e.to_string().into()))?;

        Target::new(url)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.addr {
            Some(addr) => write!(f, "{} -> {}", &self.url, addr),
            None => write!(f, "{} -> ?", &self.url),
        }
    }
}

/// Returns the host of the url, an IPv6 host is returned without brackets.
pub(crate) fn host_of(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) if domain.is_empty() => None,
        Host::Domain(domain) => Some(domain.to_string()),
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}

/// Resolves the addresses of targets in batch.
#[derive(Clone)]
pub struct TargetResolver {
    batch: BatchResolver,
}

impl TargetResolver {
    pub fn new(batch: BatchResolver) -> TargetResolver {
        Self { batch }
    }

    /// Sets the address of every unresolved target, falling back to its host.
    /// Resolved targets are left as they are.
    pub async fn resolve_all_targets<'a, T>(&self, targets: &'a mut [T]) -> &'a mut [T]
    where
        T: Addressable,
    {
        let hosts: Vec<String> = targets
            .iter()
            .filter(|it| !it.is_resolved())
            .map(|it| it.host())
            .collect::<HashSet<&str>>()
            .into_iter()
            .map(|it| it.to_string())
            .collect();

        if hosts.is_empty() {
            return targets;
        }

        let res = self.batch.resolve_all(&hosts).await;
        let ips: HashMap<&str, &str> = res.iter().collect();

        for target in targets.iter_mut().filter(|it| !it.is_resolved()) {
            let addr = ips.get(target.host()).unwrap_or(&target.host()).to_string();
            target.set_addr(addr);
        }

        targets
    }
}

impl From<BatchResolver> for TargetResolver {
    fn from(value: BatchResolver) -> Self {
        TargetResolver::new(value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::resolver::testing::{init, FakeUpstream};
    use crate::resolver::{AddressCache, CachedResolver, Upstream};

    use super::*;

    fn targets(urls: &[&str]) -> Vec<Target> {
        urls.iter().map(|it| it.parse().unwrap()).collect()
    }

    fn resolver(upstream: &Arc<FakeUpstream>) -> TargetResolver {
        TargetResolver::from(BatchResolver::from(CachedResolver::new(
            Clone::clone(upstream) as Arc<dyn Upstream>,
            AddressCache::new(64),
        )))
    }

    #[test]
    fn test_parse_target() {
        init();

        let t: Target = "https://Example.COM:8443/index.html".parse().unwrap();
        assert_eq!("example.com", t.host());
        assert!(!t.is_resolved());
        assert!(t.addr().is_none());

        let t: Target = "example.com:22".parse().unwrap();
        assert_eq!("tcp", t.url().scheme());
        assert_eq!(Some(22), t.url().port());
        assert_eq!("example.com", t.host());

        let t: Target = " http://10.0.0.1/ ".parse().unwrap();
        assert_eq!("10.0.0.1", t.host());
        assert!(t.is_resolved());
        assert_eq!(Some("10.0.0.1"), t.addr());

        let t: Target = "udp://[2001:db8::1]:53".parse().unwrap();
        assert_eq!("2001:db8::1", t.host());
        assert!(t.is_resolved());
        assert_eq!(Some("2001:db8::1"), t.addr());

        for next in ["", "  ", "file:///etc/hosts", "http://"] {
            assert!(next.parse::<Target>().is_err(), "'{}' should be invalid", next);
        }
    }

    #[test]
    fn test_display_target() {
        init();

        let mut t: Target = "https://example.com".parse().unwrap();
        assert_eq!("https://example.com/ -> ?", t.to_string());
        t.set_addr("203.0.113.5".into());
        assert_eq!("https://example.com/ -> 203.0.113.5", t.to_string());
    }

    #[tokio::test]
    async fn test_resolve_all_targets() {
        init();

        let upstream = Arc::new(
            FakeUpstream::default()
                .record("good.example", &["203.0.113.5"])
                .record("other.example", &["203.0.113.9"]),
        );
        let tr = resolver(&upstream);

        let mut ts = targets(&[
            "https://good.example",
            "tcp://good.example:22",
            "http://10.0.0.1",
            "https://badhost.invalid",
            "other.example:53",
        ]);
        tr.resolve_all_targets(&mut ts).await;

        let addrs: Vec<Option<&str>> = ts.iter().map(|it| it.addr()).collect();
        assert_eq!(
            vec![
                Some("203.0.113.5"),
                Some("203.0.113.5"),
                Some("10.0.0.1"),
                Some("badhost.invalid"),
                Some("203.0.113.9"),
            ],
            addrs
        );
        assert_eq!(1, upstream.queries("good.example"));
        assert_eq!(1, upstream.queries("badhost.invalid"));
        assert_eq!(3, upstream.total_queries());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Endpoint {
        host: &'static str,
        resolved: bool,
        addr: Option<String>,
    }

    impl Addressable for Endpoint {
        fn host(&self) -> &str {
            self.host
        }

        fn is_resolved(&self) -> bool {
            self.resolved
        }

        fn set_addr(&mut self, addr: String) {
            self.addr = Some(addr);
        }
    }

    #[tokio::test]
    async fn test_resolved_untouched() {
        init();

        let upstream = Arc::new(FakeUpstream::default());
        let tr = resolver(&upstream);

        let mut endpoints = vec![
            Endpoint {
                host: "badhost.invalid",
                resolved: true,
                addr: Some("192.0.2.100".into()),
            },
            Endpoint {
                host: "gone.invalid",
                resolved: true,
                addr: None,
            },
        ];
        let origin = Clone::clone(&endpoints);

        // idempotent, and no network access at all
        for _ in 0..2 {
            let res = tr.resolve_all_targets(&mut endpoints).await;
            assert_eq!(2, res.len());
            assert_eq!(origin, endpoints);
        }
        assert_eq!(0, upstream.total_queries());
    }

    #[tokio::test]
    async fn test_resolve_twice() {
        init();

        let upstream = Arc::new(FakeUpstream::default().record("good.example", &["203.0.113.5"]));
        let tr = resolver(&upstream);

        let mut ts = targets(&["https://good.example", "http://192.0.2.7"]);
        tr.resolve_all_targets(&mut ts).await;
        let first = Clone::clone(&ts);
        tr.resolve_all_targets(&mut ts).await;

        assert_eq!(first, ts);
        assert_eq!(1, upstream.total_queries());
    }
}
