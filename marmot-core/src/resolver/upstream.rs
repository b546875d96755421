use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use hickory_resolver::config::{
    NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts,
    ServerOrderingStrategy,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioAsyncResolver;

use marmot_etc::{ResolverConfig as ResolverConf, DEFAULT_NAMESERVERS};
use marmot_util::parse_nameserver;

use crate::error::Error;
use crate::Result;

use super::Upstream;

/// An upstream which queries nameservers through hickory-dns.
pub struct HickoryUpstream {
    resolver: TokioAsyncResolver,
}

impl HickoryUpstream {
    pub fn builder() -> HickoryUpstreamBuilder {
        HickoryUpstreamBuilder::default()
    }
}

#[async_trait::async_trait]
impl Upstream for HickoryUpstream {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let ips = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| Error::dns(host.to_string(), e.to_string()))?;
        Ok(ips.iter().collect())
    }
}

pub struct HickoryUpstreamBuilder {
    nameservers: Vec<SocketAddr>,
    system: bool,
    timeout: Option<Duration>,
}

impl HickoryUpstreamBuilder {
    /// Replaces the explicit nameservers, which are queried before the system ones.
    pub fn nameservers<I>(mut self, nameservers: I) -> Self
    where
        I: IntoIterator<Item = SocketAddr>,
    {
        self.nameservers = nameservers.into_iter().collect();
        self
    }

    /// Whether to append the nameservers of the system configuration.
    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HickoryUpstream> {
        let Self {
            nameservers,
            system,
            timeout,
        } = self;

        let mut nsc = vec![];
        for addr in nameservers {
            nsc.push(NameServerConfig::new(addr, Protocol::Udp));
            nsc.push(NameServerConfig::new(addr, Protocol::Tcp));
        }

        let mut domain = None;
        let mut search = vec![];
        let mut opts = ResolverOpts::default();

        if system {
            match hickory_resolver::system_conf::read_system_conf() {
                Ok((c, o)) => {
                    domain = c.domain().cloned();
                    search = c.search().to_vec();
                    nsc.extend(c.name_servers().iter().cloned());
                    opts = o;
                }
                Err(e) => {
                    warn!("no system dns configuration, use explicit nameservers only: {}", e);
                }
            }
        }

        if nsc.is_empty() {
            return Err(Error::InvalidConfig("no nameserver available".into()));
        }

        opts.server_ordering_strategy = ServerOrderingStrategy::UserProvidedOrder;
        if let Some(timeout) = timeout {
            opts.timeout = timeout;
        }

        debug!("build dns upstream with {} nameserver configs", nsc.len());

        let resolver = TokioAsyncResolver::new(
            ResolverConfig::from_parts(domain, search, NameServerConfigGroup::from(nsc)),
            opts,
            TokioConnectionProvider::default(),
        );

        Ok(HickoryUpstream { resolver })
    }
}

impl Default for HickoryUpstreamBuilder {
    fn default() -> Self {
        Self {
            nameservers: DEFAULT_NAMESERVERS
                .iter()
                .filter_map(|it| parse_nameserver(it))
                .collect(),
            system: true,
            timeout: None,
        }
    }
}

impl TryFrom<&ResolverConf> for HickoryUpstreamBuilder {
    type Error = Error;

    fn try_from(c: &ResolverConf) -> std::result::Result<Self, Self::Error> {
        let mut nameservers = Vec::with_capacity(c.nameservers.len());
        for next in &c.nameservers {
            match parse_nameserver(next) {
                Some(addr) => nameservers.push(addr),
                None => {
                    return Err(Error::InvalidConfig(
                        format!("invalid nameserver '{}'", next).into(),
                    ))
                }
            }
        }

        let mut b = HickoryUpstreamBuilder::default()
            .nameservers(nameservers)
            .system(c.system);

        if let Some(s) = &c.timeout {
            let timeout = duration_str::parse_std(s).map_err(|e| {
                Error::InvalidConfig(format!("invalid timeout '{}': {}", s, e).into())
            })?;
            b = b.timeout(timeout);
        }

        Ok(b)
    }
}

#[cfg(test)]
mod tests {
    use crate::resolver::testing::init;

    use super::*;

    #[test]
    fn test_default_nameservers() {
        init();

        let b = HickoryUpstreamBuilder::default();
        let expect: Vec<SocketAddr> = [
            "1.1.1.1:53",
            "1.0.0.1:53",
            "8.8.8.8:53",
            "8.8.4.4:53",
            "208.67.222.222:53",
            "208.67.220.220:53",
        ]
        .iter()
        .map(|it| it.parse().unwrap())
        .collect();
        assert_eq!(expect, b.nameservers);
        assert!(b.system);
        assert!(b.timeout.is_none());
    }

    #[test]
    fn test_from_config() {
        init();

        let c = ResolverConf {
            nameservers: vec!["9.9.9.9".into(), "[2620:fe::fe]:5353".into()],
            system: false,
            cache_size: 16,
            timeout: Some("1500ms".into()),
        };
        let b = HickoryUpstreamBuilder::try_from(&c).unwrap();
        assert_eq!(
            vec![
                "9.9.9.9:53".parse::<SocketAddr>().unwrap(),
                "[2620:fe::fe]:5353".parse().unwrap()
            ],
            b.nameservers
        );
        assert!(!b.system);
        assert_eq!(Some(Duration::from_millis(1500)), b.timeout);
    }

    #[test]
    fn test_from_invalid_config() {
        init();

        let c = ResolverConf {
            nameservers: vec!["dns.google".into()],
            ..Default::default()
        };
        assert!(HickoryUpstreamBuilder::try_from(&c)
            .is_err_and(|e| matches!(e, Error::InvalidConfig(_))));

        let c = ResolverConf {
            timeout: Some("soon".into()),
            ..Default::default()
        };
        assert!(HickoryUpstreamBuilder::try_from(&c)
            .is_err_and(|e| matches!(e, Error::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_build() {
        init();

        assert!(HickoryUpstream::builder()
            .nameservers(vec![])
            .system(false)
            .build()
            .is_err());

        assert!(HickoryUpstream::builder()
            .system(false)
            .timeout(Duration::from_secs(1))
            .build()
            .is_ok());
    }
}
