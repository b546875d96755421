use serde::{Deserialize, Serialize};

/// Nameservers which are always queried first, in this order.
pub const DEFAULT_NAMESERVERS: [&str; 6] = [
    "1.1.1.1",
    "1.0.0.1",
    "8.8.8.8",
    "8.8.4.4",
    "208.67.222.222",
    "208.67.220.220",
];

/// The max number of resolved hostnames kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Overrides the nameserver list, eg: `MARMOT_DNS=1.1.1.1;9.9.9.9:53`.
pub const ENV_DNS: &str = "MARMOT_DNS";

/// Overrides the cache size, eg: `MARMOT_DNS_CACHE_SIZE=4096`.
pub const ENV_DNS_CACHE_SIZE: &str = "MARMOT_DNS_CACHE_SIZE";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl Config {
    pub fn from_yaml(b: &[u8]) -> serde_yaml::Result<Self> {
        serde_yaml::from_slice(b)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ResolverConfig {
    /// Nameservers as `ip` or `ip:port`, tried in order.
    #[serde(default = "ResolverConfig::default_nameservers")]
    pub nameservers: Vec<String>,
    /// Append the nameservers of the system configuration (eg: /etc/resolv.conf).
    #[serde(default = "ResolverConfig::default_system")]
    pub system: bool,
    #[serde(default = "ResolverConfig::default_cache_size")]
    pub cache_size: usize,
    /// Timeout of a single upstream query, eg: `2s`, `500ms`.
    #[serde(default)]
    pub timeout: Option<String>,
}

impl ResolverConfig {
    fn default_nameservers() -> Vec<String> {
        DEFAULT_NAMESERVERS.iter().map(|it| it.to_string()).collect()
    }

    fn default_system() -> bool {
        true
    }

    fn default_cache_size() -> usize {
        DEFAULT_CACHE_SIZE
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    /// Applies overrides looked up by the given function, invalid values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(s) = lookup(ENV_DNS) {
            let nameservers: Vec<String> = s
                .split([';', ','])
                .map(|it| it.trim())
                .filter(|it| !it.is_empty())
                .map(|it| it.to_string())
                .collect();
            if nameservers.is_empty() {
                warn!("ignore empty {}", ENV_DNS);
            } else {
                debug!("use nameservers from {}: {:?}", ENV_DNS, &nameservers);
                self.nameservers = nameservers;
            }
        }

        if let Some(s) = lookup(ENV_DNS_CACHE_SIZE) {
            match s.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.cache_size = n,
                _ => warn!("ignore invalid {}: '{}'", ENV_DNS_CACHE_SIZE, s),
            }
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameservers: Self::default_nameservers(),
            system: Self::default_system(),
            cache_size: Self::default_cache_size(),
            timeout: None,
        }
    }
}
