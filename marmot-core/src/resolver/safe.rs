use std::borrow::Cow;
use std::sync::Arc;

use super::{CachedResolver, Resolver};

/// The outcome of a resolution which never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(/* address */ String),
    Unreachable(/* reason */ Cow<'static, str>),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn ok(self) -> Option<String> {
        match self {
            Resolution::Resolved(addr) => Some(addr),
            Resolution::Unreachable(_) => None,
        }
    }
}

/// A resolver which absorbs all resolution errors: an unreachable host is
/// reported with a warning and yields no address.
#[derive(Clone)]
pub struct SafeResolver {
    inner: Arc<dyn Resolver>,
}

impl SafeResolver {
    pub fn new(inner: Arc<dyn Resolver>) -> SafeResolver {
        Self { inner }
    }

    pub async fn resolve_safe(&self, host: &str) -> Resolution {
        match self.inner.resolve(host).await {
            Ok(addr) => Resolution::Resolved(addr),
            Err(e) => {
                warn!("target '{}' is unreachable and will be skipped: {}", host, e);
                Resolution::Unreachable(e.to_string().into())
            }
        }
    }
}

impl From<CachedResolver> for SafeResolver {
    fn from(value: CachedResolver) -> Self {
        SafeResolver::new(Arc::new(value))
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use crate::resolver::testing::{init, logged, FakeUpstream};
    use crate::resolver::{AddressCache, Upstream};

    use super::*;

    #[tokio::test]
    async fn test_resolve_safe() {
        init();

        let upstream = Arc::new(FakeUpstream::default().record("good.example", &["203.0.113.5"]));
        let r = SafeResolver::from(CachedResolver::new(
            Clone::clone(&upstream) as Arc<dyn Upstream>,
            AddressCache::new(16),
        ));

        let res = r.resolve_safe("good.example").await;
        assert!(res.is_resolved());
        assert_eq!(Some("203.0.113.5".to_string()), res.ok());

        assert_eq!(
            Resolution::Resolved("10.0.0.1".into()),
            r.resolve_safe("10.0.0.1").await
        );

        let res = r.resolve_safe("badhost.invalid").await;
        assert!(matches!(&res, Resolution::Unreachable(reason) if reason.contains("badhost.invalid")));
        assert!(res.ok().is_none());

        let warnings = logged(Level::Warn);
        assert_eq!(1, warnings.len(), "warnings: {:?}", &warnings);
        assert!(warnings[0].contains("badhost.invalid"));

        assert_eq!(2, upstream.total_queries());
    }
}
