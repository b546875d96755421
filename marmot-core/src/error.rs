use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid configuration '{0}'")]
    InvalidConfig(Cow<'static, str>),

    #[error("invalid target '{0}': {1}")]
    InvalidTarget(/* target */ Cow<'static, str>, /* reason */ Cow<'static, str>),

    #[error("failed to resolve '{host}': {reason}")]
    DnsResolution {
        host: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error), // source and Display delegate to anyhow::Error
}

impl Error {
    pub(crate) fn dns<H, R>(host: H, reason: R) -> Self
    where
        H: Into<Cow<'static, str>>,
        R: Into<Cow<'static, str>>,
    {
        Error::DnsResolution {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the upstream query failed to produce an address.
    pub fn is_dns_resolution(&self) -> bool {
        matches!(self, Error::DnsResolution { .. })
    }
}
