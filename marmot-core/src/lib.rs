#![allow(clippy::type_complexity)]
#![allow(clippy::module_inception)]
#![allow(clippy::upper_case_acronyms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

#[macro_use]
extern crate log;

pub use error::Error as MarmotError;
pub use resolver::{
    AddressCache, BatchResolver, BatchResult, CachedResolver, HickoryUpstream,
    HickoryUpstreamBuilder, Resolution, Resolver, SafeResolver, Upstream,
};
pub use target::{Addressable, Target, TargetResolver};

pub type Result<T> = std::result::Result<T, MarmotError>;

mod error;
pub mod resolver;
pub mod target;
