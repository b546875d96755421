#![allow(clippy::type_complexity)]
#![allow(clippy::module_inception)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

#[macro_use]
extern crate log;

pub use config::{
    Config, ResolverConfig, DEFAULT_CACHE_SIZE, DEFAULT_NAMESERVERS, ENV_DNS, ENV_DNS_CACHE_SIZE,
};

mod config;
