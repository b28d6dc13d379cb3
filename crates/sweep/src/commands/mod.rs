//! CLI command implementations.

pub(crate) mod config;
pub(crate) mod run;

pub(crate) use config::ConfigArgs;
pub(crate) use run::RunArgs;
