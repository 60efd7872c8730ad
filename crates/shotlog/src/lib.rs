// Library root: re-exports all modules so integration tests and the binary
// can drive the pipeline.

pub mod aggregate;
pub mod config;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod teams;
pub mod views;

#[cfg(test)]
pub(crate) mod testutil;
