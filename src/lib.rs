//! Monte Carlo check of Newton's shell theorem.
//!
//! The physics lives in the workspace crates re-exported here; this crate
//! wires configuration to the accumulator and hosts the command-line tools,
//! so multiple front-ends can share the same experiment runner.

pub mod experiment;

pub use shell_config as config;
pub use shell_core::{constants, vector};
pub use shell_export as export;
pub use shell_gravity as gravity;
pub use shell_sampler as sampler;

