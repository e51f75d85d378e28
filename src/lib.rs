//! Gantry - JRuby application provisioner
//!
//! Stages an application directory into a runnable deployment bundle:
//! vendors a JDK and JRuby, resolves gems through Bundler with a
//! cross-build cache, writes the boot-time database configuration
//! template, precompiles assets, and exports the runtime environment.

pub mod assets;
pub mod build;
pub mod cache;
pub mod cli;
pub mod dbconfig;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod manifest;
pub mod process;
pub mod profiled;
pub mod resolver;
pub mod runtime;
pub mod ui;

pub use error::{GantryError, GantryResult};
