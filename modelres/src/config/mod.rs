//! Configuration: resolver settings and the INI file they are loaded from.

mod error;
mod file;
mod resolver;

pub use error::{ConfigError, ConfigResult};
pub use file::ConfigFile;
pub use resolver::{ResolverConfig, DEFAULT_REMOTE_URL};
