mod error;
mod shell_toml;

pub use error::*;
pub use shell_toml::*;
