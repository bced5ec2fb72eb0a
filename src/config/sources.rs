//! Configuration sources, applied in precedence order by the loader.

pub mod env;
pub mod global_file;
pub mod settings_file;
