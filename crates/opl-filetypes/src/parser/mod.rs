mod config_set;
mod ul;

pub use config_set::*;
pub use ul::*;
