mod bin;
mod cdvdman;
mod ul;

pub use bin::*;
pub use cdvdman::*;
pub use ul::*;
