mod ul;

pub use ul::*;
