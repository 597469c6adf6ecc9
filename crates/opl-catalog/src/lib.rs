mod catalog;
mod patch;
mod project;
mod scan;

pub use catalog::*;
pub use patch::*;
pub use project::*;
pub use scan::*;

#[derive(Debug)]
pub enum Error {
    NameError(String),
    InvalidIndex(usize),
    SignatureNotFound,
    IOError(std::io::Error),
    ConfigError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NameError(name) => write!(f, "Invalid game name: {name:?}"),
            Error::InvalidIndex(index) => write!(f, "No game at index {index}"),
            Error::SignatureNotFound => {
                write!(f, "cdvdman settings block not found, unknown module image")
            }
            Error::IOError(err) => write!(f, "{err:?}"),
            Error::ConfigError(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}
