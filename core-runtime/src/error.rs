use thiserror::Error;

/// Errors raised while assembling the runtime: invalid [`UploadConfig`]
/// values and logging setup.
///
/// [`UploadConfig`]: crate::config::UploadConfig
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
