use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("failed to open {port}: {detail}")]
    Open { port: String, detail: String },
    #[error("no serial ports detected")]
    NoPorts,
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(String),
    #[error("read timeout")]
    Timeout,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
