use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Font error: {0}")]
    Font(String),
    #[error("Image error: {0}")]
    Image(String),
    #[error("SVG error: {0}")]
    Svg(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Surface unavailable: {width}x{height}")]
    Surface { width: u32, height: u32 },
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Layout engine has been destroyed")]
    Destroyed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
