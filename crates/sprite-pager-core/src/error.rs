use thiserror::Error;

#[derive(Debug, Error)]
pub enum PagePackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "Sprite '{name}' ({width}x{height}) does not fit with max page size {max_width}x{max_height} and padding {padding_x},{padding_y}"
    )]
    Unpackable {
        name: String,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
        padding_x: u32,
        padding_y: u32,
    },
    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Power-of-two pages require a power-of-two max {axis}, got {value}")]
    NotPowerOfTwo { axis: &'static str, value: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, PagePackError>;
