use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpritePackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid atlas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Cannot insert into already-occupied node")]
    Occupied,
    #[error("Node is already split")]
    AlreadySplit,
    #[error(
        "Content {width}x{height} does not fit node of size {node_width}x{node_height}"
    )]
    ContentTooLarge {
        width: u32,
        height: u32,
        node_width: u32,
        node_height: u32,
    },
    #[error("Out of space while packing item #{index} of size ({width}, {height})")]
    NoSpace { index: usize, width: u32, height: u32 },
    #[error("Packer has already run; create a new packer to retry")]
    AlreadyPacked,
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("Unknown node id {0}")]
    UnknownNode(usize),
}

pub type Result<T> = std::result::Result<T, SpritePackError>;
