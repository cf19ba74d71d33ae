use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {num_vertices} vertices")]
    InvalidMeshIndex {
        triangle: usize,
        index: u32,
        num_vertices: usize,
    },

    #[error("Collision with {0} is not supported by the BIH tree")]
    UnsupportedCollision(&'static str),

    #[error("Corrupted tree data: {0}")]
    CorruptedTree(String),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Serialization error: {0}")]
    SerializationError(Box<dyn std::error::Error + Send + Sync>),

    #[error("Deserialization error: {0}")]
    DeserializationError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, Error>;
