use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("Packer used before its bin dimensions were set")]
    Uninitialized,
    #[error("Packer is already initialized with a {width}x{height} bin")]
    AlreadyInitialized { width: u32, height: u32 },
    #[error("Invalid dimensions: {width}x{height} (width and height must be positive)")]
    InvalidDimensions { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, PackError>;

/// Rejects zero-sized bins and items.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PackError::InvalidDimensions { width, height });
    }
    Ok(())
}
