//! Error types for world map generation.
//!
//! Only configuration problems and I/O are errors. Degenerate outcomes
//! (no rivers, fewer settlements than requested) are reported through
//! feature counts and logging instead.

/// Errors that can occur when configuring, persisting or exporting a world map.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Width or height was zero.
    #[error("invalid map dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: usize, height: usize },

    /// Theme identifier is not one of the known themes.
    #[error("unknown theme '{0}' (expected medieval, fantasy, scifi or steampunk)")]
    UnknownTheme(String),

    /// A configuration value violates an ordering or range constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Save file written by a newer format version.
    #[error("save file version {found} is newer than supported version {supported}")]
    UnsupportedSaveVersion { found: u32, supported: u32 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}
