//! Error type shared by persistence, configuration and brush assets.
//!
//! Absent data is never an error: a missing density file falls through to
//! procedural generation and a missing Sphere/Cube brush asset is rebuilt.
//! Only failures of an operation that was actually attempted surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by terrain operations.
#[derive(Debug, Error)]
pub enum TerrainError {
  /// Reading a density field or brush asset failed.
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Writing a density field or brush asset failed.
  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A persisted sample file does not hold the expected number of floats.
  #[error("{} holds {actual} bytes, expected {expected}", path.display())]
  FieldSize {
    path: PathBuf,
    expected: usize,
    actual: usize,
  },

  /// Save/load target directory does not exist.
  #[error("directory does not exist: {}", .0.display())]
  MissingDirectory(PathBuf),

  /// Reading the configuration file failed.
  #[error("failed to read config {}: {source}", path.display())]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The configuration text is not valid TOML for `TerrainConfig`.
  #[error("failed to parse config: {0}")]
  ConfigParse(#[from] toml::de::Error),

  /// Saving a brush asset without a configured asset directory.
  #[error("no brush asset directory configured")]
  NoAssetDirectory,

  /// A custom brush was requested but no asset backs it.
  #[error("no brush asset named {name}")]
  MissingBrushAsset { name: String },
}

/// Result alias for terrain operations.
pub type Result<T> = std::result::Result<T, TerrainError>;
