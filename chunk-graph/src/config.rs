//! Configuration for the chunk builder and resolver.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Default token budget of a flat chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Default token overlap between consecutive flat chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 128;
/// Default hierarchy levels, largest first.
pub const DEFAULT_HIERARCHY_SIZES: [usize; 3] = [2048, 512, 128];
/// Default token overlap inside each hierarchy level.
pub const DEFAULT_HIERARCHY_OVERLAP: usize = 20;
/// Default number of neighbouring units on each side of a window.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Chunk size and overlap, both in tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SplitConfig {
    /// Maximum tokens per chunk.
    pub chunk_size: usize,
    /// Tokens repeated from the end of one chunk at the start of the next.
    pub chunk_overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, chunk_overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl SplitConfig {
    /// Create a validated split configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, chunk_overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_size(self.chunk_size, self.chunk_overlap)
    }
}

fn validate_size(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(GraphError::InvalidSplitConfig(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(GraphError::InvalidSplitConfig(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Sentence-window splitting parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    /// Units kept on each side of the target unit. Zero keeps the unit alone.
    pub window_size: usize,
    /// Split into pre-chunked spans instead of single sentences.
    pub use_chunk_presplit: bool,
    /// Chunking used when `use_chunk_presplit` is set.
    pub presplit: SplitConfig,
    /// Metadata key holding the joined window text.
    pub window_metadata_key: String,
    /// Metadata key holding the unit itself.
    pub original_text_metadata_key: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            use_chunk_presplit: false,
            presplit: SplitConfig::default(),
            window_metadata_key: "window".to_string(),
            original_text_metadata_key: "original_text".to_string(),
        }
    }
}

impl WindowConfig {
    /// Start from the defaults.
    pub fn builder() -> WindowConfigBuilder {
        WindowConfigBuilder::default()
    }

    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`] if the presplit sizes are
    /// malformed (only checked when presplitting is enabled) or a metadata
    /// key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.use_chunk_presplit {
            self.presplit.validate()?;
        }
        if self.window_metadata_key.is_empty() || self.original_text_metadata_key.is_empty() {
            return Err(GraphError::InvalidSplitConfig(
                "window metadata keys must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for a validated [`WindowConfig`].
#[derive(Debug, Clone, Default)]
pub struct WindowConfigBuilder {
    config: WindowConfig,
}

impl WindowConfigBuilder {
    /// Units kept on each side.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.config.window_size = window_size;
        self
    }

    /// Use chunked spans of `presplit` as window units.
    pub fn presplit(mut self, presplit: SplitConfig) -> Self {
        self.config.use_chunk_presplit = true;
        self.config.presplit = presplit;
        self
    }

    pub fn window_metadata_key(mut self, key: impl Into<String>) -> Self {
        self.config.window_metadata_key = key.into();
        self
    }

    pub fn original_text_metadata_key(mut self, key: impl Into<String>) -> Self {
        self.config.original_text_metadata_key = key.into();
        self
    }

    /// Validate and return the config.
    pub fn build(self) -> Result<WindowConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Hierarchical splitting parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Token budget per level, level 0 first.
    pub chunk_sizes: Vec<usize>,
    /// Token overlap applied within every level.
    pub chunk_overlap: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            chunk_sizes: DEFAULT_HIERARCHY_SIZES.to_vec(),
            chunk_overlap: DEFAULT_HIERARCHY_OVERLAP,
        }
    }
}

impl HierarchyConfig {
    /// Create a validated hierarchy with the default overlap.
    pub fn new(chunk_sizes: Vec<usize>) -> Result<Self> {
        Self::with_overlap(chunk_sizes, DEFAULT_HIERARCHY_OVERLAP)
    }

    pub fn with_overlap(chunk_sizes: Vec<usize>, chunk_overlap: usize) -> Result<Self> {
        let config = Self { chunk_sizes, chunk_overlap };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`] if `chunk_sizes` is empty or
    /// any level fails the [`SplitConfig`] rules with the shared overlap.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_sizes.is_empty() {
            return Err(GraphError::InvalidSplitConfig(
                "chunk_sizes must contain at least one level".to_string(),
            ));
        }
        for &size in &self.chunk_sizes {
            validate_size(size, self.chunk_overlap)?;
        }
        Ok(())
    }

    /// The [`SplitConfig`] of one level.
    pub fn level(&self, level: usize) -> Option<SplitConfig> {
        self.chunk_sizes
            .get(level)
            .map(|&chunk_size| SplitConfig { chunk_size, chunk_overlap: self.chunk_overlap })
    }
}

/// How the builder names the nodes it creates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeIdStrategy {
    /// Random v4 UUIDs.
    #[default]
    Uuid,
    /// `{document_id}:{mode}:{level}:{index}`, stable across runs.
    Deterministic,
}

/// Top-level configuration, as loaded by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkGraphConfig {
    /// Flat splitting.
    pub split: SplitConfig,
    /// Sentence-window splitting.
    pub window: WindowConfig,
    /// Hierarchical splitting.
    pub hierarchy: HierarchyConfig,
    /// Naming scheme for created nodes.
    pub id_strategy: NodeIdStrategy,
    /// Emit diagnostics when a relationship is absent or unresolvable.
    pub on_missing: bool,
}

impl Default for ChunkGraphConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            window: WindowConfig::default(),
            hierarchy: HierarchyConfig::default(),
            id_strategy: NodeIdStrategy::default(),
            on_missing: true,
        }
    }
}

impl ChunkGraphConfig {
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.window.validate()?;
        self.hierarchy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_config_rejects_zero_size_and_large_overlap() {
        assert!(SplitConfig::new(0, 0).is_err());
        assert!(SplitConfig::new(10, 10).is_err());
        assert!(SplitConfig::new(10, 11).is_err());
        assert!(SplitConfig::new(10, 9).is_ok());
    }

    #[test]
    fn hierarchy_defaults_descend() {
        let config = HierarchyConfig::default();
        assert_eq!(config.chunk_sizes, vec![2048, 512, 128]);
        assert!(config.validate().is_ok());
        assert_eq!(config.level(1), Some(SplitConfig { chunk_size: 512, chunk_overlap: 20 }));
        assert_eq!(config.level(3), None);
    }

    #[test]
    fn hierarchy_rejects_empty_and_small_levels() {
        assert!(HierarchyConfig::new(Vec::new()).is_err());
        assert!(HierarchyConfig::new(vec![512, 0]).is_err());
        assert!(HierarchyConfig::with_overlap(vec![512, 16], 16).is_err());
    }

    #[test]
    fn window_presplit_is_validated_only_when_enabled() {
        let config = WindowConfig {
            presplit: SplitConfig { chunk_size: 0, chunk_overlap: 0 },
            ..WindowConfig::default()
        };
        assert!(config.validate().is_ok());

        let err = WindowConfig::builder()
            .presplit(SplitConfig { chunk_size: 4, chunk_overlap: 4 })
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidSplitConfig(_)));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ChunkGraphConfig =
            serde_json::from_str(r#"{ "split": { "chunk_size": 64 }, "id_strategy": "deterministic" }"#)
                .unwrap();
        assert_eq!(config.split.chunk_size, 64);
        assert_eq!(config.split.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.id_strategy, NodeIdStrategy::Deterministic);
        assert_eq!(config.hierarchy, HierarchyConfig::default());
        // default overlap exceeds the shrunken chunk size
        assert!(config.validate().is_err());
    }
}
