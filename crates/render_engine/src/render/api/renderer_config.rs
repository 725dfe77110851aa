//! Renderer configuration for application-specific settings
//!
//! Applications choose the batching policy, the rendering path and error
//! strictness here instead of hardcoding them in the rendering system.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::render::pipeline::GraphicsContextState;
use crate::render::systems::batching::BatchingPolicy;
use crate::render::systems::path::RenderingPathKind;

/// Configuration for the graphics system and render scenes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// How renderables are grouped into batches
    pub batching_policy: BatchingPolicy,
    /// How batches are walked and submitted
    pub rendering_path: RenderingPathKind,
    /// Panic on batching logic errors instead of logging them
    ///
    /// `None` auto-detects: strict in debug builds, lenient in release builds.
    pub strict_logic_errors: Option<bool>,
    /// Log a warning for every renderable skipped because a resource is missing
    pub warn_on_skipped: bool,
    /// Background clear color [R, G, B, A] (0.0-1.0 range)
    pub clear_color: [f32; 4],
    /// Context state for batches that do not share a single material
    pub default_state: GraphicsContextState,
}

impl RendererConfig {
    /// Create a configuration with the given batching policy
    pub fn new(batching_policy: BatchingPolicy) -> Self {
        Self {
            batching_policy,
            ..Self::default()
        }
    }

    /// Set the rendering path
    pub fn with_rendering_path(mut self, rendering_path: RenderingPathKind) -> Self {
        self.rendering_path = rendering_path;
        self
    }

    /// Enable or disable strict logic error handling
    pub fn with_strict_logic_errors(mut self, strict: bool) -> Self {
        self.strict_logic_errors = Some(strict);
        self
    }

    /// Enable or disable warnings for skipped renderables
    pub fn with_warn_on_skipped(mut self, warn: bool) -> Self {
        self.warn_on_skipped = warn;
        self
    }

    /// Set background clear color [R, G, B, A] (0.0-1.0 range)
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the context state used by mixed-material batches
    pub fn with_default_state(mut self, state: GraphicsContextState) -> Self {
        self.default_state = state;
        self
    }

    /// Whether logic errors panic, resolving the auto-detect setting
    pub fn strict_logic_errors_enabled(&self) -> bool {
        self.strict_logic_errors.unwrap_or(cfg!(debug_assertions))
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batching_policy: BatchingPolicy::default(),
            rendering_path: RenderingPathKind::default(),
            strict_logic_errors: None,
            warn_on_skipped: true,
            clear_color: [0.005, 0.005, 0.005, 1.0],
            default_state: GraphicsContextState::opaque(),
        }
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pipeline::BlendMode;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.batching_policy, BatchingPolicy::MaterialGroups);
        assert_eq!(config.rendering_path, RenderingPathKind::Forward);
        assert_eq!(config.strict_logic_errors_enabled(), cfg!(debug_assertions));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RendererConfig::from_toml_str(
            "batching_policy = \"SingleBatch\"\nstrict_logic_errors = false\n",
        )
        .unwrap();
        assert_eq!(config.batching_policy, BatchingPolicy::SingleBatch);
        assert!(!config.strict_logic_errors_enabled());
        assert!(config.warn_on_skipped);
    }

    #[test]
    fn test_ron_with_nested_state() {
        let config = RendererConfig::from_ron_str(
            "(rendering_path: Immediate, default_state: (blend: Additive))",
        )
        .unwrap();
        assert_eq!(config.rendering_path, RenderingPathKind::Immediate);
        assert_eq!(config.default_state.blend, BlendMode::Additive);
        assert!(config.default_state.depth.test);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RendererConfig::new(BatchingPolicy::SingleBatch)
            .with_strict_logic_errors(true)
            .with_clear_color([0.1, 0.2, 0.3, 1.0]);
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(RendererConfig::from_toml_str(&text).unwrap(), config);
    }
}
