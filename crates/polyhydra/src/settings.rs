//! Generator settings.
//!
//! Loadable from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! enable_threading = false
//! enable_caching = true
//! rescale = true
//! jitter_magnitude = 0.0002
//! jitter_seed = 42
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_JITTER_SEED, JITTER_MAGNITUDE};
use crate::error::SettingsError;
use crate::types::TessellateConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
  /// Run rebuilds on a background worker.
  pub enable_threading: bool,
  /// Read and write the generation cache.
  pub enable_caching: bool,
  /// Scale the finished mesh to fit a 2-unit box.
  pub rescale: bool,
  pub jitter_magnitude: f32,
  pub jitter_seed: u64,
}

impl Default for GeneratorSettings {
  fn default() -> Self {
    Self::interactive()
  }
}

impl GeneratorSettings {
  /// Threading and caching on: the editing setup.
  pub fn interactive() -> Self {
    Self {
      enable_threading: true,
      enable_caching: true,
      rescale: true,
      jitter_magnitude: JITTER_MAGNITUDE,
      jitter_seed: DEFAULT_JITTER_SEED,
    }
  }

  /// Threading and caching off, for one-shot or scripted builds.
  pub fn non_interactive() -> Self {
    Self {
      enable_threading: false,
      enable_caching: false,
      ..Self::interactive()
    }
  }

  pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
    Ok(toml::from_str(content)?)
  }

  /// Load settings from a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Tessellation settings derived from these and the per-mesh options.
  pub fn tessellate_config(&self) -> TessellateConfig {
    TessellateConfig::new().with_jitter(self.jitter_magnitude, self.jitter_seed)
  }
}
