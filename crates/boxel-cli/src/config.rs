//! CLI configuration and settings management

use std::path::{Path, PathBuf};

use boxel_core::pretty::PrettyOptions;
use boxel_isel::IselOptions;
use serde::{Deserialize, Serialize};

use crate::{CliError, Result};

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "boxel.toml";

/// CLI configuration loaded from `boxel.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub runtime: RuntimeConfig,
    /// Lowering session options
    pub lowering: IselOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Runtime definition artifact; the bundled one is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub show_types: bool,
    pub indent_size: usize,
    pub diagnostics: DiagnosticStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStyle {
    #[default]
    Pretty,
    Plain,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let pretty = PrettyOptions::default();
        Self {
            show_types: pretty.show_types,
            indent_size: pretty.indent_size,
            diagnostics: DiagnosticStyle::Pretty,
        }
    }
}

impl OutputConfig {
    pub fn pretty_options(&self) -> PrettyOptions {
        PrettyOptions {
            indent_size: self.indent_size,
            show_types: self.show_types,
        }
    }
}

impl CliConfig {
    /// Load configuration from `config_path`, or from `boxel.toml` in the
    /// working directory when it exists, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::load_from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            CliError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.resolve_relative_paths(path);
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Runtime paths in a config file are relative to that file.
    fn resolve_relative_paths(&mut self, config_path: &Path) {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(runtime) = self.runtime.path.as_mut() {
            if runtime.is_relative() {
                *runtime = base.join(&*runtime);
            }
        }
    }
}
