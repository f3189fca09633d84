//! Command implementations for the boxel CLI

pub mod check_runtime;
pub mod lower;

pub use check_runtime::check_runtime_command;
pub use lower::lower_command;

use std::path::Path;

use boxel_core::RuntimeDefinition;
use tracing::debug;

use crate::config::CliConfig;
use crate::Result;

/// Load the runtime definition named on the command line, then the one in
/// the configuration file, then the bundled one.
pub fn load_runtime(flag: Option<&Path>, config: &CliConfig) -> Result<RuntimeDefinition> {
    let runtime = match flag.or(config.runtime.path.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading runtime definition");
            RuntimeDefinition::load(path)?
        }
        None => {
            debug!("using bundled runtime definition");
            RuntimeDefinition::bundled()?
        }
    };
    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::CliError;

    #[test]
    fn flag_takes_precedence_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            runtime: RuntimeConfig {
                path: Some(dir.path().join("from-config.json")),
            },
            ..CliConfig::default()
        };

        let err = load_runtime(Some(&dir.path().join("from-flag.json")), &config).unwrap_err();
        match err {
            CliError::Lowering(boxel_core::Error::RuntimeUnavailable { path, .. }) => {
                assert!(path.ends_with("from-flag.json"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bundled_runtime_is_the_fallback() {
        let runtime = load_runtime(None, &CliConfig::default()).unwrap();
        assert_eq!(runtime.display_name(), "boxel-runtime");
    }
}
