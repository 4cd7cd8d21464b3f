use std::path::PathBuf;

use config::{Config, Environment, File};
use ringdht_codec::ser::MAX_VALUE_SIZE;
use ringdht_node::NodeConfig;
use thiserror::Error;

/// Prefix for environment overrides, e.g. `RINGDHT_MAX_VALUE_SIZE`.
pub const ENV_PREFIX: &str = "RINGDHT";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build config: {0}")]
    Source(#[from] config::ConfigError),
    #[error(transparent)]
    Node(#[from] ringdht_node::ConfigError),
}

/// Builds the node config from defaults, an optional file, then `RINGDHT_*` env vars.
pub fn load(config_path: Option<PathBuf>) -> Result<NodeConfig, LoadError> {
    let defaults = NodeConfig::default();
    let mut builder = Config::builder()
        .set_default("max_value_size", MAX_VALUE_SIZE as i64)?
        .set_default("verify_signatures", defaults.verify_signatures)?
        .set_default("reject_unknown_types", defaults.reject_unknown_types)?
        .set_default("log_filter", defaults.log_filter)?;

    if let Some(path) = config_path {
        tracing::debug!("loading config from {}", path.display());
        builder = builder.add_source(File::from(path));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    let cfg: NodeConfig = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::io::Write;

    use super::{load, LoadError};

    fn with_env<F>(vars: &[(&str, &str)], test: F)
    where
        F: FnOnce(),
    {
        let mut old = Vec::new();
        for (k, v) in vars {
            old.push((k.to_string(), env::var(k).ok()));
            env::set_var(k, v);
        }

        test();

        for (k, maybe_old) in old {
            match maybe_old {
                Some(val) => env::set_var(k, val),
                None => env::remove_var(k),
            }
        }
    }

    fn toml_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        write!(file, "{body}").expect("write config");
        file
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = load(None).expect("default config");
        assert_eq!(cfg.max_value_size, 64 * 1024);
        assert!(!cfg.reject_unknown_types);
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml_file("max_value_size = 2048\nreject_unknown_types = true\n");
        let cfg = load(Some(file.path().to_path_buf())).expect("file config");
        assert_eq!(cfg.max_value_size, 2048);
        assert!(cfg.reject_unknown_types);
    }

    #[test]
    fn env_vars_override_defaults() {
        with_env(
            &[
                ("RINGDHT_VERIFY_SIGNATURES", "false"),
                ("RINGDHT_LOG_FILTER", "ringdht_node=trace"),
            ],
            || {
                let cfg = load(None).expect("env config");
                assert!(!cfg.verify_signatures);
                assert_eq!(cfg.log_filter, "ringdht_node=trace");
            },
        );
    }

    #[test]
    fn invalid_limit_is_rejected_after_layering() {
        let file = toml_file("max_value_size = 0\n");
        let err = load(Some(file.path().to_path_buf())).expect_err("zero limit");
        assert!(matches!(err, LoadError::Node(_)));
    }
}
