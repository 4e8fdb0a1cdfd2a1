//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::Dirs;
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::PathBuf;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

impl EnvResolver for StdEnvResolver {
    fn resolve_dirs(&self) -> Result<Dirs, Error> {
        if let Some(home) = non_empty_var("PROTO_HOME") {
            let base = PathBuf::from(home);
            return Ok(Dirs {
                config_dir: base.join("config"),
                data_dir: base.join("data"),
                state_dir: base.join("state"),
            });
        }

        let home = non_empty_var("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| Error::env("HOME is not set"))?;

        let config_base = non_empty_var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"));
        let data_base = non_empty_var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("share"));
        let state_base = non_empty_var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("state"));

        Ok(Dirs {
            config_dir: config_base.join("proto"),
            data_dir: data_base.join("proto"),
            state_dir: state_base.join("proto"),
        })
    }
}
