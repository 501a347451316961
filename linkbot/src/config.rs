//! 运行配置，从环境变量（含 `.env`）读取

use std::time::Duration;

use anyhow::{Result, anyhow};
use common::{DEFAULT_TIMEOUT_SECS, get_env_var};
use serde_json::{Value, json};

use crate::access::{AccessControl, AccessMode};
use crate::host::Launcher;

pub const ENV_HTTP_TIMEOUT: &str = "LINKBOT_HTTP_TIMEOUT_SECS";
pub const ENV_ACCESS_MODE: &str = "LINKBOT_ACCESS_MODE";
pub const ENV_WHITELIST: &str = "LINKBOT_WHITELIST";
pub const ENV_BLACKLIST: &str = "LINKBOT_BLACKLIST";
pub const ENV_LAUNCHER: &str = "LINKBOT_LAUNCHER";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_timeout: Duration,
    pub access: AccessControl,
    /// 控制台模式下消息所属的会话
    pub launcher: Launcher,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            access: AccessControl {
                mode: AccessMode::Blacklist,
                whitelist: Vec::new(),
                blacklist: Vec::new(),
            },
            launcher: Launcher::person("1"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(get_env_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = lookup(ENV_HTTP_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid {}: {}", ENV_HTTP_TIMEOUT, e))?;
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(mode) = lookup(ENV_ACCESS_MODE) {
            config.access.mode = mode.parse()?;
        }
        if let Some(list) = lookup(ENV_WHITELIST) {
            config.access.whitelist = split_sessions(&list);
        }
        if let Some(list) = lookup(ENV_BLACKLIST) {
            config.access.blacklist = split_sessions(&list);
        }

        if let Some(session) = lookup(ENV_LAUNCHER) {
            config.launcher = Launcher::parse(session.trim())
                .ok_or_else(|| anyhow!("Invalid {}: {}", ENV_LAUNCHER, session))?;
        }

        Ok(config)
    }

    /// 以宿主流水线配置的形式导出访问控制
    pub fn pipeline_config(&self) -> Value {
        json!({ "access-control": self.access })
    }
}

fn split_sessions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
