//! 访问控制
//!
//! 配置来自宿主，插件只读。两个版本的宿主把配置放在不同位置，
//! 分别由 [`LegacyPipelineConfig`] 与 [`QueryPipelineConfig`] 读取，
//! 通过 [`select_source`] 按能力探测选择。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{Launcher, MessageEvent};

/// 访问控制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Whitelist,
    Blacklist,
}

impl std::str::FromStr for AccessMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whitelist" => Ok(Self::Whitelist),
            "blacklist" => Ok(Self::Blacklist),
            other => Err(anyhow::anyhow!("Unknown access control mode: {}", other)),
        }
    }
}

/// 宿主流水线配置中的 `access-control` 段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    pub mode: AccessMode,
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl AccessControl {
    /// 当前模式对应的会话列表
    pub fn sessions(&self) -> &[String] {
        match self.mode {
            AccessMode::Whitelist => &self.whitelist,
            AccessMode::Blacklist => &self.blacklist,
        }
    }

    /// 会话是否在当前模式的列表中，支持 `group_*` / `person_*` 通配
    pub fn contains(&self, launcher: &Launcher) -> bool {
        let session_id = launcher.session_id();
        let wildcard = format!("{}_*", launcher.kind);

        self.sessions()
            .iter()
            .any(|entry| *entry == session_id || *entry == wildcard)
    }

    /// 是否允许处理该会话的消息
    pub fn allows(&self, launcher: &Launcher) -> bool {
        match self.mode {
            AccessMode::Whitelist => self.contains(launcher),
            AccessMode::Blacklist => !self.contains(launcher),
        }
    }
}

/// 访问控制配置的来源
pub trait AccessConfigSource {
    fn name(&self) -> &'static str;

    fn access_control(&self) -> Option<AccessControl>;
}

fn parse_section(config: &Value, pointer: &str) -> Option<AccessControl> {
    let section = config.pointer(pointer)?;
    match serde_json::from_value(section.clone()) {
        Ok(access) => Some(access),
        Err(e) => {
            log::warn!("Invalid access control config at {}: {}", pointer, e);
            None
        }
    }
}

/// 旧版宿主：全局流水线配置，位于 `/access-control`
pub struct LegacyPipelineConfig {
    data: Value,
}

impl LegacyPipelineConfig {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

impl AccessConfigSource for LegacyPipelineConfig {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn access_control(&self) -> Option<AccessControl> {
        parse_section(&self.data, "/access-control")
    }
}

/// 新版宿主：随事件下发的流水线配置，位于 `/trigger/access-control`
pub struct QueryPipelineConfig<'a> {
    data: &'a Value,
}

impl<'a> QueryPipelineConfig<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data }
    }
}

impl AccessConfigSource for QueryPipelineConfig<'_> {
    fn name(&self) -> &'static str {
        "query"
    }

    fn access_control(&self) -> Option<AccessControl> {
        parse_section(self.data, "/trigger/access-control")
    }
}

/// 能力探测：事件自带配置时使用新版来源，否则退回宿主的全局配置
pub fn select_source<'a>(
    event: &'a MessageEvent,
    legacy: Option<Value>,
) -> Option<Box<dyn AccessConfigSource + 'a>> {
    if let Some(config) = &event.pipeline_config {
        return Some(Box::new(QueryPipelineConfig::new(config)));
    }
    legacy.map(|data| Box::new(LegacyPipelineConfig::new(data)) as Box<dyn AccessConfigSource + 'a>)
}
