//! 宿主框架的抽象：消息事件、会话以及回复发送

use anyhow::Result;
use common::Reply;
use serde_json::Value;

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherType {
    Person,
    Group,
}

impl LauncherType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for LauncherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 消息来源会话（私聊或群聊），也是回复的目标
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Launcher {
    pub kind: LauncherType,
    pub id: String,
}

impl Launcher {
    pub fn new(kind: LauncherType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn person(id: impl Into<String>) -> Self {
        Self::new(LauncherType::Person, id)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(LauncherType::Group, id)
    }

    /// `{launcher_type}_{launcher_id}` 形式的会话标识
    pub fn session_id(&self) -> String {
        format!("{}_{}", self.kind, self.id)
    }

    /// 解析 `group_123` / `person_1` 形式的会话标识
    pub fn parse(session: &str) -> Option<Self> {
        let (kind, id) = session.split_once('_')?;
        let kind = match kind {
            "person" => LauncherType::Person,
            "group" => LauncherType::Group,
            _ => return None,
        };
        if id.is_empty() {
            return None;
        }
        Some(Self::new(kind, id))
    }
}

/// 插件关心的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PersonMessageReceived,
    GroupMessageReceived,
}

/// 收到的消息事件
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub launcher: Launcher,
    pub text: String,
    /// 新版宿主随事件下发的流水线配置
    pub pipeline_config: Option<Value>,
}

impl MessageEvent {
    pub fn new(launcher: Launcher, text: impl Into<String>) -> Self {
        Self {
            launcher,
            text: text.into(),
            pipeline_config: None,
        }
    }

    pub fn with_pipeline_config(mut self, config: Value) -> Self {
        self.pipeline_config = Some(config);
        self
    }

    pub fn kind(&self) -> EventKind {
        match self.launcher.kind {
            LauncherType::Person => EventKind::PersonMessageReceived,
            LauncherType::Group => EventKind::GroupMessageReceived,
        }
    }
}

/// 单条消息的处理上下文
#[derive(Debug)]
pub struct EventContext {
    pub event: MessageEvent,
    default_prevented: bool,
    postorder_prevented: bool,
}

impl EventContext {
    pub fn new(event: MessageEvent) -> Self {
        Self {
            event,
            default_prevented: false,
            postorder_prevented: false,
        }
    }

    /// 阻止宿主的默认处理
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// 阻止后续插件处理
    pub fn prevent_postorder(&mut self) {
        self.postorder_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_postorder_prevented(&self) -> bool {
        self.postorder_prevented
    }
}

/// 宿主提供的能力
#[async_trait::async_trait]
pub trait Host: Send + Sync {
    /// 向会话发送回复消息链
    async fn send_message(&self, target: &Launcher, reply: Reply) -> Result<()>;

    /// 旧版宿主的全局流水线配置，每条消息重新读取
    fn pipeline_config(&self) -> Option<Value>;
}
