//! 链接解析插件
//!
//! 识别消息中的 BiliBili 视频、GitHub 与 Gitee 仓库链接，
//! 调用平台公开 API 获取信息并回复摘要。

pub mod access;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod host;
mod tests;

pub use access::{AccessControl, AccessMode};
pub use config::AppConfig;
pub use dispatcher::{LinkDispatcher, LinkMatch, default_processors};
pub use host::{EventContext, EventKind, Host, Launcher, LauncherType, MessageEvent};
