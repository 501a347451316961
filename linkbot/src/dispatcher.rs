//! 链接匹配与分发
//!
//! 处理器按注册顺序排列，每个处理器的正则也按声明顺序尝试，第一个命中的生效。
//! 一条消息最多只处理一个链接。

use std::sync::Arc;

use common::{JsonFetcher, LinkProcessor, Reply};
use processor_bili::BiliBiliProcessor;
use processor_git::GitRepoProcessor;
use regex::Captures;

use crate::access::select_source;
use crate::host::{EventContext, EventKind, Host, MessageEvent};

/// 消息中含有该字样时不处理，避免响应机器人自身的指令
pub const RECURSION_GUARD: &str = "plugin";

/// 一次成功的匹配
pub struct LinkMatch<'p, 't> {
    pub processor: &'p dyn LinkProcessor,
    pub captures: Captures<'t>,
}

impl<'t> LinkMatch<'_, 't> {
    pub fn platform(&self) -> &'static str {
        self.processor.name()
    }

    /// 完整的匹配文本
    pub fn matched(&self) -> &'t str {
        self.captures.get(0).map_or("", |m| m.as_str())
    }
}

/// 按 BiliBili、GitHub、Gitee 的顺序注册处理器
pub fn default_processors() -> Vec<Box<dyn LinkProcessor>> {
    vec![
        Box::new(BiliBiliProcessor),
        Box::new(GitRepoProcessor::github()),
        Box::new(GitRepoProcessor::gitee()),
    ]
}

pub struct LinkDispatcher {
    processors: Vec<Box<dyn LinkProcessor>>,
    fetcher: Arc<dyn JsonFetcher>,
}

impl LinkDispatcher {
    /// 插件订阅的事件
    pub const EVENT_BINDINGS: [EventKind; 2] = [
        EventKind::PersonMessageReceived,
        EventKind::GroupMessageReceived,
    ];

    pub fn new(processors: Vec<Box<dyn LinkProcessor>>, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            processors,
            fetcher,
        }
    }

    pub fn with_default_processors(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self::new(default_processors(), fetcher)
    }

    pub fn processor_names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn handles(kind: EventKind) -> bool {
        Self::EVENT_BINDINGS.contains(&kind)
    }

    /// 按平台、再按正则的顺序查找第一个匹配
    pub fn find_link<'t>(&self, text: &'t str) -> Option<LinkMatch<'_, 't>> {
        self.processors.iter().find_map(|processor| {
            processor
                .regexes()
                .iter()
                .find_map(|re| re.captures(text))
                .map(|captures| LinkMatch {
                    processor: processor.as_ref(),
                    captures,
                })
        })
    }

    /// 处理文本中的第一个链接
    ///
    /// 没有匹配时返回 `None`；处理失败时返回处理器的固定失败文本
    pub async fn process_link(&self, text: &str) -> Option<Reply> {
        let link = self.find_link(text)?;

        log::info!(
            "Processing link with {}: {}",
            link.platform(),
            link.matched()
        );

        let reply = match link
            .processor
            .process_captures(&link.captures, self.fetcher.as_ref())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!(
                    "Failed to process link with {}\n{}\n{}",
                    link.platform(),
                    link.matched(),
                    e
                );
                Reply::plain(link.processor.failure_text())
            }
        };

        Some(reply)
    }

    /// 按宿主配置判断是否处理该消息，配置每条消息重新读取
    fn is_permitted(event: &MessageEvent, host: &dyn Host) -> bool {
        let launcher = &event.launcher;
        let Some(source) = select_source(event, host.pipeline_config()) else {
            log::warn!(
                "No pipeline config available, dropping message from {}",
                launcher.session_id()
            );
            return false;
        };
        let Some(access) = source.access_control() else {
            log::warn!(
                "Access control config missing in {} pipeline config, dropping message from {}",
                source.name(),
                launcher.session_id()
            );
            return false;
        };
        if !access.allows(launcher) {
            log::debug!("Session {} denied by access control", launcher.session_id());
            return false;
        }
        true
    }

    /// 消息事件入口
    pub async fn handle(&self, ctx: &mut EventContext, host: &dyn Host) {
        if !Self::handles(ctx.event.kind()) {
            return;
        }

        if !Self::is_permitted(&ctx.event, host) {
            return;
        }

        let text = ctx.event.text.trim();
        if text.contains(RECURSION_GUARD) {
            return;
        }

        let Some(reply) = self.process_link(text).await else {
            return;
        };

        if let Err(e) = host.send_message(&ctx.event.launcher, reply).await {
            log::error!(
                "Failed to send message to {}: {}",
                ctx.event.launcher.session_id(),
                e
            );
        }

        ctx.prevent_default();
        ctx.prevent_postorder();
    }
}
