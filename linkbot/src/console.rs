//! 控制台宿主：从标准输入读取消息，回复打印到标准输出

use anyhow::Result;
use common::{Reply, ReplySegment};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::dispatcher::LinkDispatcher;
use crate::host::{EventContext, Host, Launcher, MessageEvent};

pub struct ConsoleHost {
    launcher: Launcher,
    pipeline_config: Value,
}

impl ConsoleHost {
    pub fn new(launcher: Launcher, pipeline_config: Value) -> Self {
        Self {
            launcher,
            pipeline_config,
        }
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }
}

/// 将回复渲染为控制台文本，图片显示为 `[图片] url`
pub fn render_reply(reply: &Reply) -> String {
    let mut out = String::new();
    for seg in &reply.segments {
        match seg {
            ReplySegment::Text(text) => out.push_str(text),
            ReplySegment::Image(url) => {
                out.push_str("[图片] ");
                out.push_str(url);
                out.push('\n');
            }
        }
    }
    out
}

#[async_trait::async_trait]
impl Host for ConsoleHost {
    async fn send_message(&self, target: &Launcher, reply: Reply) -> Result<()> {
        println!("[{}] {}", target.session_id(), render_reply(&reply));
        Ok(())
    }

    fn pipeline_config(&self) -> Option<Value> {
        Some(self.pipeline_config.clone())
    }
}

/// 循环读取标准输入，每行作为一条来自配置会话的消息
pub async fn run(dispatcher: &LinkDispatcher, host: &ConsoleHost) -> Result<()> {
    log::info!(
        "Console mode started as {}. Type a message containing a link.",
        host.launcher().session_id()
    );

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();

    while let Some(line) = reader.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut ctx = EventContext::new(MessageEvent::new(host.launcher().clone(), line));
        dispatcher.handle(&mut ctx, host).await;

        if !ctx.is_default_prevented() {
            log::debug!("No link handled for: {}", line);
        }
    }

    Ok(())
}
