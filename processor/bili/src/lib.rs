//! BiliBili 视频链接处理模块
//!
//! 识别 `www.bilibili.com/video/BV...`、`b23.tv/BV...` 以及旧版 av 号链接，
//! 通过公开 API 获取视频信息并生成回复。

use regex::Regex;
use std::sync::OnceLock;

use common::{JsonFetcher, LinkProcessor, ProcessorError, ProcessorResultType, join_url};

mod api;
mod models;
mod utils;

pub use api::fetch_video;
pub use models::{VideoMetadata, VideoOwner, VideoStat};
pub use utils::build_video_reply;

static BILI_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

const VIDEO_API_URL: &str = "https://api.bilibili.com/x/web-interface/view";
const VIDEO_PAGE_URL: &str = "https://www.bilibili.com/video/";

/// 视频 ID 的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoIdKind {
    /// BV 号，ID 自带 `BV` 前缀
    Bv,
    /// 旧版 av 号，ID 为纯数字
    Av,
}

/// 从链接中提取出的视频 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoId {
    pub kind: VideoIdKind,
    pub id: String,
}

impl VideoId {
    /// 从捕获组中提取视频 ID
    ///
    /// 完整匹配文本中出现 `BV` 即视为 BV 号，否则为 av 号
    pub fn from_captures(captures: &regex::Captures<'_>) -> Option<Self> {
        let matched = captures.get(0)?.as_str();
        let id = captures.get(1)?.as_str().to_string();
        let kind = if matched.contains("BV") {
            VideoIdKind::Bv
        } else {
            VideoIdKind::Av
        };
        Some(Self { kind, id })
    }

    /// 视频信息 API 地址
    pub fn api_url(&self) -> String {
        match self.kind {
            VideoIdKind::Bv => format!("{}?bvid={}", VIDEO_API_URL, self.id),
            VideoIdKind::Av => format!("{}?aid={}", VIDEO_API_URL, self.id),
        }
    }

    /// 视频页面的规范链接
    pub fn canonical_url(&self) -> anyhow::Result<String> {
        match self.kind {
            VideoIdKind::Bv => join_url(VIDEO_PAGE_URL, &self.id),
            VideoIdKind::Av => join_url(VIDEO_PAGE_URL, &format!("av{}", self.id)),
        }
    }
}

/// BiliBili链接处理器
pub struct BiliBiliProcessor;

impl BiliBiliProcessor {
    const PATTERNS: [&'static str; 3] = [
        // 标准链接
        r"www\.bilibili\.com/video/(BV\w+)",
        // 短链接
        r"b23\.tv/(BV\w+)",
        // 旧版av号
        r"www\.bilibili\.com/video/av(\d+)",
    ];

    pub const FAILURE_TEXT: &'static str = "视频解析失败";
}

#[async_trait::async_trait]
impl LinkProcessor for BiliBiliProcessor {
    fn regexes(&self) -> &[Regex] {
        BILI_REGEXES.get_or_init(|| {
            Self::PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("Invalid BiliBili regex pattern"))
                .collect()
        })
    }

    async fn process_captures(
        &self,
        captures: &regex::Captures<'_>,
        fetcher: &dyn JsonFetcher,
    ) -> ProcessorResultType {
        let video_id = VideoId::from_captures(captures)
            .ok_or_else(|| ProcessorError::new("无法从BiliBili链接中提取视频ID"))?;

        log::debug!("BiliBili video id: {:?}", video_id);

        let metadata = fetch_video(fetcher, &video_id)
            .await
            .map_err(|e| ProcessorError::with_source("处理BiliBili链接失败", e.to_string()))?;

        Ok(build_video_reply(&video_id, &metadata)?)
    }

    fn failure_text(&self) -> &'static str {
        Self::FAILURE_TEXT
    }

    fn name(&self) -> &'static str {
        "BiliBili"
    }
}
