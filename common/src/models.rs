use crate::fetcher::JsonFetcher;

/// 回复消息链中的一段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySegment {
    /// 纯文本
    Text(String),
    /// 图片（URL）
    Image(String),
}

/// 处理器生成的回复消息链，按顺序发送
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub segments: Vec<ReplySegment>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只包含一段文本的回复
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().text(text)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(ReplySegment::Text(text.into()));
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.segments.push(ReplySegment::Image(url.into()));
        self
    }

    /// 拼接所有文本段，忽略图片
    pub fn text_content(&self) -> String {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                ReplySegment::Text(text) => Some(text.as_str()),
                ReplySegment::Image(_) => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                ReplySegment::Image(url) => Some(url.as_str()),
                ReplySegment::Text(_) => None,
            })
            .collect()
    }
}

/// 统一的处理器错误类型
#[derive(Debug, Clone)]
pub struct ProcessorError {
    pub message: String,
    pub source: Option<String>,
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProcessorError {}

impl ProcessorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<anyhow::Error> for ProcessorError {
    fn from(error: anyhow::Error) -> Self {
        ProcessorError::new(error.to_string())
    }
}

/// 统一的处理器结果类型别名
pub type ProcessorResultType = Result<Reply, ProcessorError>;

/// 统一的处理器trait
#[async_trait::async_trait]
pub trait LinkProcessor: Send + Sync {
    /// 获取正则表达式，按声明顺序尝试，先匹配者生效
    fn regexes(&self) -> &[regex::Regex];

    /// 处理匹配的链接并返回结果
    /// captures: 正则表达式的捕获组
    async fn process_captures(
        &self,
        captures: &regex::Captures<'_>,
        fetcher: &dyn JsonFetcher,
    ) -> ProcessorResultType;

    /// 处理失败时回复给用户的固定文本
    fn failure_text(&self) -> &'static str;

    /// 获取处理器名称
    fn name(&self) -> &'static str;
}
