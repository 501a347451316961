use serde::Deserialize;

/// BiliBili 视频信息 API 响应
#[derive(Debug, Deserialize)]
pub struct BiliApiResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<VideoMetadata>,
}

/// 视频信息
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub owner: VideoOwner,
    pub stat: VideoStat,
    /// 封面图
    pub pic: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub dynamic: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoOwner {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoStat {
    pub like: u64,
    pub coin: u64,
    pub favorite: u64,
}

impl VideoMetadata {
    /// 简介，`desc` 为空时退回到 `dynamic`
    pub fn description(&self) -> Option<&str> {
        [self.desc.as_deref(), self.dynamic.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
    }
}
