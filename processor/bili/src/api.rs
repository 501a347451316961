use anyhow::{Result, anyhow};
use common::JsonFetcher;

use crate::VideoId;
use crate::models::{BiliApiResponse, VideoMetadata};

/// 获取视频信息
///
/// 网络错误、JSON 解析失败、`code` 非 0 以及缺少必需字段都返回错误
pub async fn fetch_video(fetcher: &dyn JsonFetcher, video_id: &VideoId) -> Result<VideoMetadata> {
    let api_url = video_id.api_url();
    log::debug!("BiliBili API URL: {}", api_url);

    let value = fetcher.get_json(&api_url).await?;
    let response: BiliApiResponse = serde_json::from_value(value)
        .map_err(|e| anyhow!("Failed to parse BiliBili API response: {}", e))?;

    if response.code != 0 {
        return Err(anyhow!(
            "BiliBili API error {}: {}",
            response.code,
            response.message
        ));
    }

    response
        .data
        .ok_or_else(|| anyhow!("Empty data from BiliBili API"))
}
