use anyhow::Result;
use common::{Reply, format_count, truncate_desc};

use crate::VideoId;
use crate::models::VideoMetadata;

/// 构建视频信息回复：封面、标题、UP主、简介（可选）、数据、链接
pub fn build_video_reply(video_id: &VideoId, video: &VideoMetadata) -> Result<Reply> {
    let mut reply = Reply::new()
        .image(video.pic.as_str())
        .text(format!("📺 标题：{}\n", video.title))
        .text(format!("👤 UP主：{}\n", video.owner.name));

    if let Some(desc) = video.description() {
        reply = reply.text(format!("📝 简介：{}\n", truncate_desc(desc)));
    }

    Ok(reply
        .text(format!(
            "👍 点赞：{}  🪙 投币：{}  ⭐ 收藏：{}\n",
            format_count(video.stat.like),
            format_count(video.stat.coin),
            format_count(video.stat.favorite)
        ))
        .text(format!("🔗 链接：{}", video_id.canonical_url()?)))
}
