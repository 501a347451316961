//! Git 仓库链接处理模块
//!
//! GitHub 与 Gitee 的链接形式和 API 返回结构一致，共用同一个处理器，
//! 通过 [`RepoPlatform`] 区分。

use anyhow::{Result, anyhow};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use common::{
    JsonFetcher, LinkProcessor, ProcessorError, ProcessorResultType, Reply, format_count,
    truncate_desc,
};


static GITHUB_REGEX: OnceLock<[Regex; 1]> = OnceLock::new();
static GITEE_REGEX: OnceLock<[Regex; 1]> = OnceLock::new();

const SEPARATOR: &str = "━━━━━━━━━━━━━━━";
const NO_DESCRIPTION: &str = "暂无描述";

/// 支持的代码托管平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPlatform {
    GitHub,
    Gitee,
}

impl RepoPlatform {
    fn pattern(self) -> &'static str {
        match self {
            Self::GitHub => r"github\.com/([^/]+)/([^/?#]+)",
            Self::Gitee => r"gitee\.com/([^/]+)/([^/?#]+)",
        }
    }

    fn regex_cell(self) -> &'static OnceLock<[Regex; 1]> {
        match self {
            Self::GitHub => &GITHUB_REGEX,
            Self::Gitee => &GITEE_REGEX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::Gitee => "Gitee",
        }
    }

    /// 仓库信息 API 地址
    pub fn api_url(self, repo: &RepoId) -> String {
        match self {
            Self::GitHub => format!("https://api.github.com/repos/{}/{}", repo.owner, repo.repo),
            Self::Gitee => format!("https://gitee.com/api/v5/repos/{}/{}", repo.owner, repo.repo),
        }
    }
}

/// 从链接中提取出的仓库标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn from_captures(captures: &regex::Captures<'_>) -> Option<Self> {
        Some(Self {
            owner: captures.get(1)?.as_str().to_string(),
            repo: captures.get(2)?.as_str().to_string(),
        })
    }
}

/// 仓库信息，GitHub 和 Gitee 的字段名相同
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: Option<u64>,
    pub html_url: String,
}

/// Git仓库链接处理器
pub struct GitRepoProcessor {
    platform: RepoPlatform,
}

impl GitRepoProcessor {
    pub const FAILURE_TEXT: &'static str = "仓库信息获取失败";

    pub fn new(platform: RepoPlatform) -> Self {
        Self { platform }
    }

    pub fn github() -> Self {
        Self::new(RepoPlatform::GitHub)
    }

    pub fn gitee() -> Self {
        Self::new(RepoPlatform::Gitee)
    }

    pub fn platform(&self) -> RepoPlatform {
        self.platform
    }
}

#[async_trait::async_trait]
impl LinkProcessor for GitRepoProcessor {
    fn regexes(&self) -> &[Regex] {
        let pattern = self.platform.pattern();
        self.platform
            .regex_cell()
            .get_or_init(|| [Regex::new(pattern).expect("Invalid git repo regex pattern")])
    }

    async fn process_captures(
        &self,
        captures: &regex::Captures<'_>,
        fetcher: &dyn JsonFetcher,
    ) -> ProcessorResultType {
        let repo = RepoId::from_captures(captures)
            .ok_or_else(|| ProcessorError::new("无法从链接中提取仓库信息"))?;

        log::debug!(
            "{} repo details - Owner: {}, Repo: {}",
            self.platform.name(),
            repo.owner,
            repo.repo
        );

        let metadata = fetch_repo(fetcher, self.platform, &repo)
            .await
            .map_err(|e| {
                ProcessorError::with_source(
                    format!("处理{}链接失败", self.platform.name()),
                    e.to_string(),
                )
            })?;

        Ok(build_repo_reply(self.platform, &metadata))
    }

    fn failure_text(&self) -> &'static str {
        Self::FAILURE_TEXT
    }

    fn name(&self) -> &'static str {
        self.platform.name()
    }
}

/// 获取仓库信息
pub async fn fetch_repo(
    fetcher: &dyn JsonFetcher,
    platform: RepoPlatform,
    repo: &RepoId,
) -> Result<RepoMetadata> {
    let api_url = platform.api_url(repo);
    log::debug!("{} API URL: {}", platform.name(), api_url);

    let value = fetcher.get_json(&api_url).await?;
    serde_json::from_value(value)
        .map_err(|e| anyhow!("Failed to parse {} API response: {}", platform.name(), e))
}

/// 构建仓库信息回复，整体作为一段文本
pub fn build_repo_reply(platform: RepoPlatform, repo: &RepoMetadata) -> Reply {
    let description = repo
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(truncate_desc)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let mut lines = vec![
        SEPARATOR.to_string(),
        format!("📦 {} 仓库：{}", platform.name(), repo.name),
        format!("📄 描述：{}", description),
        format!("⭐ Stars: {}", format_count(repo.stargazers_count)),
        format!("🍴 Forks: {}", format_count(repo.forks_count)),
    ];

    if let Some(issues) = repo.open_issues_count {
        lines.push(format!("🐛 Issues: {}", format_count(issues)));
    }

    lines.push(SEPARATOR.to_string());
    lines.push(format!("🔗 链接：{}", repo.html_url));

    Reply::plain(lines.join("\n"))
}
