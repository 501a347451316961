#[cfg(test)]
mod main_tests {
    use crate::*;
    use common::{JsonFetcher, Reply, ReplySegment};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const VIDEO_API: &str = "https://api.bilibili.com/x/web-interface/view?bvid=BV1xx411c7mD";
    const GITHUB_API: &str = "https://api.github.com/repos/rust-lang/rust";

    /// 按 URL 返回预设响应，未预设的 URL 视为网络错误
    #[derive(Default)]
    struct StubFetcher {
        responses: HashMap<String, Value>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, value: Value) -> Self {
            self.responses.insert(url.to_string(), value);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl JsonFetcher for StubFetcher {
        async fn get_json(&self, url: &str) -> anyhow::Result<Value> {
            self.requested.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused: {}", url))
        }
    }

    /// 记录发送的回复
    struct RecordingHost {
        pipeline_config: Option<Value>,
        sent: Mutex<Vec<(Launcher, Reply)>>,
    }

    impl RecordingHost {
        fn new(pipeline_config: Option<Value>) -> Self {
            Self {
                pipeline_config,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn blacklist_nobody() -> Self {
            Self::new(Some(json!({"access-control": {"mode": "blacklist", "blacklist": []}})))
        }

        fn sent(&self) -> Vec<(Launcher, Reply)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Host for RecordingHost {
        async fn send_message(&self, target: &Launcher, reply: Reply) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((target.clone(), reply));
            Ok(())
        }

        fn pipeline_config(&self) -> Option<Value> {
            self.pipeline_config.clone()
        }
    }

    fn video_json() -> Value {
        json!({
            "code": 0,
            "data": {
                "title": "T",
                "owner": {"name": "U"},
                "stat": {"like": 1000, "coin": 2, "favorite": 3},
                "pic": "http://x/y.jpg",
                "desc": ""
            }
        })
    }

    fn repo_json() -> Value {
        json!({
            "name": "rust",
            "description": "Empowering everyone to build reliable and efficient software.",
            "stargazers_count": 98765,
            "forks_count": 12345,
            "html_url": "https://github.com/rust-lang/rust"
        })
    }

    fn dispatcher(fetcher: StubFetcher) -> (LinkDispatcher, Arc<StubFetcher>) {
        let fetcher = Arc::new(fetcher);
        let dispatcher = LinkDispatcher::with_default_processors(fetcher.clone());
        (dispatcher, fetcher)
    }

    async fn dispatch(
        dispatcher: &LinkDispatcher,
        host: &RecordingHost,
        launcher: Launcher,
        text: &str,
    ) -> EventContext {
        let mut ctx = EventContext::new(MessageEvent::new(launcher, text));
        dispatcher.handle(&mut ctx, host).await;
        ctx
    }

    #[test]
    fn test_registration_order() {
        let (dispatcher, _) = dispatcher(StubFetcher::default());
        assert_eq!(dispatcher.processor_names(), vec!["BiliBili", "GitHub", "Gitee"]);
        assert!(LinkDispatcher::handles(EventKind::PersonMessageReceived));
        assert!(LinkDispatcher::handles(EventKind::GroupMessageReceived));
    }

    #[test]
    fn test_regex_patterns() {
        let test_cases = vec![
            ("https://www.bilibili.com/video/BV1xx411c7mD", "BiliBili"),
            ("https://b23.tv/BV1xx411c7mD", "BiliBili"),
            ("https://www.bilibili.com/video/av170001", "BiliBili"),
            ("https://github.com/rust-lang/rust", "GitHub"),
            ("https://gitee.com/openharmony/docs", "Gitee"),
        ];

        let (dispatcher, _) = dispatcher(StubFetcher::default());
        for (text, expected) in test_cases {
            let link = dispatcher
                .find_link(text)
                .unwrap_or_else(|| panic!("{} was not matched", text));
            assert_eq!(link.platform(), expected, "{}", text);
        }

        assert!(dispatcher.find_link("没有链接的消息").is_none());
        assert!(dispatcher.find_link("https://example.com/a/b").is_none());
    }

    #[test]
    fn test_first_platform_wins_over_position() {
        let (dispatcher, _) = dispatcher(StubFetcher::default());
        let text = "先看 https://github.com/rust-lang/rust 再看 https://b23.tv/BV1xx411c7mD";

        let link = dispatcher.find_link(text).unwrap();
        assert_eq!(link.platform(), "BiliBili");
        assert_eq!(link.matched(), "b23.tv/BV1xx411c7mD");
    }

    #[tokio::test]
    async fn test_no_link_no_reply() {
        let (dispatcher, fetcher) = dispatcher(StubFetcher::default());
        let host = RecordingHost::blacklist_nobody();

        let ctx = dispatch(&dispatcher, &host, Launcher::person("1"), "今天天气不错").await;

        assert!(host.sent().is_empty());
        assert!(fetcher.requested().is_empty());
        assert!(!ctx.is_default_prevented());
        assert!(!ctx.is_postorder_prevented());
    }

    #[tokio::test]
    async fn test_video_link_single_reply() {
        let (dispatcher, fetcher) = dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        let host = RecordingHost::blacklist_nobody();

        let ctx = dispatch(
            &dispatcher,
            &host,
            Launcher::group("123"),
            "  https://www.bilibili.com/video/BV1xx411c7mD  ",
        )
        .await;

        let sent = host.sent();
        assert_eq!(sent.len(), 1);
        assert!(ctx.is_default_prevented());
        assert!(ctx.is_postorder_prevented());
        assert_eq!(fetcher.requested(), vec![VIDEO_API]);

        let (target, reply) = &sent[0];
        assert_eq!(*target, Launcher::group("123"));
        assert_eq!(reply.images(), vec!["http://x/y.jpg"]);

        let text = reply.text_content();
        assert!(text.contains("T"));
        assert!(text.contains("U"));
        assert!(text.contains("1,000"));
        assert!(text.contains("https://www.bilibili.com/video/BV1xx411c7mD"));
        assert!(!text.contains("简介"));
    }

    #[tokio::test]
    async fn test_mixed_links_only_bilibili_handled() {
        let fetcher = StubFetcher::default()
            .with(VIDEO_API, video_json())
            .with(GITHUB_API, repo_json());
        let (dispatcher, fetcher) = dispatcher(fetcher);
        let host = RecordingHost::blacklist_nobody();

        dispatch(
            &dispatcher,
            &host,
            Launcher::person("1"),
            "https://github.com/rust-lang/rust https://www.bilibili.com/video/BV1xx411c7mD",
        )
        .await;

        assert_eq!(fetcher.requested(), vec![VIDEO_API]);
        assert_eq!(host.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_repo_link_reply() {
        let (dispatcher, _) = dispatcher(StubFetcher::default().with(GITHUB_API, repo_json()));
        let host = RecordingHost::blacklist_nobody();

        dispatch(
            &dispatcher,
            &host,
            Launcher::person("1"),
            "https://github.com/rust-lang/rust",
        )
        .await;

        let sent = host.sent();
        assert_eq!(sent.len(), 1);
        let text = sent[0].1.text_content();
        assert!(text.starts_with("━━━━━━━━━━━━━━━\n📦 GitHub 仓库：rust\n"));
        assert!(text.contains("⭐ Stars: 98,765"));
        assert!(text.ends_with("🔗 链接：https://github.com/rust-lang/rust"));
    }

    #[tokio::test]
    async fn test_github_network_failure_fixed_text() {
        // 未预设响应，请求失败
        let (dispatcher, _) = dispatcher(StubFetcher::default());
        let host = RecordingHost::blacklist_nobody();

        let ctx = dispatch(
            &dispatcher,
            &host,
            Launcher::person("1"),
            "https://github.com/rust-lang/rust",
        )
        .await;

        let sent = host.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1.segments,
            vec![ReplySegment::Text("仓库信息获取失败".to_string())]
        );
        assert!(ctx.is_default_prevented());
    }

    #[tokio::test]
    async fn test_video_api_error_fixed_text() {
        let fetcher =
            StubFetcher::default().with(VIDEO_API, json!({"code": -400, "message": "请求错误"}));
        let (dispatcher, _) = dispatcher(fetcher);
        let host = RecordingHost::blacklist_nobody();

        dispatch(
            &dispatcher,
            &host,
            Launcher::person("1"),
            "https://b23.tv/BV1xx411c7mD",
        )
        .await;

        let sent = host.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, Reply::plain("视频解析失败"));
    }

    #[tokio::test]
    async fn test_whitelist_access_control() {
        let (dispatcher, _) = dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        let host = RecordingHost::new(Some(json!({
            "access-control": {"mode": "whitelist", "whitelist": ["group_123"]}
        })));
        let text = "https://b23.tv/BV1xx411c7mD";

        let allowed = dispatch(&dispatcher, &host, Launcher::group("123"), text).await;
        assert!(allowed.is_default_prevented());
        assert_eq!(host.sent().len(), 1);

        let denied = dispatch(&dispatcher, &host, Launcher::group("456"), text).await;
        assert!(!denied.is_default_prevented());
        assert_eq!(host.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_blacklist_wildcard() {
        let (dispatcher, fetcher) =
            dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        let host = RecordingHost::new(Some(json!({
            "access-control": {"mode": "blacklist", "blacklist": ["group_*"]}
        })));
        let text = "https://b23.tv/BV1xx411c7mD";

        dispatch(&dispatcher, &host, Launcher::group("789"), text).await;
        assert!(host.sent().is_empty());
        assert!(fetcher.requested().is_empty());

        dispatch(&dispatcher, &host, Launcher::person("789"), text).await;
        assert_eq!(host.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_query_config_preferred() {
        let (dispatcher, _) = dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        // 宿主全局配置拒绝所有群，事件自带配置允许 group_1
        let host = RecordingHost::new(Some(json!({
            "access-control": {"mode": "blacklist", "blacklist": ["group_*"]}
        })));
        let event = MessageEvent::new(Launcher::group("1"), "https://b23.tv/BV1xx411c7mD")
            .with_pipeline_config(json!({
                "trigger": {"access-control": {"mode": "whitelist", "whitelist": ["group_1"]}}
            }));

        let mut ctx = EventContext::new(event);
        dispatcher.handle(&mut ctx, &host).await;

        assert_eq!(host.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_access_config_dropped() {
        let (dispatcher, fetcher) =
            dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        let text = "https://b23.tv/BV1xx411c7mD";

        let host = RecordingHost::new(None);
        let ctx = dispatch(&dispatcher, &host, Launcher::person("1"), text).await;
        assert!(host.sent().is_empty());
        assert!(!ctx.is_default_prevented());

        let host = RecordingHost::new(Some(json!({"output": {}})));
        dispatch(&dispatcher, &host, Launcher::person("1"), text).await;
        assert!(host.sent().is_empty());
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_recursion_guard() {
        let (dispatcher, fetcher) =
            dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));
        let host = RecordingHost::blacklist_nobody();

        let ctx = dispatch(
            &dispatcher,
            &host,
            Launcher::person("1"),
            "!plugin info https://b23.tv/BV1xx411c7mD",
        )
        .await;

        assert!(host.sent().is_empty());
        assert!(fetcher.requested().is_empty());
        assert!(!ctx.is_default_prevented());
    }

    #[tokio::test]
    async fn test_process_link_without_host() {
        let (dispatcher, _) = dispatcher(StubFetcher::default().with(VIDEO_API, video_json()));

        assert!(dispatcher.process_link("no links here").await.is_none());

        let reply = dispatcher
            .process_link("www.bilibili.com/video/BV1xx411c7mD")
            .await
            .unwrap();
        assert_eq!(reply.segments.len(), 5);
    }
}
