use crate::errors::Result;
use async_trait::async_trait;

/// 加载页面并等待标记元素渲染完成
#[async_trait]
pub trait PageFetcher {
    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;

    /// 打开 `url`，标记元素出现后返回渲染后的 HTML。
    /// 超时返回 `NavigationTimeout` 或 `PageLoadTimeout`，不做重试
    async fn fetch(&self, url: &str) -> Result<String>;

    /// 关闭会话
    async fn close(&mut self) -> Result<()>;
}
