//! 宿主页面抽象 - 基础设施层
//!
//! 核心只通过这个 trait 接触页面：如何定位消息、如何读取行内容由实现决定

use std::future::Future;

use crate::error::HostResult;
use crate::models::{LastMessage, LineContent};

/// 聊天页面
///
/// 职责：
/// - 提供最后一条消息中的行（不透明句柄）
/// - 读取行内容、点击行内链接
/// - 查询验证面板并统计其中的子项
///
/// 不认识批次、暂停和补查
pub trait ChatSurface: Send + Sync {
    /// 行句柄，只被核心引用，不被修改
    type Line: Clone + Send + Sync + 'static;
    /// 页面元素句柄（验证面板）
    type Element: Send + Sync + 'static;

    /// 收集最后一条消息中的所有行
    fn collect_lines(&self) -> impl Future<Output = HostResult<LastMessage<Self::Line>>> + Send;

    /// 读取一行的链接和子节点文本
    fn inspect_line(&self, line: &Self::Line) -> impl Future<Output = HostResult<LineContent>> + Send;

    /// 触发行内第 `link` 个链接的点击
    fn activate_link(
        &self,
        line: &Self::Line,
        link: usize,
    ) -> impl Future<Output = HostResult<()>> + Send;

    /// 查询匹配 `locator` 的元素，不存在时返回 `None`
    fn find_element(
        &self,
        locator: &str,
    ) -> impl Future<Output = HostResult<Option<Self::Element>>> + Send;

    /// 统计元素内匹配 `item_locator` 的子项数量
    fn count_sub_items(
        &self,
        element: &Self::Element,
        item_locator: &str,
    ) -> impl Future<Output = HostResult<usize>> + Send;
}
