//! 行内容模型
//!
//! 宿主页面对"一行"的只读快照，Item Extractor 只根据它来提取姓名和号码

use serde::{Deserialize, Serialize};

/// 最后一条消息的行集合
#[derive(Debug, Clone)]
pub struct LastMessage<L> {
    /// 聊天中的消息总数
    pub message_count: usize,
    /// 最后一条消息中的行（按页面顺序）
    pub lines: Vec<L>,
}

/// 行的子节点
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineNode {
    /// 节点文本（未 trim）
    #[serde(default)]
    pub text: Option<String>,
    /// 如果该子节点本身就是一个链接，记录它在 `LineContent::links` 中的序号
    #[serde(default)]
    pub link: Option<usize>,
}

impl LineNode {
    /// 普通文本节点
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            link: None,
        }
    }

    /// 链接节点
    pub fn link(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: Some(text.into()),
            link: Some(index),
        }
    }
}

/// 一行的内容快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineContent {
    /// 行内所有链接的文本（按文档顺序，包含嵌套链接）
    #[serde(default)]
    pub links: Vec<String>,
    /// 行的直接子节点（按文档顺序）
    #[serde(default)]
    pub nodes: Vec<LineNode>,
}

/// 从一行中提取出的联系人引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// 显示名称
    pub name: String,
    /// 号码
    pub identifier: String,
    /// 号码链接在 `links` 中的序号（总是最后一个）
    pub link_index: usize,
}
