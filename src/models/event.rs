//! 扫描事件
//!
//! 核心向观察者单向发送的全部事件类型

use crate::models::outcome::{Contact, ScanSummary};

/// 扫描事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// 普通日志
    Log(String),
    /// 找到已验证的联系人
    FoundUser(Contact),
    /// 首轮进度（从 1 开始）
    Progress { current: usize, total: usize },
    /// 扫描正常完成
    ScanComplete(ScanSummary),
    /// 扫描因错误终止
    Error(String),
    /// 扫描被停止
    Stopped(String),
}

impl ScanEvent {
    /// 是否为结束事件（之后不会再有事件）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanEvent::ScanComplete(_) | ScanEvent::Error(_) | ScanEvent::Stopped(_)
        )
    }
}
