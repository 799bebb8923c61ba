//! 控制面板 - 观察者
//!
//! 消费扫描事件：维护状态、带时间戳的日志和去重后的结果列表

use std::fmt;

use chrono::Local;
use tracing::{error, info, warn};

use crate::models::{Contact, ScanEvent};

/// 面板状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Idle,
    Running,
    Checking { current: usize, total: usize },
    Finished,
    Stopped,
    Error,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelStatus::Idle => write!(f, "空闲"),
            PanelStatus::Running => write!(f, "运行中..."),
            PanelStatus::Checking { current, total } => write!(f, "检查中 {}/{}", current, total),
            PanelStatus::Finished => write!(f, "已完成"),
            PanelStatus::Stopped => write!(f, "已停止"),
            PanelStatus::Error => write!(f, "错误"),
        }
    }
}

/// 控制面板
#[derive(Debug)]
pub struct ControlPanel {
    status: PanelStatus,
    logs: Vec<String>,
    results: Vec<Contact>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            status: PanelStatus::Idle,
            logs: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn results(&self) -> &[Contact] {
        &self.results
    }

    /// 扫描开始
    pub fn mark_running(&mut self) {
        self.status = PanelStatus::Running;
        self.add_log("开始检查最后一条消息中的号码...".to_string());
    }

    /// 是否可以导出 / 复制
    pub fn can_export(&self) -> bool {
        !self.is_scanning() && !self.results.is_empty()
    }

    fn is_scanning(&self) -> bool {
        matches!(
            self.status,
            PanelStatus::Running | PanelStatus::Checking { .. }
        )
    }

    /// 处理一个事件，返回它是否为结束事件
    pub fn apply(&mut self, event: ScanEvent) -> bool {
        let terminal = event.is_terminal();

        match event {
            ScanEvent::Log(text) => self.add_log(text),
            ScanEvent::FoundUser(contact) => {
                self.add_contact(contact);
            }
            ScanEvent::Progress { current, total } => {
                self.status = PanelStatus::Checking { current, total };
            }
            ScanEvent::ScanComplete(summary) => {
                self.status = PanelStatus::Finished;
                self.add_log(summary.to_string());
            }
            ScanEvent::Error(message) => {
                self.status = PanelStatus::Error;
                error!("❌ {}", message);
                self.push_line(format!("错误: {}", message));
            }
            ScanEvent::Stopped(message) => {
                self.status = PanelStatus::Stopped;
                warn!("⏹ {}", message);
                self.push_line(message);
            }
        }

        terminal
    }

    /// 添加联系人，号码重复时跳过
    pub fn add_contact(&mut self, contact: Contact) -> bool {
        if self
            .results
            .iter()
            .any(|c| c.identifier == contact.identifier)
        {
            self.add_log(format!("⚠️ 已跳过重复号码: {}", contact.identifier));
            return false;
        }

        info!("👤 新联系人: {} ({})", contact.name, contact.identifier);
        self.results.push(contact);
        true
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.add_log("结果已清空".to_string());
    }

    fn add_log(&mut self, text: String) {
        info!("{}", text);
        self.push_line(text);
    }

    fn push_line(&mut self, text: String) {
        self.logs
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), text));
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}
