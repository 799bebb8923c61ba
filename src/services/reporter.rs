//! 事件上报服务 - 业务能力层
//!
//! 只负责"把事件交给观察者"，不等待确认、不做背压

use tokio::sync::mpsc;
use tracing::trace;

use crate::models::{Contact, ScanEvent};

/// 事件上报
pub trait Reporter: Send + Sync {
    /// 发送一个事件，不阻塞
    fn emit(&self, event: ScanEvent);

    fn log(&self, text: String) {
        self.emit(ScanEvent::Log(text));
    }

    fn found_user(&self, contact: Contact) {
        self.emit(ScanEvent::FoundUser(contact));
    }

    fn error(&self, message: String) {
        self.emit(ScanEvent::Error(message));
    }
}

/// 基于无界通道的上报
#[derive(Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ChannelReporter {
    /// 创建上报端和对应的接收端
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Reporter for ChannelReporter {
    fn emit(&self, event: ScanEvent) {
        if let Err(e) = self.tx.send(event) {
            trace!("观察者已关闭，丢弃事件: {:?}", e.0);
        }
    }
}
