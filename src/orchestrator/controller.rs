//! 扫描控制器 - 编排层
//!
//! 同一时间只允许一个扫描。状态机：
//!
//! ```text
//! Idle ──start──▶ Running ──stop──▶ Stopping
//!                    │                 │
//!                    ▼                 ▼
//!           Finished / Errored ◀───────┘
//! ```
//!
//! `Finished` 和 `Errored` 之后可以再次 `start`

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ControlError;
use crate::infrastructure::ChatSurface;
use crate::orchestrator::batch_scheduler::{BatchScheduler, ScanEnd, ScanJob};
use crate::services::suspend::Sleeper;

/// 扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
    Stopping,
    Finished,
    Errored,
}

impl ScanState {
    /// 是否有扫描正在进行
    pub fn is_active(&self) -> bool {
        matches!(self, ScanState::Running | ScanState::Stopping)
    }
}

/// 扫描控制器
pub struct ScanController {
    state: Arc<watch::Sender<ScanState>>,
    cancel: watch::Sender<bool>,
}

impl ScanController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        let (cancel, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
            cancel,
        }
    }

    /// 当前状态
    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// 开始一次扫描
    ///
    /// 已有扫描进行中时拒绝。返回的任务句柄在扫描结束后给出 `ScanEnd`
    pub fn start<H, S>(&self, job: ScanJob<H, S>) -> Result<JoinHandle<ScanEnd>, ControlError>
    where
        H: ChatSurface + 'static,
        S: Sleeper + 'static,
    {
        let accepted = self.state.send_if_modified(|state| {
            if state.is_active() {
                false
            } else {
                *state = ScanState::Running;
                true
            }
        });

        if !accepted {
            warn!("⚠️ 已有扫描正在进行中，忽略本次启动");
            return Err(ControlError::AlreadyRunning);
        }

        self.cancel.send_replace(false);
        let scheduler = BatchScheduler::new(job, self.cancel.subscribe());
        let state = Arc::clone(&self.state);

        info!("▶️ 扫描已启动");
        Ok(tokio::spawn(async move {
            let end = scheduler.run().await;
            let next = match &end {
                ScanEnd::Completed(_) | ScanEnd::Stopped => ScanState::Finished,
                ScanEnd::Failed(_) => ScanState::Errored,
            };
            state.send_replace(next);
            end
        }))
    }

    /// 请求停止当前扫描
    ///
    /// 只有 Running 状态下有效；调度器会在下一个挂起点退出
    pub fn stop(&self) -> bool {
        let stopping = self.state.send_if_modified(|state| {
            if *state == ScanState::Running {
                *state = ScanState::Stopping;
                true
            } else {
                false
            }
        });

        if stopping {
            info!("⏹ 已请求停止扫描");
            self.cancel.send_replace(true);
        }

        stopping
    }
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new()
    }
}
