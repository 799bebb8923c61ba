//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一次扫描的全部调度，是行级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **收集行**：从页面取出最后一条消息的所有行，只取一次
//! 2. **随机倒序**：每次扫描最多整体倒序一次
//! 3. **分批处理**：随机批次大小，每行之前随机等待
//! 4. **模拟失误**：随机跳过某行并记录，首轮结束后按发现顺序补查
//! 5. **批次暂停**：批次之间长暂停
//! 6. **结果上报**：找到的联系人、完成 / 错误 / 停止事件
//!
//! 停止信号在每个挂起点被检查，一旦收到立即退出，不再补查

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{ScanError, ScanResult};
use crate::infrastructure::ChatSurface;
use crate::models::{LineOutcome, ScanEvent, ScanSummary, Settings, SkipReason};
use crate::services::pacing::Pacer;
use crate::services::reporter::Reporter;
use crate::services::suspend::{Sleeper, Suspender};
use crate::workflow::{LineCtx, LineFlow, VerificationOptions};

/// 被模拟失误跳过的行
#[derive(Debug, Clone)]
pub struct SkippedEntry<L> {
    pub line: L,
    /// 首轮中的位置（从1开始）
    pub position: usize,
}

/// 一次扫描所需的全部协作者
pub struct ScanJob<H, S> {
    pub host: Arc<H>,
    pub sleeper: S,
    pub pacer: Box<dyn Pacer>,
    pub reporter: Arc<dyn Reporter>,
    pub settings: Settings,
    pub verification: VerificationOptions,
}

/// 扫描结束方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEnd {
    Completed(ScanSummary),
    Stopped,
    Failed(String),
}

/// 批次调度器
pub struct BatchScheduler<H, S> {
    host: Arc<H>,
    suspender: Suspender<S>,
    pacer: Box<dyn Pacer>,
    reporter: Arc<dyn Reporter>,
    settings: Settings,
    verification: VerificationOptions,
}

impl<H: ChatSurface, S: Sleeper> BatchScheduler<H, S> {
    pub fn new(job: ScanJob<H, S>, cancel: watch::Receiver<bool>) -> Self {
        Self {
            host: job.host,
            suspender: Suspender::new(job.sleeper, cancel),
            pacer: job.pacer,
            reporter: job.reporter,
            settings: job.settings,
            verification: job.verification,
        }
    }

    /// 执行一次完整扫描
    ///
    /// 不返回错误：所有结局都以事件形式上报，并通过 `ScanEnd` 告知调用方
    pub async fn run(mut self) -> ScanEnd {
        self.reporter
            .log("🚀 开始从最后一条消息检查...".to_string());

        match self.scan().await {
            Ok(summary) => {
                info!(
                    "✓ 扫描完成: 共 {} 行, 找到 {} 个联系人",
                    summary.total_lines, summary.found
                );
                self.reporter.emit(ScanEvent::ScanComplete(summary.clone()));
                ScanEnd::Completed(summary)
            }
            Err(ScanError::Cancelled) => {
                warn!("⏹ 扫描已停止");
                self.reporter
                    .emit(ScanEvent::Stopped(ScanError::Cancelled.to_string()));
                ScanEnd::Stopped
            }
            Err(e) => {
                error!("❌ 扫描失败: {}", e);
                self.reporter.error(e.to_string());
                ScanEnd::Failed(e.to_string())
            }
        }
    }

    async fn scan(&mut self) -> ScanResult<ScanSummary> {
        self.suspender.checkpoint()?;

        let message = self.host.collect_lines().await?;
        if message.message_count == 0 {
            return Err(ScanError::NoInput);
        }

        self.reporter
            .log(format!("📦 找到消息总数: {}", message.message_count));
        self.reporter.log("🧩 正在分析最后一条消息...".to_string());
        self.reporter
            .log(format!("📃 最后一条消息的行数: {}", message.lines.len()));

        let mut queue = message.lines;
        if queue.is_empty() {
            return Err(ScanError::NoInput);
        }

        let total = queue.len();
        let mut summary = ScanSummary {
            total_lines: total,
            ..Default::default()
        };

        if self.settings.random_order && self.pacer.should_reverse() {
            queue.reverse();
            summary.reversed = true;
            self.reporter.log("🔀 按倒序检查各行".to_string());
        }

        let mut skipped: Vec<SkippedEntry<H::Line>> = Vec::new();
        let mut cursor = 0;

        // ========== 首轮：分批处理 ==========
        while cursor < total {
            let batch_size = if self.settings.batch_processing {
                self.pacer.batch_size()
            } else {
                total
            };
            let end = (cursor + batch_size).min(total);
            summary.batches += 1;

            debug!("批次 {}: 第 {}-{} 行", summary.batches, cursor + 1, end);
            self.reporter
                .log(format!("📊 正在处理一批 {} 行", batch_size));

            for (index, line) in queue.iter().enumerate().take(end).skip(cursor) {
                let position = index + 1;

                self.pace().await?;

                if self.settings.simulate_errors && self.pacer.should_simulate_error() {
                    self.reporter.log(format!(
                        "🤷 哎呀！漏掉了第 {} 行（模拟人为失误）",
                        position
                    ));
                    skipped.push(SkippedEntry {
                        line: line.clone(),
                        position,
                    });
                    summary.record(&LineOutcome::Skipped(SkipReason::SimulatedError));
                } else {
                    let outcome = self.process(line, LineCtx::first(position)).await?;
                    summary.record(&outcome);
                }

                self.reporter.emit(ScanEvent::Progress {
                    current: position,
                    total,
                });
            }

            cursor = end;

            if cursor < total && self.settings.pause_between_batches {
                let pause = self.pacer.batch_pause();
                let minutes = (pause.as_millis() as f64 / 60_000.0).round() as u64;
                debug!("批次间暂停 {:?}", pause);
                self.reporter
                    .log(format!("⏸️ 暂停约 {} 分钟...", minutes));
                self.suspender.wait_for(pause).await?;
                self.reporter.log("↩️ 继续检查...".to_string());
            }
        }

        // ========== 补查：按发现顺序，不再模拟失误 ==========
        if !skipped.is_empty() {
            self.reporter.log(format!(
                "🔍 回头检查 {} 个被跳过的行...",
                skipped.len()
            ));

            for entry in &skipped {
                self.pace().await?;
                self.reporter.log(format!(
                    "🔍 重新检查之前跳过的第 {} 行",
                    entry.position
                ));
                let outcome = self
                    .process(&entry.line, LineCtx::retry(entry.position))
                    .await?;
                summary.retried += 1;
                summary.record(&outcome);
            }

            self.reporter
                .log("✅ 已完成所有跳过行的检查".to_string());
        }

        Ok(summary)
    }

    /// 每行之前的等待；关闭随机等待时只检查停止信号
    async fn pace(&mut self) -> ScanResult<()> {
        if self.settings.random_delay {
            let delay = self.pacer.item_delay();
            self.suspender.wait_for(delay).await
        } else {
            self.suspender.checkpoint()
        }
    }

    /// 处理一行，已验证的联系人转发给观察者
    async fn process(&self, line: &H::Line, ctx: LineCtx) -> ScanResult<LineOutcome> {
        let flow = LineFlow::new(
            self.host.as_ref(),
            &self.suspender,
            self.reporter.as_ref(),
            &self.verification,
        );

        let outcome = flow.run(line, &ctx).await?;
        if let LineOutcome::ContactFound(contact) = &outcome {
            self.reporter.found_user(contact.clone());
        }

        Ok(outcome)
    }
}
