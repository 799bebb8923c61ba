//! 单行处理流程 - 流程层
//!
//! 核心职责：定义"一行"的完整处理流程
//!
//! 流程顺序：
//! 1. 读取行内容 → 提取号码（最后一个链接）和备注名（其余子节点文本）
//! 2. 点击号码 → 等待验证面板出现
//! 3. 统计面板子项 → 恰好 2 项视为已验证
//!
//! 等待或读取验证面板失败只记录日志，不向上抛出；停止信号和其他页面错误照常返回

use tracing::{debug, info, warn};

use crate::error::{ScanError, ScanResult, VerificationFailure};
use crate::infrastructure::ChatSurface;
use crate::models::{Contact, LineContent, LineOutcome, NoContactReason, Reference};
use crate::services::reporter::Reporter;
use crate::services::suspend::{PollOptions, Sleeper, Suspender, WaitOutcome};
use crate::workflow::line_ctx::LineCtx;

/// 验证面板参数
#[derive(Debug, Clone)]
pub struct VerificationOptions {
    /// 验证面板选择器
    pub surface_locator: String,
    /// 面板子项选择器
    pub item_locator: String,
    /// 子项数量等于该值时视为已验证
    pub verified_item_count: usize,
    /// 等待面板出现的轮询参数
    pub poll: PollOptions,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            surface_locator: r#"span > div[role="application"]"#.to_string(),
            item_locator: "li".to_string(),
            verified_item_count: 2,
            poll: PollOptions::default(),
        }
    }
}

/// 单行处理流程
///
/// - 只处理一行
/// - 不关心批次、暂停和补查
/// - 不持有任何资源，只借用页面、挂起点和上报通道
pub struct LineFlow<'a, H, S> {
    host: &'a H,
    suspender: &'a Suspender<S>,
    reporter: &'a dyn Reporter,
    options: &'a VerificationOptions,
}

impl<'a, H: ChatSurface, S: Sleeper> LineFlow<'a, H, S> {
    pub fn new(
        host: &'a H,
        suspender: &'a Suspender<S>,
        reporter: &'a dyn Reporter,
        options: &'a VerificationOptions,
    ) -> Self {
        Self {
            host,
            suspender,
            reporter,
            options,
        }
    }

    pub async fn run(&self, line: &H::Line, ctx: &LineCtx) -> ScanResult<LineOutcome> {
        self.reporter.log(format!("🔍 检查第 {} 行", ctx.position));

        let content = self.host.inspect_line(line).await?;

        let reference = match extract_reference(&content) {
            Ok(reference) => reference,
            Err(reason) => {
                debug!("{} {}", ctx, reason.message());
                self.reporter.log(reason.message().to_string());
                return Ok(LineOutcome::NoContactFound(reason));
            }
        };

        self.reporter.log(format!("👤 备注名: {}", reference.name));
        self.reporter.log(format!("📞 号码: {}", reference.identifier));

        self.host.activate_link(line, reference.link_index).await?;
        self.reporter.log("🖱️ 已点击号码".to_string());

        let item_count = match self.verify().await? {
            Ok(count) => count,
            Err(failure) => {
                warn!("{} ⚠️ 验证面板检查失败: {}", ctx, failure);
                self.reporter.log(format!("⚠️ 检查验证面板出错: {}", failure));
                return Ok(LineOutcome::VerificationFailed(failure));
            }
        };

        self.reporter.log(format!("📋 找到 <li> 项: {}", item_count));

        let verified = item_count == self.options.verified_item_count;
        self.reporter.log(format!(
            "✅ 验证状态: {}",
            if verified { "已找到" } else { "未找到" }
        ));

        if verified {
            info!("{} ✓ 已验证: {} ({})", ctx, reference.name, reference.identifier);
            Ok(LineOutcome::ContactFound(Contact::new(
                reference.name,
                reference.identifier,
            )))
        } else {
            Ok(LineOutcome::ContactNotVerified)
        }
    }

    /// 等待验证面板并统计子项
    ///
    /// 外层 `Err` 只会是停止信号；面板相关的失败放在内层
    async fn verify(&self) -> ScanResult<Result<usize, VerificationFailure>> {
        let host = self.host;
        let locator = self.options.surface_locator.as_str();

        let waited = self
            .suspender
            .wait_until_present(&self.options.poll, || host.find_element(locator))
            .await;

        let surface = match waited {
            Ok(WaitOutcome::Present(surface)) => surface,
            Ok(WaitOutcome::TimedOut(waited)) => {
                return Ok(Err(VerificationFailure::Timeout(waited)))
            }
            Err(ScanError::Host(e)) => return Ok(Err(VerificationFailure::Host(e))),
            Err(e) => return Err(e),
        };

        match host
            .count_sub_items(&surface, &self.options.item_locator)
            .await
        {
            Ok(count) => Ok(Ok(count)),
            Err(e) => Ok(Err(VerificationFailure::Host(e))),
        }
    }
}

/// 从行内容中提取号码和备注名
///
/// - 号码取最后一个链接的文本（trim）
/// - 备注名取除号码链接外所有子节点文本（各自 trim 后直接拼接，再整体 trim）
pub fn extract_reference(content: &LineContent) -> Result<Reference, NoContactReason> {
    let link_index = content
        .links
        .len()
        .checked_sub(1)
        .ok_or(NoContactReason::NoLink)?;

    let identifier = content.links[link_index].trim();
    if identifier.is_empty() {
        return Err(NoContactReason::EmptyIdentifier);
    }

    let name: String = content
        .nodes
        .iter()
        .filter(|node| node.link != Some(link_index))
        .filter_map(|node| node.text.as_deref())
        .map(str::trim)
        .collect();
    let name = name.trim();
    if name.is_empty() {
        return Err(NoContactReason::EmptyReference);
    }

    Ok(Reference {
        name: name.to_string(),
        identifier: identifier.to_string(),
        link_index,
    })
}
