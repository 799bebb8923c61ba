//! 单行处理结果与扫描统计

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VerificationFailure;

/// 已验证的联系人
///
/// 序列化字段名与导出文件保持一致（Reference / Number）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "Reference")]
    pub name: String,
    #[serde(rename = "Number")]
    pub identifier: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 模拟人为失误，留到补查阶段
    SimulatedError,
}

/// 未找到联系人的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoContactReason {
    /// 行内没有链接
    NoLink,
    /// 最后一个链接文本为空
    EmptyIdentifier,
    /// 除号码外没有其他文本
    EmptyReference,
}

impl NoContactReason {
    /// 面向用户的日志文本
    pub fn message(&self) -> &'static str {
        match self {
            NoContactReason::NoLink => "⚠️ 已跳过：未找到 <a> 标签",
            NoContactReason::EmptyIdentifier => "⚠️ 已跳过：未找到号码",
            NoContactReason::EmptyReference => "⚠️ 已跳过：未找到备注名",
        }
    }
}

/// 单行处理结果
#[derive(Debug)]
pub enum LineOutcome {
    /// 被调度器跳过，没有调用 Item Extractor
    Skipped(SkipReason),
    /// 行中没有可用的联系人引用
    NoContactFound(NoContactReason),
    /// 验证面板出现，但子项数量不符
    ContactNotVerified,
    /// 联系人已验证
    ContactFound(Contact),
    /// 等待或读取验证面板失败（不终止扫描）
    VerificationFailed(VerificationFailure),
}

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// 扫描开始时的行数
    pub total_lines: usize,
    /// 是否倒序检查
    pub reversed: bool,
    /// 批次数
    pub batches: usize,
    /// 访问行的次数（首轮每行一次，包括被跳过的行；补查每行再一次）
    pub visits: usize,
    /// 调用 Item Extractor 的次数（首轮 + 补查）
    pub attempts: usize,
    /// 首轮被模拟失误跳过的行数
    pub skipped: usize,
    /// 补查的行数
    pub retried: usize,
    pub found: usize,
    pub not_verified: usize,
    pub no_contact: usize,
    pub verification_failed: usize,
}

impl ScanSummary {
    /// 记录一次 Item Extractor 的结果
    pub fn record(&mut self, outcome: &LineOutcome) {
        self.visits += 1;
        match outcome {
            LineOutcome::Skipped(_) => {
                self.skipped += 1;
                return;
            }
            LineOutcome::NoContactFound(_) => self.no_contact += 1,
            LineOutcome::ContactNotVerified => self.not_verified += 1,
            LineOutcome::ContactFound(_) => self.found += 1,
            LineOutcome::VerificationFailed(_) => self.verification_failed += 1,
        }
        self.attempts += 1;
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ 完成！所有行均已检查 (共 {} 行, 找到 {}, 未验证 {}, 无联系人 {}, 验证失败 {}, 补查 {})",
            self.total_lines,
            self.found,
            self.not_verified,
            self.no_contact,
            self.verification_failed,
            self.retried
        )
    }
}
