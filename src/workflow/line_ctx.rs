//! 行处理上下文
//!
//! 封装"我正在处理第几行、处于哪一轮"这一信息

use std::fmt::Display;

/// 扫描轮次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPass {
    /// 首轮（分批处理）
    First,
    /// 补查被跳过的行
    Retry,
}

/// 行处理上下文
#[derive(Debug, Clone, Copy)]
pub struct LineCtx {
    /// 行在（可能已倒序的）队列中的位置（从1开始）
    pub position: usize,

    /// 当前轮次
    pub pass: ScanPass,
}

impl LineCtx {
    pub fn first(position: usize) -> Self {
        Self {
            position,
            pass: ScanPass::First,
        }
    }

    pub fn retry(position: usize) -> Self {
        Self {
            position,
            pass: ScanPass::Retry,
        }
    }
}

impl Display for LineCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pass {
            ScanPass::First => write!(f, "[第 {} 行]", self.position),
            ScanPass::Retry => write!(f, "[补查 第 {} 行]", self.position),
        }
    }
}
