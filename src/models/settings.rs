use serde::{Deserialize, Serialize};

/// 行为开关
///
/// 扫描开始时读取一次，核心不会修改它。缺失的字段使用默认值（全部开启）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// 每行之前随机等待
    pub random_delay: bool,
    /// 随机大小分批
    pub batch_processing: bool,
    /// 批次之间长暂停
    pub pause_between_batches: bool,
    /// 模拟人为失误（跳过后补查）
    pub simulate_errors: bool,
    /// 随机倒序
    pub random_order: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            random_delay: true,
            batch_processing: true,
            pause_between_batches: true,
            simulate_errors: true,
            random_order: true,
        }
    }
}

impl Settings {
    /// 全部关闭（按原顺序、一批、无等待、无跳过）
    pub fn disabled() -> Self {
        Self {
            random_delay: false,
            batch_processing: false,
            pause_between_batches: false,
            simulate_errors: false,
            random_order: false,
        }
    }
}
