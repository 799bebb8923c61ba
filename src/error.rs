use std::time::Duration;

use thiserror::Error;

/// 页面操作错误
///
/// 由 `ChatSurface` 的实现返回，描述与宿主页面交互时的失败
#[derive(Error, Debug)]
pub enum HostError {
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    Script(String),

    /// 脚本返回值无法解析
    #[error("页面返回数据解析失败: {0}")]
    Decode(String),

    /// 之前标记的节点已不在页面中
    #[error("页面元素已失效: {0}")]
    Detached(String),

    /// 行中不存在指定序号的链接
    #[error("链接不存在 (链接序号: {link})")]
    MissingLink { link: usize },
}

/// 扫描错误
///
/// 只有调度层和输入层的错误会终止扫描，单行的验证失败不会出现在这里
#[derive(Error, Debug)]
pub enum ScanError {
    /// 页面中没有任何消息（或最后一条消息中没有行）
    #[error("未找到任何消息！")]
    NoInput,

    /// 收到停止信号
    #[error("扫描已被用户停止")]
    Cancelled,

    /// 其他页面操作失败
    #[error("发生错误: {0}")]
    Host(#[from] HostError),
}

/// 单行验证失败
///
/// 在 Item Extractor 边界被吞掉，转换为 `LineOutcome::VerificationFailed`
#[derive(Error, Debug)]
pub enum VerificationFailure {
    /// 等待验证面板超时
    #[error("等待验证面板超时 ({0:?})")]
    Timeout(Duration),

    /// 查询验证面板失败
    #[error("{0}")]
    Host(HostError),
}

/// 扫描控制错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// 已有扫描在运行
    #[error("已有扫描正在进行中")]
    AlreadyRunning,
}

/// 设置读写错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("读取设置文件失败 ({path}): {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("写入设置文件失败 ({path}): {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("设置文件解析失败 ({path}): {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("设置序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for HostError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        HostError::Script(err.to_string())
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::Decode(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 扫描结果类型
pub type ScanResult<T> = Result<T, ScanError>;

/// 页面操作结果类型
pub type HostResult<T> = Result<T, HostError>;
