//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、收尾）
//! - 持有浏览器资源（Browser、ChromiumChatPage）
//! - 把事件转发给控制面板，导出结果
//!
//! ### `controller` - 扫描控制器
//! - 同一时间只允许一个扫描
//! - 启动 / 停止，维护扫描状态
//!
//! ### `batch_scheduler` - 批次调度器
//! - 收集行、随机倒序、分批、暂停
//! - 模拟失误与补查
//! - 上报结束事件
//!
//! ## 层次关系
//!
//! ```text
//! app (一次运行)
//!     ↓
//! controller (启动 / 停止)
//!     ↓
//! batch_scheduler (处理 Vec<Line>)
//!     ↓
//! workflow::LineFlow (处理单行)
//!     ↓
//! services (能力层：pacing / suspend / reporter)
//!     ↓
//! infrastructure (基础设施：ChatSurface)
//! ```

pub mod app;
pub mod batch_scheduler;
pub mod controller;

// 重新导出主要类型
pub use app::App;
pub use batch_scheduler::{BatchScheduler, ScanEnd, ScanJob, SkippedEntry};
pub use controller::{ScanController, ScanState};
