//! # Last Message Checker
//!
//! 检查聊天中最后一条消息里的每一行：提取备注名和号码，点击号码并确认其已验证
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构，外加一个观察者：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `ChatSurface` - 核心唯一依赖的页面抽象
//! - `ChromiumChatPage` - 基于 JsExecutor 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Pacer` - 随机等待、批次大小、模拟失误
//! - `Suspender` - 可取消的等待与轮询
//! - `Reporter` - 向观察者发送事件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一行"的完整处理流程
//! - `LineCtx` - 上下文封装（位置 + 首轮/补查）
//! - `LineFlow` - 流程编排（提取 → 点击 → 验证）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_scheduler` - 分批、暂停、补查
//! - `orchestrator/controller` - 启动 / 停止
//! - `orchestrator/app` - 应用入口
//!
//! ### 观察者（Observer）
//! - `observer/` - 控制面板和结果导出，只消费事件

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod observer;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{ControlError, HostError, ScanError, ScanResult, VerificationFailure};
pub use infrastructure::{ChatSurface, ChromiumChatPage, JsExecutor};
pub use models::{Contact, LineOutcome, ScanEvent, ScanSummary, Settings};
pub use observer::{ControlPanel, ExportWriter};
pub use orchestrator::{App, ScanController, ScanEnd, ScanJob, ScanState};
pub use workflow::{LineCtx, LineFlow, VerificationOptions};
