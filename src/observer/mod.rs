//! 观察者
//!
//! 不属于核心：消费扫描事件，维护结果列表并导出

pub mod control_panel;
pub mod export;

pub use control_panel::{ControlPanel, PanelStatus};
pub use export::ExportWriter;
