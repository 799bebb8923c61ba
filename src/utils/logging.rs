use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、日志文件和统计输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::Settings;
use crate::orchestrator::ScanEnd;

/// 初始化 tracing
///
/// 默认 info 级别，`verbose` 时为 debug；`RUST_LOG` 优先
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n号码检查日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加面板日志到日志文件
pub fn append_log_lines(log_file_path: &str, lines: &[String]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    for line in lines {
        writeln!(file, "{}", line)?;
    }

    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 最后一条消息号码检查");
    info!("🌐 目标页面: {}", config.target_url);
    match config.verification_timeout_secs {
        0 => info!("⏱️ 验证面板等待: 不限时"),
        secs => info!("⏱️ 验证面板等待: 最长 {} 秒", secs),
    }
    info!("{}", "=".repeat(60));
}

/// 记录本次扫描使用的开关
pub fn log_settings(settings: &Settings) {
    info!(
        "⚙️ 设置: 随机等待={} 分批={} 批间暂停={} 模拟失误={} 随机倒序={}",
        settings.random_delay,
        settings.batch_processing,
        settings.pause_between_batches,
        settings.simulate_errors,
        settings.random_order
    );
}

/// 打印最终统计信息
pub fn print_final_stats(end: &ScanEnd, contacts: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 扫描结束统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match end {
        ScanEnd::Completed(summary) => {
            info!("✅ 共 {} 行 ({} 批)", summary.total_lines, summary.batches);
            info!("👤 已验证: {}", summary.found);
            info!("❔ 未验证: {}", summary.not_verified);
            info!("➖ 无联系人: {}", summary.no_contact);
            info!("⚠️ 验证失败: {}", summary.verification_failed);
            info!("🔁 补查: {}", summary.retried);
        }
        ScanEnd::Stopped => info!("⏹ 扫描被停止"),
        ScanEnd::Failed(message) => info!("❌ 扫描失败: {}", message),
    }
    info!("📇 结果列表: {} 个联系人", contacts);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
