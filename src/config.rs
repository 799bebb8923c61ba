use std::time::Duration;

use crate::infrastructure::PageSelectors;
use crate::services::suspend::PollOptions;
use crate::workflow::VerificationOptions;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 目标URL
    pub target_url: String,
    /// 目标页面标题
    pub target_title: String,
    // --- 页面选择器 ---
    pub message_row_selector: String,
    pub line_selector: String,
    pub surface_selector: String,
    pub surface_item_selector: String,
    /// 验证面板子项数量等于该值时视为已验证
    pub verified_item_count: usize,
    // --- 轮询 ---
    pub poll_interval_ms: u64,
    /// 等待验证面板的最长时间，0 表示一直等待
    pub verification_timeout_secs: u64,
    // --- 文件 ---
    pub settings_file: String,
    pub export_dir: String,
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://web.whatsapp.com".to_string(),
            target_title: "WhatsApp".to_string(),
            message_row_selector: r#"div[role="row"]"#.to_string(),
            line_selector: "span.x1lliihq".to_string(),
            surface_selector: r#"span > div[role="application"]"#.to_string(),
            surface_item_selector: "li".to_string(),
            verified_item_count: 2,
            poll_interval_ms: 100,
            verification_timeout_secs: 30,
            settings_file: "settings.toml".to_string(),
            export_dir: "output".to_string(),
            output_log_file: "scan_log.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT").unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            target_title: std::env::var("TARGET_TITLE").unwrap_or(default.target_title),
            message_row_selector: std::env::var("MESSAGE_ROW_SELECTOR").unwrap_or(default.message_row_selector),
            line_selector: std::env::var("LINE_SELECTOR").unwrap_or(default.line_selector),
            surface_selector: std::env::var("SURFACE_SELECTOR").unwrap_or(default.surface_selector),
            surface_item_selector: std::env::var("SURFACE_ITEM_SELECTOR").unwrap_or(default.surface_item_selector),
            verified_item_count: env_parse("VERIFIED_ITEM_COUNT").unwrap_or(default.verified_item_count),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS").unwrap_or(default.poll_interval_ms),
            verification_timeout_secs: env_parse("VERIFICATION_TIMEOUT_SECS").unwrap_or(default.verification_timeout_secs),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(default.export_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        }
    }

    /// 页面选择器
    pub fn page_selectors(&self) -> PageSelectors {
        PageSelectors {
            message_row: self.message_row_selector.clone(),
            line: self.line_selector.clone(),
        }
    }

    /// 验证面板参数
    pub fn verification_options(&self) -> VerificationOptions {
        let timeout = match self.verification_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        VerificationOptions {
            surface_locator: self.surface_selector.clone(),
            item_locator: self.surface_item_selector.clone(),
            verified_item_count: self.verified_item_count,
            poll: PollOptions {
                interval: Duration::from_millis(self.poll_interval_ms),
                timeout,
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
