//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、读取设置、连接浏览器、创建 ChromiumChatPage
//! 2. **启动扫描**：通过 ScanController 启动一次扫描
//! 3. **事件转发**：把扫描事件交给 ControlPanel；Ctrl+C 请求停止
//! 4. **收尾**：写日志文件、导出结果、输出统计
//!
//! 唯一持有 Browser 的模块

use std::pin::pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{ChromiumChatPage, JsExecutor};
use crate::models::{ScanEvent, Settings, SettingsStore};
use crate::observer::{ControlPanel, ExportWriter};
use crate::orchestrator::batch_scheduler::{ScanEnd, ScanJob};
use crate::orchestrator::controller::ScanController;
use crate::services::pacing::RandomPacer;
use crate::services::reporter::ChannelReporter;
use crate::services::suspend::TokioSleeper;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    page: Arc<ChromiumChatPage>,
    settings: Settings,
    controller: ScanController,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        let settings = load_settings(&SettingsStore::new(&config.settings_file)).await;
        logging::log_settings(&settings);

        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            &config.target_url,
            Some(&config.target_title),
        )
        .await
        .context("连接浏览器失败，请确认浏览器已开启远程调试端口")?;

        let page = ChromiumChatPage::new(JsExecutor::new(page), config.page_selectors());

        Ok(Self {
            config,
            _browser: browser,
            page: Arc::new(page),
            settings,
            controller: ScanController::new(),
        })
    }

    /// 运行一次扫描，直到结束或被 Ctrl+C 停止
    pub async fn run(&self) -> Result<ScanEnd> {
        let (reporter, events) = ChannelReporter::channel();

        let job = ScanJob {
            host: Arc::clone(&self.page),
            sleeper: TokioSleeper,
            pacer: Box::new(RandomPacer::from_entropy()),
            reporter: Arc::new(reporter),
            settings: self.settings,
            verification: self.config.verification_options(),
        };

        let mut panel = ControlPanel::new();
        panel.mark_running();

        let handle = self.controller.start(job)?;
        self.forward_events(events, &mut panel).await;

        let end = match handle.await {
            Ok(end) => end,
            Err(e) => {
                error!("扫描任务异常退出: {}", e);
                ScanEnd::Failed(e.to_string())
            }
        };

        if let Err(e) = logging::append_log_lines(&self.config.output_log_file, panel.logs()) {
            warn!("⚠️ 写入日志文件失败: {}", e);
        }

        if panel.can_export() {
            ExportWriter::new(&self.config.export_dir)
                .write_all(panel.results())
                .await?;
        } else {
            info!("没有找到已验证的联系人，不导出文件");
        }

        logging::print_final_stats(&end, panel.results().len(), &self.config.output_log_file);

        Ok(end)
    }

    /// 把事件交给控制面板，直到收到结束事件
    async fn forward_events(
        &self,
        mut events: mpsc::UnboundedReceiver<ScanEvent>,
        panel: &mut ControlPanel,
    ) {
        let mut ctrl_c = pin!(tokio::signal::ctrl_c());
        let mut stop_requested = false;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if panel.apply(event) {
                        break;
                    }
                }
                _ = &mut ctrl_c, if !stop_requested => {
                    stop_requested = true;
                    info!("收到 Ctrl+C，正在停止扫描...");
                    self.controller.stop();
                }
            }
        }
    }
}

/// 读取设置；文件不存在时写入一份默认设置，读取失败时使用默认设置
async fn load_settings(store: &SettingsStore) -> Settings {
    let exists = tokio::fs::try_exists(store.path()).await.unwrap_or(false);

    match store.load().await {
        Ok(settings) => {
            if !exists {
                match store.save(&settings).await {
                    Ok(()) => info!("📝 已生成默认设置文件: {}", store.path().display()),
                    Err(e) => warn!("⚠️ 写入默认设置失败: {}", e),
                }
            }
            settings
        }
        Err(e) => {
            warn!("⚠️ 读取设置失败，使用默认设置: {}", e);
            Settings::default()
        }
    }
}
