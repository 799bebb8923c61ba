use anyhow::Result;
use last_message_checker::utils::logging;
use last_message_checker::{App, Config, ScanEnd};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    if let ScanEnd::Failed(message) = app.run().await? {
        anyhow::bail!(message);
    }

    Ok(())
}
