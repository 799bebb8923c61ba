use crate::error::SettingsError;
use crate::models::settings::Settings;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 设置文件存储
///
/// 以 TOML 保存五个开关；文件不存在时返回默认值
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取设置，文件中的值覆盖默认值
    pub async fn load(&self) -> Result<Settings, SettingsError> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            tracing::debug!("设置文件不存在，使用默认设置: {}", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| SettingsError::Read {
                path: self.path.display().to_string(),
                source,
            })?;

        parse_settings(&content).map_err(|source| SettingsError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// 保存设置
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(settings)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| SettingsError::Write {
                        path: parent.display().to_string(),
                        source,
                    })?;
            }
        }

        fs::write(&self.path, content)
            .await
            .map_err(|source| SettingsError::Write {
                path: self.path.display().to_string(),
                source,
            })?;

        tracing::info!("设置已保存: {}", self.path.display());
        Ok(())
    }
}

/// 解析 TOML 设置内容
pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}
