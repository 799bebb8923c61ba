//! 结果导出 - 观察者
//!
//! 只负责把找到的联系人写成 JSON / CSV / 剪贴板文本，不关心扫描流程

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use crate::models::Contact;

pub const JSON_FILE_NAME: &str = "whatsapp_users.json";
pub const CSV_FILE_NAME: &str = "whatsapp_users.csv";
pub const CLIPBOARD_FILE_NAME: &str = "whatsapp_users.txt";

/// JSON 数组，字段为 Reference / Number
pub fn to_json(contacts: &[Contact]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(contacts)
}

/// CSV，两列都加引号，内部引号加倍
pub fn to_csv(contacts: &[Contact]) -> Result<String> {
    let mut builder = WriterBuilder::new();
    builder.quote_style(QuoteStyle::Always);
    render(contacts, b"Reference,Number\n", &builder)
}

/// 制表符分隔的文本，用于粘贴到表格
///
/// 含制表符、换行或引号的字段会被加引号，保证一个联系人只占一行两列
pub fn to_clipboard_text(contacts: &[Contact]) -> Result<String> {
    let mut builder = WriterBuilder::new();
    builder.delimiter(b'\t');
    render(contacts, b"Reference\tNumber\n", &builder)
}

/// 表头原样写入，之后每个联系人一条记录
fn render(contacts: &[Contact], header: &[u8], builder: &WriterBuilder) -> Result<String> {
    let mut writer = builder.from_writer(header.to_vec());
    for contact in contacts {
        writer.write_record([contact.name.as_str(), contact.identifier.as_str()])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// 导出写入服务
///
/// 职责：
/// - 把结果写入导出目录
/// - 没有结果时不写任何文件
pub struct ExportWriter {
    export_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// 写入 JSON、CSV 和剪贴板文本，返回写入的文件路径
    pub async fn write_all(&self, contacts: &[Contact]) -> Result<Vec<PathBuf>> {
        if contacts.is_empty() {
            debug!("没有结果，跳过导出");
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.export_dir)
            .await
            .with_context(|| format!("无法创建导出目录: {}", self.export_dir.display()))?;

        let outputs = [
            (JSON_FILE_NAME, to_json(contacts)?),
            (CSV_FILE_NAME, to_csv(contacts)?),
            (CLIPBOARD_FILE_NAME, to_clipboard_text(contacts)?),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (file_name, content) in outputs {
            let path = self.export_dir.join(file_name);
            fs::write(&path, content)
                .await
                .with_context(|| format!("无法写入文件: {}", path.display()))?;
            info!("💾 已导出: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
