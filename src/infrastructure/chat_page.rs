//! Chromium 聊天页面 - 基础设施层
//!
//! 通过 `JsExecutor` 在真实页面上实现 `ChatSurface`。
//! 行和验证面板用 data 属性打标记，之后的查询都按标记定位

use serde::Deserialize;
use tracing::debug;

use crate::error::{HostError, HostResult};
use crate::infrastructure::surface::ChatSurface;
use crate::infrastructure::JsExecutor;
use crate::models::{LastMessage, LineContent};

const LINE_MARKER: &str = "data-lmc-line";
const SURFACE_MARKER: &str = "data-lmc-surface";

/// 页面选择器
#[derive(Debug, Clone)]
pub struct PageSelectors {
    /// 消息行（每条消息一个）
    pub message_row: String,
    /// 消息中的文本行
    pub line: String,
}

/// 最后一条消息中的一行（按标记序号定位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLine {
    pub index: usize,
}

/// 已打标记的验证面板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceHandle(pub String);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineCounts {
    message_count: usize,
    line_count: usize,
}

/// Chromium 聊天页面
pub struct ChromiumChatPage {
    executor: JsExecutor,
    selectors: PageSelectors,
}

impl ChromiumChatPage {
    pub fn new(executor: JsExecutor, selectors: PageSelectors) -> Self {
        Self {
            executor,
            selectors,
        }
    }

    fn line_query(line: &ChatLine) -> HostResult<String> {
        Ok(serde_json::to_string(&format!(
            "[{}=\"{}\"]",
            LINE_MARKER, line.index
        ))?)
    }
}

impl ChatSurface for ChromiumChatPage {
    type Line = ChatLine;
    type Element = SurfaceHandle;

    async fn collect_lines(&self) -> HostResult<LastMessage<ChatLine>> {
        let js_code = format!(
            r#"
            (() => {{
                const rows = document.querySelectorAll({row});
                if (rows.length === 0) {{
                    return {{ messageCount: 0, lineCount: 0 }};
                }}
                document.querySelectorAll('[{marker}]').forEach(el => el.removeAttribute('{marker}'));
                const last = rows[rows.length - 1];
                const spans = last.querySelectorAll({line});
                spans.forEach((el, i) => el.setAttribute('{marker}', String(i)));
                return {{ messageCount: rows.length, lineCount: spans.length }};
            }})()
            "#,
            row = serde_json::to_string(&self.selectors.message_row)?,
            line = serde_json::to_string(&self.selectors.line)?,
            marker = LINE_MARKER,
        );

        let counts: LineCounts = self.executor.eval_as(js_code).await?;
        debug!(
            "消息数: {}, 最后一条消息行数: {}",
            counts.message_count, counts.line_count
        );

        Ok(LastMessage {
            message_count: counts.message_count,
            lines: (0..counts.line_count).map(|index| ChatLine { index }).collect(),
        })
    }

    async fn inspect_line(&self, line: &ChatLine) -> HostResult<LineContent> {
        let js_code = format!(
            r#"
            (() => {{
                const line = document.querySelector({query});
                if (!line) {{
                    return null;
                }}
                const links = Array.from(line.querySelectorAll('a'));
                return {{
                    links: links.map(a => a.textContent || ''),
                    nodes: Array.from(line.childNodes).map(node => {{
                        const idx = links.indexOf(node);
                        return {{ text: node.textContent, link: idx >= 0 ? idx : null }};
                    }})
                }};
            }})()
            "#,
            query = Self::line_query(line)?,
        );

        let content: Option<LineContent> = self.executor.eval_as(js_code).await?;
        content.ok_or_else(|| HostError::Detached(format!("第 {} 行", line.index + 1)))
    }

    async fn activate_link(&self, line: &ChatLine, link: usize) -> HostResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const line = document.querySelector({query});
                if (!line) {{
                    return false;
                }}
                const link = line.querySelectorAll('a')[{link}];
                if (!link) {{
                    return false;
                }}
                link.click();
                return true;
            }})()
            "#,
            query = Self::line_query(line)?,
            link = link,
        );

        let clicked: bool = self.executor.eval_as(js_code).await?;
        if clicked {
            Ok(())
        } else {
            Err(HostError::MissingLink { link })
        }
    }

    async fn find_element(&self, locator: &str) -> HostResult<Option<SurfaceHandle>> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({locator});
                if (!el) {{
                    return null;
                }}
                let id = el.getAttribute('{marker}');
                if (!id) {{
                    window.__lmcSurfaceSeq = (window.__lmcSurfaceSeq || 0) + 1;
                    id = String(window.__lmcSurfaceSeq);
                    el.setAttribute('{marker}', id);
                }}
                return id;
            }})()
            "#,
            locator = serde_json::to_string(locator)?,
            marker = SURFACE_MARKER,
        );

        let id: Option<String> = self.executor.eval_as(js_code).await?;
        Ok(id.map(SurfaceHandle))
    }

    async fn count_sub_items(&self, element: &SurfaceHandle, item_locator: &str) -> HostResult<usize> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({query});
                if (!el) {{
                    return null;
                }}
                return el.querySelectorAll({item}).length;
            }})()
            "#,
            query = serde_json::to_string(&format!("[{}=\"{}\"]", SURFACE_MARKER, element.0))?,
            item = serde_json::to_string(item_locator)?,
        );

        let count: Option<usize> = self.executor.eval_as(js_code).await?;
        count.ok_or_else(|| HostError::Detached(format!("验证面板 #{}", element.0)))
    }
}
