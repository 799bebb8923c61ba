//! 集成测试公共工具：内存中的聊天页面、立即返回的时钟和可控的节奏来源

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use last_message_checker::error::{HostError, HostResult};
use last_message_checker::infrastructure::ChatSurface;
use last_message_checker::models::{LastMessage, LineContent, LineNode, ScanEvent, Settings};
use last_message_checker::orchestrator::{BatchScheduler, ScanEnd, ScanJob};
use last_message_checker::services::{ChannelReporter, Pacer, PollOptions, Sleeper};
use last_message_checker::VerificationOptions;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

pub const SURFACE: &str = "verification-surface";
pub const ITEM: &str = "li";

/// 点击号码后验证面板的表现
#[derive(Debug, Clone, Copy)]
pub enum Surface {
    /// 面板出现，包含 n 个子项
    Items(usize),
    /// 轮询 k 次后出现
    AppearsAfter { polls: usize, items: usize },
    /// 面板永远不出现
    Never,
    /// 查询面板时页面报错
    Broken,
}

#[derive(Debug, Clone)]
pub struct FakeLine {
    pub content: LineContent,
    pub surface: Surface,
}

impl FakeLine {
    /// 备注名 + 号码链接
    pub fn contact(name: &str, number: &str, surface: Surface) -> Self {
        Self {
            content: LineContent {
                links: vec![number.to_string()],
                nodes: vec![LineNode::text(format!("{} ", name)), LineNode::link(number, 0)],
            },
            surface,
        }
    }

    /// 没有链接的纯文本行
    pub fn plain(text: &str) -> Self {
        Self {
            content: LineContent {
                links: Vec::new(),
                nodes: vec![LineNode::text(text)],
            },
            surface: Surface::Never,
        }
    }
}

type InspectHook = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
struct PageLog {
    inspected: Vec<usize>,
    clicked: Vec<usize>,
    active: Option<usize>,
    polls: usize,
}

/// 内存中的聊天页面
pub struct FakeChatPage {
    message_count: usize,
    lines: Vec<FakeLine>,
    log: Mutex<PageLog>,
    on_inspect: Option<InspectHook>,
}

impl FakeChatPage {
    pub fn new(lines: Vec<FakeLine>) -> Self {
        Self {
            message_count: if lines.is_empty() { 0 } else { 3 },
            lines,
            log: Mutex::new(PageLog::default()),
            on_inspect: None,
        }
    }

    /// 聊天中有消息，但最后一条消息里没有行
    pub fn with_empty_last_message() -> Self {
        Self {
            message_count: 1,
            ..Self::new(Vec::new())
        }
    }

    /// 每次读取行内容之前调用，参数为已读取的行数（从 1 开始）
    pub fn on_inspect(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_inspect = Some(Box::new(hook));
        self
    }

    /// 按调用顺序读取过的行（页面序号，从 0 开始）
    pub fn inspected(&self) -> Vec<usize> {
        self.log.lock().unwrap().inspected.clone()
    }

    pub fn clicked(&self) -> Vec<usize> {
        self.log.lock().unwrap().clicked.clone()
    }
}

impl ChatSurface for FakeChatPage {
    type Line = usize;
    type Element = usize;

    fn collect_lines(&self) -> impl Future<Output = HostResult<LastMessage<usize>>> + Send {
        std::future::ready(Ok(LastMessage {
            message_count: self.message_count,
            lines: (0..self.lines.len()).collect(),
        }))
    }

    fn inspect_line(&self, line: &usize) -> impl Future<Output = HostResult<LineContent>> + Send {
        let count = {
            let mut log = self.log.lock().unwrap();
            log.inspected.push(*line);
            log.inspected.len()
        };
        if let Some(hook) = &self.on_inspect {
            hook(count);
        }
        std::future::ready(Ok(self.lines[*line].content.clone()))
    }

    fn activate_link(&self, line: &usize, link: usize) -> impl Future<Output = HostResult<()>> + Send {
        let result = if link < self.lines[*line].content.links.len() {
            let mut log = self.log.lock().unwrap();
            log.clicked.push(*line);
            log.active = Some(*line);
            log.polls = 0;
            Ok(())
        } else {
            Err(HostError::MissingLink { link })
        };
        std::future::ready(result)
    }

    fn find_element(&self, locator: &str) -> impl Future<Output = HostResult<Option<usize>>> + Send {
        let result = if locator != SURFACE {
            Ok(None)
        } else {
            let mut log = self.log.lock().unwrap();
            log.polls += 1;
            match log.active.map(|line| (line, self.lines[line].surface)) {
                None => Ok(None),
                Some((_, Surface::Never)) => Ok(None),
                Some((_, Surface::Broken)) => Err(HostError::Script("surface query failed".into())),
                Some((_, Surface::AppearsAfter { polls, .. })) if log.polls <= polls => Ok(None),
                Some((line, _)) => Ok(Some(line)),
            }
        };
        std::future::ready(result)
    }

    fn count_sub_items(
        &self,
        element: &usize,
        item_locator: &str,
    ) -> impl Future<Output = HostResult<usize>> + Send {
        let count = match (item_locator, self.lines[*element].surface) {
            (ITEM, Surface::Items(n)) | (ITEM, Surface::AppearsAfter { items: n, .. }) => n,
            _ => 0,
        };
        std::future::ready(Ok(count))
    }
}

/// 立即返回并记录每次等待时长的时钟
///
/// 时间只随等待前进
#[derive(Clone)]
pub struct RecordingSleeper {
    origin: Instant,
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl Default for RecordingSleeper {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            slept: Arc::default(),
        }
    }
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.slept.lock().unwrap().push(duration);
        std::future::ready(())
    }

    fn now(&self) -> Instant {
        self.origin + self.slept.lock().unwrap().iter().sum::<Duration>()
    }
}

/// 预先写好决策的节奏来源
///
/// `skip` 中的数字是首轮第几次访问（从 1 开始）被模拟失误跳过
#[derive(Clone)]
pub struct ScriptedPacer {
    pub delay: Duration,
    pub pause: Duration,
    pub batch_sizes: VecDeque<usize>,
    pub skip: HashSet<usize>,
    pub reverse: bool,
    error_draws: usize,
}

impl ScriptedPacer {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1_000),
            pause: Duration::from_secs(300),
            batch_sizes: VecDeque::from([30]),
            skip: HashSet::new(),
            reverse: false,
            error_draws: 0,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn batches(mut self, sizes: &[usize]) -> Self {
        self.batch_sizes = sizes.iter().copied().collect();
        self
    }

    pub fn skipping(mut self, draws: &[usize]) -> Self {
        self.skip = draws.iter().copied().collect();
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

impl Pacer for ScriptedPacer {
    fn item_delay(&mut self) -> Duration {
        self.delay
    }

    fn batch_size(&mut self) -> usize {
        if self.batch_sizes.len() > 1 {
            self.batch_sizes.pop_front().unwrap_or(30)
        } else {
            self.batch_sizes.front().copied().unwrap_or(30)
        }
    }

    fn batch_pause(&mut self) -> Duration {
        self.pause
    }

    fn should_simulate_error(&mut self) -> bool {
        self.error_draws += 1;
        self.skip.contains(&self.error_draws)
    }

    fn should_reverse(&mut self) -> bool {
        self.reverse
    }
}

pub fn verification() -> VerificationOptions {
    VerificationOptions {
        surface_locator: SURFACE.to_string(),
        item_locator: ITEM.to_string(),
        verified_item_count: 2,
        poll: PollOptions {
            interval: Duration::from_millis(100),
            timeout: Some(Duration::from_secs(1)),
        },
    }
}

/// 一次扫描的结果
pub struct Run {
    pub end: ScanEnd,
    pub events: Vec<ScanEvent>,
}

impl Run {
    pub fn logs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Log(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn found(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::FoundUser(c) => Some((c.name.as_str(), c.identifier.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn terminal(&self) -> Vec<&ScanEvent> {
        self.events.iter().filter(|e| e.is_terminal()).collect()
    }
}

pub fn drain(mut rx: mpsc::UnboundedReceiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// 用给定的页面、节奏和设置跑一次扫描
pub async fn run_scan(
    page: Arc<FakeChatPage>,
    sleeper: RecordingSleeper,
    pacer: ScriptedPacer,
    settings: Settings,
    cancel: watch::Receiver<bool>,
) -> Run {
    let (reporter, rx) = ChannelReporter::channel();
    let job = ScanJob {
        host: page,
        sleeper,
        pacer: Box::new(pacer),
        reporter: Arc::new(reporter),
        settings,
        verification: verification(),
    };

    let end = BatchScheduler::new(job, cancel).run().await;
    Run {
        end,
        events: drain(rx),
    }
}

/// 不会被停止的扫描
pub async fn scan(
    page: Arc<FakeChatPage>,
    sleeper: RecordingSleeper,
    pacer: ScriptedPacer,
    settings: Settings,
) -> Run {
    let (_tx, rx) = watch::channel(false);
    run_scan(page, sleeper, pacer, settings, rx).await
}
