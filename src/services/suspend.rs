//! 挂起服务 - 业务能力层
//!
//! 提供两个挂起点：固定时长等待、轮询等待元素出现。
//! 两者都会在每次挂起前检查停止信号

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{HostResult, ScanError, ScanResult};

/// 时钟
///
/// 生产环境用 tokio 计时器，测试可以换成立即返回的实现
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// 当前时刻，轮询超时按它计算
    fn now(&self) -> Instant;
}

/// tokio 计时器
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 轮询参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// 轮询间隔
    pub interval: Duration,
    /// 最长等待时间，`None` 表示一直等待
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// 轮询结果
#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// 元素已出现
    Present(T),
    /// 超时，附带已等待的时长
    TimedOut(Duration),
}

/// 可取消的挂起点
pub struct Suspender<S> {
    sleeper: S,
    cancel: watch::Receiver<bool>,
}

impl<S: Sleeper> Suspender<S> {
    pub fn new(sleeper: S, cancel: watch::Receiver<bool>) -> Self {
        Self { sleeper, cancel }
    }

    /// 是否已收到停止信号
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// 不挂起，只检查停止信号
    pub fn checkpoint(&self) -> ScanResult<()> {
        if self.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 挂起指定时长，期间收到停止信号会立即返回 `Cancelled`
    pub async fn wait_for(&self, duration: Duration) -> ScanResult<()> {
        self.checkpoint()?;

        let mut cancel = self.cancel.clone();
        tokio::select! {
            _ = self.sleeper.sleep(duration) => Ok(()),
            _ = cancelled(&mut cancel) => Err(ScanError::Cancelled),
        }
    }

    /// 按 `options.interval` 轮询 `probe`，直到它返回 `Some`
    ///
    /// 每次轮询前检查停止信号；从开始计时（包括 `probe` 自身的耗时）超过
    /// `options.timeout` 返回 `TimedOut`。`probe` 的错误原样返回（包装为 `ScanError::Host`）
    pub async fn wait_until_present<T, F, Fut>(
        &self,
        options: &PollOptions,
        mut probe: F,
    ) -> ScanResult<WaitOutcome<T>>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = HostResult<Option<T>>> + Send,
        T: Send,
    {
        let interval = options.interval.max(Duration::from_millis(1));
        let started = self.sleeper.now();

        loop {
            self.checkpoint()?;

            if let Some(found) = probe().await? {
                return Ok(WaitOutcome::Present(found));
            }

            if let Some(limit) = options.timeout {
                let waited = self.sleeper.now().saturating_duration_since(started);
                if waited >= limit {
                    debug!("轮询超时，已等待 {:?}", waited);
                    return Ok(WaitOutcome::TimedOut(waited));
                }
            }

            self.wait_for(interval).await?;
        }
    }
}

/// 等待停止信号；发送端被丢弃时永远挂起
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let signalled = cancel.wait_for(|stop| *stop).await.is_ok();
    if !signalled {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// 立即返回的虚拟时钟
    ///
    /// `total_ms` 只累计等待时长，`elapsed_ms` 还包括模拟的页面查询耗时
    #[derive(Clone)]
    struct CountingSleeper {
        origin: Instant,
        total_ms: Arc<AtomicUsize>,
        elapsed_ms: Arc<AtomicUsize>,
    }

    impl Default for CountingSleeper {
        fn default() -> Self {
            Self {
                origin: Instant::now(),
                total_ms: Arc::default(),
                elapsed_ms: Arc::default(),
            }
        }
    }

    impl CountingSleeper {
        /// 时钟前进但不算作等待
        fn advance(&self, ms: usize) {
            self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Sleeper for CountingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            let ms = duration.as_millis() as usize;
            self.total_ms.fetch_add(ms, Ordering::SeqCst);
            self.advance(ms);
            std::future::ready(())
        }

        fn now(&self) -> Instant {
            self.origin + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst) as u64)
        }
    }

    fn options(timeout_ms: Option<u64>) -> PollOptions {
        PollOptions {
            interval: Duration::from_millis(100),
            timeout: timeout_ms.map(Duration::from_millis),
        }
    }

    #[test]
    fn resolves_once_probe_finds_element() {
        let (_tx, rx) = watch::channel(false);
        let sleeper = CountingSleeper::default();
        let suspender = Suspender::new(sleeper.clone(), rx);
        let polls = AtomicUsize::new(0);

        let outcome = tokio_test::block_on(suspender.wait_until_present(&options(None), || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, HostError>(if n == 3 { Some("surface") } else { None }) }
        }))
        .unwrap();

        assert_eq!(outcome, WaitOutcome::Present("surface"));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.total_ms.load(Ordering::SeqCst), 300);
    }

    #[test]
    fn times_out_after_deadline() {
        let (_tx, rx) = watch::channel(false);
        let suspender = Suspender::new(CountingSleeper::default(), rx);

        let outcome = tokio_test::block_on(
            suspender.wait_until_present(&options(Some(1_000)), || async { Ok::<_, HostError>(None::<()>) }),
        )
        .unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut(Duration::from_millis(1_000)));
    }

    #[test]
    fn slow_probes_count_towards_the_deadline() {
        let (_tx, rx) = watch::channel(false);
        let sleeper = CountingSleeper::default();
        let suspender = Suspender::new(sleeper.clone(), rx);
        let polls = AtomicUsize::new(0);

        // 每次查询耗时 200ms，间隔 100ms：第 4 次查询后已过 1100ms
        let outcome = tokio_test::block_on(suspender.wait_until_present(&options(Some(1_000)), || {
            polls.fetch_add(1, Ordering::SeqCst);
            sleeper.advance(200);
            async { Ok::<_, HostError>(None::<()>) }
        }))
        .unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut(Duration::from_millis(1_100)));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.total_ms.load(Ordering::SeqCst), 300);
    }

    #[test]
    fn stop_signal_is_seen_on_next_poll_tick() {
        let (tx, rx) = watch::channel(false);
        let suspender = Suspender::new(CountingSleeper::default(), rx);
        let polls = AtomicUsize::new(0);

        let result = tokio_test::block_on(suspender.wait_until_present(&options(None), || {
            if polls.fetch_add(1, Ordering::SeqCst) == 2 {
                let _ = tx.send(true);
            }
            async { Ok::<_, HostError>(None::<()>) }
        }));

        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn probe_error_is_returned_as_host_error() {
        let (_tx, rx) = watch::channel(false);
        let suspender = Suspender::new(CountingSleeper::default(), rx);

        let result = tokio_test::block_on(suspender.wait_until_present(&options(None), || async {
            Err::<Option<()>, _>(HostError::Script("boom".into()))
        }));

        assert!(matches!(result, Err(ScanError::Host(_))));
    }

    #[tokio::test]
    async fn wait_for_returns_cancelled_when_already_stopped() {
        let (tx, rx) = watch::channel(false);
        let sleeper = CountingSleeper::default();
        let suspender = Suspender::new(sleeper.clone(), rx);

        suspender.wait_for(Duration::from_millis(500)).await.unwrap();
        tx.send(true).unwrap();
        let result = suspender.wait_for(Duration::from_millis(500)).await;

        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(sleeper.total_ms.load(Ordering::SeqCst), 500);
    }

    #[tokio::test]
    async fn wait_for_is_interrupted_by_stop() {
        let (tx, rx) = watch::channel(false);
        let suspender = Suspender::new(TokioSleeper, rx);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
            tx
        });

        let started = std::time::Instant::now();
        let result = suspender.wait_for(Duration::from_secs(60)).await;
        let _tx = stopper.await.unwrap();

        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
