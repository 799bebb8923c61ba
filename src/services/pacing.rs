//! 节奏服务 - 业务能力层
//!
//! 只负责"抽取随机数"能力：每行之前的等待、批次大小、批次间暂停、模拟失误、倒序。
//! 随机源由外部注入，测试可以使用固定种子或脚本化的实现

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 每行之前的等待（毫秒，闭区间）
pub const ITEM_DELAY_MIN_MS: u64 = 800;
pub const ITEM_DELAY_MAX_MS: u64 = 2000;

/// 批次大小（闭区间）
pub const BATCH_SIZE_MIN: usize = 25;
pub const BATCH_SIZE_MAX: usize = 35;

/// 批次间暂停：在 [48, 72] 中抽一个整数，再乘以 5 秒，即 4~6 分钟
const PAUSE_STEP_MS: u64 = 5_000;
const PAUSE_STEPS_MIN: u64 = 48;
const PAUSE_STEPS_MAX: u64 = 72;
pub const PAUSE_MIN_MS: u64 = PAUSE_STEPS_MIN * PAUSE_STEP_MS;
pub const PAUSE_MAX_MS: u64 = PAUSE_STEPS_MAX * PAUSE_STEP_MS;

/// 模拟失误概率
pub const SIMULATED_ERROR_RATE: f64 = 0.10;
/// 整体倒序概率（每次扫描只抽一次）
pub const REVERSE_RATE: f64 = 0.30;

/// [min_ms, max_ms] 内均匀分布的时长
pub fn random_duration<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> Duration {
    let (low, high) = if min_ms <= max_ms {
        (min_ms, max_ms)
    } else {
        (max_ms, min_ms)
    };
    Duration::from_millis(rng.gen_range(low..=high))
}

/// [25, 35] 内的批次大小
pub fn random_batch_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(BATCH_SIZE_MIN..=BATCH_SIZE_MAX)
}

/// 4~6 分钟内的暂停时长（5 秒粒度）
pub fn random_pause_duration<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_millis(rng.gen_range(PAUSE_STEPS_MIN..=PAUSE_STEPS_MAX) * PAUSE_STEP_MS)
}

/// 以 10% 的概率返回 true
pub fn should_simulate_error<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(SIMULATED_ERROR_RATE)
}

/// 节奏来源
///
/// 调度器只通过它获取随机决策
pub trait Pacer: Send + Sync {
    /// 每行之前的等待
    fn item_delay(&mut self) -> Duration;
    /// 下一批的大小
    fn batch_size(&mut self) -> usize;
    /// 批次间暂停
    fn batch_pause(&mut self) -> Duration;
    /// 本行是否模拟失误
    fn should_simulate_error(&mut self) -> bool;
    /// 本次扫描是否倒序
    fn should_reverse(&mut self) -> bool;
}

/// 基于随机数生成器的节奏来源
pub struct RandomPacer<R = StdRng> {
    rng: R,
}

impl<R: Rng + Send + Sync> RandomPacer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPacer<StdRng> {
    /// 使用系统熵初始化
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// 使用固定种子初始化
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + Sync> Pacer for RandomPacer<R> {
    fn item_delay(&mut self) -> Duration {
        random_duration(&mut self.rng, ITEM_DELAY_MIN_MS, ITEM_DELAY_MAX_MS)
    }

    fn batch_size(&mut self) -> usize {
        random_batch_size(&mut self.rng)
    }

    fn batch_pause(&mut self) -> Duration {
        random_pause_duration(&mut self.rng)
    }

    fn should_simulate_error(&mut self) -> bool {
        should_simulate_error(&mut self.rng)
    }

    fn should_reverse(&mut self) -> bool {
        self.rng.gen_bool(REVERSE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_delay_stays_in_bounds() {
        let mut pacer = RandomPacer::seeded(7);
        let mut seen_min = u64::MAX;
        let mut seen_max = 0;
        for _ in 0..20_000 {
            let ms = pacer.item_delay().as_millis() as u64;
            assert!((ITEM_DELAY_MIN_MS..=ITEM_DELAY_MAX_MS).contains(&ms));
            seen_min = seen_min.min(ms);
            seen_max = seen_max.max(ms);
        }
        // 两端都可以取到
        assert_eq!(seen_min, ITEM_DELAY_MIN_MS);
        assert_eq!(seen_max, ITEM_DELAY_MAX_MS);
    }

    #[test]
    fn batch_size_covers_whole_range() {
        let mut pacer = RandomPacer::seeded(11);
        let mut seen = [false; BATCH_SIZE_MAX - BATCH_SIZE_MIN + 1];
        for _ in 0..5_000 {
            let size = pacer.batch_size();
            assert!((BATCH_SIZE_MIN..=BATCH_SIZE_MAX).contains(&size));
            seen[size - BATCH_SIZE_MIN] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn pause_is_between_four_and_six_minutes_on_a_five_second_grid() {
        let mut pacer = RandomPacer::seeded(3);
        for _ in 0..5_000 {
            let ms = pacer.batch_pause().as_millis() as u64;
            assert!((PAUSE_MIN_MS..=PAUSE_MAX_MS).contains(&ms));
            assert_eq!(ms % PAUSE_STEP_MS, 0);
        }
        assert_eq!(PAUSE_MIN_MS, 4 * 60_000);
        assert_eq!(PAUSE_MAX_MS, 6 * 60_000);
    }

    #[test]
    fn simulated_error_rate_is_about_ten_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 100_000;
        let hits = (0..draws).filter(|_| should_simulate_error(&mut rng)).count();
        let rate = hits as f64 / draws as f64;
        assert!((rate - SIMULATED_ERROR_RATE).abs() < 0.005, "rate = {}", rate);
    }

    #[test]
    fn reverse_rate_is_about_thirty_percent() {
        let mut pacer = RandomPacer::seeded(99);
        let draws = 50_000;
        let hits = (0..draws).filter(|_| pacer.should_reverse()).count();
        let rate = hits as f64 / draws as f64;
        assert!((rate - REVERSE_RATE).abs() < 0.01, "rate = {}", rate);
    }

    #[test]
    fn random_duration_accepts_swapped_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let d = random_duration(&mut rng, 50, 10);
            assert!((10..=50).contains(&(d.as_millis() as u64)));
        }
        assert_eq!(random_duration(&mut rng, 5, 5), Duration::from_millis(5));
    }
}
