use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 检查点命中统计
#[derive(Clone)]
pub struct CheckpointMonitor {
    metrics: Arc<CheckpointMetrics>,
}

#[derive(Default)]
pub struct CheckpointMetrics {
    /// 产物已存在、跳过计算的次数
    pub hits: AtomicUsize,
    /// 产物缺失、需要重新计算的次数
    pub misses: AtomicUsize,
    pub writes: AtomicUsize,
    pub errors: AtomicUsize,
    /// 按阶段统计 (命中, 未命中)
    pub stage_metrics: std::sync::RwLock<BTreeMap<String, (usize, usize)>>,
}

/// 检查点统计报告
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckpointReport {
    pub hit_rate: f64,
    pub hits: usize,
    pub misses: usize,
    pub writes: usize,
    pub errors: usize,
    /// 阶段名 -> (命中, 未命中)
    pub stage_stats: BTreeMap<String, (usize, usize)>,
}

impl CheckpointMonitor {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(CheckpointMetrics::default()),
        }
    }

    /// 记录检查点命中
    pub fn record_hit(&self, stage: &str) {
        self.metrics.hits.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut stage_map) = self.metrics.stage_metrics.write() {
            stage_map.entry(stage.to_string()).or_default().0 += 1;
        }
        tracing::info!("   💰 检查点命中 [{}] - 跳过该阶段", stage);
    }

    /// 记录检查点未命中
    pub fn record_miss(&self, stage: &str) {
        self.metrics.misses.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut stage_map) = self.metrics.stage_metrics.write() {
            stage_map.entry(stage.to_string()).or_default().1 += 1;
        }
        tracing::debug!("   ⌛ 检查点未命中 [{}] - 需要重新生成", stage);
    }

    /// 记录产物写入
    pub fn record_write(&self, stage: &str) {
        self.metrics.writes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("   💾 产物写入 [{}]", stage);
    }

    /// 记录读写错误
    pub fn record_error(&self, stage: &str, error: &str) {
        self.metrics.errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!("   ❌ 检查点错误 [{}]: {}", stage, error);
    }

    /// 生成统计报告
    pub fn generate_report(&self) -> CheckpointReport {
        let hits = self.metrics.hits.load(Ordering::Relaxed);
        let misses = self.metrics.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        let stage_stats = self
            .metrics
            .stage_metrics
            .read()
            .map(|stage_map| stage_map.clone())
            .unwrap_or_default();

        CheckpointReport {
            hit_rate,
            hits,
            misses,
            writes: self.metrics.writes.load(Ordering::Relaxed),
            errors: self.metrics.errors.load(Ordering::Relaxed),
            stage_stats,
        }
    }
}

impl Default for CheckpointMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CheckpointReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "检查点命中率: {:.1}% (命中 {} / 未命中 {} / 写入 {} / 错误 {})",
            self.hit_rate * 100.0,
            self.hits,
            self.misses,
            self.writes,
            self.errors
        )?;
        for (stage, (hits, misses)) in &self.stage_stats {
            writeln!(f, "- {}: 命中 {}, 未命中 {}", stage, hits, misses)?;
        }
        Ok(())
    }
}
