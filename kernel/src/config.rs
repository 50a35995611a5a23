//! Compile-time configuration
//!
//! Все лимиты фиксированы при сборке — никакой динамической памяти.
//! All limits are fixed at build time — no dynamic allocation.

use crate::sched::Level;

/// Размер арены процессов / Process arena size.
pub const NPROC: usize = 64;

/// Длина имени процесса (только для диагностики).
/// Process name length (diagnostics only).
pub const PROC_NAME_LEN: usize = 16;

/// Параметры MLFQ / MLFQ tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlfqConfig {
    /// Квант каждого уровня в тиках: после него L0→L1, L1→L2,
    /// а на L2 — минус один приоритет.
    /// Per-level quantum in ticks: L0→L1, L1→L2, and on L2 a priority decay.
    pub quantum:        [u32; Level::COUNT],
    /// Период boost'а в глобальных тиках / Boost period in global ticks.
    pub boost_interval: u64,
    /// Единственное ядро, которое двигает глобальный счётчик.
    /// The only core allowed to advance the global counter.
    pub tick_cpu:       usize,
}

impl MlfqConfig {
    pub const DEFAULT: Self = Self {
        quantum:        [4, 6, 8],
        boost_interval: 100,
        tick_cpu:       0,
    };

    #[inline]
    pub const fn quantum_of(&self, level: Level) -> u32 {
        self.quantum[level.index()]
    }
}

impl Default for MlfqConfig {
    fn default() -> Self { Self::DEFAULT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quanta_grow_with_level() {
        let cfg = MlfqConfig::default();
        assert_eq!(cfg.quantum_of(Level::L0), 4);
        assert_eq!(cfg.quantum_of(Level::L1), 6);
        assert_eq!(cfg.quantum_of(Level::L2), 8);
        assert_eq!(cfg.boost_interval, 100);
        assert_eq!(cfg.tick_cpu, 0);
    }
}
