//! Tick policy — aging and priority decay for the running process
//!
//! Чистая функция над `ProcTable`: не знает ни про прерывания,
//! ни про boost, ни про lock — поэтому тестируется отдельно.
//! A pure function over `ProcTable`: knows nothing about traps,
//! boosting or the scheduler lock — so it is tested on its own.

use crate::config::MlfqConfig;
use crate::error::{Result, SchedError};

use super::{Level, ProcId, ProcTable};

/// Что политика сделала с процессом / What the policy did to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Квант ещё не исчерпан / Quantum not used up yet.
    Unchanged,
    /// MONOPOLY: ни миграции, ни decay / MONOPOLY: no migration, no decay.
    Exempt,
    Demoted { from: Level, to: Level },
    /// L2 терминальный: вместо понижения — минус приоритет (не ниже 0).
    /// L2 is terminal: instead of demotion, priority drops (floor 0).
    Decayed { priority: u32 },
}

/// Применить политику к процессу `id` после таймерного тика.
/// Apply the policy to process `id` after a timer tick.
pub fn apply(table: &mut ProcTable, id: ProcId, cfg: &MlfqConfig) -> Result<TickAction> {
    let proc = table.get_mut(id).ok_or(SchedError::InvalidProc(id))?;
    if proc.is_monopoly() {
        return Ok(TickAction::Exempt);
    }

    let level = proc.level;
    if proc.runtime < cfg.quantum_of(level) {
        return Ok(TickAction::Unchanged);
    }

    match level.demoted() {
        Some(to) => {
            let pid = proc.pid;
            table.migrate(id, to)?;
            log::debug!(target: "sched", "pid {}: {:?}->{:?}", pid, level, to);
            table.queues().dump();
            Ok(TickAction::Demoted { from: level, to })
        }
        None => {
            proc.priority = proc.priority.saturating_sub(1);
            proc.runtime = 0;
            log::debug!(target: "sched", "pid {}: priority decayed to {}", proc.pid, proc.priority);
            Ok(TickAction::Decayed { priority: proc.priority })
        }
    }
}
