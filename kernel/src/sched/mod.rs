//! Scheduler — MLFQ ready queues
//!
//! Multilevel Feedback Queue с тремя уровнями.
//! Multilevel Feedback Queue with three levels.
//!
//! Очереди / Queues:
//!   L0 → квант 4 тика  — новые и интерактивные   (highest favour)
//!   L1 → квант 6 тиков — исчерпали L0
//!   L2 → квант 8 тиков — терминальный уровень: дальше только
//!        снижение приоритета / terminal level: only priority decay
//!
//! Boost раз в 100 тиков возвращает всех на L0 (внешний коллаборатор).
//! A boost every 100 ticks returns everyone to L0 (external collaborator).
//!
//! Очереди доступны только через `ProcTable`, а `ProcTable` существует
//! только внутри `spin::Mutex` — без захваченного guard'а очередь не трогаем.
//! Queues are reachable only through `ProcTable`, and `ProcTable` only
//! exists inside a `spin::Mutex` — no held guard, no queue access.

pub mod lock;
pub mod policy;
pub mod proc;
pub mod queue;

use spin::Mutex;

pub use lock::{SchedLock, SchedToken};
pub use policy::TickAction;
pub use proc::{Proc, ProcFlags, ProcState, ProcTable};
pub use queue::RunQueues;

/// Глобальная таблица процессов / Global process table.
pub static PROCS: Mutex<ProcTable> = ProcTable::new_locked();

/// Уровень MLFQ / MLFQ level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    L0,
    L1,
    L2,
}

impl Level {
    pub const COUNT: usize = 3;
    pub const ALL: [Level; Self::COUNT] = [Level::L0, Level::L1, Level::L2];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Следующий (менее привилегированный) уровень; у L2 его нет.
    /// Next (less favoured) level; L2 has none.
    pub const fn demoted(self) -> Option<Level> {
        match self {
            Level::L0 => Some(Level::L1),
            Level::L1 => Some(Level::L2),
            Level::L2 => None,
        }
    }
}

/// Индекс слота в арене процессов / Slot index in the process arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcId(pub usize);

impl ProcId {
    #[inline]
    pub const fn index(self) -> usize { self.0 }
}
