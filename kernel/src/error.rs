//! Ошибки планировщика / Scheduler errors
//!
//! Killed — не ошибка, а флаг процесса (см. `ProcFlags::KILLED`).
//! Fatal — `panic!`, восстановления нет. Spurious — только лог.
//! Killed is not an error but a process flag (see `ProcFlags::KILLED`).
//! Fatal is a `panic!` with no recovery. Spurious is log-only.

use core::fmt;

use crate::sched::{Level, ProcId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Процесса нет в этой очереди / Process is not in this queue.
    NotFound { proc: ProcId, level: Level },
    /// Процесс уже связан с очередью / Process is already linked into a queue.
    AlreadyQueued { proc: ProcId, level: Level },
    /// Карта членства и очередь расходятся.
    /// Membership map and queue contents disagree.
    Inconsistent { proc: ProcId, level: Level },
    /// Индекс вне арены или пустой слот / Index out of arena or unused slot.
    InvalidProc(ProcId),
    /// Нет свободных слотов / No free slots.
    TableFull,
    /// Scheduler lock уже у другого процесса.
    LockHeld { holder: ProcId },
    /// Снять lock может только владелец / Only the holder may release.
    NotLockHolder { caller: ProcId },
    LockNotHeld,
}

pub type Result<T> = core::result::Result<T, SchedError>;

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { proc, level } =>
                write!(f, "process {} is not in queue {:?}", proc.index(), level),
            Self::AlreadyQueued { proc, level } =>
                write!(f, "process {} is already linked into queue {:?}", proc.index(), level),
            Self::Inconsistent { proc, level } =>
                write!(f, "queue {:?} is inconsistent for process {}", level, proc.index()),
            Self::InvalidProc(proc)  => write!(f, "invalid process slot {}", proc.index()),
            Self::TableFull          => f.write_str("process table is full"),
            Self::LockHeld { holder } =>
                write!(f, "scheduler lock is held by process {}", holder.index()),
            Self::NotLockHolder { caller } =>
                write!(f, "process {} does not hold the scheduler lock", caller.index()),
            Self::LockNotHeld        => f.write_str("scheduler lock is not held"),
        }
    }
}
