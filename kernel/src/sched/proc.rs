//! Process table — arena of `NPROC` slots + the MLFQ run queues

use bitflags::bitflags;
use spin::Mutex;

use crate::config::{NPROC, PROC_NAME_LEN};
use crate::error::{Result, SchedError};

use super::queue::RunQueues;
use super::{Level, ProcId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Unused,
    Embryo,
    Sleeping,
    Runnable,
    Running,
    Zombie,
}

bitflags! {
    /// Флаги процесса / Process flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcFlags: u8 {
        /// Запрошено кооперативное завершение / Cooperative termination requested.
        const KILLED   = 1 << 0;
        /// Освобождён от старения и decay / Exempt from aging and decay.
        const MONOPOLY = 1 << 1;
    }
}

/// Процесс глазами планировщика / A process as the scheduler sees it.
#[derive(Debug, Clone, Copy)]
pub struct Proc {
    pub pid:      u32,
    pub state:    ProcState,
    pub level:    Level,
    /// Тики на текущем уровне с последнего сброса.
    /// Ticks at the current level since the last reset.
    pub runtime:  u32,
    /// Только уменьшается здесь / Only ever decremented here.
    pub priority: u32,
    pub flags:    ProcFlags,
    name:         [u8; PROC_NAME_LEN],
}

impl Proc {
    const UNUSED: Self = Self {
        pid:      0,
        state:    ProcState::Unused,
        level:    Level::L0,
        runtime:  0,
        priority: 0,
        flags:    ProcFlags::empty(),
        name:     [0; PROC_NAME_LEN],
    };

    /// Новый процесс на L0, ещё не в очереди.
    /// A fresh process at L0, not queued yet.
    pub fn new(pid: u32, name: &str, priority: u32) -> Self {
        let mut buf = [0u8; PROC_NAME_LEN];
        let len = name.len().min(PROC_NAME_LEN);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self { pid, state: ProcState::Embryo, priority, name: buf, ..Self::UNUSED }
    }

    pub fn name(&self) -> &str {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(PROC_NAME_LEN);
        // Обрезка могла разрезать UTF-8 — берём валидный префикс
        // Truncation may have split UTF-8 — keep the valid prefix
        match core::str::from_utf8(&self.name[..len]) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.name[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    #[inline]
    pub fn is_killed(&self) -> bool { self.flags.contains(ProcFlags::KILLED) }

    #[inline]
    pub fn is_monopoly(&self) -> bool { self.flags.contains(ProcFlags::MONOPOLY) }

    #[inline]
    pub fn is_running(&self) -> bool { self.state == ProcState::Running }
}

pub struct ProcTable {
    procs:  [Proc; NPROC],
    queues: RunQueues,
}

impl ProcTable {
    const fn new() -> Self {
        Self { procs: [Proc::UNUSED; NPROC], queues: RunQueues::new() }
    }

    /// Единственный способ получить таблицу — уже под замком.
    /// The only way to get a table — already behind its lock.
    pub const fn new_locked() -> Mutex<ProcTable> {
        Mutex::new(Self::new())
    }

    pub fn get(&self, id: ProcId) -> Option<&Proc> {
        self.procs.get(id.index()).filter(|p| p.state != ProcState::Unused)
    }

    pub fn get_mut(&mut self, id: ProcId) -> Option<&mut Proc> {
        self.procs.get_mut(id.index()).filter(|p| p.state != ProcState::Unused)
    }

    fn proc_mut(&mut self, id: ProcId) -> Result<&mut Proc> {
        self.get_mut(id).ok_or(SchedError::InvalidProc(id))
    }

    pub fn queues(&self) -> &RunQueues { &self.queues }

    pub fn queues_mut(&mut self) -> &mut RunQueues { &mut self.queues }

    /// Занять свободный слот / Claim a free slot.
    pub fn insert(&mut self, proc: Proc) -> Result<ProcId> {
        let slot = self.procs.iter().position(|p| p.state == ProcState::Unused)
            .ok_or(SchedError::TableFull)?;
        self.procs[slot] = Proc { state: ProcState::Embryo, ..proc };
        Ok(ProcId(slot))
    }

    /// Процесс готов к запуску: встаёт в очередь своего уровня.
    /// The process becomes runnable and joins its level's queue.
    pub fn make_runnable(&mut self, id: ProcId) -> Result<()> {
        let proc = self.proc_mut(id)?;
        proc.state = ProcState::Runnable;
        let level = proc.level;
        if self.queues.level_of(id).is_none() {
            self.queues.append(id, level)?;
        }
        Ok(())
    }

    /// Покинуть очередь (sleep, exit) / Leave the queue (sleep, exit).
    pub fn unlink(&mut self, id: ProcId) -> Result<Level> {
        let level = self.proc_mut(id)?.level;
        let home = self.queues.level_of(id).unwrap_or(level);
        self.queues.remove(id, home)?;
        Ok(home)
    }

    /// Перенести на уровень `to`, обнулив runtime.
    /// Move to level `to`, resetting runtime.
    pub fn migrate(&mut self, id: ProcId, to: Level) -> Result<()> {
        let from = self.proc_mut(id)?.level;
        match self.queues.remove(id, from) {
            Ok(()) => {}
            Err(e @ SchedError::NotFound { .. }) => log::warn!(target: "sched", "migrate: {}", e),
            Err(e) => return Err(e),
        }
        self.queues.append(id, to)?;
        let proc = self.proc_mut(id)?;
        proc.level = to;
        proc.runtime = 0;
        Ok(())
    }

    pub fn kill(&mut self, id: ProcId) -> Result<()> {
        self.proc_mut(id)?.flags.insert(ProcFlags::KILLED);
        Ok(())
    }

    pub fn set_monopoly(&mut self, id: ProcId, on: bool) -> Result<()> {
        self.proc_mut(id)?.flags.set(ProcFlags::MONOPOLY, on);
        Ok(())
    }

    pub fn is_killed(&self, id: ProcId) -> bool {
        self.get(id).is_some_and(Proc::is_killed)
    }

    /// Вернуть слот в арену / Return the slot to the arena.
    pub fn retire(&mut self, id: ProcId) -> Result<()> {
        self.proc_mut(id)?;
        if let Some(level) = self.queues.level_of(id) {
            self.queues.remove(id, level)?;
        }
        self.procs[id.index()] = Proc::UNUSED;
        Ok(())
    }
}
