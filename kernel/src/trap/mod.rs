//! Trap dispatcher — every interrupt, exception and syscall lands here
//!
//! Порядок / Order:
//!   1. классификация вектора / classify the vector
//!   2. обработка по виду (syscall возвращается сразу)
//!      per-kind handling (syscall returns right away)
//!   3. убит и идём в ring 3 → exit / killed and returning to ring 3 → exit
//!   4. таймер + процесс Running → политика MLFQ, затем yield
//!      timer + Running process → MLFQ policy, then yield
//!   5. взведён boost → снять scheduler lock, затем boost
//!      boost armed → drop the scheduler lock, then boost
//!   6. снова проверка killed / killed check again
//!
//! Всё внешнее (syscall-таблица, драйверы, EOI, yield, exit, boost,
//! lock) — через [`KernelServices`]. Ни один замок не держится
//! во время yield.
//! Everything external (syscall table, drivers, EOI, yield, exit, boost,
//! lock) goes through [`KernelServices`]. No lock is held across yield.

pub mod frame;
pub mod ticks;
pub mod vector;

use spin::Mutex;

use crate::config::MlfqConfig;
use crate::sched::{self, policy, ProcId, ProcTable, SchedLock, SchedToken, TickAction};

pub use frame::TrapFrame;
pub use ticks::TickClock;
pub use vector::{Device, TrapKind};

/// Внешние коллабораторы ядра / The kernel's external collaborators.
pub trait KernelServices {
    fn cpu_id(&self) -> usize;
    /// Процесс, прерванный на этом ядре / The process interrupted on this core.
    fn current(&self) -> Option<ProcId>;

    fn dispatch_syscall(&self, frame: &mut TrapFrame);
    fn disk_intr(&self);
    fn keyboard_intr(&self);
    fn serial_intr(&self);
    /// End-Of-Interrupt для LAPIC / End-Of-Interrupt to the LAPIC.
    fn eoi(&self);
    fn user_interrupt(&self);

    fn scheduler_lock(&self, token: &SchedToken);
    fn scheduler_unlock(&self, token: &SchedToken);
    /// Вернуть все процессы на L0 / Reset every process to L0.
    fn boost(&self);

    fn wakeup_ticks(&self);
    fn yield_cpu(&self);
    fn exit(&self);
}

/// Что произошло за один trap / What happened during one trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapReport {
    pub kind:    TrapKind,
    pub tick:    Option<TickAction>,
    pub yielded: bool,
    pub boosted: bool,
    pub exited:  bool,
}

impl TrapReport {
    const fn new(kind: TrapKind) -> Self {
        Self { kind, tick: None, yielded: false, boosted: false, exited: false }
    }

    fn exited(mut self) -> Self {
        self.exited = true;
        self
    }
}

pub struct TrapDispatcher {
    config:     MlfqConfig,
    clock:      TickClock,
    sched_lock: SchedLock,
}

/// Глобальный диспетчер / Global dispatcher.
pub static TRAPS: TrapDispatcher = TrapDispatcher::new(MlfqConfig::DEFAULT);

/// Точка входа из ассемблерной заглушки / Entry point from the asm stub.
pub fn trap<K: KernelServices>(frame: &mut TrapFrame, services: &K) -> TrapReport {
    TRAPS.dispatch(frame, &sched::PROCS, services)
}

/// Освободить слот после exit / Release a slot after exit.
pub fn retire<K: KernelServices>(id: ProcId, services: &K) -> crate::Result<()> {
    TRAPS.retire(id, &sched::PROCS, services)
}

impl TrapDispatcher {
    pub const fn new(config: MlfqConfig) -> Self {
        Self {
            clock:      TickClock::new(config.boost_interval),
            sched_lock: SchedLock::new(),
            config,
        }
    }

    pub fn config(&self) -> &MlfqConfig { &self.config }

    pub fn clock(&self) -> &TickClock { &self.clock }

    pub fn sched_lock(&self) -> &SchedLock { &self.sched_lock }

    pub fn dispatch<K: KernelServices>(
        &self,
        frame: &mut TrapFrame,
        procs: &Mutex<ProcTable>,
        k: &K,
    ) -> TrapReport {
        let kind = TrapKind::classify(frame.trapno);
        let current = k.current();
        let mut report = TrapReport::new(kind);

        match kind {
            TrapKind::Syscall       => return Self::syscall(frame, current, procs, k, report),
            TrapKind::Timer         => self.timer(current, procs, k),
            TrapKind::Device(dev)   => Self::device(dev, k),
            TrapKind::UserInterrupt => k.user_interrupt(),
            TrapKind::SchedLock     => self.lock_trap(current, procs, k),
            TrapKind::SchedUnlock   => self.unlock_trap(current, procs, k),
            TrapKind::Spurious => {
                log::warn!(target: "trap", "cpu{}: spurious interrupt at {:#x}:{:#x}",
                    k.cpu_id(), frame.cs, frame.rip);
                k.eoi();
            }
            TrapKind::Unknown(n)    => Self::unknown(n, frame, current, procs, k),
        }

        // Ещё в ядре — пусть дойдёт до обычного возврата из syscall
        // Still in the kernel — let it reach the regular syscall return
        if frame.from_user() && Self::killed(current, procs) {
            k.exit();
            return report.exited();
        }

        if kind == TrapKind::Timer {
            if let Some(id) = current {
                if let Some(action) = self.age(id, procs) {
                    report.tick = action;
                    k.yield_cpu();
                    report.yielded = true;
                }
            }
        }

        if self.clock.take_boost() {
            // Монополист не может задушить boost
            // A monopolist cannot suppress the boost
            if let Some(token) = self.sched_lock.revoke() {
                log::info!(target: "trap", "boost: revoking scheduler lock of slot {}",
                    token.holder().index());
                k.scheduler_unlock(&token);
            }
            k.boost();
            report.boosted = true;
        }

        if frame.from_user() && Self::killed(current, procs) {
            k.exit();
            return report.exited();
        }
        report
    }

    /// Вернуть слот процесса в арену; его scheduler lock снимается.
    /// Return a process slot to the arena, dropping its scheduler lock.
    pub fn retire<K: KernelServices>(
        &self,
        id: ProcId,
        procs: &Mutex<ProcTable>,
        k: &K,
    ) -> crate::Result<()> {
        procs.lock().retire(id)?;
        if let Some(token) = self.sched_lock.forfeit(id) {
            log::info!(target: "trap", "pid {} left holding the scheduler lock", token.pid());
            k.scheduler_unlock(&token);
        }
        Ok(())
    }

    fn killed(current: Option<ProcId>, procs: &Mutex<ProcTable>) -> bool {
        current.is_some_and(|id| procs.lock().is_killed(id))
    }

    fn pid_of(id: ProcId, procs: &Mutex<ProcTable>) -> Option<u32> {
        procs.lock().get(id).map(|p| p.pid)
    }

    // ── Виды trap'ов / Trap kinds ─────────────────────────────────────────────

    fn syscall<K: KernelServices>(
        frame: &mut TrapFrame,
        current: Option<ProcId>,
        procs: &Mutex<ProcTable>,
        k: &K,
        report: TrapReport,
    ) -> TrapReport {
        if Self::killed(current, procs) {
            k.exit();
            return report.exited();
        }
        k.dispatch_syscall(frame);
        if Self::killed(current, procs) {
            k.exit();
            return report.exited();
        }
        report
    }

    fn timer<K: KernelServices>(&self, current: Option<ProcId>, procs: &Mutex<ProcTable>, k: &K) {
        // Иначе каждое ядро прибавляло бы свой тик
        // Otherwise every core would add its own tick
        if k.cpu_id() == self.config.tick_cpu {
            self.clock.tick(|_| {
                if let Some(id) = current {
                    if let Some(p) = procs.lock().get_mut(id).filter(|p| p.is_running()) {
                        p.runtime += 1;
                    }
                }
                k.wakeup_ticks();
            });
        }
        k.eoi();
    }

    fn device<K: KernelServices>(dev: Device, k: &K) {
        match dev {
            Device::Disk         => k.disk_intr(),
            Device::DiskSpurious => {}
            Device::Keyboard     => k.keyboard_intr(),
            Device::Serial       => k.serial_intr(),
        }
        k.eoi();
    }

    fn lock_trap<K: KernelServices>(&self, current: Option<ProcId>, procs: &Mutex<ProcTable>, k: &K) {
        let Some((id, pid)) = current.and_then(|id| Some((id, Self::pid_of(id, procs)?))) else {
            log::warn!(target: "trap", "scheduler lock trap without a process");
            return;
        };
        match self.sched_lock.acquire(id, pid) {
            Ok(token) => k.scheduler_lock(&token),
            Err(e) => log::warn!(target: "trap", "scheduler lock refused: {}", e),
        }
    }

    fn unlock_trap<K: KernelServices>(&self, current: Option<ProcId>, procs: &Mutex<ProcTable>, k: &K) {
        let Some((id, pid)) = current.and_then(|id| Some((id, Self::pid_of(id, procs)?))) else {
            log::warn!(target: "trap", "scheduler unlock trap without a process");
            return;
        };
        match self.sched_lock.release(id, pid) {
            Ok(token) => k.scheduler_unlock(&token),
            Err(e) => log::warn!(target: "trap", "scheduler unlock refused: {}", e),
        }
    }

    fn unknown<K: KernelServices>(
        trapno: u64,
        frame: &TrapFrame,
        current: Option<ProcId>,
        procs: &Mutex<ProcTable>,
        k: &K,
    ) {
        let cpu = k.cpu_id();
        // В ядре — значит, наша ошибка / In the kernel — it must be our mistake
        let Some(id) = current.filter(|_| !frame.from_kernel()) else {
            panic!("unexpected trap {} from cpu {} rip {:#x} (cr2={:#x})",
                trapno, cpu, frame.rip, frame.fault_addr);
        };

        // В пользовательском режиме — процесс сам виноват
        // In user space — assume the process misbehaved
        let mut table = procs.lock();
        if let Some(p) = table.get(id) {
            log::error!(target: "trap",
                "pid {} {}: trap {} err {} on cpu {} rip {:#x} addr {:#x}--kill proc",
                p.pid, p.name(), trapno, frame.err, cpu, frame.rip, frame.fault_addr);
        }
        if let Err(e) = table.kill(id) {
            log::error!(target: "trap", "trap {}: cannot kill slot {}: {}", trapno, id.index(), e);
        }
    }

    /// Политика тика для текущего процесса, если он ещё Running.
    /// Tick policy for the current process, if it is still Running.
    fn age(&self, id: ProcId, procs: &Mutex<ProcTable>) -> Option<Option<TickAction>> {
        let mut table = procs.lock();
        if !table.get(id).is_some_and(|p| p.is_running()) {
            return None;
        }
        match policy::apply(&mut table, id, &self.config) {
            Ok(action) => Some(Some(action)),
            Err(e) => {
                log::error!(target: "sched", "tick policy for slot {}: {}", id.index(), e);
                Some(None)
            }
        }
    }
}
