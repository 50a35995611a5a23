//! Записывающий мок коллабораторов / Recording collaborator mock.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use mlfq_kernel::sched::{Level, Proc, ProcId, ProcState, ProcTable, SchedToken};
use mlfq_kernel::trap::frame::{KERNEL_CODE, USER_CODE};
use mlfq_kernel::trap::vector::{IRQ_TIMER, T_IRQ0};
use mlfq_kernel::trap::{KernelServices, TrapFrame};
use spin::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Syscall(u64),
    Disk,
    Keyboard,
    Serial,
    Eoi,
    UserInterrupt,
    Lock(ProcId),
    Unlock(ProcId),
    Boost,
    Wakeup,
    Yield,
    Exit,
}

pub struct MockKernel<'a> {
    procs:                   &'a Mutex<ProcTable>,
    pub cpu:                 Cell<usize>,
    pub current:             Cell<Option<ProcId>>,
    pub kill_during_syscall: Cell<bool>,
    calls:                   RefCell<Vec<Call>>,
}

impl<'a> MockKernel<'a> {
    pub fn new(procs: &'a Mutex<ProcTable>) -> Self {
        Self {
            procs,
            cpu: Cell::new(0),
            current: Cell::new(None),
            kill_during_syscall: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn running(self, id: ProcId) -> Self {
        self.current.set(Some(id));
        self
    }

    pub fn on_cpu(self, cpu: usize) -> Self {
        self.cpu.set(cpu);
        self
    }

    /// Забрать накопленные вызовы / Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.borrow_mut().drain(..).collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl KernelServices for MockKernel<'_> {
    fn cpu_id(&self) -> usize { self.cpu.get() }
    fn current(&self) -> Option<ProcId> { self.current.get() }

    fn dispatch_syscall(&self, frame: &mut TrapFrame) {
        self.record(Call::Syscall(frame.trapno));
        if self.kill_during_syscall.get() {
            if let Some(id) = self.current.get() {
                self.procs.lock().kill(id).unwrap();
            }
        }
    }

    fn disk_intr(&self)      { self.record(Call::Disk) }
    fn keyboard_intr(&self)  { self.record(Call::Keyboard) }
    fn serial_intr(&self)    { self.record(Call::Serial) }
    fn eoi(&self)            { self.record(Call::Eoi) }
    fn user_interrupt(&self) { self.record(Call::UserInterrupt) }

    fn scheduler_lock(&self, token: &SchedToken)   { self.record(Call::Lock(token.holder())) }
    fn scheduler_unlock(&self, token: &SchedToken) { self.record(Call::Unlock(token.holder())) }

    fn boost(&self)        { self.record(Call::Boost) }
    fn wakeup_ticks(&self) { self.record(Call::Wakeup) }
    fn yield_cpu(&self)    { self.record(Call::Yield) }
    fn exit(&self)         { self.record(Call::Exit) }
}

/// Процесс в очереди `level` с заданным состоянием и runtime.
/// A process queued at `level` with the given state and runtime.
pub fn spawn(procs: &Mutex<ProcTable>, pid: u32, level: Level, runtime: u32, state: ProcState) -> ProcId {
    let mut t = procs.lock();
    let id = t.insert(Proc::new(pid, "test", 5)).unwrap();
    t.make_runnable(id).unwrap();
    if level != Level::L0 {
        t.migrate(id, level).unwrap();
    }
    let p = t.get_mut(id).unwrap();
    p.state = state;
    p.runtime = runtime;
    id
}

pub fn user_frame(trapno: u64) -> TrapFrame {
    TrapFrame { rip: 0x1000, ..TrapFrame::new(trapno, USER_CODE) }
}

pub fn kernel_frame(trapno: u64) -> TrapFrame {
    TrapFrame { rip: 0xffff_8000_0010_0000, ..TrapFrame::new(trapno, KERNEL_CODE) }
}

pub fn timer_frame() -> TrapFrame {
    user_frame(T_IRQ0 + IRQ_TIMER)
}
