//! Trap vectors and their classification
//!
//! Важные векторы / Important vectors:
//!   0x20 + n  — IRQ n после ремаппинга PIC / IRQ n after PIC remap
//!   0x40      — syscall (ring 3 gate)
//!   0x80      — пользовательское прерывание / user interrupt
//!   0x81/0x82 — scheduler lock / unlock (ring 3 gates)

pub const T_IRQ0:       u64 = 0x20;
pub const T_SYSCALL:    u64 = 0x40;
pub const T_USERINT:    u64 = 0x80;
pub const T_SCHLOCK:    u64 = 0x81;
pub const T_SCHUNLOCK:  u64 = 0x82;

pub const IRQ_TIMER:    u64 = 0;
pub const IRQ_KBD:      u64 = 1;
pub const IRQ_COM1:     u64 = 4;
// Ложный IRQ мастер-PIC / Master PIC spurious IRQ
pub const IRQ_PIC_SPURIOUS: u64 = 7;
pub const IRQ_IDE:      u64 = 14;
pub const IRQ_SPURIOUS: u64 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Disk,
    /// Bochs шлёт ложные IDE1 / Bochs raises spurious IDE1 interrupts.
    DiskSpurious,
    Keyboard,
    Serial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    Syscall,
    Timer,
    Device(Device),
    UserInterrupt,
    SchedLock,
    SchedUnlock,
    Spurious,
    Unknown(u64),
}

impl TrapKind {
    pub const fn classify(trapno: u64) -> Self {
        match trapno {
            T_SYSCALL                              => Self::Syscall,
            n if n == T_IRQ0 + IRQ_TIMER           => Self::Timer,
            n if n == T_IRQ0 + IRQ_IDE             => Self::Device(Device::Disk),
            n if n == T_IRQ0 + IRQ_IDE + 1         => Self::Device(Device::DiskSpurious),
            n if n == T_IRQ0 + IRQ_KBD             => Self::Device(Device::Keyboard),
            n if n == T_IRQ0 + IRQ_COM1            => Self::Device(Device::Serial),
            T_USERINT                              => Self::UserInterrupt,
            T_SCHLOCK                              => Self::SchedLock,
            T_SCHUNLOCK                            => Self::SchedUnlock,
            n if n == T_IRQ0 + IRQ_PIC_SPURIOUS
              || n == T_IRQ0 + IRQ_SPURIOUS        => Self::Spurious,
            n                                      => Self::Unknown(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bindings_classify() {
        assert_eq!(TrapKind::classify(T_SYSCALL), TrapKind::Syscall);
        assert_eq!(TrapKind::classify(0x20), TrapKind::Timer);
        assert_eq!(TrapKind::classify(0x2E), TrapKind::Device(Device::Disk));
        assert_eq!(TrapKind::classify(0x2F), TrapKind::Device(Device::DiskSpurious));
        assert_eq!(TrapKind::classify(0x21), TrapKind::Device(Device::Keyboard));
        assert_eq!(TrapKind::classify(0x24), TrapKind::Device(Device::Serial));
        assert_eq!(TrapKind::classify(T_USERINT), TrapKind::UserInterrupt);
        assert_eq!(TrapKind::classify(T_SCHLOCK), TrapKind::SchedLock);
        assert_eq!(TrapKind::classify(T_SCHUNLOCK), TrapKind::SchedUnlock);
        assert_eq!(TrapKind::classify(0x27), TrapKind::Spurious);
        assert_eq!(TrapKind::classify(0x3F), TrapKind::Spurious);
    }

    #[test]
    fn everything_else_is_unknown() {
        assert_eq!(TrapKind::classify(14), TrapKind::Unknown(14)); // #PF
        assert_eq!(TrapKind::classify(0x22), TrapKind::Unknown(0x22));
        assert_eq!(TrapKind::classify(0xFF), TrapKind::Unknown(0xFF));
    }
}
