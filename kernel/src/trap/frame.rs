//! Trap frame — saved state handed to the dispatcher

// ── Селекторы сегментов / Segment selectors ───────────────────────────────────
pub const KERNEL_CODE: u16 = 0x08;
pub const USER_CODE:   u16 = 0x1B; // RPL 3

/// DPL/RPL пользовательского кольца / User ring DPL/RPL.
pub const DPL_USER: u8 = 3;

/// Контекст прерывания / Trap context.
///
/// `trapno` и `err` кладёт входная заглушка, `rip..ss` — CPU,
/// `fault_addr` — копия CR2 (имеет смысл только для #PF).
/// `trapno` and `err` are pushed by the entry stub, `rip..ss` by the CPU,
/// `fault_addr` is a copy of CR2 (meaningful only for #PF).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TrapFrame {
    pub trapno:     u64,
    pub err:        u64,
    pub rip:        u64,
    pub cs:         u64,
    pub rflags:     u64,
    pub rsp:        u64,
    pub ss:         u64,
    pub fault_addr: u64,
}

impl TrapFrame {
    pub const fn new(trapno: u64, cs: u16) -> Self {
        Self { trapno, err: 0, rip: 0, cs: cs as u64, rflags: 0, rsp: 0, ss: 0, fault_addr: 0 }
    }

    /// Requested privilege level — младшие биты CS.
    #[inline]
    pub const fn rpl(&self) -> u8 {
        (self.cs & 3) as u8
    }

    #[inline]
    pub const fn from_user(&self) -> bool {
        self.rpl() == DPL_USER
    }

    #[inline]
    pub const fn from_kernel(&self) -> bool {
        self.rpl() == 0
    }
}
