//! MLFQ Kernel — ready queues + trap dispatcher
//!
//! Ядро планировщика: три уровня MLFQ, старение по таймеру,
//! снижение приоритета на последнем уровне и периодический boost.
//! Scheduler core: three MLFQ levels, timer-driven aging,
//! priority decay on the last level and periodic boosting.
//!
//! Подсистемы / Subsystems:
//!   sched — таблица процессов, очереди, политика тика, scheduler lock
//!   trap  — классификация прерываний, часы тиков, диспетчер
//!
//! Переключение контекста, syscall-таблица и драйверы — снаружи,
//! через трейт [`trap::KernelServices`].
//! Context switching, the syscall table and drivers live outside,
//! behind the [`trap::KernelServices`] trait.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod logger;
pub mod sched;
pub mod trap;

pub use error::{Result, SchedError};

/// Поднять логгер и сообщить о готовности подсистем.
/// Bring up the logger and report subsystem readiness.
pub fn init(sink: logger::Sink, level: log::LevelFilter) {
    logger::init(sink, level);
    log::info!("[sched] MLFQ: {} levels, {} slots", sched::Level::COUNT, config::NPROC);
    log::info!("[trap] boost every {} ticks", config::MlfqConfig::DEFAULT.boost_interval);
}
