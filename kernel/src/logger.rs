//! Kernel logger — `log` facade over the console
//!
//! Все подсистемы пишут через `log::{trace, debug, info, warn, error}`.
//! Куда идут строки решает `Sink`: на железе — COM1, в тестах — буфер.
//! Every subsystem writes through `log::{trace, debug, info, warn, error}`.
//! Where the lines go is up to the `Sink`: COM1 on hardware, a buffer in tests.

use core::fmt;

use log::{LevelFilter, Log, Metadata, Record};
use spin::{Mutex, Once};

/// Приёмник отформатированной строки / Formatted-line receiver.
pub type Sink = fn(fmt::Arguments<'_>);

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;
static SINK: Once<Sink> = Once::new();

// Строки с разных ядер не должны перемешиваться
// Lines from different cores must not interleave
static CONSOLE_LOCK: Mutex<()> = Mutex::new(());

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(sink) = SINK.get() else { return };
        let _guard = CONSOLE_LOCK.lock();
        sink(format_args!("[{:<5}] {}: {}\n", record.level(), record.target(), record.args()));
    }

    fn flush(&self) {}
}

/// Зарегистрировать логгер. Повторный вызов меняет только уровень.
/// Register the logger. A repeated call only changes the level.
pub fn init(sink: Sink, level: LevelFilter) {
    SINK.call_once(|| sink);
    // Err означает, что логгер уже стоит — это нормально
    // Err means a logger is already installed — that's fine
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
