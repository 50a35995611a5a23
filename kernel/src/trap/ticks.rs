//! Global tick clock
//!
//! Счётчик двигает только одно ядро (`MlfqConfig::tick_cpu`), под своим
//! spin-замком. Пересечение порога boost'а взводит флаг ровно один раз;
//! следующий порог — через `interval` тиков.
//! Only one core (`MlfqConfig::tick_cpu`) advances the counter, under its
//! own spinlock. Crossing the boost threshold arms a flag exactly once;
//! the next threshold is `interval` ticks later.
//!
//! Флаг boost'а атомарный: остальные trap'ы опрашивают его без замка.
//! The boost flag is atomic: other traps poll it without the lock.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

struct TickState {
    ticks:      u64,
    next_boost: u64,
}

pub struct TickClock {
    state:         Mutex<TickState>,
    boost_pending: AtomicBool,
    interval:      u64,
}

impl TickClock {
    pub const fn new(interval: u64) -> Self {
        Self {
            state:         Mutex::new(TickState { ticks: 0, next_boost: interval }),
            boost_pending: AtomicBool::new(false),
            interval,
        }
    }

    /// Один тик: счётчик +1, затем `under_lock` — всё ещё под замком.
    /// One tick: counter +1, then `under_lock` — still under the lock.
    pub fn tick<F: FnOnce(u64)>(&self, under_lock: F) -> u64 {
        let mut st = self.state.lock();
        st.ticks += 1;
        if st.ticks >= st.next_boost {
            self.boost_pending.store(true, Ordering::Release);
            st.next_boost = st.ticks + self.interval;
        }
        let now = st.ticks;
        under_lock(now);
        now
    }

    pub fn now(&self) -> u64 {
        self.state.lock().ticks
    }

    /// Забрать взведённый boost (не больше одного раза на порог).
    /// Take the armed boost (at most once per threshold).
    pub fn take_boost(&self) -> bool {
        self.boost_pending.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_arms_once_per_interval() {
        let clock = TickClock::new(100);
        let mut armed = Vec::new();
        for _ in 0..250 {
            let now = clock.tick(|_| {});
            if clock.take_boost() {
                armed.push(now);
            }
        }
        assert_eq!(armed, [100, 200]);
        assert_eq!(clock.now(), 250);
    }

    #[test]
    fn pending_boost_survives_until_taken() {
        let clock = TickClock::new(2);
        clock.tick(|_| {});
        clock.tick(|_| {});
        clock.tick(|_| {});

        assert!(clock.take_boost());
        assert!(!clock.take_boost());
    }

    #[test]
    fn polling_the_boost_does_not_take_the_counter_lock() {
        let clock = TickClock::new(1);
        clock.tick(|_| {});

        let _held = clock.state.lock();
        assert!(clock.take_boost());
        assert!(!clock.take_boost());
    }

    #[test]
    fn closure_sees_the_new_count() {
        let clock = TickClock::new(100);
        let mut seen = 0;
        clock.tick(|now| seen = now);
        assert_eq!(seen, 1);
    }
}
