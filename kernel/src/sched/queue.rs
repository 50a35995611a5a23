//! Run queues — one ordered sequence of `ProcId`s per level
//!
//! Вместо общего поля `next` в процессе: у каждого уровня свой массив
//! индексов, а карта `home` помнит, где сейчас процесс. Попасть в две
//! очереди сразу структурно невозможно — `append`/`prepend` откажут.
//! Instead of a shared `next` field in the process: each level owns an
//! array of indices and the `home` map remembers where a process sits.
//! Being in two queues at once is structurally impossible —
//! `append`/`prepend` refuse.
//!
//! Никаких блокировок внутри: доступ только через `&mut ProcTable`.
//! No locking inside: access only goes through `&mut ProcTable`.

use crate::config::NPROC;
use crate::error::{Result, SchedError};

use super::{Level, ProcId};

// ── Одна очередь / A single queue ────────────────────────────────────────────

#[derive(Clone, Copy)]
struct RunQueue {
    ids: [ProcId; NPROC],
    len: usize,
}

impl RunQueue {
    const EMPTY: Self = Self { ids: [ProcId(0); NPROC], len: 0 };

    fn members(&self) -> &[ProcId] {
        &self.ids[..self.len]
    }

    fn position(&self, id: ProcId) -> Option<usize> {
        self.members().iter().position(|&m| m == id)
    }

    // Ёмкость NPROC хватает всегда: процесс живёт максимум в одной очереди
    // NPROC capacity always suffices: a process lives in at most one queue
    fn insert(&mut self, at: usize, id: ProcId) {
        self.ids.copy_within(at..self.len, at + 1);
        self.ids[at] = id;
        self.len += 1;
    }

    fn remove_at(&mut self, at: usize) {
        self.ids.copy_within(at + 1..self.len, at);
        self.len -= 1;
    }
}

// ── Три уровня / Three levels ────────────────────────────────────────────────

pub struct RunQueues {
    levels: [RunQueue; Level::COUNT],
    home:   [Option<Level>; NPROC],
}

impl RunQueues {
    pub(super) const fn new() -> Self {
        Self {
            levels: [RunQueue::EMPTY; Level::COUNT],
            home:   [None; NPROC],
        }
    }

    fn check(&self, id: ProcId) -> Result<()> {
        if id.index() < NPROC { Ok(()) } else { Err(SchedError::InvalidProc(id)) }
    }

    fn link(&mut self, id: ProcId, level: Level, front: bool) -> Result<()> {
        self.check(id)?;
        if let Some(current) = self.home[id.index()] {
            return Err(SchedError::AlreadyQueued { proc: id, level: current });
        }
        let queue = &mut self.levels[level.index()];
        let at = if front { 0 } else { queue.len };
        queue.insert(at, id);
        self.home[id.index()] = Some(level);
        Ok(())
    }

    /// Добавить в хвост очереди / Link at the tail of `level`.
    pub fn append(&mut self, id: ProcId, level: Level) -> Result<()> {
        self.link(id, level, false)
    }

    /// Добавить в голову очереди / Link at the front of `level`.
    pub fn prepend(&mut self, id: ProcId, level: Level) -> Result<()> {
        self.link(id, level, true)
    }

    pub fn is_tail(&self, id: ProcId, level: Level) -> bool {
        self.levels[level.index()].members().last() == Some(&id)
    }

    /// Убрать процесс из очереди `level`.
    /// Unlink a process from `level`.
    ///
    /// Отсутствующий процесс → `NotFound`, очередь не меняется.
    /// An absent process → `NotFound`, the queue is left untouched.
    pub fn remove(&mut self, id: ProcId, level: Level) -> Result<()> {
        self.check(id)?;
        let home = self.home[id.index()];
        let queue = &mut self.levels[level.index()];
        match (queue.position(id), home) {
            (Some(at), Some(h)) if h == level => {
                queue.remove_at(at);
                self.home[id.index()] = None;
                Ok(())
            }
            (None, Some(h)) if h != level => Err(SchedError::NotFound { proc: id, level }),
            (None, None) => Err(SchedError::NotFound { proc: id, level }),
            _ => Err(SchedError::Inconsistent { proc: id, level }),
        }
    }

    pub fn count(&self, level: Level) -> usize {
        self.levels[level.index()].len
    }

    pub fn is_empty(&self, level: Level) -> bool {
        self.count(level) == 0
    }

    pub fn front(&self, level: Level) -> Option<ProcId> {
        self.levels[level.index()].members().first().copied()
    }

    /// Где сейчас процесс / Which queue currently holds `id`.
    pub fn level_of(&self, id: ProcId) -> Option<Level> {
        self.home.get(id.index()).copied().flatten()
    }

    pub fn iter(&self, level: Level) -> impl Iterator<Item = ProcId> + '_ {
        self.levels[level.index()].members().iter().copied()
    }

    /// Вывести содержимое всех уровней в trace-лог.
    /// Dump every level into the trace log.
    pub fn dump(&self) {
        for level in Level::ALL {
            log::trace!(target: "sched", "{:?} ({}): {:?}",
                level, self.count(level), self.levels[level.index()].members());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(q: &RunQueues, level: Level) -> Vec<usize> {
        q.iter(level).map(ProcId::index).collect()
    }

    #[test]
    fn append_links_at_tail() {
        let mut q = RunQueues::new();
        q.append(ProcId(1), Level::L0).unwrap();
        q.append(ProcId(2), Level::L0).unwrap();

        assert!(q.is_tail(ProcId(2), Level::L0));
        assert!(!q.is_tail(ProcId(1), Level::L0));
        assert_eq!(q.count(Level::L0), 2);
        assert_eq!(q.level_of(ProcId(2)), Some(Level::L0));
    }

    #[test]
    fn prepend_pushes_first_member_back() {
        let mut q = RunQueues::new();
        q.append(ProcId(1), Level::L1).unwrap();
        q.prepend(ProcId(7), Level::L1).unwrap();

        assert_eq!(ids(&q, Level::L1), [7, 1]);
        assert_eq!(q.front(Level::L1), Some(ProcId(7)));
    }

    #[test]
    fn second_link_is_rejected() {
        let mut q = RunQueues::new();
        q.append(ProcId(3), Level::L0).unwrap();

        assert_eq!(
            q.append(ProcId(3), Level::L1),
            Err(SchedError::AlreadyQueued { proc: ProcId(3), level: Level::L0 })
        );
        assert_eq!(
            q.prepend(ProcId(3), Level::L0),
            Err(SchedError::AlreadyQueued { proc: ProcId(3), level: Level::L0 })
        );
        assert_eq!(q.count(Level::L0), 1);
        assert_eq!(q.count(Level::L1), 0);
    }

    #[test]
    fn remove_absent_member_is_not_found() {
        let mut q = RunQueues::new();
        for id in [10, 11, 12] {
            q.append(ProcId(id), Level::L2).unwrap();
        }

        assert_eq!(
            q.remove(ProcId(13), Level::L2),
            Err(SchedError::NotFound { proc: ProcId(13), level: Level::L2 })
        );
        assert_eq!(ids(&q, Level::L2), [10, 11, 12]);
    }

    #[test]
    fn remove_from_wrong_level_is_not_found() {
        let mut q = RunQueues::new();
        q.append(ProcId(4), Level::L0).unwrap();

        assert_eq!(
            q.remove(ProcId(4), Level::L1),
            Err(SchedError::NotFound { proc: ProcId(4), level: Level::L1 })
        );
        assert_eq!(q.level_of(ProcId(4)), Some(Level::L0));
    }

    #[test]
    fn remove_middle_keeps_order() {
        let mut q = RunQueues::new();
        for id in [1, 2, 3] {
            q.append(ProcId(id), Level::L0).unwrap();
        }
        q.remove(ProcId(2), Level::L0).unwrap();

        assert_eq!(ids(&q, Level::L0), [1, 3]);
        assert_eq!(q.level_of(ProcId(2)), None);
        // Снова можно поставить / Can be linked again
        q.append(ProcId(2), Level::L1).unwrap();
    }

    #[test]
    fn desynchronised_home_is_inconsistent() {
        let mut q = RunQueues::new();
        q.append(ProcId(1), Level::L0).unwrap();
        q.home[1] = Some(Level::L1);

        assert_eq!(
            q.remove(ProcId(1), Level::L0),
            Err(SchedError::Inconsistent { proc: ProcId(1), level: Level::L0 })
        );
        assert_eq!(q.count(Level::L0), 1);
    }

    #[test]
    fn empty_queue_has_no_tail() {
        let q = RunQueues::new();
        assert!(!q.is_tail(ProcId(0), Level::L0));
        assert!(q.is_empty(Level::L0));
        assert_eq!(q.front(Level::L0), None);
    }

    #[test]
    fn out_of_range_slot_is_invalid() {
        let mut q = RunQueues::new();
        assert_eq!(q.append(ProcId(NPROC), Level::L0), Err(SchedError::InvalidProc(ProcId(NPROC))));
        assert_eq!(q.level_of(ProcId(NPROC)), None);
    }
}
