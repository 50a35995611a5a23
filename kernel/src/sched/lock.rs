//! Scheduler lock — a capability bound to the holding process
//!
//! Вместо общей «магической» константы: токен выдаётся при захвате,
//! привязан к процессу и эпохе, снять lock может только владелец.
//! Instead of a shared magic constant: a token is issued on acquire,
//! bound to the process and an epoch; only the holder may release.
//!
//! Слот арены переиспользуется, поэтому владелец — пара (слот, pid).
//! Arena slots are reused, so the holder is a (slot, pid) pair.
//!
//! Boost снимает lock принудительно через `revoke()`, выход владельца —
//! через `forfeit()`.
//! Boosting force-releases the lock via `revoke()`, the holder's exit
//! via `forfeit()`.

use spin::Mutex;

use crate::error::{Result, SchedError};

use super::ProcId;

/// Право на scheduler lock. Не клонируется.
/// The right to the scheduler lock. Not cloneable.
#[derive(Debug, PartialEq, Eq)]
pub struct SchedToken {
    holder: ProcId,
    pid:    u32,
    epoch:  u64,
}

impl SchedToken {
    pub fn holder(&self) -> ProcId { self.holder }
    pub fn pid(&self) -> u32 { self.pid }
    pub fn epoch(&self) -> u64 { self.epoch }
}

struct Grant {
    holder: ProcId,
    pid:    u32,
    epoch:  u64,
}

impl Grant {
    fn owned_by(&self, holder: ProcId, pid: u32) -> bool {
        self.holder == holder && self.pid == pid
    }

    fn into_token(self) -> SchedToken {
        SchedToken { holder: self.holder, pid: self.pid, epoch: self.epoch }
    }
}

struct LockState {
    grant: Option<Grant>,
    epoch: u64,
}

pub struct SchedLock {
    state: Mutex<LockState>,
}

impl SchedLock {
    pub const fn new() -> Self {
        Self { state: Mutex::new(LockState { grant: None, epoch: 0 }) }
    }

    /// Выдать токен процессу `pid` в слоте `holder`.
    /// Issue a token to process `pid` sitting in slot `holder`.
    pub fn acquire(&self, holder: ProcId, pid: u32) -> Result<SchedToken> {
        let mut st = self.state.lock();
        if let Some(g) = &st.grant {
            return Err(SchedError::LockHeld { holder: g.holder });
        }
        st.epoch += 1;
        let epoch = st.epoch;
        st.grant = Some(Grant { holder, pid, epoch });
        Ok(SchedToken { holder, pid, epoch })
    }

    /// Снять lock от имени `caller`; возвращает погашенный токен.
    /// Release on behalf of `caller`; returns the spent token.
    pub fn release(&self, caller: ProcId, pid: u32) -> Result<SchedToken> {
        let mut st = self.state.lock();
        match st.grant.take() {
            None => Err(SchedError::LockNotHeld),
            Some(g) if !g.owned_by(caller, pid) => {
                st.grant = Some(g);
                Err(SchedError::NotLockHolder { caller })
            }
            Some(g) => Ok(g.into_token()),
        }
    }

    /// Принудительно снять lock, кто бы его ни держал.
    /// Force the lock off, whoever holds it.
    pub fn revoke(&self) -> Option<SchedToken> {
        self.state.lock().grant.take().map(Grant::into_token)
    }

    /// Снять lock, если его держит слот `holder` (процесс уходит).
    /// Drop the lock if slot `holder` owns it (the process is leaving).
    pub fn forfeit(&self, holder: ProcId) -> Option<SchedToken> {
        let mut st = self.state.lock();
        if st.grant.as_ref().is_some_and(|g| g.holder == holder) {
            st.grant.take().map(Grant::into_token)
        } else {
            None
        }
    }

    pub fn holder(&self) -> Option<ProcId> {
        self.state.lock().grant.as_ref().map(|g| g.holder)
    }

    pub fn is_held(&self) -> bool {
        self.holder().is_some()
    }

    /// Токен соответствует текущему захвату (не устарел).
    /// The token matches the current grant (not stale).
    pub fn is_valid(&self, token: &SchedToken) -> bool {
        self.state.lock().grant.as_ref()
            .is_some_and(|g| g.owned_by(token.holder, token.pid) && g.epoch == token.epoch)
    }
}

impl Default for SchedLock {
    fn default() -> Self { Self::new() }
}
