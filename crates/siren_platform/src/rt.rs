//! Real-Time Hoists
//!
//! The sampling loop cannot afford a page fault or a scheduler preemption
//! mid-window. On Linux the process pins its pages with `mlockall` for the
//! duration of a window and asks for maximum `SCHED_FIFO` priority once at
//! startup. Both are best-effort: a failure is logged and sampling carries
//! on, it just jitters more. Other targets compile these to no-ops.

use tracing::{debug, warn};

/// Scoped page lock held across one sampling window
///
/// Dropping the guard releases the lock. Failure to acquire is recorded on
/// the guard but is not an error.
pub struct MemoryLockGuard {
    locked: bool,
}

impl MemoryLockGuard {
    #[cfg(target_os = "linux")]
    pub fn acquire() -> Self {
        // Current and future pages: the FFT scratch is already allocated,
        // but the stack can still grow under us.
        let rc = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
        if rc != 0 {
            warn!(
                errno = std::io::Error::last_os_error().raw_os_error(),
                "mlockall failed, sampling without a page lock"
            );
        }
        Self { locked: rc == 0 }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn acquire() -> Self {
        debug!("memory locking not supported on this target");
        Self { locked: false }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for MemoryLockGuard {
    fn drop(&mut self) {
        #[cfg(target_os = "linux")]
        if self.locked {
            unsafe {
                libc::munlockall();
            }
        }
    }
}

/// Move the calling process to the maximum `SCHED_FIFO` priority
///
/// Called once at startup. Returns whether the promotion took effect;
/// running unprivileged it usually does not, which is fine for replay runs.
#[cfg(target_os = "linux")]
pub fn promote_to_fifo() -> bool {
    unsafe {
        let priority = libc::sched_get_priority_max(libc::SCHED_FIFO);
        let param = libc::sched_param {
            sched_priority: priority,
        };
        let rc = libc::sched_setscheduler(0, libc::SCHED_FIFO, &param);
        if rc != 0 {
            warn!(
                errno = std::io::Error::last_os_error().raw_os_error(),
                "SCHED_FIFO promotion failed, staying on the default scheduler"
            );
            return false;
        }
        debug!(priority, "running under SCHED_FIFO");
        true
    }
}

#[cfg(not(target_os = "linux"))]
pub fn promote_to_fifo() -> bool {
    debug!("real-time scheduling not supported on this target");
    false
}
