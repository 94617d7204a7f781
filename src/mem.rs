use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use sysinfo::{System, SystemExt};

/// Cached, low-overhead memory watcher.
/// - Refreshes at most every `REFRESH_EVERY`.
/// - Backs the shuffle auto-strategy: buffer only when RAM plainly allows it.
struct MemState {
    sys: System,
    last_check: Instant,
    last_avail: u64, // bytes
}

static STATE: OnceLock<Mutex<MemState>> = OnceLock::new();
const REFRESH_EVERY: Duration = Duration::from_millis(500);

fn with_state<F, T>(f: F) -> T
where
    F: FnOnce(&mut MemState) -> T,
{
    let m = STATE.get_or_init(|| {
        let mut s = System::new();
        s.refresh_memory();
        let avail = s.available_memory();
        Mutex::new(MemState {
            sys: s,
            last_check: Instant::now(),
            last_avail: avail,
        })
    });
    let mut guard = m.lock().unwrap();
    f(&mut guard)
}

/// Returns a recent estimate of available memory in bytes.
pub fn available_memory_bytes() -> u64 {
    with_state(|st| {
        let now = Instant::now();
        if now.duration_since(st.last_check) >= REFRESH_EVERY {
            st.sys.refresh_memory();
            st.last_avail = st.sys.available_memory();
            st.last_check = now;
        }
        st.last_avail
    })
}

/// Headroom factor covering per-row allocation overhead and output buffers
/// on top of the raw file bytes.
const IN_MEMORY_HEADROOM: u64 = 4;

/// True when buffering `bytes` of row data leaves ample RAM to spare.
pub fn fits_in_memory(bytes: u64) -> bool {
    bytes.saturating_mul(IN_MEMORY_HEADROOM) < available_memory_bytes()
}
