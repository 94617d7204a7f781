use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

// -------- Robust file ops with backoff (Windows-friendly) --------

/// Transient/retriable I/O errors often seen on Windows when filter drivers
/// (AV/backup), USB/NAS volumes, or sharing violations occur.
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        // 5 = access denied (often AV/share), 21 = device not ready,
        // 32/33 = sharing/lock violation, 225 = AV blocked file,
        // 433 = device does not exist, 1006 = volume externally altered,
        // 1117 = I/O device error, 1224 = user-mapped section open
        Some(5) | Some(21) | Some(32) | Some(33) | Some(225) | Some(433) | Some(1006)
            | Some(1117) | Some(1224)
    )
}

const IO_TRIES: usize = 16;
const IO_DELAY_MS: u64 = 50;

/// Run one filesystem operation with bounded retry/backoff on transient
/// errors; non-transient errors surface immediately.
fn retry_io<T, F>(mut op: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut last_err: Option<io::Error> = None;
    for i in 0..IO_TRIES {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(IO_DELAY_MS.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "io retries exhausted")))
}

pub fn open_file(path: &Path) -> Result<File> {
    retry_io(|| File::open(path)).with_context(|| format!("open {}", path.display()))
}

pub fn create_file(path: &Path) -> Result<File> {
    retry_io(|| File::create(path)).with_context(|| format!("create {}", path.display()))
}

/// Succeeds if the file is already gone.
pub fn remove_file(path: &Path) -> Result<()> {
    retry_io(|| match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    })
    .with_context(|| format!("remove {}", path.display()))
}

fn rename_file(src: &Path, dest: &Path) -> Result<()> {
    retry_io(|| fs::rename(src, dest))
        .with_context(|| format!("rename {} -> {}", src.display(), dest.display()))
}

/// Replace `dest` with `src`, overwriting any existing destination. Falls
/// back to copy+remove when rename is refused (cross-volume, sharing).
pub fn replace_file(src: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        remove_file(dest)?;
    }
    if rename_file(src, dest).is_ok() {
        return Ok(());
    }
    retry_io(|| fs::copy(src, dest).map(|_| ()))
        .with_context(|| format!("copy {} -> {}", src.display(), dest.display()))?;
    remove_file(src)
}
