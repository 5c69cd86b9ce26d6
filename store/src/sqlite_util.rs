//! Opening SQLite files with owner-only permissions, plus timestamp formatting
//! for `created_at` columns.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (creating if needed) a read-write database at `path`.
///
/// The parent directory is created and tightened to 0o700 and the database
/// file to 0o600 before SQLite ever touches it. Existing WAL/SHM sidecars are
/// tightened too. Permission changes are Unix-only.
pub(crate) fn open_secure_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_private_dir(parent)?;
    }
    ensure_private_file(path)?;

    Connection::open(path).with_context(|| format!("Failed to open database at {}", path.display()))
}

fn ensure_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let metadata = fs::metadata(dir)
            .with_context(|| format!("Failed to read directory metadata: {}", dir.display()))?;
        // Directories owned by someone else (e.g. a shared /tmp) are left alone.
        let our_uid = unsafe { libc::getuid() };
        if metadata.uid() == our_uid && metadata.permissions().mode() & 0o077 != 0 {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).with_context(|| {
                format!("Failed to set directory permissions: {}", dir.display())
            })?;
        }
    }
    Ok(())
}

fn ensure_private_file(path: &Path) -> Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).truncate(false).read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .with_context(|| format!("Failed to create database file: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set database permissions: {}", path.display()))?;
        for sidecar in ["-wal", "-shm"].map(|suffix| sidecar_path(path, suffix)) {
            if sidecar.exists() {
                let _ = fs::set_permissions(&sidecar, fs::Permissions::from_mode(0o600));
            }
        }
    }
    Ok(())
}

/// `lico.db` -> `lico.db-wal`.
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Current time as `YYYY-MM-DDTHH:MM:SSZ` (UTC).
pub(crate) fn now_iso8601() -> String {
    format_iso8601(SystemTime::now())
}

fn format_iso8601(time: SystemTime) -> String {
    let secs = time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let (year, month, day) = civil_from_days(secs / 86_400);
    let time_of_day = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        time_of_day / 3600,
        time_of_day % 3600 / 60,
        time_of_day % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date (Howard Hinnant's algorithm).
fn civil_from_days(days: u64) -> (i64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = (yoe + era * 400) as i64 + i64::from(month <= 2);
    (year, month, day)
}
