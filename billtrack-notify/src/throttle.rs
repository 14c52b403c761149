//! Persisted minimum-interval throttle for social posts.
//!
//! The timestamp of the last post lives on disk so the spacing survives
//! process restarts; a burst of NEW bills right after a deploy still goes
//! out one post per interval.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{io_err, NotifyError};

pub struct PersistedThrottle {
    path: PathBuf,
    min_interval: Duration,
}

impl PersistedThrottle {
    pub fn new(path: impl Into<PathBuf>, min_interval: Duration) -> Self {
        PersistedThrottle {
            path: path.into(),
            min_interval,
        }
    }

    /// Block until the interval since the last recorded post has elapsed,
    /// then record now as the last post time.
    pub fn wait_and_mark(&self) -> Result<(), NotifyError> {
        if !self.min_interval.is_zero() {
            if let Some(remaining) = self.remaining() {
                std::thread::sleep(remaining);
            }
        }
        self.mark()
    }

    fn remaining(&self) -> Option<Duration> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let last_secs: f64 = raw.trim().parse().ok()?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        let elapsed = now.as_secs_f64() - last_secs;
        if elapsed < 0.0 {
            // Clock went backwards; treat the full interval as pending.
            return Some(self.min_interval);
        }
        let elapsed = Duration::from_secs_f64(elapsed);
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }

    fn mark(&self) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| {
                io_err(
                    &self.path,
                    std::io::Error::new(std::io::ErrorKind::Other, e),
                )
            })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{}", now.as_secs_f64())).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn first_post_is_not_delayed() {
        let dir = TempDir::new().unwrap();
        let throttle =
            PersistedThrottle::new(dir.path().join("last_post"), Duration::from_secs(60));
        let before = Instant::now();
        throttle.wait_and_mark().unwrap();
        assert!(before.elapsed() < Duration::from_millis(100));
        assert!(dir.path().join("last_post").exists());
    }

    #[test]
    fn second_post_waits_out_the_interval() {
        let dir = TempDir::new().unwrap();
        let throttle =
            PersistedThrottle::new(dir.path().join("last_post"), Duration::from_millis(60));
        throttle.wait_and_mark().unwrap();
        let before = Instant::now();
        throttle.wait_and_mark().unwrap();
        assert!(before.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn corrupt_state_file_does_not_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_post");
        fs::write(&path, "not a number").unwrap();
        let throttle = PersistedThrottle::new(&path, Duration::from_secs(60));
        let before = Instant::now();
        throttle.wait_and_mark().unwrap();
        assert!(before.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn zero_interval_never_sleeps() {
        let dir = TempDir::new().unwrap();
        let throttle = PersistedThrottle::new(dir.path().join("last_post"), Duration::ZERO);
        throttle.wait_and_mark().unwrap();
        let before = Instant::now();
        throttle.wait_and_mark().unwrap();
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
