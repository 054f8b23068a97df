//! Background retention for retired segments.
//!
//! Rotation only renames the active file; purging and gzipping happen on a
//! dedicated thread so writers never wait on them. Requests that pile up
//! while a pass is running collapse into one pass.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use chrono::{DateTime, Utc};

use crate::rotation::{backups, RotationPolicy};

enum Request {
    Run(DateTime<Utc>),
    Settle(Sender<()>),
}

/// Handle to the maintenance thread of one active file.
#[derive(Debug, Clone)]
pub struct Maintenance {
    tx: Sender<Request>,
}

impl Maintenance {
    /// Start the maintenance thread. It exits once every handle is dropped.
    pub fn spawn(policy: RotationPolicy) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("log-maintenance".into())
            .spawn(move || run(policy, rx))?;
        Ok(Self { tx })
    }

    /// Queue a retention pass evaluated at `now`.
    pub fn schedule(&self, now: DateTime<Utc>) {
        if self.tx.send(Request::Run(now)).is_err() {
            tracing::warn!("Log maintenance thread is gone, retention skipped");
        }
    }

    /// Block until every pass queued before this call has finished.
    pub fn settle(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.tx.send(Request::Settle(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

fn run(policy: RotationPolicy, rx: Receiver<Request>) {
    while let Ok(request) = rx.recv() {
        let mut latest = match request {
            Request::Run(now) => now,
            Request::Settle(done) => {
                let _ = done.send(());
                continue;
            }
        };

        let mut waiters = Vec::new();
        while let Ok(next) = rx.try_recv() {
            match next {
                Request::Run(now) => latest = latest.max(now),
                Request::Settle(done) => waiters.push(done),
            }
        }

        match backups::enforce(
            &policy.path,
            policy.max_backups,
            policy.max_age_days,
            policy.compress,
            latest,
        ) {
            Ok(removed) if !removed.is_empty() => {
                tracing::debug!(count = removed.len(), "Purged retired log segments");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                path = %policy.path.display(),
                error = %e,
                "Log retention pass failed"
            ),
        }

        for done in waiters {
            let _ = done.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scheduled_passes_enforce_limits() {
        let dir = tempfile::tempdir().unwrap();
        let active = dir.path().join("app.log");
        let now = Utc::now();
        for i in 0..4 {
            let at = now - chrono::Duration::minutes(i);
            fs::write(backups::backup_path(&active, at), vec![b'x'; 256 * 1024]).unwrap();
        }

        let maintenance = Maintenance::spawn(RotationPolicy {
            path: active.clone(),
            max_bytes: 1024,
            max_age_days: 0,
            max_backups: 2,
            compress: true,
        })
        .unwrap();

        maintenance.schedule(now);
        maintenance.schedule(now);
        maintenance.settle();

        let retired = backups::list_backups(&active).unwrap();
        assert_eq!(retired.len(), 2);
        assert!(retired.iter().all(|b| b.compressed));
    }

    #[test]
    fn test_settle_without_work_returns() {
        let dir = tempfile::tempdir().unwrap();
        let maintenance = Maintenance::spawn(RotationPolicy {
            path: dir.path().join("app.log"),
            max_bytes: 1024,
            max_age_days: 0,
            max_backups: 0,
            compress: false,
        })
        .unwrap();
        maintenance.settle();
        maintenance.clone().settle();
    }
}
