use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawns a task that logs `report()` every `interval`.
///
/// The report runs on the heartbeat task, so it doubles as a place for periodic
/// housekeeping (expiring sessions and the like).
pub fn start<T, F>(service_id: T, interval: Duration, report: F) -> JoinHandle<()>
where
    T: Into<String>,
    F: FnMut() -> String + Send + 'static,
{
    tokio::spawn(worker(service_id.into(), interval, report))
}

async fn worker<F>(id: String, interval: Duration, mut report: F)
where
    F: FnMut() -> String + Send + 'static,
{
    info!(service = %id, ?interval, "heartbeat started");

    let mut timer = tokio::time::interval(interval);
    let mut beats: u64 = 0;
    loop {
        timer.tick().await;
        beats += 1;
        if id.is_empty() {
            error!("heartbeat service id is empty");
            continue;
        }
        info!(service = %id, beats, "alive: {}", report());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn report_runs_every_tick() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = start("test", Duration::from_secs(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            String::new()
        });

        // first tick fires immediately, then one per interval
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        handle.abort();
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }
}
