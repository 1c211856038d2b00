//! Ordered, bounded and cancellable fan-out over a list of targets.
//!
//! Every target gets its own task. A semaphore caps how many run at once and
//! results are written into a slot per input position, so the output order is
//! the input order no matter which task finishes first.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use reachr_common::checks::BatchOptions;
use reachr_common::result::notes;

/// Receives the number of targets finished so far.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

pub(crate) const TASK_FAILED: &str = "probe task failed";

enum Slot<T> {
    Pending,
    NotStarted,
    Done(T),
}

/// Runs `probe_one` for every target and returns one outcome per target, in input order.
///
/// Targets that never got a permit before `cancel` fired (or the deadline in
/// `opts` elapsed) are filled in by `placeholder` with [`notes::CANCELLED`].
/// Targets whose task died are filled in with [`TASK_FAILED`].
pub(crate) async fn run_ordered<T, F, Fut, P>(
    targets: Vec<String>,
    opts: &BatchOptions,
    cancel: &CancellationToken,
    progress: Option<&ProgressFn>,
    probe_one: F,
    placeholder: P,
) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(String, CancellationToken) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    P: Fn(String, &str) -> T,
{
    let token: CancellationToken = cancel.child_token();
    let watchdog = opts.deadline.map(|deadline| {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            debug!("Batch deadline of {}ms reached", deadline.as_millis());
            token.cancel();
        })
    });

    let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(opts.concurrency));
    let mut tasks: JoinSet<(usize, Option<T>)> = JoinSet::new();

    for (idx, target) in targets.iter().enumerate() {
        let probe = probe_one(target.clone(), token.clone());
        let semaphore = semaphore.clone();
        let token = token.clone();

        tasks.spawn(async move {
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                permit = semaphore.acquire_owned() => permit.ok(),
            };
            let Some(_permit) = permit else {
                return (idx, None);
            };
            (idx, Some(probe.await))
        });
    }

    let mut slots: Vec<Slot<T>> = targets.iter().map(|_| Slot::Pending).collect();
    let mut finished: usize = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, Some(outcome))) => slots[idx] = Slot::Done(outcome),
            Ok((idx, None)) => slots[idx] = Slot::NotStarted,
            Err(e) => error!("Probe task failed: {e}"),
        }
        finished += 1;
        if let Some(progress) = progress {
            progress(finished);
        }
    }

    if let Some(watchdog) = watchdog {
        watchdog.abort();
    }

    slots
        .into_iter()
        .zip(targets)
        .map(|(slot, target)| match slot {
            Slot::Done(outcome) => outcome,
            Slot::NotStarted => placeholder(target, notes::CANCELLED),
            Slot::Pending => placeholder(target, TASK_FAILED),
        })
        .collect()
}

/// Drives `future` unless `token` fires first.
pub(crate) async fn until_cancelled<F: Future>(token: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = future => Some(output),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
