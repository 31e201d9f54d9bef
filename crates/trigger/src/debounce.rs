//! Trailing-edge debouncer.
//!
//! Values are submitted under a key. A value fires only once its key has been
//! quiet for the whole window; a newer value for the same key replaces the
//! pending one and restarts the window. Fired values run on their own task,
//! so a slow handler never delays other keys and is never cancelled by later
//! submissions.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Handle for submitting values to a running debounce task.
///
/// Dropping every handle closes the channel; values still pending at that
/// point fire immediately and the task exits.
pub struct Debouncer<K, V> {
    tx: mpsc::UnboundedSender<(K, V)>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    /// Starts the debounce task on the current Tokio runtime.
    pub fn spawn<F, Fut>(window: Duration, fire: F) -> (Self, JoinHandle<()>)
    where
        F: Fn(V) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(rx, window, fire));
        (Self { tx }, handle)
    }

    /// Queues `value` under `key`. Returns `false` if the task has stopped.
    pub fn submit(&self, key: K, value: V) -> bool {
        self.tx.send((key, value)).is_ok()
    }
}

async fn run<K, V, F, Fut>(mut rx: mpsc::UnboundedReceiver<(K, V)>, window: Duration, fire: F)
where
    K: Eq + Hash + Clone,
    F: Fn(V) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut pending: HashMap<K, (Instant, V)> = HashMap::new();

    loop {
        let next_deadline = pending.values().map(|(deadline, _)| *deadline).min();

        tokio::select! {
            received = rx.recv() => match received {
                Some((key, value)) => {
                    trace!("Debounce window restarted");
                    pending.insert(key, (Instant::now() + window, value));
                }
                None => break,
            },
            () = sleep_until(next_deadline) => {
                let now = Instant::now();
                let due: Vec<K> = pending
                    .iter()
                    .filter(|(_, (deadline, _))| *deadline <= now)
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in due {
                    if let Some((_, value)) = pending.remove(&key) {
                        tokio::spawn(fire(value));
                    }
                }
            }
        }
    }

    for (_, (_, value)) in pending.drain() {
        tokio::spawn(fire(value));
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
