//! Directory search: the name/email filter and a debouncer for
//! as-you-type queries.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::types::User;

/// Users whose name or email contains `query`, ignoring case. An empty
/// query matches everyone.
pub fn filter_users<'a, T: AsRef<User>>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| item.as_ref().matches(query))
        .collect()
}

pub fn people_label(count: usize) -> &'static str {
    if count == 1 {
        "person"
    } else {
        "people"
    }
}

/// "Found 1 person matching "x"" style summary for a non-empty query.
pub fn found_summary(count: usize, query: &str) -> Option<String> {
    if query.is_empty() {
        return None;
    }
    Some(format!(
        "Found {count} {} matching \"{query}\"",
        people_label(count)
    ))
}

pub fn showing_summary(count: usize) -> String {
    format!("Showing {count} {}", people_label(count))
}

/// Delays a callback until input has been quiet for `delay`.
///
/// Each new value replaces the pending one and restarts the timer. A single
/// worker task runs the callback, so invocations never overlap.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, mut callback: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    Some(value) => {
                        tokio::select! {
                            next = rx.recv() => match next {
                                Some(newer) => pending = Some(newer),
                                None => {
                                    callback(value).await;
                                    break;
                                }
                            },
                            _ = sleep(delay) => callback(value).await,
                        }
                    }
                }
            }
        });

        Self { tx, worker }
    }

    pub fn push(&self, value: T) {
        // The worker only stops once this sender is gone.
        let _ = self.tx.send(value);
    }

    /// Run any pending value immediately and wait for the worker to finish.
    pub async fn finish(self) {
        let Self { tx, worker } = self;
        drop(tx);
        let _ = worker.await;
    }

    /// Drop any pending value without running it.
    pub fn cancel(self) {
        self.worker.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::user;
    use std::sync::{Arc, Mutex};

    fn directory() -> Vec<User> {
        let mut leanne = user(1, "Leanne Graham");
        leanne.email = "Sincere@april.biz".to_string();
        let mut ervin = user(2, "Ervin Howell");
        ervin.email = "Shanna@melissa.tv".to_string();
        let mut clementine = user(3, "Clementine Bauch");
        clementine.email = "Nathan@yesenia.net".to_string();
        vec![leanne, ervin, clementine]
    }

    #[test]
    fn test_filter_by_name_case_insensitive() {
        let users = directory();
        let found = filter_users(&users, "GRAHAM");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn test_filter_by_email() {
        let users = directory();
        let found = filter_users(&users, "melissa.tv");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn test_filter_matches_across_users() {
        let users = directory();
        // "an" hits Leanne by name, Shanna and Nathan by email
        assert_eq!(filter_users(&users, "an").len(), 3);
        assert_eq!(filter_users(&users, "").len(), 3);
        assert!(filter_users(&users, "zzz").is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(people_label(0), "people");
        assert_eq!(people_label(1), "person");
        assert_eq!(people_label(2), "people");
        assert_eq!(showing_summary(1), "Showing 1 person");
        assert_eq!(
            found_summary(0, "zzz").as_deref(),
            Some("Found 0 people matching \"zzz\"")
        );
        assert_eq!(found_summary(3, ""), None);
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Debouncer<String>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(Duration::from_millis(300), move |query: String| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(query);
            }
        });
        (calls, debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_keeps_last_value() {
        let (calls, debouncer) = recorder();

        debouncer.push("l".to_string());
        sleep(Duration::from_millis(100)).await;
        debouncer.push("le".to_string());
        sleep(Duration::from_millis(100)).await;
        debouncer.push("lea".to_string());
        sleep(Duration::from_millis(350)).await;

        assert_eq!(*calls.lock().unwrap(), vec!["lea".to_string()]);

        debouncer.push("ervin".to_string());
        sleep(Duration::from_millis(350)).await;
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["lea".to_string(), "ervin".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_finish_flushes_pending() {
        let (calls, debouncer) = recorder();

        debouncer.push("graham".to_string());
        debouncer.finish().await;

        assert_eq!(*calls.lock().unwrap(), vec!["graham".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_cancel_drops_pending() {
        let (calls, debouncer) = recorder();

        debouncer.push("graham".to_string());
        debouncer.cancel();
        sleep(Duration::from_millis(500)).await;

        assert!(calls.lock().unwrap().is_empty());
    }
}
