// Sequential query loop plus the worker-thread session the GUI talks to.
use crate::model::{BatchSummary, PhoneRecord};
use crate::normalizer::normalize;
use crate::parser::Ip138Parser;
use crate::scraper::Fetch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Runs the full pipeline over `phones`, strictly one at a time.
///
/// `should_continue` is consulted before each item; flipping it false stops
/// the loop at the next iteration boundary, never mid-fetch. Each finished
/// record is handed to `on_record` immediately so callers can render partial
/// progress, then the loop pauses for `delay` before the next request.
pub fn run_batch<F, C, R>(
    fetcher: &F,
    parser: &Ip138Parser,
    phones: &[String],
    delay: Duration,
    should_continue: C,
    mut on_record: R,
) -> BatchSummary
where
    F: Fetch,
    C: Fn() -> bool,
    R: FnMut(PhoneRecord),
{
    let mut summary = BatchSummary {
        attempted: 0,
        succeeded: 0,
        total: phones.len(),
    };

    for phone in phones {
        if !should_continue() {
            info!(
                "batch stopped after {} of {} queries",
                summary.attempted, summary.total
            );
            break;
        }

        info!("querying {}", phone);
        let record = normalize(phone, fetcher.fetch(phone), parser);

        summary.attempted += 1;
        if record.success {
            summary.succeeded += 1;
        } else {
            warn!(
                "query failed for {}: {}",
                phone,
                record.error.as_deref().unwrap_or("unknown")
            );
        }

        on_record(record);

        // Fixed pause between requests; the upstream site throttles anything
        // faster.
        thread::sleep(delay);
    }

    summary
}

pub enum BatchEvent {
    Record(PhoneRecord),
    Finished(BatchSummary),
}

/// One running batch, living on its own thread. The UI polls `try_next` each
/// frame; the worker never touches UI state. At most one session exists at a
/// time — the GUI refuses to start a second one while this is alive.
pub struct QuerySession {
    stop: Arc<AtomicBool>,
    events: Receiver<BatchEvent>,
}

impl QuerySession {
    pub fn spawn<F>(fetcher: F, parser: Ip138Parser, phones: Vec<String>, delay: Duration) -> Self
    where
        F: Fetch + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let (tx, events) = mpsc::channel();

        thread::spawn(move || {
            let sender: Sender<BatchEvent> = tx;
            let summary = run_batch(
                &fetcher,
                &parser,
                &phones,
                delay,
                || !stop_flag.load(Ordering::Relaxed),
                |record| {
                    let _ = sender.send(BatchEvent::Record(record));
                },
            );
            let _ = sender.send(BatchEvent::Finished(summary));
        });

        Self { stop, events }
    }

    /// Cooperative stop: the in-flight fetch still completes, the loop exits
    /// before picking up the next number.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn try_next(&self) -> Option<BatchEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for QuerySession {
    fn drop(&mut self) {
        // The detached worker checks this flag and winds down on its own.
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchError;
    use std::cell::Cell;

    const RESULT_PAGE: &str = r#"
        <table>
          <tr><td>查询结果</td><td></td></tr>
          <tr><td>归属地</td><td>北京</td></tr>
        </table>"#;

    /// Serves a canned page, or a 404 for numbers listed as failing.
    struct StubFetcher {
        failing: Vec<&'static str>,
    }

    impl Fetch for StubFetcher {
        fn fetch(&self, phone: &str) -> Result<String, FetchError> {
            if self.failing.iter().any(|&f| f == phone) {
                Err(FetchError::HttpStatus(404))
            } else {
                Ok(RESULT_PAGE.to_string())
            }
        }
    }

    fn phones(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("1380013800{}", i)).collect()
    }

    #[test]
    fn delivers_records_in_input_order() {
        let fetcher = StubFetcher { failing: vec![] };
        let parser = Ip138Parser::new();
        let list = phones(3);
        let mut seen = Vec::new();

        let summary = run_batch(
            &fetcher,
            &parser,
            &list,
            Duration::ZERO,
            || true,
            |record| seen.push(record.phone.clone()),
        );

        assert_eq!(seen, list);
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn per_item_failure_does_not_abort_the_batch() {
        let fetcher = StubFetcher {
            failing: vec!["13800138001"],
        };
        let parser = Ip138Parser::new();
        let list = phones(3);
        let mut records = Vec::new();

        let summary = run_batch(
            &fetcher,
            &parser,
            &list,
            Duration::ZERO,
            || true,
            |record| records.push(record),
        );

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert!(!records[1].success);
        assert_eq!(records[1].error.as_deref(), Some("HTTP错误: 404"));
        assert!(records[2].success);
    }

    #[test]
    fn stop_flag_halts_before_the_next_item() {
        let fetcher = StubFetcher { failing: vec![] };
        let parser = Ip138Parser::new();
        let list = phones(5);
        let delivered = Cell::new(0usize);

        let summary = run_batch(
            &fetcher,
            &parser,
            &list,
            Duration::ZERO,
            || delivered.get() < 2,
            |_| delivered.set(delivered.get() + 1),
        );

        assert_eq!(delivered.get(), 2);
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.total, 5);
    }

    #[test]
    fn session_streams_records_then_summary() {
        let fetcher = StubFetcher { failing: vec![] };
        let session = QuerySession::spawn(fetcher, Ip138Parser::new(), phones(2), Duration::ZERO);

        let mut records = 0;
        loop {
            match session
                .events
                .recv_timeout(Duration::from_secs(5))
                .expect("worker went silent")
            {
                BatchEvent::Record(record) => {
                    assert!(record.success);
                    records += 1;
                }
                BatchEvent::Finished(summary) => {
                    assert_eq!(summary.attempted, 2);
                    assert_eq!(summary.succeeded, 2);
                    break;
                }
            }
        }
        assert_eq!(records, 2);
    }
}
