//! The request/result pipeline a `Calculator` front end talks to.
//!
//! The reference ran two fixed-size ring buffers (`QVector<Request>` /
//! `QVector<Result>`, each [`BUFFER_SIZE`] slots) gated by a pair of
//! semaphores apiece, and a dedicated `QThread` per direction polling its
//! semaphore with a timeout (`request_time` = 600ms, `result_time` = 700ms)
//! so it could still notice a shutdown flag between requests. A bounded
//! `crossbeam_channel` gives the same backpressure and the same "don't spin
//! forever" polling discipline without hand-rolling the ring buffer: the
//! channel itself is the buffer, and `recv_timeout` replaces the
//! semaphore-with-timeout acquire.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::calculator::{evaluate, Request, ResultRecord};
use crate::control::StopToken;
use crate::prng::Prng;

/// Ring buffer depth in the reference's `_tp::buff_size`.
pub const BUFFER_SIZE: usize = 256;

/// How long the request worker blocks on an empty queue before re-checking
/// for a stop signal, matching `ro::request_time`.
pub const REQUEST_POLL: Duration = Duration::from_millis(600);

/// How long the result worker blocks on an empty queue before re-checking,
/// matching `ro::result_time`.
pub const RESULT_POLL: Duration = Duration::from_millis(700);

/// The request-submission half of a pipeline. Cheap to clone; every clone
/// shares the same bounded queue.
#[derive(Clone)]
pub struct RequestSender(Sender<Request>);

impl RequestSender {
    /// Enqueues `request`, returning it back on failure instead of blocking
    /// the caller — a full queue means the worker is behind, not that the
    /// request should wait indefinitely on a UI thread.
    pub fn try_send(&self, request: Request) -> Result<(), Request> {
        match self.0.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(r)) | Err(TrySendError::Disconnected(r)) => Err(r),
        }
    }
}

/// The result-retrieval half of a pipeline.
#[derive(Clone)]
pub struct ResultReceiver(Receiver<ResultRecord>);

impl ResultReceiver {
    /// Blocks up to [`RESULT_POLL`] for the next completed result.
    pub fn recv_timeout(&self) -> Option<ResultRecord> {
        match self.0.recv_timeout(RESULT_POLL) {
            Ok(r) => Some(r),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// A running worker thread draining requests and evaluating them, plus the
/// handles needed to feed it and collect its output.
pub struct Pipeline {
    requests: RequestSender,
    results: ResultReceiver,
    worker: Option<JoinHandle<()>>,
    stop: StopToken,
}

impl Pipeline {
    /// Spawns the worker thread. `stop` is polled both between requests
    /// (to end the thread) and inside a running factorization (to cancel
    /// it without tearing the thread down).
    pub fn spawn(stop: StopToken, seed: u64) -> Self {
        let (req_tx, req_rx) = crossbeam_channel::bounded::<Request>(BUFFER_SIZE);
        let (res_tx, res_rx) = crossbeam_channel::bounded::<ResultRecord>(BUFFER_SIZE);
        let worker_stop = stop.clone();

        let worker = std::thread::spawn(move || {
            let mut rng = Prng::seed_from(seed);
            loop {
                match req_rx.recv_timeout(REQUEST_POLL) {
                    Ok(request) => {
                        let record = evaluate(request, &mut rng, &worker_stop);
                        if res_tx.send(record).is_err() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if worker_stop.is_stopped() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            requests: RequestSender(req_tx),
            results: ResultReceiver(res_rx),
            worker: Some(worker),
            stop,
        }
    }

    pub fn requests(&self) -> RequestSender {
        self.requests.clone()
    }

    pub fn results(&self) -> ResultReceiver {
        self.results.clone()
    }

    /// Signals the worker to stop and joins its thread. Any in-flight
    /// factorization unwinds via its own `StopToken` polling first.
    pub fn shutdown(mut self) {
        self.stop.request_stop();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop.request_stop();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ADD;
    use crate::decimal::Decimal;

    #[test]
    fn round_trips_a_single_request() {
        let stop = StopToken::new();
        let pipeline = Pipeline::spawn(stop, 7);
        let requests = pipeline.requests();
        let results = pipeline.results();

        requests
            .try_send(Request {
                operation: ADD,
                operands: [Decimal::parse("2"), Decimal::parse("3")],
            })
            .expect("queue has room");

        let record = results.recv_timeout().expect("worker answers within the poll window");
        assert_eq!(record.result[0].value(), "5");

        pipeline.shutdown();
    }

    #[test]
    fn shutdown_joins_the_worker_thread() {
        let stop = StopToken::new();
        let pipeline = Pipeline::spawn(stop, 1);
        pipeline.shutdown();
    }
}
