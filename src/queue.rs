/*!
Hands records from a reader running on a worker thread to any number of
consumer threads.

The worker parses the stream and sends each record down a channel as soon
as it is complete. Consumers share the receiving end through cloned
[`RecordQueue`] handles, and records come out in stream order.

```
use fastcsv::queue::QueueBuilder;
use fastcsv::Reader;

let rdr = Reader::from_text("a,b\nc,d\n");
let queue = QueueBuilder::new().capacity(Some(16)).spawn(rdr)?;
let records: Vec<_> = queue.clone().map(|r| r.unwrap()).collect();
assert_eq!(records.len(), 2);
assert_eq!(queue.join()?, 2);
# Ok::<(), fastcsv::Error>(())
```
*/

use std::io;
use std::panic;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use fastcsv_core::Record;

use crate::error::Result;
use crate::reader::Reader;

/// Builds a record queue.
#[derive(Clone, Debug, Default)]
pub struct QueueBuilder {
    capacity: Option<usize>,
}

impl QueueBuilder {
    /// Create a new builder for an unbounded queue.
    pub fn new() -> QueueBuilder {
        QueueBuilder::default()
    }

    /// Bound the number of records waiting in the queue.
    ///
    /// When the queue is full, the worker blocks until a consumer catches
    /// up. `None`, the default, never blocks the worker.
    pub fn capacity(&mut self, capacity: Option<usize>) -> &mut QueueBuilder {
        self.capacity = capacity;
        self
    }

    /// Start parsing `rdr` on a new worker thread.
    ///
    /// The worker stops at the end of the stream, after a read error (which
    /// is delivered to consumers as the last item) or once every handle to
    /// the queue has been dropped.
    pub fn spawn<R>(&self, mut rdr: Reader<R>) -> Result<RecordQueue>
    where
        R: io::Read + Send + 'static,
    {
        let (tx, rx) = match self.capacity {
            None => {
                let (tx, rx) = mpsc::channel();
                (Tx::Unbounded(tx), rx)
            }
            Some(cap) => {
                let (tx, rx) = mpsc::sync_channel(cap);
                (Tx::Bounded(tx), rx)
            }
        };
        let handle = thread::Builder::new()
            .name("fastcsv-queue".to_string())
            .spawn(move || {
                debug!("queue worker started");
                let mut sent = 0;
                loop {
                    let item = match rdr.read_record() {
                        Ok(Some(record)) => Ok(record),
                        Ok(None) => break,
                        Err(err) => Err(err),
                    };
                    let failed = item.is_err();
                    if !tx.send(item) {
                        debug!("every consumer is gone, stopping early");
                        break;
                    }
                    if failed {
                        warn!("queue worker stopped by a read error");
                        break;
                    }
                    sent += 1;
                }
                debug!("queue worker sent {} records", sent);
                sent
            })?;
        Ok(RecordQueue {
            rx: Arc::new(Mutex::new(rx)),
            worker: Arc::new(Mutex::new(Some(handle))),
        })
    }
}

enum Tx {
    Unbounded(Sender<Result<Record>>),
    Bounded(SyncSender<Result<Record>>),
}

impl Tx {
    /// Returns false if nobody is listening anymore.
    fn send(&self, item: Result<Record>) -> bool {
        match *self {
            Tx::Unbounded(ref tx) => tx.send(item).is_ok(),
            Tx::Bounded(ref tx) => tx.send(item).is_ok(),
        }
    }
}

/// A shared handle to the records produced by a queue worker.
///
/// Handles are cheap to clone and may be moved to other threads. Every
/// record is delivered to exactly one handle. Iterating a handle blocks
/// until the next record is ready and ends when the worker is done.
#[derive(Clone, Debug)]
pub struct RecordQueue {
    rx: Arc<Mutex<Receiver<Result<Record>>>>,
    worker: Arc<Mutex<Option<JoinHandle<u64>>>>,
}

impl RecordQueue {
    /// Block until the next record is ready.
    ///
    /// This returns `None` once the worker is done and the queue is empty.
    pub fn recv(&self) -> Option<Result<Record>> {
        let rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
        rx.recv().ok()
    }

    /// Take the next record if one is ready, without blocking.
    ///
    /// While another handle is waiting in [`recv`](RecordQueue::recv), no
    /// record can be ready for this one, so this reports
    /// `TryRecvError::Empty`.
    pub fn try_recv(
        &self,
    ) -> std::result::Result<Result<Record>, TryRecvError> {
        let rx = match self.rx.try_lock() {
            Ok(rx) => rx,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(TryRecvError::Empty),
        };
        rx.try_recv()
    }

    /// Wait for the worker to finish and return the number of records it
    /// delivered.
    ///
    /// If this is the last handle, records still waiting in the queue are
    /// dropped and the worker stops early. Otherwise the worker keeps going
    /// until the remaining handles drain it or are dropped, so with a
    /// bounded queue this blocks for as long as they hold on without
    /// reading. If another handle already joined the worker, this returns
    /// `0` right away.
    ///
    /// # Panics
    ///
    /// If the worker panicked, the panic is resumed on the calling thread.
    pub fn join(self) -> Result<u64> {
        let RecordQueue { rx, worker } = self;
        drop(rx);
        let handle = worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        match handle {
            None => Ok(0),
            Some(handle) => match handle.join() {
                Ok(sent) => Ok(sent),
                Err(payload) => panic::resume_unwind(payload),
            },
        }
    }
}

impl Iterator for RecordQueue {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::thread;
    use std::time::Duration;

    use crate::reader::{Reader, ReaderBuilder};

    use super::QueueBuilder;

    fn data(rows: usize) -> String {
        (0..rows).map(|i| format!("{},\"row\n{}\"\n", i, i)).collect()
    }

    #[test]
    fn unbounded_in_order() {
        let queue =
            QueueBuilder::new().spawn(Reader::from_text(data(100))).unwrap();
        let got: Vec<String> =
            queue.clone().map(|r| r.unwrap()[0].to_string()).collect();
        let want: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(got, want);
        assert_eq!(queue.join().unwrap(), 100);
    }

    #[test]
    fn bounded_many_consumers() {
        let rdr =
            ReaderBuilder::new().buffer_size(3).from_text(data(500)).unwrap();
        let queue = QueueBuilder::new().capacity(Some(4)).spawn(rdr).unwrap();
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let q = queue.clone();
                thread::spawn(move || {
                    q.map(|r| r.unwrap()[0].parse::<u64>().unwrap())
                        .collect::<Vec<u64>>()
                })
            })
            .collect();
        let mut all = vec![];
        for consumer in consumers {
            let got = consumer.join().unwrap();
            // Each consumer sees its share in stream order.
            assert!(got.windows(2).all(|w| w[0] < w[1]));
            all.extend(got);
        }
        all.sort();
        assert_eq!(all, (0..500).collect::<Vec<u64>>());
        assert_eq!(queue.join().unwrap(), 500);
    }

    #[test]
    fn read_error_is_last_item() {
        struct Broken(bool);

        impl io::Read for Broken {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 {
                    let err = io::Error::new(io::ErrorKind::Other, "gone");
                    return Err(err);
                }
                self.0 = true;
                buf[..4].copy_from_slice(b"a\nb,");
                Ok(4)
            }
        }

        let rdr = Reader::from_reader(Broken(false));
        let queue = QueueBuilder::new().spawn(rdr).unwrap();
        let items: Vec<_> = queue.clone().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().fields(), &["a"]);
        assert!(items[1].as_ref().unwrap_err().is_io_error());
        assert_eq!(queue.join().unwrap(), 1);
    }

    #[test]
    fn try_recv_reports_disconnect() {
        let queue = QueueBuilder::new().spawn(Reader::from_text("")).unwrap();
        assert!(queue.recv().is_none());
        assert_eq!(
            queue.try_recv().map(|_| ()).unwrap_err(),
            TryRecvError::Disconnected
        );
        assert_eq!(queue.join().unwrap(), 0);
    }

    // A source that hands out its data only once the gate is opened.
    struct Gated {
        gate: Receiver<()>,
        data: Option<&'static [u8]>,
    }

    impl io::Read for Gated {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let data = match self.data.take() {
                None => return Ok(0),
                Some(data) => data,
            };
            let _ = self.gate.recv();
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn try_recv_does_not_wait_for_other_handles() {
        let (open, gate) = mpsc::channel();
        let src = Gated { gate, data: Some(b"a,b\n") };
        let queue =
            QueueBuilder::new().spawn(Reader::from_reader(src)).unwrap();
        let waiting = queue.clone();
        let consumer = thread::spawn(move || {
            waiting.recv().map(|r| r.unwrap().into_fields())
        });
        // Give the consumer time to park in `recv`.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(
            queue.try_recv().map(|_| ()).unwrap_err(),
            TryRecvError::Empty
        );
        open.send(()).unwrap();
        let got = consumer.join().unwrap();
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(queue.join().unwrap(), 1);
    }

    #[test]
    fn join_waits_for_other_handles_to_drain() {
        let queue = QueueBuilder::new()
            .capacity(Some(2))
            .spawn(Reader::from_text(data(50)))
            .unwrap();
        let other = queue.clone();
        let consumer = thread::spawn(move || other.count());
        assert_eq!(queue.join().unwrap(), 50);
        assert_eq!(consumer.join().unwrap(), 50);
    }

    #[test]
    fn dropping_consumers_stops_worker() {
        let queue = QueueBuilder::new()
            .capacity(Some(1))
            .spawn(Reader::from_text(data(1000)))
            .unwrap();
        assert!(queue.recv().unwrap().is_ok());
        let sent = queue.join().unwrap();
        assert!(sent < 1000);
    }
}
