//! Persistent worker pool for band tasks.
//!
//! Workers are the threads of one rayon pool, started with the engine and
//! kept until shutdown. A generation's tasks are spawned into a single
//! in-place scope; the coordinator drains the result channel from inside
//! that scope while the workers run, and the scope's end is the barrier.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

use tracing::{debug, error, info, trace};

use super::band::{BandResult, Task};
use super::error::{ConfigError, EngineError};

type Outcome = Result<BandResult, EngineError>;

pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
    workers: usize,
}

impl WorkerPool {
    /// Start `workers` threads. They live until [`WorkerPool::shutdown`] or
    /// drop.
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("band-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::PoolBuild(e.to_string()))?;
        info!(workers, "worker pool started");
        Ok(Self {
            pool: Some(pool),
            workers,
        })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_some()
    }

    /// Run every task on the pool and hand each result to `on_result` on the
    /// calling thread, in completion order.
    ///
    /// Returns the number of results delivered. A panicking task becomes
    /// [`EngineError::WorkerFault`] and its band is never delivered; a result
    /// count short of the dispatched count is
    /// [`EngineError::BarrierViolation`]. Either way the caller must discard
    /// whatever it assembled from the delivered results.
    pub fn run<'g, F>(&self, tasks: Vec<Task<'g>>, mut on_result: F) -> Result<usize, EngineError>
    where
        F: FnMut(BandResult),
    {
        let dispatched = tasks.len();
        let Some(pool) = self.pool.as_ref() else {
            return Err(EngineError::BarrierViolation {
                dispatched,
                received: 0,
            });
        };
        if dispatched == 0 {
            return Ok(0);
        }

        let (tx, rx) = mpsc::channel::<Outcome>();
        let mut received = 0usize;
        let mut fault = None;

        pool.in_place_scope(|scope| {
            for task in tasks {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let offset = task.offset();
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run())).map_err(
                        |payload| EngineError::WorkerFault {
                            offset,
                            message: panic_message(payload.as_ref()),
                        },
                    );
                    // The receiver outlives the scope; a send can only fail
                    // if the coordinator itself is unwinding.
                    let _ = tx.send(outcome);
                });
            }
            drop(tx);

            // Every sender is dropped once its task finishes, so recv errors
            // out instead of blocking if a result is ever lost.
            for _ in 0..dispatched {
                match rx.recv() {
                    Ok(Ok(result)) => {
                        trace!(offset = result.offset(), rows = result.rows(), "band complete");
                        received += 1;
                        on_result(result);
                    }
                    Ok(Err(err)) => {
                        error!(%err, "band task failed");
                        fault.get_or_insert(err);
                    }
                    Err(_) => break,
                }
            }
        });

        if let Some(err) = fault {
            return Err(err);
        }
        if received != dispatched {
            error!(dispatched, received, "result barrier not met");
            return Err(EngineError::BarrierViolation {
                dispatched,
                received,
            });
        }
        Ok(received)
    }

    /// Stop every worker.
    ///
    /// Each worker acknowledges the shutdown once, without producing a band
    /// result, before the pool is torn down. Returns the number of
    /// acknowledgements; a second call returns 0.
    pub fn shutdown(&mut self) -> usize {
        let Some(pool) = self.pool.take() else {
            return 0;
        };
        let acks = pool.broadcast(|ctx| {
            trace!(worker = ctx.index(), "shutdown acknowledged");
            ctx.index()
        });
        drop(pool);
        debug!(acknowledged = acks.len(), "worker pool stopped");
        acks.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::WorkerPool;
    use crate::bandlife::band::{Band, Task, partition};
    use crate::bandlife::error::{ConfigError, EngineError};
    use crate::bandlife::grid::Grid;

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(ConfigError::NoWorkers)));
    }

    #[test]
    fn every_task_yields_one_result() {
        let pool = WorkerPool::new(3).unwrap();
        let grid = Grid::new(8, 14).unwrap();
        let tasks: Vec<_> = partition(&grid, 6)
            .into_iter()
            .map(|band| Task::new(band, Vec::new()))
            .collect();

        let mut offsets = HashSet::new();
        let delivered = pool
            .run(tasks, |result| {
                assert!(offsets.insert(result.offset()));
            })
            .unwrap();
        assert_eq!(delivered, 6);
        assert_eq!(offsets, HashSet::from([1, 3, 5, 7, 9, 11]));
    }

    #[test]
    fn empty_dispatch_is_trivially_complete() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.run(Vec::new(), |_| unreachable!()), Ok(0));
    }

    #[test]
    fn panicking_task_is_a_worker_fault() {
        let pool = WorkerPool::new(2).unwrap();
        let cells = vec![false; 10];
        // Claims three interior rows but only holds two rows of cells.
        let broken = Band {
            cells: &cells,
            width: 5,
            offset: 4,
            rows: 3,
        };
        let mut delivered = 0;
        let err = pool
            .run(vec![Task::new(broken, Vec::new())], |_| delivered += 1)
            .unwrap_err();
        assert!(matches!(err, EngineError::WorkerFault { offset: 4, .. }));
        assert_eq!(delivered, 0);

        // The pool survives the fault.
        let grid = Grid::new(5, 5).unwrap();
        let tasks = vec![Task::new(partition(&grid, 1)[0], Vec::new())];
        assert_eq!(pool.run(tasks, |_| {}), Ok(1));
    }

    #[test]
    fn shutdown_is_acknowledged_by_every_worker() {
        let mut pool = WorkerPool::new(4).unwrap();
        assert_eq!(pool.shutdown(), 4);
        assert!(!pool.is_running());
        assert_eq!(pool.shutdown(), 0);

        let grid = Grid::new(5, 5).unwrap();
        let tasks = vec![Task::new(partition(&grid, 1)[0], Vec::new())];
        assert!(matches!(
            pool.run(tasks, |_| {}),
            Err(EngineError::BarrierViolation { dispatched: 1, received: 0 })
        ));
    }
}
