use super::DbPool;
use crate::errors::StorageError;
use diesel::{Connection, SqliteConnection};
use log::{debug, error};
use pricesync_core::errors::{DatabaseError, Error, Result};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

// Jobs return core::Result since that's what callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type Reply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Capacity of the job queue in front of the writer.
const QUEUE_CAPACITY: usize = 1024;

/// Handle for sending jobs to the writer actor.
///
/// Every write in the process goes through one connection, one job at a
/// time, each inside an immediate transaction. Concurrent updaters therefore
/// never race each other for SQLite's write lock.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, Reply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("writer actor has stopped"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("writer actor dropped the reply"))??;

        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| writer_gone("unexpected result type from writer actor"))
    }
}

fn writer_gone(message: &str) -> Error {
    Error::Database(DatabaseError::Internal(message.to_string()))
}

/// Spawns a background Tokio task that acts as the single writer.
///
/// The actor owns one pooled connection for its lifetime and stops once
/// every [`WriteHandle`] is dropped. Must be called inside a Tokio runtime.
pub fn spawn_writer(pool: Arc<DbPool>) -> Result<WriteHandle> {
    let mut conn = pool.get().map_err(StorageError::from)?;
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, Reply)>(QUEUE_CAPACITY);

    tokio::spawn(async move {
        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| {
                    error!("Write transaction failed: {}", e);
                    e.into()
                });

            // The caller may have given up waiting.
            let _ = reply_tx.send(result);
        }
        debug!("Writer actor stopped");
    });

    Ok(WriteHandle { tx })
}
