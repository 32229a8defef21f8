//! Dedicated writer thread serializing all mutations.
//!
//! Every job runs inside one immediate transaction on the writer's
//! connection: a sync tick's row upserts and cursor update commit together
//! or roll back together, and sqlite never sees competing writers.

use std::thread;

use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;
use diesel::sqlite::SqliteConnection;
use govlens_core::errors::{DatabaseError, Error, Result};
use log::error;
use tokio::sync::{mpsc, oneshot};

use crate::errors::StorageError;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Handle used by repositories to enqueue write jobs.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

/// Adapter so jobs returning core results can run inside a diesel
/// transaction closure, which needs `From<diesel::result::Error>`.
enum TxError {
    Diesel(diesel::result::Error),
    App(Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        TxError::Diesel(e)
    }
}

impl From<TxError> for Error {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Diesel(e) => StorageError::from(e).into(),
            TxError::App(e) => e,
        }
    }
}

impl WriteHandle {
    /// Runs `job` on the writer thread inside a single immediate
    /// transaction and awaits its result.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let wrapped: WriteJob = Box::new(move |conn| {
            let outcome = conn
                .immediate_transaction::<T, TxError, _>(|tx| job(tx).map_err(TxError::App))
                .map_err(Error::from);
            let _ = reply_tx.send(outcome);
        });

        self.sender.send(wrapped).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Database writer thread is gone".to_string(),
            ))
        })?;
        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Database writer dropped the reply channel".to_string(),
            ))
        })?
    }
}

/// Spawns the writer thread. Jobs drain in submission order, one at a time.
pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();
    thread::Builder::new()
        .name("govlens-db-writer".to_string())
        .spawn(move || {
            while let Some(job) = receiver.blocking_recv() {
                match pool.get() {
                    Ok(mut conn) => job(&mut *conn),
                    Err(e) => error!("Writer could not get a connection: {}", e),
                }
            }
        })
        .expect("Failed to spawn database writer thread");
    WriteHandle { sender }
}
