use std::sync::Arc;

use chrono::Utc;
use shared::leaderboard;
use shared::protocol::{ResultRecord, ResultSubmission};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Where results live. Postgres when configured, otherwise process memory.
#[derive(Clone)]
pub enum ResultStore {
    Postgres(PgPool),
    Memory(Arc<RwLock<Vec<ResultRecord>>>),
}

impl ResultStore {
    pub fn memory() -> Self {
        ResultStore::Memory(Arc::new(RwLock::new(Vec::new())))
    }

    /// Connect to the database if a URL is given; fall back to memory.
    pub async fn open(database_url: Option<&str>) -> Self {
        if let Some(url) = database_url {
            match db::connect(url).await {
                Ok(pool) => {
                    info!("result_store = postgres");
                    return ResultStore::Postgres(pool);
                }
                Err(e) => {
                    error!("db_connect_failed = {:?}", e);
                }
            }
        } else {
            warn!("database_url_missing = true");
        }
        warn!("result_store = memory (results are lost on restart)");
        ResultStore::memory()
    }

    pub async fn insert(&self, submission: ResultSubmission) -> Result<ResultRecord, StoreError> {
        match self {
            ResultStore::Postgres(pool) => Ok(db::insert_result(pool, &submission).await?),
            ResultStore::Memory(records) => {
                let record = ResultRecord {
                    id: Uuid::new_v4(),
                    name: submission.name,
                    usn: submission.usn,
                    results: submission.results,
                    created_at: Utc::now(),
                };
                records.write().await.push(record.clone());
                Ok(record)
            }
        }
    }

    /// Newest first.
    pub async fn recent(&self) -> Result<Vec<ResultRecord>, StoreError> {
        match self {
            ResultStore::Postgres(pool) => Ok(db::recent_results(pool).await?),
            ResultStore::Memory(records) => {
                Ok(records.read().await.iter().rev().cloned().collect())
            }
        }
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<ResultRecord>, StoreError> {
        match self {
            ResultStore::Postgres(pool) => Ok(db::top_results(pool, limit).await?),
            ResultStore::Memory(records) => {
                let all = records.read().await.clone();
                Ok(leaderboard::rank(all, limit))
            }
        }
    }
}
