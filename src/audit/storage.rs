use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::shared::error::StoreResult;
use crate::core::shared::schema::{error_logs, staff_members, visitor_logs};
use crate::core::shared::utils::{with_conn, DbPool};

use super::types::{ErrorLog, VisitorLog, VisitorLogEntry};

/// Append-only visitor and error logs.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn append_visitor_log(&self, log: VisitorLog) -> StoreResult<VisitorLog>;
    async fn append_error_log(&self, log: ErrorLog) -> StoreResult<ErrorLog>;
    async fn list_visitor_logs(&self, limit: i64) -> StoreResult<Vec<VisitorLogEntry>>;
    async fn list_error_logs(&self, limit: i64) -> StoreResult<Vec<ErrorLog>>;
}

pub struct PgAuditLogStore {
    pool: DbPool,
}

impl PgAuditLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for PgAuditLogStore {
    async fn append_visitor_log(&self, log: VisitorLog) -> StoreResult<VisitorLog> {
        with_conn(&self.pool, move |conn| {
            diesel::insert_into(visitor_logs::table)
                .values(&log)
                .execute(conn)?;
            Ok(log)
        })
        .await
    }

    async fn append_error_log(&self, log: ErrorLog) -> StoreResult<ErrorLog> {
        with_conn(&self.pool, move |conn| {
            diesel::insert_into(error_logs::table)
                .values(&log)
                .execute(conn)?;
            Ok(log)
        })
        .await
    }

    async fn list_visitor_logs(&self, limit: i64) -> StoreResult<Vec<VisitorLogEntry>> {
        with_conn(&self.pool, move |conn| {
            let rows: Vec<(VisitorLog, Option<String>)> = visitor_logs::table
                .left_join(staff_members::table)
                .order(visitor_logs::created_at.desc())
                .limit(limit)
                .select((visitor_logs::all_columns, staff_members::name.nullable()))
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(log, staff_name)| VisitorLogEntry { log, staff_name })
                .collect())
        })
        .await
    }

    async fn list_error_logs(&self, limit: i64) -> StoreResult<Vec<ErrorLog>> {
        with_conn(&self.pool, move |conn| {
            Ok(error_logs::table
                .order(error_logs::created_at.desc())
                .limit(limit)
                .load::<ErrorLog>(conn)?)
        })
        .await
    }
}

/// Vec-backed log store. Staff names are not resolved.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogStore {
    visitors: Arc<RwLock<Vec<VisitorLog>>>,
    errors: Arc<RwLock<Vec<ErrorLog>>>,
}

impl InMemoryAuditLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn visitor_logs(&self) -> Vec<VisitorLog> {
        self.visitors.read().await.clone()
    }

    pub async fn error_logs(&self) -> Vec<ErrorLog> {
        self.errors.read().await.clone()
    }
}

fn newest_first<T: Clone, F>(items: &[T], created_at: F, limit: i64) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    sorted.truncate(usize::try_from(limit).unwrap_or(0));
    sorted
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLogStore {
    async fn append_visitor_log(&self, log: VisitorLog) -> StoreResult<VisitorLog> {
        self.visitors.write().await.push(log.clone());
        Ok(log)
    }

    async fn append_error_log(&self, log: ErrorLog) -> StoreResult<ErrorLog> {
        self.errors.write().await.push(log.clone());
        Ok(log)
    }

    async fn list_visitor_logs(&self, limit: i64) -> StoreResult<Vec<VisitorLogEntry>> {
        let visitors = self.visitors.read().await;
        Ok(newest_first(visitors.as_slice(), |l| l.created_at, limit)
            .into_iter()
            .map(|log| VisitorLogEntry {
                log,
                staff_name: None,
            })
            .collect())
    }

    async fn list_error_logs(&self, limit: i64) -> StoreResult<Vec<ErrorLog>> {
        let errors = self.errors.read().await;
        Ok(newest_first(errors.as_slice(), |l| l.created_at, limit))
    }
}
