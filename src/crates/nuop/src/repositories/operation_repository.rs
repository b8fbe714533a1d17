//! Operation repository for database operations

use super::OperationStore;
use crate::db::Database;
use crate::error::{NuopError, Result};
use crate::models::{OperationRecord, QueryResult, StorageTier};
use crate::sql::GeneratedQuery;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Repository reading the SPB operation tables
#[derive(Clone, Debug)]
pub struct OperationRepository {
    db: Arc<Database>,
}

impl OperationRepository {
    /// Create a new operation repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Substring lookup for one tier.
    ///
    /// The table name is a validated identifier; the operation id is bound.
    fn lookup_sql(tier: &StorageTier) -> String {
        format!(
            "SELECT $2::text AS origin, \
                    COALESCE(msgid::text, '') AS msgid, \
                    TRIM(nuop)::text AS nuop, \
                    COALESCE(codmsg::text, '') AS codmsg, \
                    COALESCE(statusop, 0)::int4 AS statusop, \
                    statusmsg::int4 AS statusmsg, \
                    ts_inclusao::timestamp AS ts_inclusao \
             FROM {} \
             WHERE nuop LIKE '%' || $1 || '%' ESCAPE '\\' \
             ORDER BY ts_inclusao ASC",
            tier.table
        )
    }

    async fn bounded<T, F>(&self, fut: F) -> std::result::Result<T, String>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.db.statement_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.db.statement_timeout().as_secs()
            )),
        }
    }
}

#[async_trait]
impl OperationStore for OperationRepository {
    async fn execute(&self, query: &GeneratedQuery) -> Result<QueryResult> {
        debug!(sql = %query, "Executing generated query");

        let rows = self
            .bounded(sqlx::query(query.sql()).fetch_all(self.db.pool()))
            .await
            .map_err(NuopError::QueryExecution)?;

        let Some(first) = rows.first() else {
            return Ok(QueryResult::empty());
        };
        let columns = first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let cells = rows.iter().map(render_row).collect();

        Ok(QueryResult::new(columns, cells))
    }

    async fn lookup(&self, tier: &StorageTier, operation_id: &str) -> Result<Vec<OperationRecord>> {
        tier.validate()?;
        let target = operation_id.trim();
        let pattern = escape_like(target);
        let sql = Self::lookup_sql(tier);

        let records = self
            .bounded(
                sqlx::query_as::<_, OperationRecord>(&sql)
                    .bind(&pattern)
                    .bind(&tier.table)
                    .fetch_all(self.db.pool()),
            )
            .await
            .map_err(|reason| NuopError::TierUnavailable {
                tier: tier.table.clone(),
                reason,
            })?;

        debug!(tier = %tier, operation_id = %target, count = records.len(), "Tier lookup finished");
        Ok(records)
    }

    async fn probe(&self, tier: &StorageTier) -> Result<()> {
        tier.validate()?;
        let sql = format!("SELECT 1 FROM {} LIMIT 1", tier.table);
        self.bounded(sqlx::query(&sql).fetch_optional(self.db.pool()))
            .await
            .map(|_| ())
            .map_err(|reason| NuopError::TierUnavailable {
                tier: tier.table.clone(),
                reason,
            })
    }

    async fn ping(&self) -> Result<()> {
        self.db.health_check().await
    }
}

/// Escape LIKE metacharacters so the id matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render every cell of a row as display text
fn render_row(row: &PgRow) -> Vec<String> {
    (0..row.columns().len()).map(|i| render_cell(row, i)).collect()
}

/// Decode a cell of unknown type by trying the common Postgres types in turn.
/// NULL renders as an empty string.
fn render_cell(row: &PgRow, index: usize) -> String {
    macro_rules! try_as {
        ($ty:ty) => {
            if let Ok(value) = row.try_get::<Option<$ty>, _>(index) {
                return value.map(|v| v.to_string()).unwrap_or_default();
            }
        };
    }

    try_as!(String);
    try_as!(i32);
    try_as!(i64);
    try_as!(i16);
    try_as!(f64);
    try_as!(f32);
    try_as!(bool);
    try_as!(NaiveDateTime);
    try_as!(DateTime<Utc>);
    try_as!(NaiveDate);

    let type_name = row.columns()[index].type_info().name().to_string();
    warn!(column = index, type_name = %type_name, "Unrenderable column type");
    format!("<{}>", type_name.to_lowercase())
}
