//! SQLite implementation of the ResultStore port.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::{format_timestamp, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    DateRange, Entity, EntityKind, GroupField, GroupValue, MetricValue, PartialRow, ResultState,
    Scope, TestResult, UNKNOWN_GROUP,
};
use crate::domain::ports::{AggregateOp, AggregateQuery, RecordQuery, ResultStore};

#[derive(Clone)]
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_result(&self, result: &TestResult) -> DomainResult<()> {
        let mut conn = self.pool.acquire().await?;
        write_result(&mut conn, result).await
    }

    pub async fn upsert_user(&self, user: &Entity) -> DomainResult<()> {
        let mut conn = self.pool.acquire().await?;
        write_user(&mut conn, user).await
    }

    pub async fn upsert_run(&self, run: &Entity) -> DomainResult<()> {
        let mut conn = self.pool.acquire().await?;
        write_run(&mut conn, run).await
    }

    /// Write users, runs and results in one transaction; nothing is kept if any write fails.
    pub async fn import_batch(&self, users: &[Entity], runs: &[Entity], results: &[TestResult]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        for user in users {
            write_user(&mut tx, user).await?;
        }
        for run in runs {
            write_run(&mut tx, run).await?;
        }
        for result in results {
            write_result(&mut tx, result).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn write_result(conn: &mut SqliteConnection, result: &TestResult) -> DomainResult<()> {
    sqlx::query(
        r#"INSERT OR REPLACE INTO test_results (id, project_id, run_id, title, state,
           assignee_id, elapsed_seconds, automated, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&result.id)
    .bind(&result.project_id)
    .bind(&result.run_id)
    .bind(&result.title)
    .bind(result.state.as_str())
    .bind(&result.assignee_id)
    .bind(result.elapsed_seconds)
    .bind(result.automated)
    .bind(format_timestamp(result.created_at))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn write_user(conn: &mut SqliteConnection, user: &Entity) -> DomainResult<()> {
    sqlx::query("INSERT OR REPLACE INTO users (id, name, email) VALUES (?, ?, ?)")
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.attributes.get("email").map(String::as_str))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn write_run(conn: &mut SqliteConnection, run: &Entity) -> DomainResult<()> {
    let project_id = run.project_id.as_deref().ok_or_else(|| {
        DomainError::ValidationFailed(format!("run '{}' has no project_id", run.id))
    })?;

    sqlx::query("INSERT OR REPLACE INTO runs (id, project_id, name, milestone) VALUES (?, ?, ?, ?)")
        .bind(&run.id)
        .bind(project_id)
        .bind(&run.name)
        .bind(run.attributes.get("milestone").map(String::as_str))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// SQL expression for a natively groupable field.
fn native_column(field: GroupField) -> DomainResult<String> {
    match field {
        GroupField::State => Ok("state".to_string()),
        GroupField::Assignee => Ok(format!("COALESCE(NULLIF(assignee_id, ''), '{UNKNOWN_GROUP}')")),
        GroupField::Run => Ok("run_id".to_string()),
        GroupField::Day | GroupField::Automated => Err(DomainError::UnsupportedGrouping(field)),
    }
}

fn aggregate_expr(op: AggregateOp) -> &'static str {
    match op {
        AggregateOp::Count => "COUNT(*)",
        AggregateOp::SumElapsed => "COALESCE(SUM(elapsed_seconds), 0.0)",
        AggregateOp::AvgElapsed => "COALESCE(AVG(elapsed_seconds), 0.0)",
    }
}

/// Append scope and date filters to a query that already has a `WHERE 1=1`.
fn push_filters(sql: &mut String, bindings: &mut Vec<String>, scope: &Scope, range: &DateRange) {
    if let Some(project_id) = scope.project_id() {
        sql.push_str(" AND project_id = ?");
        bindings.push(project_id.to_string());
    }
    if let Some(start) = range.start {
        sql.push_str(" AND created_at >= ?");
        bindings.push(format_timestamp(start));
    }
    if let Some(end) = range.end {
        sql.push_str(" AND created_at < ?");
        bindings.push(format_timestamp(end));
    }
}

fn decode_aggregate(row: &SqliteRow, columns: usize, op: AggregateOp) -> DomainResult<PartialRow> {
    let mut values = Vec::with_capacity(columns);
    for i in 0..columns {
        let value: String = row.try_get(i)?;
        values.push(GroupValue::Text(value));
    }
    let value = match op {
        AggregateOp::Count => MetricValue::Count(row.try_get::<i64, _>(columns)?),
        AggregateOp::SumElapsed | AggregateOp::AvgElapsed => {
            MetricValue::Number(row.try_get::<f64, _>(columns)?)
        }
    };
    Ok(PartialRow::new(values, value))
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn grouped_aggregate(&self, query: &AggregateQuery) -> DomainResult<Vec<PartialRow>> {
        let columns = query
            .group_by
            .iter()
            .map(|f| native_column(*f))
            .collect::<DomainResult<Vec<_>>>()?;

        let mut select: Vec<String> = columns.clone();
        select.push(aggregate_expr(query.op).to_string());

        let mut sql = format!("SELECT {} FROM test_results WHERE 1=1", select.join(", "));
        let mut bindings = Vec::new();
        push_filters(&mut sql, &mut bindings, &query.scope, &query.range);

        if !columns.is_empty() {
            let positions: Vec<String> = (1..=columns.len()).map(|i| i.to_string()).collect();
            sql.push_str(&format!(" GROUP BY {0} ORDER BY {0}", positions.join(", ")));
        }

        let mut q = sqlx::query(&sql);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| decode_aggregate(row, columns.len(), query.op))
            .collect()
    }

    async fn find_results(&self, query: &RecordQuery) -> DomainResult<Vec<TestResult>> {
        let mut sql = String::from(
            "SELECT id, project_id, run_id, title, state, assignee_id, elapsed_seconds, automated, created_at
             FROM test_results WHERE 1=1",
        );
        let mut bindings = Vec::new();
        push_filters(&mut sql, &mut bindings, &query.scope, &query.range);
        sql.push_str(" ORDER BY created_at, id");

        let mut q = sqlx::query_as::<_, TestResultRow>(&sql);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<TestResultRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn distinct_values(&self, scope: &Scope, field: GroupField) -> DomainResult<Vec<GroupValue>> {
        let expr = match field {
            GroupField::Day => "substr(created_at, 1, 10)".to_string(),
            GroupField::Automated => "automated".to_string(),
            native => native_column(native)?,
        };

        let mut sql = format!("SELECT DISTINCT {expr} FROM test_results WHERE 1=1");
        let mut bindings = Vec::new();
        push_filters(&mut sql, &mut bindings, scope, &DateRange::unbounded());
        sql.push_str(" ORDER BY 1");

        let mut q = sqlx::query(&sql);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| match field {
                GroupField::Day => {
                    let day: String = row.try_get(0)?;
                    NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                        .map(GroupValue::Date)
                        .map_err(|e| DomainError::SerializationError(e.to_string()))
                }
                GroupField::Automated => Ok(GroupValue::Bool(row.try_get::<bool, _>(0)?)),
                _ => Ok(GroupValue::Text(row.try_get::<String, _>(0)?)),
            })
            .collect()
    }

    async fn list_entities(&self, scope: &Scope, kind: EntityKind) -> DomainResult<Vec<Entity>> {
        match kind {
            EntityKind::User => {
                let rows: Vec<(String, String, Option<String>)> =
                    sqlx::query_as("SELECT id, name, email FROM users ORDER BY id")
                        .fetch_all(&self.pool)
                        .await?;
                Ok(rows
                    .into_iter()
                    .map(|(id, name, email)| {
                        let user = Entity::new(id, name);
                        match email {
                            Some(email) => user.with_attribute("email", email),
                            None => user,
                        }
                    })
                    .collect())
            }
            EntityKind::Run => {
                let mut sql = String::from("SELECT id, project_id, name, milestone FROM runs WHERE 1=1");
                if scope.project_id().is_some() {
                    sql.push_str(" AND project_id = ?");
                }
                sql.push_str(" ORDER BY id");

                let mut q = sqlx::query_as::<_, (String, String, String, Option<String>)>(&sql);
                if let Some(project_id) = scope.project_id() {
                    q = q.bind(project_id);
                }

                let rows = q.fetch_all(&self.pool).await?;
                Ok(rows
                    .into_iter()
                    .map(|(id, project_id, name, milestone)| {
                        let run = Entity::new(id, name).in_project(project_id);
                        match milestone {
                            Some(milestone) => run.with_attribute("milestone", milestone),
                            None => run,
                        }
                    })
                    .collect())
            }
        }
    }
}

#[derive(sqlx::FromRow)]
struct TestResultRow {
    id: String,
    project_id: String,
    run_id: String,
    title: String,
    state: String,
    assignee_id: Option<String>,
    elapsed_seconds: Option<f64>,
    automated: bool,
    created_at: String,
}

impl TryFrom<TestResultRow> for TestResult {
    type Error = DomainError;

    fn try_from(row: TestResultRow) -> Result<Self, Self::Error> {
        let state = ResultState::from_str(&row.state)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid state: {}", row.state)))?;

        Ok(TestResult {
            id: row.id,
            project_id: row.project_id,
            run_id: row.run_id,
            title: row.title,
            state,
            assignee_id: row.assignee_id,
            elapsed_seconds: row.elapsed_seconds,
            automated: row.automated,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
