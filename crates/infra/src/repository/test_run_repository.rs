//! # TestRunRepository
//!
//! テストランとそのメンバーシップ（test_run_test_cases）の永続化を担当する
//! リポジトリ。
//!
//! メンバーシップは中間テーブルで表現し、エンティティ側の
//! `test_case_ids` 集合と常に同期させる。INSERT / UPDATE は
//! トランザクション内で本体とメンバーシップをまとめて書き込む。

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qatrack_domain::{
    test_case::TestCaseId,
    test_run::{NewTestRun, TestRun, TestRunId, TestRunRecord},
    value_objects::{TestRunStatus, UserId},
};
use sqlx::PgPool;

use crate::error::InfraError;

/// テストランリポジトリトレイト
#[async_trait]
pub trait TestRunRepository: Send + Sync {
    /// 新規テストランを保存し、採番済みのエンティティを返す
    ///
    /// メンバーとなるテストケース集合も同一トランザクションで保存する。
    async fn insert(&self, new: &NewTestRun) -> Result<TestRun, InfraError>;

    /// 既存のテストランを上書き保存する
    ///
    /// メンバーシップはエンティティの集合に合わせて同期される。
    async fn update(&self, run: &TestRun) -> Result<(), InfraError>;

    /// ID でテストランを取得する
    async fn find_by_id(&self, id: TestRunId) -> Result<Option<TestRun>, InfraError>;

    /// テストランの一覧を取得する
    async fn find_all(&self) -> Result<Vec<TestRun>, InfraError>;

    /// 作成者でテストランの一覧を取得する
    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<TestRun>, InfraError>;

    /// テストランを削除する（メンバーシップも合わせて削除）
    async fn delete(&self, id: TestRunId) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の TestRunRepository
#[derive(Debug, Clone)]
pub struct PostgresTestRunRepository {
    pool: PgPool,
}

impl PostgresTestRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// test_runs テーブルの行構造（メンバーシップは別クエリで取得）
#[derive(sqlx::FromRow)]
struct TestRunRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_by: i64,
}

impl TestRunRow {
    fn into_entity(self, test_case_ids: BTreeSet<TestCaseId>) -> Result<TestRun, InfraError> {
        Ok(TestRun::from_db(TestRunRecord {
            id: TestRunId::from_i64(self.id),
            title: self.title,
            description: self.description,
            status: self
                .status
                .parse::<TestRunStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            start_time: self.start_time,
            end_time: self.end_time,
            created_by: UserId::from_i64(self.created_by),
            test_case_ids,
        }))
    }
}

const SELECT_COLUMNS: &str = "id, title, description, status, start_time, end_time, created_by";

impl PostgresTestRunRepository {
    /// 複数テストランのメンバーシップをまとめて取得し、行をエンティティに変換する
    async fn into_entities(&self, rows: Vec<TestRunRow>) -> Result<Vec<TestRun>, InfraError> {
        let run_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let memberships: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT test_run_id, test_case_id FROM test_run_test_cases
            WHERE test_run_id = ANY($1)
            "#,
        )
        .bind(&run_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let case_ids = memberships
                    .iter()
                    .filter(|(run_id, _)| *run_id == row.id)
                    .map(|(_, case_id)| TestCaseId::from_i64(*case_id))
                    .collect();
                row.into_entity(case_ids)
            })
            .collect()
    }
}

#[async_trait]
impl TestRunRepository for PostgresTestRunRepository {
    async fn insert(&self, new: &NewTestRun) -> Result<TestRun, InfraError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, TestRunRow>(&format!(
            r#"
            INSERT INTO test_runs (title, description, status, start_time, end_time, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(new.title())
        .bind(new.description())
        .bind(new.status().to_string())
        .bind(new.start_time())
        .bind(new.end_time())
        .bind(new.created_by().as_i64())
        .fetch_one(&mut *tx)
        .await?;

        for case_id in new.test_case_ids() {
            sqlx::query(
                "INSERT INTO test_run_test_cases (test_run_id, test_case_id) VALUES ($1, $2)",
            )
            .bind(row.id)
            .bind(case_id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_entity(new.test_case_ids().clone())
    }

    async fn update(&self, run: &TestRun) -> Result<(), InfraError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE test_runs
            SET title = $2, description = $3, status = $4, start_time = $5, end_time = $6
            WHERE id = $1
            "#,
        )
        .bind(run.id().as_i64())
        .bind(run.title())
        .bind(run.description())
        .bind(run.status().to_string())
        .bind(run.start_time())
        .bind(run.end_time())
        .execute(&mut *tx)
        .await?;

        // メンバーシップは全削除してから挿入し直すことで集合と同期する
        sqlx::query("DELETE FROM test_run_test_cases WHERE test_run_id = $1")
            .bind(run.id().as_i64())
            .execute(&mut *tx)
            .await?;
        for case_id in run.test_case_ids() {
            sqlx::query(
                "INSERT INTO test_run_test_cases (test_run_id, test_case_id) VALUES ($1, $2)",
            )
            .bind(run.id().as_i64())
            .bind(case_id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: TestRunId) -> Result<Option<TestRun>, InfraError> {
        let row = sqlx::query_as::<_, TestRunRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_runs WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let case_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT test_case_id FROM test_run_test_cases WHERE test_run_id = $1",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let run = row.into_entity(case_ids.into_iter().map(TestCaseId::from_i64).collect())?;
        Ok(Some(run))
    }

    async fn find_all(&self) -> Result<Vec<TestRun>, InfraError> {
        let rows = sqlx::query_as::<_, TestRunRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_runs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.into_entities(rows).await
    }

    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<TestRun>, InfraError> {
        let rows = sqlx::query_as::<_, TestRunRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_runs WHERE created_by = $1 ORDER BY id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        self.into_entities(rows).await
    }

    async fn delete(&self, id: TestRunId) -> Result<(), InfraError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM test_run_test_cases WHERE test_run_id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM test_runs WHERE id = $1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
