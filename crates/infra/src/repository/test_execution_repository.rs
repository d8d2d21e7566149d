//! # TestExecutionRepository
//!
//! テスト実行（割り当てと結果記録）の永続化を担当するリポジトリ。

use async_trait::async_trait;
use qatrack_domain::{
    test_case::TestCaseId,
    test_execution::{NewTestExecution, TestExecution, TestExecutionId, TestExecutionRecord},
    test_run::TestRunId,
    value_objects::{TestResult, UserId},
};
use sqlx::PgPool;

use crate::error::InfraError;

/// テスト実行リポジトリトレイト
#[async_trait]
pub trait TestExecutionRepository: Send + Sync {
    /// 新規テスト実行を保存し、採番済みのエンティティを返す
    async fn insert(&self, new: &NewTestExecution) -> Result<TestExecution, InfraError>;

    /// 既存のテスト実行を上書き保存する
    async fn update(&self, execution: &TestExecution) -> Result<(), InfraError>;

    /// ID でテスト実行を取得する
    async fn find_by_id(&self, id: TestExecutionId) -> Result<Option<TestExecution>, InfraError>;

    /// (テストラン, テストケース, 担当者) の三つ組でテスト実行を取得する
    ///
    /// 割り当ての冪等性チェックに使用する。
    async fn find_by_run_case_tester(
        &self,
        test_run_id: TestRunId,
        test_case_id: TestCaseId,
        tester_id: UserId,
    ) -> Result<Option<TestExecution>, InfraError>;

    /// 担当者に割り当てられたテスト実行の一覧を取得する
    async fn find_by_tester_id(&self, tester_id: UserId) -> Result<Vec<TestExecution>, InfraError>;

    /// テストランに属するテスト実行の一覧を取得する
    async fn find_by_test_run_id(
        &self,
        test_run_id: TestRunId,
    ) -> Result<Vec<TestExecution>, InfraError>;
}

/// PostgreSQL 実装の TestExecutionRepository
#[derive(Debug, Clone)]
pub struct PostgresTestExecutionRepository {
    pool: PgPool,
}

impl PostgresTestExecutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// test_executions テーブルの行構造
#[derive(sqlx::FromRow)]
struct TestExecutionRow {
    id: i64,
    test_run_id: i64,
    test_case_id: i64,
    tester_id: i64,
    result: Option<String>,
    comment: Option<String>,
}

impl TestExecutionRow {
    fn into_entity(self) -> Result<TestExecution, InfraError> {
        Ok(TestExecution::from_db(TestExecutionRecord {
            id: TestExecutionId::from_i64(self.id),
            test_run_id: TestRunId::from_i64(self.test_run_id),
            test_case_id: TestCaseId::from_i64(self.test_case_id),
            tester_id: UserId::from_i64(self.tester_id),
            result: self
                .result
                .map(|r| r.parse::<TestResult>())
                .transpose()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            comment: self.comment,
        }))
    }
}

const SELECT_COLUMNS: &str = "id, test_run_id, test_case_id, tester_id, result, comment";

#[async_trait]
impl TestExecutionRepository for PostgresTestExecutionRepository {
    async fn insert(&self, new: &NewTestExecution) -> Result<TestExecution, InfraError> {
        let row = sqlx::query_as::<_, TestExecutionRow>(&format!(
            r#"
            INSERT INTO test_executions (test_run_id, test_case_id, tester_id)
            VALUES ($1, $2, $3)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(new.test_run_id().as_i64())
        .bind(new.test_case_id().as_i64())
        .bind(new.tester_id().as_i64())
        .fetch_one(&self.pool)
        .await?;

        row.into_entity()
    }

    async fn update(&self, execution: &TestExecution) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE test_executions
            SET test_run_id = $2, test_case_id = $3, tester_id = $4, result = $5, comment = $6
            WHERE id = $1
            "#,
        )
        .bind(execution.id().as_i64())
        .bind(execution.test_run_id().as_i64())
        .bind(execution.test_case_id().as_i64())
        .bind(execution.tester_id().as_i64())
        .bind(execution.result().map(|r| r.to_string()))
        .bind(execution.comment())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: TestExecutionId) -> Result<Option<TestExecution>, InfraError> {
        let row = sqlx::query_as::<_, TestExecutionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_executions WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TestExecutionRow::into_entity).transpose()
    }

    async fn find_by_run_case_tester(
        &self,
        test_run_id: TestRunId,
        test_case_id: TestCaseId,
        tester_id: UserId,
    ) -> Result<Option<TestExecution>, InfraError> {
        let row = sqlx::query_as::<_, TestExecutionRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM test_executions
            WHERE test_run_id = $1 AND test_case_id = $2 AND tester_id = $3
            "#,
        ))
        .bind(test_run_id.as_i64())
        .bind(test_case_id.as_i64())
        .bind(tester_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TestExecutionRow::into_entity).transpose()
    }

    async fn find_by_tester_id(&self, tester_id: UserId) -> Result<Vec<TestExecution>, InfraError> {
        let rows = sqlx::query_as::<_, TestExecutionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_executions WHERE tester_id = $1 ORDER BY id"
        ))
        .bind(tester_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TestExecutionRow::into_entity).collect()
    }

    async fn find_by_test_run_id(
        &self,
        test_run_id: TestRunId,
    ) -> Result<Vec<TestExecution>, InfraError> {
        let rows = sqlx::query_as::<_, TestExecutionRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_executions WHERE test_run_id = $1 ORDER BY id"
        ))
        .bind(test_run_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TestExecutionRow::into_entity).collect()
    }
}
