//! # TestCaseRepository
//!
//! テストケースの永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qatrack_domain::{
    requirement::RequirementId,
    test_case::{NewTestCase, TestCase, TestCaseId, TestCaseRecord},
    value_objects::{Status, TestResult, UserId},
};
use sqlx::PgPool;

use crate::error::InfraError;

/// テストケースリポジトリトレイト
#[async_trait]
pub trait TestCaseRepository: Send + Sync {
    /// 新規テストケースを保存し、採番済みのエンティティを返す
    async fn insert(&self, new: &NewTestCase) -> Result<TestCase, InfraError>;

    /// 既存のテストケースを上書き保存する
    async fn update(&self, test_case: &TestCase) -> Result<(), InfraError>;

    /// ID でテストケースを取得する
    async fn find_by_id(&self, id: TestCaseId) -> Result<Option<TestCase>, InfraError>;

    /// ID のリストに一致するテストケースを取得する
    ///
    /// 存在しない ID は結果に含まれない（エラーにならない）。
    async fn find_by_ids(&self, ids: &[TestCaseId]) -> Result<Vec<TestCase>, InfraError>;

    /// テストケースの一覧を取得する
    async fn find_all(&self) -> Result<Vec<TestCase>, InfraError>;

    /// 要件に紐づくテストケースの一覧を取得する
    async fn find_by_requirement_id(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<TestCase>, InfraError>;

    /// テストケースを削除する
    async fn delete(&self, id: TestCaseId) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の TestCaseRepository
#[derive(Debug, Clone)]
pub struct PostgresTestCaseRepository {
    pool: PgPool,
}

impl PostgresTestCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// test_cases テーブルの行構造
#[derive(sqlx::FromRow)]
struct TestCaseRow {
    id: i64,
    title: String,
    description: Option<String>,
    requirement_id: i64,
    status: String,
    test_result: Option<String>,
    created_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TestCaseRow {
    fn into_entity(self) -> Result<TestCase, InfraError> {
        Ok(TestCase::from_db(TestCaseRecord {
            id: TestCaseId::from_i64(self.id),
            title: self.title,
            description: self.description,
            requirement_id: RequirementId::from_i64(self.requirement_id),
            status: self
                .status
                .parse::<Status>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            test_result: self
                .test_result
                .map(|r| r.parse::<TestResult>())
                .transpose()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            created_by: UserId::from_i64(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

const SELECT_COLUMNS: &str = "id, title, description, requirement_id, status, test_result, \
                              created_by, created_at, updated_at";

#[async_trait]
impl TestCaseRepository for PostgresTestCaseRepository {
    async fn insert(&self, new: &NewTestCase) -> Result<TestCase, InfraError> {
        let row = sqlx::query_as::<_, TestCaseRow>(&format!(
            r#"
            INSERT INTO test_cases
                (title, description, requirement_id, status, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(new.title())
        .bind(new.description())
        .bind(new.requirement_id().as_i64())
        .bind(new.status().to_string())
        .bind(new.created_by().as_i64())
        .bind(new.created_at())
        .fetch_one(&self.pool)
        .await?;

        row.into_entity()
    }

    async fn update(&self, test_case: &TestCase) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE test_cases
            SET title = $2, description = $3, requirement_id = $4, status = $5,
                test_result = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(test_case.id().as_i64())
        .bind(test_case.title())
        .bind(test_case.description())
        .bind(test_case.requirement_id().as_i64())
        .bind(test_case.status().to_string())
        .bind(test_case.test_result().map(|r| r.to_string()))
        .bind(test_case.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: TestCaseId) -> Result<Option<TestCase>, InfraError> {
        let row = sqlx::query_as::<_, TestCaseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_cases WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TestCaseRow::into_entity).transpose()
    }

    async fn find_by_ids(&self, ids: &[TestCaseId]) -> Result<Vec<TestCase>, InfraError> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query_as::<_, TestCaseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_cases WHERE id = ANY($1) ORDER BY id"
        ))
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TestCaseRow::into_entity).collect()
    }

    async fn find_all(&self) -> Result<Vec<TestCase>, InfraError> {
        let rows = sqlx::query_as::<_, TestCaseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_cases ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TestCaseRow::into_entity).collect()
    }

    async fn find_by_requirement_id(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<TestCase>, InfraError> {
        let rows = sqlx::query_as::<_, TestCaseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM test_cases WHERE requirement_id = $1 ORDER BY id"
        ))
        .bind(requirement_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TestCaseRow::into_entity).collect()
    }

    async fn delete(&self, id: TestCaseId) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM test_cases WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
