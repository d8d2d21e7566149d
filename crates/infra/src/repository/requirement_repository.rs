//! # RequirementRepository
//!
//! 要件の永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qatrack_domain::{
    requirement::{NewRequirement, Requirement, RequirementId, RequirementRecord},
    value_objects::{Priority, Status},
};
use sqlx::PgPool;

use crate::error::InfraError;

/// 要件リポジトリトレイト
#[async_trait]
pub trait RequirementRepository: Send + Sync {
    /// 新規要件を保存し、採番済みのエンティティを返す
    async fn insert(&self, new: &NewRequirement) -> Result<Requirement, InfraError>;

    /// 既存の要件を上書き保存する
    async fn update(&self, requirement: &Requirement) -> Result<(), InfraError>;

    /// ID で要件を取得する
    ///
    /// 見つからない場合は `Ok(None)` を返す。
    async fn find_by_id(&self, id: RequirementId) -> Result<Option<Requirement>, InfraError>;

    /// 要件の一覧を取得する
    async fn find_all(&self) -> Result<Vec<Requirement>, InfraError>;

    /// 要件を削除する
    async fn delete(&self, id: RequirementId) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の RequirementRepository
#[derive(Debug, Clone)]
pub struct PostgresRequirementRepository {
    pool: PgPool,
}

impl PostgresRequirementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// requirements テーブルの行構造
#[derive(sqlx::FromRow)]
struct RequirementRow {
    id: i64,
    title: String,
    description: Option<String>,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RequirementRow {
    fn into_entity(self) -> Result<Requirement, InfraError> {
        Ok(Requirement::from_db(RequirementRecord {
            id: RequirementId::from_i64(self.id),
            title: self.title,
            description: self.description,
            priority: self
                .priority
                .parse::<Priority>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            status: self
                .status
                .parse::<Status>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

const SELECT_COLUMNS: &str = "id, title, description, priority, status, created_at, updated_at";

#[async_trait]
impl RequirementRepository for PostgresRequirementRepository {
    async fn insert(&self, new: &NewRequirement) -> Result<Requirement, InfraError> {
        let row = sqlx::query_as::<_, RequirementRow>(
            r#"
            INSERT INTO requirements (title, description, priority, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, title, description, priority, status, created_at, updated_at
            "#,
        )
        .bind(new.title())
        .bind(new.description())
        .bind(new.priority().to_string())
        .bind(new.status().to_string())
        .bind(new.created_at())
        .fetch_one(&self.pool)
        .await?;

        row.into_entity()
    }

    async fn update(&self, requirement: &Requirement) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE requirements
            SET title = $2, description = $3, priority = $4, status = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(requirement.id().as_i64())
        .bind(requirement.title())
        .bind(requirement.description())
        .bind(requirement.priority().to_string())
        .bind(requirement.status().to_string())
        .bind(requirement.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: RequirementId) -> Result<Option<Requirement>, InfraError> {
        let row = sqlx::query_as::<_, RequirementRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM requirements WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RequirementRow::into_entity).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Requirement>, InfraError> {
        let rows = sqlx::query_as::<_, RequirementRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM requirements ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RequirementRow::into_entity).collect()
    }

    async fn delete(&self, id: RequirementId) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM requirements WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
