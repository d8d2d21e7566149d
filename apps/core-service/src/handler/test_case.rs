//! # テストケースハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/test-cases` - テストケース作成
//! - `GET /api/test-cases` - テストケース一覧
//! - `GET /api/test-cases/{id}` - テストケース取得
//! - `PUT /api/test-cases/{id}` - テストケース更新
//! - `DELETE /api/test-cases/{id}` - テストケース削除
//! - `GET /api/requirements/{id}/test-cases` - 要件に紐づくテストケース一覧

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use qatrack_domain::{
    requirement::RequirementId,
    test_case::{CreateTestCase, TestCase, TestCaseId, UpdateTestCase},
    value_objects::{Status, TestResult, UserId},
};
use qatrack_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, usecase::TestCaseUseCaseImpl};

/// テストケース API の共有状態
pub struct TestCaseState {
    pub usecase: TestCaseUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// テストケース作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTestCaseRequest {
    pub title: String,
    pub description: Option<String>,
    pub requirement_id: i64,
    pub status: Option<Status>,
    pub created_by: i64,
}

/// テストケース更新リクエスト（`None` のフィールドは変更しない）
#[derive(Debug, Deserialize)]
pub struct UpdateTestCaseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirement_id: Option<i64>,
    pub status: Option<Status>,
}

/// テストケース DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TestCaseDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub requirement_id: i64,
    pub status: Status,
    pub test_result: Option<TestResult>,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TestCaseDto {
    fn from_entity(test_case: &TestCase) -> Self {
        Self {
            id: test_case.id().as_i64(),
            title: test_case.title().to_string(),
            description: test_case.description().map(String::from),
            requirement_id: test_case.requirement_id().as_i64(),
            status: test_case.status(),
            test_result: test_case.test_result(),
            created_by: test_case.created_by().as_i64(),
            created_at: test_case.created_at().to_rfc3339(),
            updated_at: test_case.updated_at().to_rfc3339(),
        }
    }
}

// --- ハンドラ ---

/// POST /api/test-cases
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたテストケース
/// - `400 Bad Request`: タイトルが空か 255 文字超、または要件 ID が 0 以下
#[tracing::instrument(skip_all)]
pub async fn create_test_case(
    State(state): State<Arc<TestCaseState>>,
    Json(req): Json<CreateTestCaseRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let params = CreateTestCase {
        title: req.title,
        description: req.description,
        requirement_id: RequirementId::from_i64(req.requirement_id),
        status: req.status,
        created_by: UserId::from_i64(req.created_by),
    };

    let test_case = state.usecase.create_test_case(params).await?;

    let response = ApiResponse::new(TestCaseDto::from_entity(&test_case));
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/test-cases
#[tracing::instrument(skip_all)]
pub async fn list_test_cases(
    State(state): State<Arc<TestCaseState>>,
) -> Result<impl IntoResponse, CoreError> {
    let test_cases = state.usecase.list_test_cases().await?;

    let items: Vec<TestCaseDto> = test_cases.iter().map(TestCaseDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /api/test-cases/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_test_case(
    State(state): State<Arc<TestCaseState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let test_case = state.usecase.get_test_case(TestCaseId::from_i64(id)).await?;

    let response = ApiResponse::new(TestCaseDto::from_entity(&test_case));
    Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/test-cases/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後のテストケース
/// - `404 Not Found`: テストケースが見つからない
/// - `409 Conflict`: テストケースが `CLOSED` 状態
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_test_case(
    State(state): State<Arc<TestCaseState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTestCaseRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let patch = UpdateTestCase {
        title: req.title,
        description: req.description,
        requirement_id: req.requirement_id.map(RequirementId::from_i64),
        status: req.status,
    };

    let test_case = state
        .usecase
        .update_test_case(TestCaseId::from_i64(id), patch)
        .await?;

    let response = ApiResponse::new(TestCaseDto::from_entity(&test_case));
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/test-cases/{id}
///
/// ## レスポンス
///
/// - `204 No Content`: 削除成功
/// - `404 Not Found`: テストケースが見つからない（0 以下の ID を含む）
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_test_case(
    State(state): State<Arc<TestCaseState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    state
        .usecase
        .delete_test_case(TestCaseId::from_i64(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/requirements/{id}/test-cases
///
/// ## レスポンス
///
/// - `200 OK`: 要件に紐づくテストケースの一覧（空でもよい）
/// - `400 Bad Request`: 要件 ID が 0 以下
#[tracing::instrument(skip_all, fields(%id))]
pub async fn list_test_cases_for_requirement(
    State(state): State<Arc<TestCaseState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let test_cases = state
        .usecase
        .list_by_requirement(RequirementId::from_i64(id))
        .await?;

    let items: Vec<TestCaseDto> = test_cases.iter().map(TestCaseDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}
