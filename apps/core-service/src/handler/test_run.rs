//! # テストランハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/test-runs` - テストラン作成
//! - `GET /api/test-runs` - テストラン一覧
//! - `GET /api/test-runs/{id}` - テストラン取得
//! - `PUT /api/test-runs/{id}` - テストラン更新
//! - `DELETE /api/test-runs/{id}` - テストラン削除
//! - `POST /api/test-runs/{run_id}/test-cases/{case_id}` - テストケース追加
//! - `GET /api/test-runs/user/{user_id}` - 作成者別テストラン一覧

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use qatrack_domain::{
    test_case::TestCaseId,
    test_run::{CreateTestRun, TestRun, TestRunId, UpdateTestRun},
    value_objects::{TestRunStatus, UserId},
};
use qatrack_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, usecase::TestRunUseCaseImpl};

/// テストラン API の共有状態
pub struct TestRunState {
    pub usecase: TestRunUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// テストラン作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTestRunRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// 受理するが無視される（テストランは常に `PLANNED` で作成される）
    pub status: Option<TestRunStatus>,
    pub test_case_ids: Option<Vec<i64>>,
    pub created_by: i64,
}

/// テストラン更新リクエスト（`None` のフィールドは変更しない）
#[derive(Debug, Deserialize)]
pub struct UpdateTestRunRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// テストラン DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TestRunDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TestRunStatus,
    pub start_time: String,
    pub end_time: String,
    pub created_by: i64,
    pub test_case_ids: Vec<i64>,
}

impl TestRunDto {
    fn from_entity(run: &TestRun) -> Self {
        Self {
            id: run.id().as_i64(),
            title: run.title().to_string(),
            description: run.description().map(String::from),
            status: run.status(),
            start_time: run.start_time().to_rfc3339(),
            end_time: run.end_time().to_rfc3339(),
            created_by: run.created_by().as_i64(),
            test_case_ids: run.test_case_ids().iter().map(|id| id.as_i64()).collect(),
        }
    }
}

// --- ハンドラ ---

/// POST /api/test-runs
///
/// 入力の `status` は無視され、常に `PLANNED` で作成される。
/// `test_case_ids` のうち解決できなかった ID は黙って無視される。
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたテストラン
/// - `400 Bad Request`: タイトル・日時の検証に失敗
#[tracing::instrument(skip_all)]
pub async fn create_test_run(
    State(state): State<Arc<TestRunState>>,
    Json(req): Json<CreateTestRunRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let params = CreateTestRun {
        title: req.title,
        description: req.description,
        start_time: req.start_time,
        end_time: req.end_time,
        created_by: UserId::from_i64(req.created_by),
    };
    let test_case_ids: Vec<TestCaseId> = req
        .test_case_ids
        .unwrap_or_default()
        .into_iter()
        .map(TestCaseId::from_i64)
        .collect();

    let run = state.usecase.create_test_run(params, test_case_ids).await?;

    let response = ApiResponse::new(TestRunDto::from_entity(&run));
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/test-runs
#[tracing::instrument(skip_all)]
pub async fn list_test_runs(
    State(state): State<Arc<TestRunState>>,
) -> Result<impl IntoResponse, CoreError> {
    let runs = state.usecase.list_test_runs().await?;

    let items: Vec<TestRunDto> = runs.iter().map(TestRunDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /api/test-runs/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_test_run(
    State(state): State<Arc<TestRunState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let run = state.usecase.get_test_run(TestRunId::from_i64(id)).await?;

    let response = ApiResponse::new(TestRunDto::from_entity(&run));
    Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/test-runs/{id}
///
/// 日時フィールドのゲートはドメイン層で検証される。
/// 開始・終了の同時指定はステータスゲートを通らない点に注意。
///
/// ## レスポンス
///
/// - `200 OK`: 更新後のテストラン
/// - `400 Bad Request`: 日時・タイトルの検証に失敗
/// - `404 Not Found`: テストランが見つからない
/// - `409 Conflict`: 計画中以外の状態で開始日時のみを変更
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_test_run(
    State(state): State<Arc<TestRunState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTestRunRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let patch = UpdateTestRun {
        title: req.title,
        description: req.description,
        start_time: req.start_time,
        end_time: req.end_time,
    };

    let run = state
        .usecase
        .update_test_run(TestRunId::from_i64(id), patch)
        .await?;

    let response = ApiResponse::new(TestRunDto::from_entity(&run));
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/test-runs/{id}
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_test_run(
    State(state): State<Arc<TestRunState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    state.usecase.delete_test_run(TestRunId::from_i64(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/test-runs/{run_id}/test-cases/{case_id}
///
/// ## レスポンス
///
/// - `200 OK`: 追加後のテストラン
/// - `404 Not Found`: テストランまたはテストケースが見つからない
/// - `409 Conflict`: 既にメンバーになっている
#[tracing::instrument(skip_all, fields(%run_id, %case_id))]
pub async fn add_test_case_to_run(
    State(state): State<Arc<TestRunState>>,
    Path((run_id, case_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, CoreError> {
    let run = state
        .usecase
        .add_test_case(TestRunId::from_i64(run_id), TestCaseId::from_i64(case_id))
        .await?;

    let response = ApiResponse::new(TestRunDto::from_entity(&run));
    Ok((StatusCode::OK, Json(response)))
}

/// GET /api/test-runs/user/{user_id}
#[tracing::instrument(skip_all, fields(%user_id))]
pub async fn list_test_runs_for_user(
    State(state): State<Arc<TestRunState>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let runs = state
        .usecase
        .list_by_creator(UserId::from_i64(user_id))
        .await?;

    let items: Vec<TestRunDto> = runs.iter().map(TestRunDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}
