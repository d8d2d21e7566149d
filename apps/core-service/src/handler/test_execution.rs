//! # テスト実行ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/test-executions/runs/{run_id}/cases/{case_id}/assign/{tester_id}`
//!   - 担当者の割り当て（冪等）
//! - `PUT /api/test-executions/{id}/result` - テスト結果の報告
//! - `GET /api/test-executions/tester/{tester_id}` - 担当者別一覧
//! - `GET /api/test-executions/run/{run_id}` - テストラン別一覧

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use qatrack_domain::{
    test_case::TestCaseId,
    test_execution::{TestExecution, TestExecutionId},
    test_run::TestRunId,
    value_objects::{TestResult, UserId},
};
use qatrack_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, usecase::TestExecutionUseCaseImpl};

/// テスト実行 API の共有状態
pub struct TestExecutionState {
    pub usecase: TestExecutionUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// テスト結果報告リクエスト
#[derive(Debug, Deserialize)]
pub struct SubmitResultRequest {
    pub tester_id: i64,
    pub result: TestResult,
    pub comment: Option<String>,
}

/// テスト実行 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TestExecutionDto {
    pub id: i64,
    pub test_run_id: i64,
    pub test_case_id: i64,
    pub tester_id: i64,
    pub result: Option<TestResult>,
    pub comment: Option<String>,
}

impl TestExecutionDto {
    fn from_entity(execution: &TestExecution) -> Self {
        Self {
            id: execution.id().as_i64(),
            test_run_id: execution.test_run_id().as_i64(),
            test_case_id: execution.test_case_id().as_i64(),
            tester_id: execution.tester_id().as_i64(),
            result: execution.result(),
            comment: execution.comment().map(String::from),
        }
    }
}

// --- ハンドラ ---

/// POST /api/test-executions/runs/{run_id}/cases/{case_id}/assign/{tester_id}
///
/// 同じ三つ組への再割り当ては既存のテスト実行をそのまま返す。
///
/// ## レスポンス
///
/// - `200 OK`: 割り当てられたテスト実行（既存または新規）
/// - `404 Not Found`: テストランまたはテストケースが見つからない
#[tracing::instrument(skip_all, fields(%run_id, %case_id, %tester_id))]
pub async fn assign_tester(
    State(state): State<Arc<TestExecutionState>>,
    Path((run_id, case_id, tester_id)): Path<(i64, i64, i64)>,
) -> Result<impl IntoResponse, CoreError> {
    let execution = state
        .usecase
        .assign(
            TestRunId::from_i64(run_id),
            TestCaseId::from_i64(case_id),
            UserId::from_i64(tester_id),
        )
        .await?;

    let response = ApiResponse::new(TestExecutionDto::from_entity(&execution));
    Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/test-executions/{id}/result
///
/// ## レスポンス
///
/// - `200 OK`: 報告後のテスト実行
/// - `400 Bad Request`: 報告者が割り当てられた担当者ではない
/// - `404 Not Found`: テスト実行が見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn submit_result(
    State(state): State<Arc<TestExecutionState>>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitResultRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let execution = state
        .usecase
        .submit_result(
            TestExecutionId::from_i64(id),
            UserId::from_i64(req.tester_id),
            req.result,
            req.comment,
        )
        .await?;

    let response = ApiResponse::new(TestExecutionDto::from_entity(&execution));
    Ok((StatusCode::OK, Json(response)))
}

/// GET /api/test-executions/tester/{tester_id}
#[tracing::instrument(skip_all, fields(%tester_id))]
pub async fn list_executions_for_tester(
    State(state): State<Arc<TestExecutionState>>,
    Path(tester_id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let executions = state
        .usecase
        .list_for_tester(UserId::from_i64(tester_id))
        .await?;

    let items: Vec<TestExecutionDto> =
        executions.iter().map(TestExecutionDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /api/test-executions/run/{run_id}
#[tracing::instrument(skip_all, fields(%run_id))]
pub async fn list_executions_for_run(
    State(state): State<Arc<TestExecutionState>>,
    Path(run_id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let executions = state.usecase.list_for_run(TestRunId::from_i64(run_id)).await?;

    let items: Vec<TestExecutionDto> =
        executions.iter().map(TestExecutionDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}
