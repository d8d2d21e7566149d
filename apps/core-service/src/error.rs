//! # Core Service エラー定義
//!
//! Core Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ドメインエラーは [`DomainError`] の種別に応じてマッピングする:
//! 入力検証の失敗は 400、状態遷移の違反は 409。リソース未解決は
//! ユースケース層が [`CoreError::NotFound`] を生成する（404）。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qatrack_domain::DomainError;
use qatrack_infra::InfraError;
use qatrack_shared::ErrorResponse;
use thiserror::Error;

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 状態による競合
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::BadRequest(msg),
            DomainError::InvalidState(msg) => CoreError::Conflict(msg),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            CoreError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::conflict(msg)),
            CoreError::Database(err) => {
                // 詳細はログにのみ出し、レスポンスには含めない
                tracing::error!(span_trace = %err.span_trace(), "データベースエラー: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!("内部エラー: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
