//! # 要件ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/requirements` - 要件作成
//! - `GET /api/requirements` - 要件一覧
//! - `GET /api/requirements/{id}` - 要件取得
//! - `PUT /api/requirements/{id}` - 要件更新
//! - `DELETE /api/requirements/{id}` - 要件削除

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use qatrack_domain::{
    requirement::{CreateRequirement, Requirement, RequirementId, UpdateRequirement},
    value_objects::{Priority, Status},
};
use qatrack_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, usecase::RequirementUseCaseImpl};

/// 要件 API の共有状態
pub struct RequirementState {
    pub usecase: RequirementUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 要件作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateRequirementRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

/// 要件更新リクエスト（`None` のフィールドは変更しない）
#[derive(Debug, Deserialize)]
pub struct UpdateRequirementRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

/// 要件 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RequirementDto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
}

impl RequirementDto {
    fn from_entity(requirement: &Requirement) -> Self {
        Self {
            id: requirement.id().as_i64(),
            title: requirement.title().to_string(),
            description: requirement.description().map(String::from),
            priority: requirement.priority(),
            status: requirement.status(),
            created_at: requirement.created_at().to_rfc3339(),
            updated_at: requirement.updated_at().to_rfc3339(),
        }
    }
}

// --- ハンドラ ---

/// POST /api/requirements
///
/// ## レスポンス
///
/// - `201 Created`: 作成された要件
/// - `400 Bad Request`: タイトルが空、または英数字とスペース以外を含む
#[tracing::instrument(skip_all)]
pub async fn create_requirement(
    State(state): State<Arc<RequirementState>>,
    Json(req): Json<CreateRequirementRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let params = CreateRequirement {
        title: req.title,
        description: req.description,
        priority: req.priority,
    };

    let requirement = state.usecase.create_requirement(params).await?;

    let response = ApiResponse::new(RequirementDto::from_entity(&requirement));
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/requirements
#[tracing::instrument(skip_all)]
pub async fn list_requirements(
    State(state): State<Arc<RequirementState>>,
) -> Result<impl IntoResponse, CoreError> {
    let requirements = state.usecase.list_requirements().await?;

    let items: Vec<RequirementDto> = requirements.iter().map(RequirementDto::from_entity).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /api/requirements/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 要件
/// - `404 Not Found`: 要件が見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_requirement(
    State(state): State<Arc<RequirementState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    let requirement = state
        .usecase
        .get_requirement(RequirementId::from_i64(id))
        .await?;

    let response = ApiResponse::new(RequirementDto::from_entity(&requirement));
    Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/requirements/{id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の要件
/// - `400 Bad Request`: 新しいタイトルが検証に失敗
/// - `404 Not Found`: 要件が見つからない
/// - `409 Conflict`: 要件が `OPEN` 状態ではない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_requirement(
    State(state): State<Arc<RequirementState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRequirementRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let patch = UpdateRequirement {
        title: req.title,
        description: req.description,
        priority: req.priority,
        status: req.status,
    };

    let requirement = state
        .usecase
        .update_requirement(RequirementId::from_i64(id), patch)
        .await?;

    let response = ApiResponse::new(RequirementDto::from_entity(&requirement));
    Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/requirements/{id}
///
/// ## レスポンス
///
/// - `204 No Content`: 削除成功
/// - `404 Not Found`: 要件が見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_requirement(
    State(state): State<Arc<RequirementState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CoreError> {
    state
        .usecase
        .delete_requirement(RequirementId::from_i64(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::{get, post},
    };
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use qatrack_domain::clock::FixedClock;
    use qatrack_infra::mock::MockRequirementRepository;
    use tower::ServiceExt;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn create_test_app() -> Router {
        let usecase = RequirementUseCaseImpl::new(
            Arc::new(MockRequirementRepository::new()),
            Arc::new(FixedClock::new(fixed_now())),
        );
        let state = Arc::new(RequirementState { usecase });

        Router::new()
            .route(
                "/api/requirements",
                post(create_requirement).get(list_requirements),
            )
            .route(
                "/api/requirements/{id}",
                get(get_requirement)
                    .put(update_requirement)
                    .delete(delete_requirement),
            )
            .with_state(state)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    async fn response_body<T: serde::de::DeserializeOwned>(
        response: axum::http::Response<Body>,
    ) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_要件を作成すると201が返る() {
        // Given
        let sut = create_test_app();
        let request = json_request(
            Method::POST,
            "/api/requirements",
            serde_json::json!({
                "title": "Login",
                "description": "Login flow",
                "priority": "HIGH"
            }),
        );

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: ApiResponse<RequirementDto> = response_body(response).await;
        assert_eq!(body.data.id, 1);
        assert_eq!(body.data.title, "Login");
        assert_eq!(body.data.priority, Priority::High);
        assert_eq!(body.data.status, Status::Open);
    }

    #[tokio::test]
    async fn test_post_記号を含むタイトルは400が返る() {
        // Given
        let sut = create_test_app();
        let request = json_request(
            Method::POST,
            "/api/requirements",
            serde_json::json!({ "title": "Login!" }),
        );

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_存在しない要件は404が返る() {
        // Given
        let sut = create_test_app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/requirements/99")
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_クローズ済み要件の更新は409が返る() {
        // Given: 作成してからクローズする
        let sut = create_test_app();
        let response = sut
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/requirements",
                serde_json::json!({ "title": "Login" }),
            ))
            .await
            .unwrap();
        let body: ApiResponse<RequirementDto> = response_body(response).await;

        let response = sut
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/requirements/{}", body.data.id),
                serde_json::json!({ "status": "CLOSED" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // When: クローズ後にタイトルを変更しようとする
        let response = sut
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/requirements/{}", body.data.id),
                serde_json::json!({ "title": "Login v2" }),
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_要件を削除すると204が返る() {
        // Given
        let sut = create_test_app();
        let response = sut
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/requirements",
                serde_json::json!({ "title": "Login" }),
            ))
            .await
            .unwrap();
        let body: ApiResponse<RequirementDto> = response_body(response).await;

        // When
        let response = sut
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/requirements/{}", body.data.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_get_要件一覧が返る() {
        // Given
        let sut = create_test_app();
        for title in ["Req A", "Req B"] {
            sut.clone()
                .oneshot(json_request(
                    Method::POST,
                    "/api/requirements",
                    serde_json::json!({ "title": title }),
                ))
                .await
                .unwrap();
        }

        // When
        let response = sut
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/requirements")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<Vec<RequirementDto>> = response_body(response).await;
        assert_eq!(body.data.len(), 2);
    }
}
