//! # ヘルスチェックハンドラ
//!
//! サービスの稼働状態を確認するためのエンドポイント。
//!
//! ```text
//! GET /health
//! ```

use axum::Json;
use qatrack_shared::HealthResponse;

/// ヘルスチェックエンドポイント
///
/// サーバーが正常に稼働していることを確認する。
/// バージョンは Cargo.toml から取得する。
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
