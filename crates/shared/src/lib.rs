//! # QaTrack 共有ユーティリティ
//!
//! プロジェクト全体で使用される共通型を提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, core-service）から依存される
//! - ビジネスロジックを含まない純粋なデータ型のみを配置
//! - 外部クレートへの依存は最小限に抑える

pub mod api_response;
pub mod error_response;
pub mod health;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::HealthResponse;
