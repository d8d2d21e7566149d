//! # QaTrack ドメイン層
//!
//! QA トラッキングのビジネスロジックの中核を担うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! このクレートは DDD（ドメイン駆動設計）の原則に従い、以下を提供する:
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: Requirement,
//!   TestRun）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Status,
//!   Priority）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//! これにより、ビジネスロジックの純粋性が保たれる。
//!
//! ## モジュール構成
//!
//! - [`requirement`] - 要件エンティティとライフサイクル
//! - [`test_case`] - テストケースエンティティ
//! - [`test_run`] - テストラン（スケジュール検証と状態ゲートの中心）
//! - [`test_execution`] - テスト実行（割り当てと結果記録）
//! - [`clock`] - 時刻プロバイダの抽象化
//! - [`error`] - ドメイン層で発生するエラーの定義
//!
//! ## 使用例
//!
//! ```rust
//! use qatrack_domain::{DomainError, value_objects::Priority};
//!
//! // 優先度のデフォルトは LOW
//! assert_eq!(Priority::default(), Priority::Low);
//!
//! // ドメインエラーの生成
//! let error = DomainError::Validation("タイトルは必須です".to_string());
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod requirement;
pub mod test_case;
pub mod test_execution;
pub mod test_run;
pub mod value_objects;

pub use error::DomainError;
