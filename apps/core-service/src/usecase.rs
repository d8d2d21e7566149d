//! # ユースケース層
//!
//! Core Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと時刻プロバイダを `Arc<dyn Trait>` で
//!   外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースと
//!   ドメイン層に集約

pub(crate) mod helpers;

pub mod requirement;
pub mod test_case;
pub mod test_execution;
pub mod test_run;

pub use requirement::RequirementUseCaseImpl;
pub use test_case::TestCaseUseCaseImpl;
pub use test_execution::TestExecutionUseCaseImpl;
pub use test_run::TestRunUseCaseImpl;
