//! # リポジトリ実装
//!
//! 各エンティティの永続化操作を定義するトレイトと、その PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイト経由でリポジトリを利用する
//! - **採番は DB に委譲**: INSERT は `RETURNING` 句で採番済みのエンティティを返す
//! - **テスタビリティ**: トレイト経由でモック可能な設計（[`crate::mock`]）

pub mod requirement_repository;
pub mod test_case_repository;
pub mod test_execution_repository;
pub mod test_run_repository;

pub use requirement_repository::{PostgresRequirementRepository, RequirementRepository};
pub use test_case_repository::{PostgresTestCaseRepository, TestCaseRepository};
pub use test_execution_repository::{PostgresTestExecutionRepository, TestExecutionRepository};
pub use test_run_repository::{PostgresTestRunRepository, TestRunRepository};
