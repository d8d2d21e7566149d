//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケースとドメイン層に委譲

pub mod health;
pub mod requirement;
pub mod test_case;
pub mod test_execution;
pub mod test_run;

pub use health::health_check;
pub use requirement::{
    RequirementState,
    create_requirement,
    delete_requirement,
    get_requirement,
    list_requirements,
    update_requirement,
};
pub use test_case::{
    TestCaseState,
    create_test_case,
    delete_test_case,
    get_test_case,
    list_test_cases,
    list_test_cases_for_requirement,
    update_test_case,
};
pub use test_execution::{
    TestExecutionState,
    assign_tester,
    list_executions_for_run,
    list_executions_for_tester,
    submit_result,
};
pub use test_run::{
    TestRunState,
    add_test_case_to_run,
    create_test_run,
    delete_test_run,
    get_test_run,
    list_test_runs,
    list_test_runs_for_user,
    update_test_run,
};
