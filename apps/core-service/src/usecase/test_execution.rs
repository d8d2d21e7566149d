//! テスト実行（割り当て・結果報告）ユースケース

use std::sync::Arc;

use qatrack_domain::{
    test_case::TestCaseId,
    test_execution::{NewTestExecution, TestExecution, TestExecutionId},
    test_run::TestRunId,
    value_objects::{TestResult, UserId},
};
use qatrack_infra::repository::{
    TestCaseRepository,
    TestExecutionRepository,
    TestRunRepository,
};

use crate::{error::CoreError, usecase::helpers::FindResultExt};

/// テスト実行ユースケース
pub struct TestExecutionUseCaseImpl {
    test_execution_repository: Arc<dyn TestExecutionRepository>,
    test_run_repository: Arc<dyn TestRunRepository>,
    test_case_repository: Arc<dyn TestCaseRepository>,
}

impl TestExecutionUseCaseImpl {
    pub fn new(
        test_execution_repository: Arc<dyn TestExecutionRepository>,
        test_run_repository: Arc<dyn TestRunRepository>,
        test_case_repository: Arc<dyn TestCaseRepository>,
    ) -> Self {
        Self {
            test_execution_repository,
            test_run_repository,
            test_case_repository,
        }
    }

    /// 担当者をテストランのテストケースに割り当てる
    ///
    /// 同じ (テストラン, テストケース, 担当者) の三つ組が既に存在する場合は
    /// 新しい行を作らず、既存のテスト実行をそのまま返す（冪等）。
    pub async fn assign(
        &self,
        run_id: TestRunId,
        case_id: TestCaseId,
        tester_id: UserId,
    ) -> Result<TestExecution, CoreError> {
        let run = self
            .test_run_repository
            .find_by_id(run_id)
            .await
            .or_not_found("テストラン")?;

        let test_case = self
            .test_case_repository
            .find_by_id(case_id)
            .await
            .or_not_found("テストケース")?;

        if let Some(existing) = self
            .test_execution_repository
            .find_by_run_case_tester(run.id(), test_case.id(), tester_id)
            .await?
        {
            return Ok(existing);
        }

        let new = NewTestExecution::new(run.id(), test_case.id(), tester_id);
        Ok(self.test_execution_repository.insert(&new).await?)
    }

    /// テスト結果を報告する
    ///
    /// 報告できるのは割り当てられた担当者本人のみ。
    /// 結果・コメントは無条件に上書きされる。
    pub async fn submit_result(
        &self,
        execution_id: TestExecutionId,
        tester_id: UserId,
        result: TestResult,
        comment: Option<String>,
    ) -> Result<TestExecution, CoreError> {
        let execution = self
            .test_execution_repository
            .find_by_id(execution_id)
            .await
            .or_not_found("テスト実行")?;

        let execution = execution.submit_result(tester_id, result, comment)?;
        self.test_execution_repository.update(&execution).await?;

        Ok(execution)
    }

    /// 担当者に割り当てられたテスト実行の一覧を取得する
    pub async fn list_for_tester(
        &self,
        tester_id: UserId,
    ) -> Result<Vec<TestExecution>, CoreError> {
        Ok(self
            .test_execution_repository
            .find_by_tester_id(tester_id)
            .await?)
    }

    /// テストランに属するテスト実行の一覧を取得する
    pub async fn list_for_run(&self, run_id: TestRunId) -> Result<Vec<TestExecution>, CoreError> {
        Ok(self
            .test_execution_repository
            .find_by_test_run_id(run_id)
            .await?)
    }
}
