//! テストラン管理ユースケース

use std::{collections::BTreeSet, sync::Arc};

use qatrack_domain::{
    clock::Clock,
    test_case::TestCaseId,
    test_run::{CreateTestRun, NewTestRun, TestRun, TestRunId, UpdateTestRun},
    value_objects::UserId,
};
use qatrack_infra::repository::{TestCaseRepository, TestRunRepository};

use crate::{error::CoreError, usecase::helpers::FindResultExt};

/// テストラン管理ユースケース
pub struct TestRunUseCaseImpl {
    test_run_repository: Arc<dyn TestRunRepository>,
    test_case_repository: Arc<dyn TestCaseRepository>,
    clock: Arc<dyn Clock>,
}

impl TestRunUseCaseImpl {
    pub fn new(
        test_run_repository: Arc<dyn TestRunRepository>,
        test_case_repository: Arc<dyn TestCaseRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            test_run_repository,
            test_case_repository,
            clock,
        }
    }

    /// テストランを作成する
    ///
    /// ステータスは入力にかかわらず `Planned` で開始する。
    /// `test_case_ids` は一括解決し、解決できなかった ID は黙って無視する。
    pub async fn create_test_run(
        &self,
        params: CreateTestRun,
        test_case_ids: Vec<TestCaseId>,
    ) -> Result<TestRun, CoreError> {
        let new = NewTestRun::new(params, self.clock.now())?;

        let member_ids: BTreeSet<TestCaseId> = if test_case_ids.is_empty() {
            BTreeSet::new()
        } else {
            self.test_case_repository
                .find_by_ids(&test_case_ids)
                .await?
                .iter()
                .map(|c| c.id())
                .collect()
        };

        let new = new.with_test_cases(member_ids);
        Ok(self.test_run_repository.insert(&new).await?)
    }

    /// テストランを取得する
    pub async fn get_test_run(&self, id: TestRunId) -> Result<TestRun, CoreError> {
        self.test_run_repository
            .find_by_id(id)
            .await
            .or_not_found("テストラン")
    }

    /// テストランの一覧を取得する
    pub async fn list_test_runs(&self) -> Result<Vec<TestRun>, CoreError> {
        Ok(self.test_run_repository.find_all().await?)
    }

    /// 作成者でテストランの一覧を取得する
    pub async fn list_by_creator(&self, user_id: UserId) -> Result<Vec<TestRun>, CoreError> {
        Ok(self.test_run_repository.find_by_created_by(user_id).await?)
    }

    /// テストランを更新する
    ///
    /// 日時フィールドのゲート（ステータス・順序・クロックスキュー）は
    /// ドメイン層の `apply_update` が検証する。
    pub async fn update_test_run(
        &self,
        id: TestRunId,
        patch: UpdateTestRun,
    ) -> Result<TestRun, CoreError> {
        let run = self
            .test_run_repository
            .find_by_id(id)
            .await
            .or_not_found("テストラン")?;

        let run = run.apply_update(patch, self.clock.now())?;
        self.test_run_repository.update(&run).await?;

        Ok(run)
    }

    /// テストランを削除する
    pub async fn delete_test_run(&self, id: TestRunId) -> Result<(), CoreError> {
        self.test_run_repository
            .find_by_id(id)
            .await
            .or_not_found("テストラン")?;

        self.test_run_repository.delete(id).await?;
        Ok(())
    }

    /// テストランにテストケースを追加する
    ///
    /// 既にメンバーの場合は競合エラーになる。
    pub async fn add_test_case(
        &self,
        run_id: TestRunId,
        case_id: TestCaseId,
    ) -> Result<TestRun, CoreError> {
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

        let run = run.add_test_case(test_case.id())?;
        self.test_run_repository.update(&run).await?;

        Ok(run)
    }
}
