//! テストケース管理ユースケース

use std::sync::Arc;

use qatrack_domain::{
    clock::Clock,
    requirement::RequirementId,
    test_case::{CreateTestCase, NewTestCase, TestCase, TestCaseId, UpdateTestCase},
};
use qatrack_infra::repository::TestCaseRepository;

use crate::{error::CoreError, usecase::helpers::FindResultExt};

/// テストケース管理ユースケース
pub struct TestCaseUseCaseImpl {
    test_case_repository: Arc<dyn TestCaseRepository>,
    clock: Arc<dyn Clock>,
}

impl TestCaseUseCaseImpl {
    pub fn new(test_case_repository: Arc<dyn TestCaseRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            test_case_repository,
            clock,
        }
    }

    /// テストケースを作成する
    ///
    /// ステータスの指定がなければ `Open` で開始する。
    pub async fn create_test_case(&self, params: CreateTestCase) -> Result<TestCase, CoreError> {
        let new = NewTestCase::new(params, self.clock.now())?;
        Ok(self.test_case_repository.insert(&new).await?)
    }

    /// テストケースを取得する
    pub async fn get_test_case(&self, id: TestCaseId) -> Result<TestCase, CoreError> {
        self.test_case_repository
            .find_by_id(id)
            .await
            .or_not_found("テストケース")
    }

    /// テストケースの一覧を取得する
    pub async fn list_test_cases(&self) -> Result<Vec<TestCase>, CoreError> {
        Ok(self.test_case_repository.find_all().await?)
    }

    /// 要件に紐づくテストケースの一覧を取得する
    pub async fn list_by_requirement(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<TestCase>, CoreError> {
        if !requirement_id.is_positive() {
            return Err(CoreError::BadRequest(
                "要件 ID は 1 以上である必要があります".to_string(),
            ));
        }
        Ok(self
            .test_case_repository
            .find_by_requirement_id(requirement_id)
            .await?)
    }

    /// テストケースを更新する
    ///
    /// `Closed` 状態のテストケースは更新できない。
    pub async fn update_test_case(
        &self,
        id: TestCaseId,
        patch: UpdateTestCase,
    ) -> Result<TestCase, CoreError> {
        let test_case = self
            .test_case_repository
            .find_by_id(id)
            .await
            .or_not_found("テストケース")?;

        let test_case = test_case.apply_update(patch, self.clock.now())?;
        self.test_case_repository.update(&test_case).await?;

        Ok(test_case)
    }

    /// テストケースを削除する
    ///
    /// 0 以下の ID は存在しない ID と同じ扱いにする。
    pub async fn delete_test_case(&self, id: TestCaseId) -> Result<(), CoreError> {
        if !id.is_positive() {
            return Err(CoreError::NotFound(
                "テストケースが見つかりません".to_string(),
            ));
        }

        self.test_case_repository
            .find_by_id(id)
            .await
            .or_not_found("テストケース")?;

        self.test_case_repository.delete(id).await?;
        Ok(())
    }
}
