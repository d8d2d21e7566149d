//! 要件管理ユースケース

use std::sync::Arc;

use qatrack_domain::{
    clock::Clock,
    requirement::{
        CreateRequirement,
        NewRequirement,
        Requirement,
        RequirementId,
        UpdateRequirement,
    },
};
use qatrack_infra::repository::RequirementRepository;

use crate::{error::CoreError, usecase::helpers::FindResultExt};

/// 要件管理ユースケース
pub struct RequirementUseCaseImpl {
    requirement_repository: Arc<dyn RequirementRepository>,
    clock: Arc<dyn Clock>,
}

impl RequirementUseCaseImpl {
    pub fn new(requirement_repository: Arc<dyn RequirementRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            requirement_repository,
            clock,
        }
    }

    /// 要件を作成する
    ///
    /// 優先度の指定がなければ `Low`、ステータスは常に `Open` で開始する。
    pub async fn create_requirement(
        &self,
        params: CreateRequirement,
    ) -> Result<Requirement, CoreError> {
        let new = NewRequirement::new(params, self.clock.now())?;
        Ok(self.requirement_repository.insert(&new).await?)
    }

    /// 要件を取得する
    pub async fn get_requirement(&self, id: RequirementId) -> Result<Requirement, CoreError> {
        self.requirement_repository
            .find_by_id(id)
            .await
            .or_not_found("要件")
    }

    /// 要件の一覧を取得する
    pub async fn list_requirements(&self) -> Result<Vec<Requirement>, CoreError> {
        Ok(self.requirement_repository.find_all().await?)
    }

    /// 要件を更新する
    ///
    /// `Open` 状態の要件のみ更新できる。タイトルは作成時と同じ検証を通す。
    pub async fn update_requirement(
        &self,
        id: RequirementId,
        patch: UpdateRequirement,
    ) -> Result<Requirement, CoreError> {
        let requirement = self
            .requirement_repository
            .find_by_id(id)
            .await
            .or_not_found("要件")?;

        let requirement = requirement.apply_update(patch, self.clock.now())?;
        self.requirement_repository.update(&requirement).await?;

        Ok(requirement)
    }

    /// 要件を削除する
    ///
    /// ステータスにかかわらず無条件に削除する。
    pub async fn delete_requirement(&self, id: RequirementId) -> Result<(), CoreError> {
        self.requirement_repository
            .find_by_id(id)
            .await
            .or_not_found("要件")?;

        self.requirement_repository.delete(id).await?;
        Ok(())
    }
}
