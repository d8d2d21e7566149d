//! ユースケース層の共通ヘルパー

use qatrack_infra::InfraError;

use crate::error::CoreError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, CoreError>` に変換する
///
/// `find_by_id` 等の `Option` を返すリポジトリメソッドの結果を、
/// `CoreError::NotFound` または `CoreError::Database` に変換する。
///
/// ```ignore
/// let run = self.test_run_repository.find_by_id(id).await.or_not_found("テストラン")?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `CoreError::NotFound`、`InfraError` の場合は
    /// `CoreError::Database` を返す
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError> {
        self.map_err(CoreError::Database)?
            .ok_or_else(|| CoreError::NotFound(format!("{entity_name}が見つかりません")))
    }
}
