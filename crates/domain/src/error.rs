//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **HTTP ステータスへのマッピング**: API 層でステータスコードに変換可能
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `InvalidState` | 409 Conflict | 現在の状態では許可されない操作 |
//!
//! エンティティの不在（404）はリポジトリの検索結果から API 層で判定するため、
//! ドメイン層には NotFound バリアントを置かない。
//!
//! ## 使用例
//!
//! ```rust
//! use qatrack_domain::DomainError;
//!
//! fn validate_title(title: &str) -> Result<(), DomainError> {
//!     if title.is_empty() {
//!         return Err(DomainError::Validation("タイトルは必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 開始日時が終了日時より後
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 状態遷移エラー
    ///
    /// エンティティの現在の状態では許可されない操作を実行しようとした場合に
    /// 使用する。
    ///
    /// # 例
    ///
    /// - オープン状態でない要件の更新
    /// - クローズ済みテストケースの更新
    /// - テストランへのテストケースの重複追加
    #[error("状態遷移エラー: {0}")]
    InvalidState(String),
}
