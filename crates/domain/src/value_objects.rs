//! # 共通値オブジェクト
//!
//! 複数のエンティティで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **ワイヤ形式の固定**: ステータス系 enum は JSON / DB とも
//!   `SCREAMING_SNAKE_CASE` 文字列で表現する
//!
//! ## 含まれる型
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`UserId`] | ユーザー識別子（採番は外部の認証基盤） |
//! | [`Status`] | 要件・テストケース共通のライフサイクルステータス |
//! | [`Priority`] | 要件の優先度 |
//! | [`TestRunStatus`] | テストランのライフサイクルステータス |
//! | [`TestResult`] | テスト実行の結果 |

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::DomainError;

define_i64_id! {
    /// ユーザー ID
    ///
    /// ユーザーの採番・認証は外部の認証基盤の責務であり、
    /// このシステムでは識別子としてのみ扱う。
    pub struct UserId;
}

// =========================================================================
// Status（要件・テストケース共通ステータス）
// =========================================================================

/// 要件・テストケース共通のライフサイクルステータス
///
/// 更新ゲートの基準になる:
/// - 要件は `Open` の間のみ更新可能
/// - テストケースは `Closed` になると更新不可
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// オープン（初期状態）
    #[default]
    Open,
    /// 対応中
    InProgress,
    /// クローズ済み
    Closed,
}

impl std::str::FromStr for Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(DomainError::Validation(format!("不正なステータス: {}", s))),
        }
    }
}

// =========================================================================
// Priority（要件の優先度）
// =========================================================================

/// 要件の優先度
///
/// 作成時に指定がなければ `Low` がデフォルトになる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// 高
    High,
    /// 中
    Medium,
    /// 低（デフォルト）
    #[default]
    Low,
}

impl std::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(DomainError::Validation(format!("不正な優先度: {}", s))),
        }
    }
}

// =========================================================================
// TestRunStatus（テストランステータス）
// =========================================================================

/// テストランのライフサイクルステータス
///
/// `Planned → InProgress → Completed` の一方向に遷移する。
/// 作成時は入力にかかわらず `Planned` に強制される。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TestRunStatus {
    /// 計画中（初期状態）
    #[default]
    Planned,
    /// 実施中
    InProgress,
    /// 完了
    Completed,
}

impl std::str::FromStr for TestRunStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANNED" => Ok(Self::Planned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DomainError::Validation(format!(
                "不正なテストランステータス: {}",
                s
            ))),
        }
    }
}

// =========================================================================
// TestResult（テスト結果）
// =========================================================================

/// テスト実行の結果
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResult {
    /// 合格
    Pass,
    /// 不合格
    Fail,
    /// ブロック（前提条件が満たせず実施不能）
    Blocked,
}

impl std::str::FromStr for TestResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            "BLOCKED" => Ok(Self::Blocked),
            _ => Err(DomainError::Validation(format!(
                "不正なテスト結果: {}",
                s
            ))),
        }
    }
}

// =========================================================================
// テスト
// =========================================================================

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // UserId のテスト

    #[test]
    fn test_ユーザーidは正の値で有効() {
        let id = UserId::from_i64(42);
        assert_eq!(id.as_i64(), 42);
        assert!(id.is_positive());
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn test_ユーザーidの0以下はis_positiveがfalse(#[case] value: i64) {
        assert!(!UserId::from_i64(value).is_positive());
    }

    #[test]
    fn test_ユーザーidの表示形式は数値のみ() {
        assert_eq!(UserId::from_i64(7).to_string(), "7");
    }

    // Status のテスト

    #[test]
    fn test_ステータスのデフォルトはopen() {
        assert_eq!(Status::default(), Status::Open);
    }

    #[rstest]
    #[case(Status::Open, "OPEN")]
    #[case(Status::InProgress, "IN_PROGRESS")]
    #[case(Status::Closed, "CLOSED")]
    fn test_ステータスの文字列表現(#[case] status: Status, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
        assert_eq!(Status::from_str(expected).unwrap(), status);
    }

    #[test]
    fn test_ステータスの不正な文字列はエラー() {
        assert!(Status::from_str("open").is_err());
        assert!(Status::from_str("UNKNOWN").is_err());
    }

    #[test]
    fn test_ステータスのjsonシリアライズ() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    // Priority のテスト

    #[test]
    fn test_優先度のデフォルトはlow() {
        assert_eq!(Priority::default(), Priority::Low);
    }

    #[rstest]
    #[case(Priority::High, "HIGH")]
    #[case(Priority::Medium, "MEDIUM")]
    #[case(Priority::Low, "LOW")]
    fn test_優先度の文字列表現(#[case] priority: Priority, #[case] expected: &str) {
        assert_eq!(priority.to_string(), expected);
        assert_eq!(Priority::from_str(expected).unwrap(), priority);
    }

    // TestRunStatus のテスト

    #[test]
    fn test_テストランステータスのデフォルトはplanned() {
        assert_eq!(TestRunStatus::default(), TestRunStatus::Planned);
    }

    #[rstest]
    #[case(TestRunStatus::Planned, "PLANNED")]
    #[case(TestRunStatus::InProgress, "IN_PROGRESS")]
    #[case(TestRunStatus::Completed, "COMPLETED")]
    fn test_テストランステータスの文字列表現(
        #[case] status: TestRunStatus,
        #[case] expected: &str,
    ) {
        assert_eq!(status.to_string(), expected);
        assert_eq!(TestRunStatus::from_str(expected).unwrap(), status);
    }

    // TestResult のテスト

    #[rstest]
    #[case(TestResult::Pass, "PASS")]
    #[case(TestResult::Fail, "FAIL")]
    #[case(TestResult::Blocked, "BLOCKED")]
    fn test_テスト結果の文字列表現(#[case] result: TestResult, #[case] expected: &str) {
        assert_eq!(result.to_string(), expected);
        assert_eq!(TestResult::from_str(expected).unwrap(), result);
    }

    #[test]
    fn test_テスト結果の不正な文字列はエラー() {
        assert!(TestResult::from_str("SUCCESS").is_err());
    }

    #[test]
    fn test_テスト結果のjsonデシリアライズ() {
        let result: TestResult = serde_json::from_str("\"BLOCKED\"").unwrap();
        assert_eq!(result, TestResult::Blocked);
    }
}
