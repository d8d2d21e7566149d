//! # テストケース
//!
//! 要件を検証するテストケースを管理する。
//! テストケースは必ず既存の要件に紐づき、クローズされるまで内容を変更できる。

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    requirement::RequirementId,
    value_objects::{Status, TestResult, UserId},
};

define_i64_id! {
    /// テストケース ID
    pub struct TestCaseId;
}

/// タイトルの最大文字数
pub const TITLE_MAX_LENGTH: usize = 255;

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("タイトルは必須です".to_string()));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(DomainError::Validation(format!(
            "タイトルは {} 文字以内である必要があります",
            TITLE_MAX_LENGTH
        )));
    }
    Ok(())
}

/// テストケースエンティティ
///
/// 要件に紐づく検証手順。`Closed` になると以後の更新を受け付けない。
/// 更新パッチにはタイトルの再検証がない（作成時のみ検証される）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    id: TestCaseId,
    title: String,
    description: Option<String>,
    requirement_id: RequirementId,
    status: Status,
    test_result: Option<TestResult>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// テストケースの新規作成パラメータ（検証前の生入力）
pub struct CreateTestCase {
    pub title: String,
    pub description: Option<String>,
    pub requirement_id: RequirementId,
    pub status: Option<Status>,
    pub created_by: UserId,
}

/// テストケースの更新パッチ
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Default)]
pub struct UpdateTestCase {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirement_id: Option<RequirementId>,
    pub status: Option<Status>,
}

/// 検証済みの新規テストケース（ID 未採番）
#[derive(Debug, Clone)]
pub struct NewTestCase {
    title: String,
    description: Option<String>,
    requirement_id: RequirementId,
    status: Status,
    created_by: UserId,
    created_at: DateTime<Utc>,
}

impl NewTestCase {
    /// 入力を検証して新規テストケースドラフトを作成する
    ///
    /// ステータスの指定がなければ `Open` で開始する。
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: タイトルが空白のみ、または 255 文字を
    ///   超える場合。要件 ID が 0 以下の場合
    pub fn new(params: CreateTestCase, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_title(&params.title)?;
        if !params.requirement_id.is_positive() {
            return Err(DomainError::Validation(
                "要件 ID は 1 以上である必要があります".to_string(),
            ));
        }
        Ok(Self {
            title: params.title,
            description: params.description,
            requirement_id: params.requirement_id,
            status: params.status.unwrap_or_default(),
            created_by: params.created_by,
            created_at: now,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn requirement_id(&self) -> RequirementId {
        self.requirement_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// テストケースの DB 復元パラメータ
pub struct TestCaseRecord {
    pub id: TestCaseId,
    pub title: String,
    pub description: Option<String>,
    pub requirement_id: RequirementId,
    pub status: Status,
    pub test_result: Option<TestResult>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestCase {
    /// 既存のデータから復元する
    pub fn from_db(record: TestCaseRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            requirement_id: record.requirement_id,
            status: record.status,
            test_result: record.test_result,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> TestCaseId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn requirement_id(&self) -> RequirementId {
        self.requirement_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn test_result(&self) -> Option<TestResult> {
        self.test_result
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// パッチを適用した新しいテストケースを返す
    ///
    /// `Closed` 状態のテストケースは更新できない。
    /// タイトルを含む各フィールドは再検証なしで適用される。
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: `Closed` 状態で呼び出した場合
    pub fn apply_update(
        self,
        patch: UpdateTestCase,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if self.status == Status::Closed {
            return Err(DomainError::InvalidState(
                "クローズ済みのテストケースは更新できません".to_string(),
            ));
        }

        let mut test_case = self;
        if let Some(title) = patch.title {
            test_case.title = title;
        }
        if let Some(description) = patch.description {
            test_case.description = Some(description);
        }
        if let Some(requirement_id) = patch.requirement_id {
            test_case.requirement_id = requirement_id;
        }
        if let Some(status) = patch.status {
            test_case.status = status;
        }
        test_case.updated_at = now;
        Ok(test_case)
    }
}
