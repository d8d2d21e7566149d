//! # テストラン
//!
//! テストケースをまとめて実施する計画単位を管理する。
//! スケジュール（開始・終了日時）の整合性検証とステータスによる
//! 更新ゲートがこのモジュールの中心になる。
//!
//! ## スケジュール検証の要点
//!
//! - 開始日時は終了日時より厳密に前（同時刻は不可）
//! - 作成時の開始日時は「現在時刻 − 30 秒」より前にできない
//!   （分散環境のクロックスキューを許容するためのバッファ）
//! - 更新時は指定されたフィールドの組み合わせで検証が変わる:
//!   開始・終了を同時に指定した場合は前後関係のみを検証し、
//!   片方だけ指定した場合はステータスゲートと既存値との整合性を検証する

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::{
    DomainError,
    test_case::TestCaseId,
    value_objects::{TestRunStatus, UserId},
};

define_i64_id! {
    /// テストラン ID
    pub struct TestRunId;
}

/// タイトルの最大文字数
pub const TITLE_MAX_LENGTH: usize = 255;

/// クロックスキュー許容バッファ（秒）
///
/// 「開始日時が過去でないこと」の判定で、クライアントとサーバーの
/// 時計のずれをこの秒数まで許容する。
pub const CLOCK_SKEW_BUFFER_SECONDS: i64 = 30;

fn skew_buffer() -> Duration {
    Duration::seconds(CLOCK_SKEW_BUFFER_SECONDS)
}

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

/// テストランエンティティ
///
/// 実施期間とメンバーとなるテストケースの集合を持ち、
/// `Planned → InProgress → Completed` の一方向に遷移する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    id: TestRunId,
    title: String,
    description: Option<String>,
    status: TestRunStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_by: UserId,
    test_case_ids: BTreeSet<TestCaseId>,
}

/// テストランの新規作成パラメータ（検証前の生入力）
///
/// 開始・終了日時はリクエスト上必須だが、欠落をドメインエラー
/// （400）として報告するため `Option` で受け取る。
pub struct CreateTestRun {
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_by: UserId,
}

/// テストランの更新パッチ
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Default)]
pub struct UpdateTestRun {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// 検証済みの新規テストラン（ID 未採番）
#[derive(Debug, Clone)]
pub struct NewTestRun {
    title: String,
    description: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_by: UserId,
    test_case_ids: BTreeSet<TestCaseId>,
}

impl NewTestRun {
    /// 入力を検証して新規テストランドラフトを作成する
    ///
    /// ステータスは入力にかかわらず `Planned` で開始する。
    ///
    /// # Errors
    ///
    /// `DomainError::Validation`:
    /// - タイトルが空白のみ、または 255 文字を超える
    /// - 開始日時または終了日時が未指定
    /// - 開始日時が「現在時刻 − 30 秒」より前
    /// - 開始日時が終了日時と同時刻またはそれ以降
    pub fn new(params: CreateTestRun, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_title(&params.title)?;

        let start_time = params
            .start_time
            .ok_or_else(|| DomainError::Validation("開始日時は必須です".to_string()))?;
        let end_time = params
            .end_time
            .ok_or_else(|| DomainError::Validation("終了日時は必須です".to_string()))?;

        if start_time < now - skew_buffer() {
            return Err(DomainError::Validation(
                "開始日時を過去に設定することはできません".to_string(),
            ));
        }
        if start_time >= end_time {
            return Err(DomainError::Validation(
                "開始日時は終了日時より前である必要があります".to_string(),
            ));
        }

        Ok(Self {
            title: params.title,
            description: params.description,
            start_time,
            end_time,
            created_by: params.created_by,
            test_case_ids: BTreeSet::new(),
        })
    }

    /// メンバーとなるテストケース集合を設定する
    ///
    /// 呼び出し側で存在確認を済ませた ID のみを渡すこと
    /// （解決できなかった ID は黙って無視する仕様）。
    pub fn with_test_cases(mut self, test_case_ids: BTreeSet<TestCaseId>) -> Self {
        self.test_case_ids = test_case_ids;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// 新規テストランの初期ステータス（常に `Planned`）
    pub fn status(&self) -> TestRunStatus {
        TestRunStatus::Planned
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn test_case_ids(&self) -> &BTreeSet<TestCaseId> {
        &self.test_case_ids
    }
}

/// テストランの DB 復元パラメータ
pub struct TestRunRecord {
    pub id: TestRunId,
    pub title: String,
    pub description: Option<String>,
    pub status: TestRunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: UserId,
    pub test_case_ids: BTreeSet<TestCaseId>,
}

impl TestRun {
    /// 既存のデータから復元する
    pub fn from_db(record: TestRunRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            status: record.status,
            start_time: record.start_time,
            end_time: record.end_time,
            created_by: record.created_by,
            test_case_ids: record.test_case_ids,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> TestRunId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TestRunStatus {
        self.status
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn test_case_ids(&self) -> &BTreeSet<TestCaseId> {
        &self.test_case_ids
    }

    // ビジネスロジックメソッド

    /// パッチを適用した新しいテストランを返す
    ///
    /// タイトル・説明はステータスにかかわらず変更できる
    /// （タイトルのみ作成時と同じ検証を通す）。
    /// 日時は指定されたフィールドの組み合わせで検証が変わる:
    ///
    /// - **開始・終了を同時指定**: 前後関係（開始 < 終了）のみを検証し、
    ///   ステータスゲートを通さずに両方を適用する
    /// - **開始のみ**: `Planned` 状態でのみ変更可能。新しい開始日時が既存の
    ///   終了日時より後、または「現在時刻 − 30 秒」より前なら拒否する
    /// - **終了のみ**: `Completed` 状態では変更不可（入力エラー扱い）。
    ///   新しい終了日時が既存の開始日時より前、または
    ///   「現在時刻 − 30 秒」より前なら拒否する
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: `Planned` 以外の状態で開始日時のみを
    ///   変更しようとした場合
    /// - `DomainError::Validation`: 上記以外の検証失敗
    pub fn apply_update(
        self,
        patch: UpdateTestRun,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut run = self;

        if let Some(title) = patch.title {
            validate_title(&title)?;
            run.title = title;
        }
        if let Some(description) = patch.description {
            run.description = Some(description);
        }

        match (patch.start_time, patch.end_time) {
            (Some(start_time), Some(end_time)) => {
                // 両方同時の指定はステータスゲートを通さない
                if start_time >= end_time {
                    return Err(DomainError::Validation(
                        "開始日時は終了日時より前である必要があります".to_string(),
                    ));
                }
                run.start_time = start_time;
                run.end_time = end_time;
            }
            (Some(start_time), None) => {
                if run.status != TestRunStatus::Planned {
                    return Err(DomainError::InvalidState(format!(
                        "開始日時を変更できるのは計画中のテストランのみです（現在: {}）",
                        run.status
                    )));
                }
                if start_time > run.end_time {
                    return Err(DomainError::Validation(
                        "開始日時は既存の終了日時より後にできません".to_string(),
                    ));
                }
                if start_time < now - skew_buffer() {
                    return Err(DomainError::Validation(
                        "開始日時を過去に設定することはできません".to_string(),
                    ));
                }
                run.start_time = start_time;
            }
            (None, Some(end_time)) => {
                // 完了済みの終了日時変更は状態エラーではなく入力エラーとして扱う
                if run.status == TestRunStatus::Completed {
                    return Err(DomainError::Validation(
                        "完了済みのテストランの終了日時は変更できません".to_string(),
                    ));
                }
                if end_time < run.start_time {
                    return Err(DomainError::Validation(
                        "終了日時は開始日時より前にできません".to_string(),
                    ));
                }
                if end_time < now - skew_buffer() {
                    return Err(DomainError::Validation(
                        "終了日時を過去に設定することはできません".to_string(),
                    ));
                }
                run.end_time = end_time;
            }
            (None, None) => {}
        }

        Ok(run)
    }

    /// テストケースをメンバーに追加した新しいテストランを返す
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: 同じテストケースがすでにメンバーの場合
    pub fn add_test_case(self, test_case_id: TestCaseId) -> Result<Self, DomainError> {
        if self.test_case_ids.contains(&test_case_id) {
            return Err(DomainError::InvalidState(format!(
                "テストケース {} はすでにこのテストランに追加されています",
                test_case_id
            )));
        }
        let mut run = self;
        run.test_case_ids.insert(test_case_id);
        Ok(run)
    }

    /// テストランを開始した新しいテストランを返す
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: `Planned` 以外の状態で呼び出した場合
    pub fn started(self) -> Result<Self, DomainError> {
        match self.status {
            TestRunStatus::Planned => Ok(Self {
                status: TestRunStatus::InProgress,
                ..self
            }),
            _ => Err(DomainError::InvalidState(format!(
                "開始できるのは計画中のテストランのみです（現在: {}）",
                self.status
            ))),
        }
    }

    /// テストランを完了した新しいテストランを返す
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: `InProgress` 以外の状態で呼び出した場合
    pub fn completed(self) -> Result<Self, DomainError> {
        match self.status {
            TestRunStatus::InProgress => Ok(Self {
                status: TestRunStatus::Completed,
                ..self
            }),
            _ => Err(DomainError::InvalidState(format!(
                "完了できるのは実施中のテストランのみです（現在: {}）",
                self.status
            ))),
        }
    }
}
