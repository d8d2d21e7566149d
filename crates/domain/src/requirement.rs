//! # 要件
//!
//! テスト対象となる要件を管理する。
//! 要件はオープン状態で作成され、オープンの間のみ内容を変更できる。

use chrono::{DateTime, Utc};

use crate::{
    DomainError,
    value_objects::{Priority, Status},
};

define_i64_id! {
    /// 要件 ID
    pub struct RequirementId;
}

/// タイトルに使用できる文字の検証
///
/// 空白のみのタイトルを拒否し、英数字とスペース以外の文字を含む場合も拒否する。
fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("タイトルは必須です".to_string()));
    }
    if !title.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(DomainError::Validation(
            "タイトルに使用できるのは英数字とスペースのみです".to_string(),
        ));
    }
    Ok(())
}

/// 要件エンティティ
///
/// タイトルと優先度を持ち、`Open → InProgress → Closed`
/// のライフサイクルを辿る。更新が許可されるのは `Open` 状態のときのみ。
/// 削除には状態ゲートがない（どの状態でも削除できる）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    id: RequirementId,
    title: String,
    description: Option<String>,
    priority: Priority,
    status: Status,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 要件の新規作成パラメータ（検証前の生入力）
pub struct CreateRequirement {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

/// 要件の更新パッチ
///
/// `None` のフィールドは変更しない（フィールドをクリアする操作は存在しない）。
#[derive(Debug, Default)]
pub struct UpdateRequirement {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

/// 検証済みの新規要件（ID 未採番）
///
/// リポジトリが INSERT 時に ID を採番し、[`Requirement`] として返す。
#[derive(Debug, Clone)]
pub struct NewRequirement {
    title: String,
    description: Option<String>,
    priority: Priority,
    created_at: DateTime<Utc>,
}

impl NewRequirement {
    /// 入力を検証して新規要件ドラフトを作成する
    ///
    /// 優先度の指定がなければ `Low`、ステータスは入力にかかわらず `Open`
    /// で開始する。
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: タイトルが空白のみ、または英数字と
    ///   スペース以外の文字を含む場合
    pub fn new(params: CreateRequirement, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_title(&params.title)?;
        Ok(Self {
            title: params.title,
            description: params.description,
            priority: params.priority.unwrap_or_default(),
            created_at: now,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// 新規要件の初期ステータス（常に `Open`）
    pub fn status(&self) -> Status {
        Status::Open
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// 要件の DB 復元パラメータ
pub struct RequirementRecord {
    pub id: RequirementId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Requirement {
    /// 既存のデータから復元する
    pub fn from_db(record: RequirementRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            priority: record.priority,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> RequirementId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// パッチを適用した新しい要件を返す
    ///
    /// 更新が許可されるのは `Open` 状態のときのみ。タイトルを変更する場合は
    /// 作成時と同じ検証を通す。ステータス自体の変更もこのパッチで行う
    /// （`Open` からの一方向遷移のため、一度クローズすると再度更新できない）。
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidState`: `Open` 以外の状態で呼び出した場合
    /// - `DomainError::Validation`: 新しいタイトルが検証に失敗した場合
    pub fn apply_update(
        self,
        patch: UpdateRequirement,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if self.status != Status::Open {
            return Err(DomainError::InvalidState(format!(
                "オープン状態の要件のみ更新できます（現在: {}）",
                self.status
            )));
        }

        let mut requirement = self;
        if let Some(title) = patch.title {
            validate_title(&title)?;
            requirement.title = title;
        }
        if let Some(description) = patch.description {
            requirement.description = Some(description);
        }
        if let Some(priority) = patch.priority {
            requirement.priority = priority;
        }
        if let Some(status) = patch.status {
            requirement.status = status;
        }
        requirement.updated_at = now;
        Ok(requirement)
    }
}
