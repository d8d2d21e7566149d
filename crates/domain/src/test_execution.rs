//! # テスト実行
//!
//! テストラン内の 1 テストケースを 1 担当者に割り当てた実行単位。
//! (テストラン, テストケース, 担当者) の三つ組で一意になり、
//! 同じ三つ組への割り当ては冪等（既存の実行をそのまま返す）。

use crate::{
    DomainError,
    test_case::TestCaseId,
    test_run::TestRunId,
    value_objects::{TestResult, UserId},
};

define_i64_id! {
    /// テスト実行 ID
    pub struct TestExecutionId;
}

/// テスト実行エンティティ
///
/// 割り当て時点では結果・コメントとも未記録（`None`）で作成され、
/// 担当者本人の結果報告で上書きされる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestExecution {
    id: TestExecutionId,
    test_run_id: TestRunId,
    test_case_id: TestCaseId,
    tester_id: UserId,
    result: Option<TestResult>,
    comment: Option<String>,
}

/// テスト実行の新規作成パラメータ（割り当て時）
///
/// テストラン・テストケースの存在確認は呼び出し側の責務。
#[derive(Debug, Clone)]
pub struct NewTestExecution {
    test_run_id: TestRunId,
    test_case_id: TestCaseId,
    tester_id: UserId,
}

impl NewTestExecution {
    pub fn new(test_run_id: TestRunId, test_case_id: TestCaseId, tester_id: UserId) -> Self {
        Self {
            test_run_id,
            test_case_id,
            tester_id,
        }
    }

    pub fn test_run_id(&self) -> TestRunId {
        self.test_run_id
    }

    pub fn test_case_id(&self) -> TestCaseId {
        self.test_case_id
    }

    pub fn tester_id(&self) -> UserId {
        self.tester_id
    }
}

/// テスト実行の DB 復元パラメータ
pub struct TestExecutionRecord {
    pub id: TestExecutionId,
    pub test_run_id: TestRunId,
    pub test_case_id: TestCaseId,
    pub tester_id: UserId,
    pub result: Option<TestResult>,
    pub comment: Option<String>,
}

impl TestExecution {
    /// 既存のデータから復元する
    pub fn from_db(record: TestExecutionRecord) -> Self {
        Self {
            id: record.id,
            test_run_id: record.test_run_id,
            test_case_id: record.test_case_id,
            tester_id: record.tester_id,
            result: record.result,
            comment: record.comment,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> TestExecutionId {
        self.id
    }

    pub fn test_run_id(&self) -> TestRunId {
        self.test_run_id
    }

    pub fn test_case_id(&self) -> TestCaseId {
        self.test_case_id
    }

    pub fn tester_id(&self) -> UserId {
        self.tester_id
    }

    pub fn result(&self) -> Option<TestResult> {
        self.result
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    // ビジネスロジックメソッド

    /// 結果を記録した新しいテスト実行を返す
    ///
    /// 報告できるのは割り当てられた担当者本人のみ。
    /// 結果・コメントは無条件に上書きされる（再報告で前回の値は残らない。
    /// コメント未指定なら `None` で上書きする）。
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 報告者が割り当てられた担当者でない場合
    pub fn submit_result(
        self,
        tester_id: UserId,
        result: TestResult,
        comment: Option<String>,
    ) -> Result<Self, DomainError> {
        if self.tester_id != tester_id {
            return Err(DomainError::Validation(
                "このテスト実行には担当者として割り当てられていません".to_string(),
            ));
        }
        Ok(Self {
            result: Some(result),
            comment,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn execution() -> TestExecution {
        TestExecution::from_db(TestExecutionRecord {
            id: TestExecutionId::from_i64(1),
            test_run_id: TestRunId::from_i64(1),
            test_case_id: TestCaseId::from_i64(2),
            tester_id: UserId::from_i64(5),
            result: None,
            comment: None,
        })
    }

    #[rstest]
    fn test_割り当て直後は結果もコメントも未記録(execution: TestExecution) {
        assert_eq!(execution.result(), None);
        assert_eq!(execution.comment(), None);
    }

    #[rstest]
    fn test_担当者本人は結果を報告できる(execution: TestExecution) {
        let sut = execution
            .submit_result(
                UserId::from_i64(5),
                TestResult::Pass,
                Some("問題なし".to_string()),
            )
            .unwrap();

        assert_eq!(sut.result(), Some(TestResult::Pass));
        assert_eq!(sut.comment(), Some("問題なし"));
    }

    #[rstest]
    fn test_担当者以外の報告は拒否される(execution: TestExecution) {
        let result = execution.submit_result(UserId::from_i64(99), TestResult::Pass, None);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_再報告で結果とコメントは上書きされる(execution: TestExecution) {
        let first = execution
            .submit_result(
                UserId::from_i64(5),
                TestResult::Fail,
                Some("タイムアウト".to_string()),
            )
            .unwrap();

        let sut = first
            .submit_result(UserId::from_i64(5), TestResult::Pass, None)
            .unwrap();

        assert_eq!(sut.result(), Some(TestResult::Pass));
        // コメント未指定の再報告では前回のコメントも消える
        assert_eq!(sut.comment(), None);
    }

    #[rstest]
    fn test_新規作成パラメータは三つ組を保持する() {
        let new = NewTestExecution::new(
            TestRunId::from_i64(1),
            TestCaseId::from_i64(2),
            UserId::from_i64(5),
        );

        assert_eq!(new.test_run_id(), TestRunId::from_i64(1));
        assert_eq!(new.test_case_id(), TestCaseId::from_i64(2));
        assert_eq!(new.tester_id(), UserId::from_i64(5));
    }
}
