//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! qatrack-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! ID の採番は DB の `BIGSERIAL` を模して 1 始まりの連番で行う。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qatrack_domain::{
    requirement::{NewRequirement, Requirement, RequirementId, RequirementRecord},
    test_case::{NewTestCase, TestCase, TestCaseId, TestCaseRecord},
    test_execution::{NewTestExecution, TestExecution, TestExecutionId, TestExecutionRecord},
    test_run::{NewTestRun, TestRun, TestRunId, TestRunRecord},
    value_objects::UserId,
};

use crate::{
    error::InfraError,
    repository::{
        RequirementRepository,
        TestCaseRepository,
        TestExecutionRepository,
        TestRunRepository,
    },
};

/// BIGSERIAL を模したインメモリ採番カウンター
#[derive(Clone, Default)]
struct IdSequence(Arc<Mutex<i64>>);

impl IdSequence {
    fn next(&self) -> i64 {
        let mut counter = self.0.lock().unwrap();
        *counter += 1;
        *counter
    }
}

// ===== MockRequirementRepository =====

#[derive(Clone, Default)]
pub struct MockRequirementRepository {
    requirements: Arc<Mutex<Vec<Requirement>>>,
    sequence: IdSequence,
}

impl MockRequirementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequirementRepository for MockRequirementRepository {
    async fn insert(&self, new: &NewRequirement) -> Result<Requirement, InfraError> {
        let requirement = Requirement::from_db(RequirementRecord {
            id: RequirementId::from_i64(self.sequence.next()),
            title: new.title().to_string(),
            description: new.description().map(String::from),
            priority: new.priority(),
            status: new.status(),
            created_at: new.created_at(),
            updated_at: new.created_at(),
        });
        self.requirements.lock().unwrap().push(requirement.clone());
        Ok(requirement)
    }

    async fn update(&self, requirement: &Requirement) -> Result<(), InfraError> {
        let mut requirements = self.requirements.lock().unwrap();
        if let Some(pos) = requirements.iter().position(|r| r.id() == requirement.id()) {
            requirements[pos] = requirement.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: RequirementId) -> Result<Option<Requirement>, InfraError> {
        Ok(self
            .requirements
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Requirement>, InfraError> {
        Ok(self.requirements.lock().unwrap().clone())
    }

    async fn delete(&self, id: RequirementId) -> Result<(), InfraError> {
        self.requirements.lock().unwrap().retain(|r| r.id() != id);
        Ok(())
    }
}

// ===== MockTestCaseRepository =====

#[derive(Clone, Default)]
pub struct MockTestCaseRepository {
    test_cases: Arc<Mutex<Vec<TestCase>>>,
    sequence: IdSequence,
}

impl MockTestCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestCaseRepository for MockTestCaseRepository {
    async fn insert(&self, new: &NewTestCase) -> Result<TestCase, InfraError> {
        let test_case = TestCase::from_db(TestCaseRecord {
            id: TestCaseId::from_i64(self.sequence.next()),
            title: new.title().to_string(),
            description: new.description().map(String::from),
            requirement_id: new.requirement_id(),
            status: new.status(),
            test_result: None,
            created_by: new.created_by(),
            created_at: new.created_at(),
            updated_at: new.created_at(),
        });
        self.test_cases.lock().unwrap().push(test_case.clone());
        Ok(test_case)
    }

    async fn update(&self, test_case: &TestCase) -> Result<(), InfraError> {
        let mut test_cases = self.test_cases.lock().unwrap();
        if let Some(pos) = test_cases.iter().position(|c| c.id() == test_case.id()) {
            test_cases[pos] = test_case.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TestCaseId) -> Result<Option<TestCase>, InfraError> {
        Ok(self
            .test_cases
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[TestCaseId]) -> Result<Vec<TestCase>, InfraError> {
        Ok(self
            .test_cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| ids.contains(&c.id()))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<TestCase>, InfraError> {
        Ok(self.test_cases.lock().unwrap().clone())
    }

    async fn find_by_requirement_id(
        &self,
        requirement_id: RequirementId,
    ) -> Result<Vec<TestCase>, InfraError> {
        Ok(self
            .test_cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.requirement_id() == requirement_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: TestCaseId) -> Result<(), InfraError> {
        self.test_cases.lock().unwrap().retain(|c| c.id() != id);
        Ok(())
    }
}

// ===== MockTestRunRepository =====

#[derive(Clone, Default)]
pub struct MockTestRunRepository {
    test_runs: Arc<Mutex<Vec<TestRun>>>,
    sequence: IdSequence,
}

impl MockTestRunRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestRunRepository for MockTestRunRepository {
    async fn insert(&self, new: &NewTestRun) -> Result<TestRun, InfraError> {
        let run = TestRun::from_db(TestRunRecord {
            id: TestRunId::from_i64(self.sequence.next()),
            title: new.title().to_string(),
            description: new.description().map(String::from),
            status: new.status(),
            start_time: new.start_time(),
            end_time: new.end_time(),
            created_by: new.created_by(),
            test_case_ids: new.test_case_ids().clone(),
        });
        self.test_runs.lock().unwrap().push(run.clone());
        Ok(run)
    }

    async fn update(&self, run: &TestRun) -> Result<(), InfraError> {
        let mut test_runs = self.test_runs.lock().unwrap();
        if let Some(pos) = test_runs.iter().position(|r| r.id() == run.id()) {
            test_runs[pos] = run.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TestRunId) -> Result<Option<TestRun>, InfraError> {
        Ok(self
            .test_runs
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<TestRun>, InfraError> {
        Ok(self.test_runs.lock().unwrap().clone())
    }

    async fn find_by_created_by(&self, user_id: UserId) -> Result<Vec<TestRun>, InfraError> {
        Ok(self
            .test_runs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_by() == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: TestRunId) -> Result<(), InfraError> {
        self.test_runs.lock().unwrap().retain(|r| r.id() != id);
        Ok(())
    }
}

// ===== MockTestExecutionRepository =====

#[derive(Clone, Default)]
pub struct MockTestExecutionRepository {
    executions: Arc<Mutex<Vec<TestExecution>>>,
    sequence: IdSequence,
}

impl MockTestExecutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestExecutionRepository for MockTestExecutionRepository {
    async fn insert(&self, new: &NewTestExecution) -> Result<TestExecution, InfraError> {
        let execution = TestExecution::from_db(TestExecutionRecord {
            id: TestExecutionId::from_i64(self.sequence.next()),
            test_run_id: new.test_run_id(),
            test_case_id: new.test_case_id(),
            tester_id: new.tester_id(),
            result: None,
            comment: None,
        });
        self.executions.lock().unwrap().push(execution.clone());
        Ok(execution)
    }

    async fn update(&self, execution: &TestExecution) -> Result<(), InfraError> {
        let mut executions = self.executions.lock().unwrap();
        if let Some(pos) = executions.iter().position(|e| e.id() == execution.id()) {
            executions[pos] = execution.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TestExecutionId) -> Result<Option<TestExecution>, InfraError> {
        Ok(self
            .executions
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned())
    }

    async fn find_by_run_case_tester(
        &self,
        test_run_id: TestRunId,
        test_case_id: TestCaseId,
        tester_id: UserId,
    ) -> Result<Option<TestExecution>, InfraError> {
        Ok(self
            .executions
            .lock()
            .unwrap()
            .iter()
            .find(|e| {
                e.test_run_id() == test_run_id
                    && e.test_case_id() == test_case_id
                    && e.tester_id() == tester_id
            })
            .cloned())
    }

    async fn find_by_tester_id(&self, tester_id: UserId) -> Result<Vec<TestExecution>, InfraError> {
        Ok(self
            .executions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.tester_id() == tester_id)
            .cloned()
            .collect())
    }

    async fn find_by_test_run_id(
        &self,
        test_run_id: TestRunId,
    ) -> Result<Vec<TestExecution>, InfraError> {
        Ok(self
            .executions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.test_run_id() == test_run_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use qatrack_domain::{
        requirement::{CreateRequirement, UpdateRequirement},
        test_case::CreateTestCase,
        test_run::CreateTestRun,
    };
    use rstest::rstest;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn new_requirement(title: &str) -> NewRequirement {
        NewRequirement::new(
            CreateRequirement {
                title: title.to_string(),
                description: None,
                priority: None,
            },
            fixed_now(),
        )
        .unwrap()
    }

    fn new_test_case(title: &str) -> NewTestCase {
        NewTestCase::new(
            CreateTestCase {
                title: title.to_string(),
                description: None,
                requirement_id: RequirementId::from_i64(1),
                status: None,
                created_by: UserId::from_i64(1),
            },
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_採番はbigserialと同じく1始まりの連番() {
        let repo = MockRequirementRepository::new();

        let first = repo.insert(&new_requirement("Req A")).await.unwrap();
        let second = repo.insert(&new_requirement("Req B")).await.unwrap();

        assert_eq!(first.id().as_i64(), 1);
        assert_eq!(second.id().as_i64(), 2);
    }

    #[tokio::test]
    async fn test_updateは同じidの行を置き換える() {
        let repo = MockRequirementRepository::new();
        let requirement = repo.insert(&new_requirement("Req A")).await.unwrap();

        let updated = requirement
            .clone()
            .apply_update(
                UpdateRequirement {
                    title: Some("Req A v2".to_string()),
                    ..UpdateRequirement::default()
                },
                fixed_now(),
            )
            .unwrap();
        repo.update(&updated).await.unwrap();

        let found = repo.find_by_id(requirement.id()).await.unwrap().unwrap();
        assert_eq!(found.title(), "Req A v2");
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleteは対象の行のみ取り除く() {
        let repo = MockRequirementRepository::new();
        let first = repo.insert(&new_requirement("Req A")).await.unwrap();
        let second = repo.insert(&new_requirement("Req B")).await.unwrap();

        repo.delete(first.id()).await.unwrap();

        assert_eq!(repo.find_by_id(first.id()).await.unwrap(), None);
        assert!(repo.find_by_id(second.id()).await.unwrap().is_some());
    }

    #[rstest]
    #[case(vec![1, 2], 2)]
    #[case(vec![2, 99], 1)]
    #[case(vec![99], 0)]
    #[tokio::test]
    async fn test_find_by_idsは存在するidのみ解決する(
        #[case] ids: Vec<i64>,
        #[case] expected: usize,
    ) {
        let repo = MockTestCaseRepository::new();
        repo.insert(&new_test_case("ログイン成功")).await.unwrap();
        repo.insert(&new_test_case("ログイン失敗")).await.unwrap();

        let ids: Vec<TestCaseId> = ids.into_iter().map(TestCaseId::from_i64).collect();
        let found = repo.find_by_ids(&ids).await.unwrap();

        assert_eq!(found.len(), expected);
    }

    #[tokio::test]
    async fn test_テストランのメンバーシップは挿入時の集合を保持する() {
        let repo = MockTestRunRepository::new();
        let member_ids: BTreeSet<TestCaseId> =
            [TestCaseId::from_i64(3), TestCaseId::from_i64(7)]
                .into_iter()
                .collect();
        let new = NewTestRun::new(
            CreateTestRun {
                title: "リリース前確認".to_string(),
                description: None,
                start_time: Some(fixed_now() + Duration::hours(1)),
                end_time: Some(fixed_now() + Duration::hours(2)),
                created_by: UserId::from_i64(1),
            },
            fixed_now(),
        )
        .unwrap()
        .with_test_cases(member_ids.clone());

        let run = repo.insert(&new).await.unwrap();

        let found = repo.find_by_id(run.id()).await.unwrap().unwrap();
        assert_eq!(found.test_case_ids(), &member_ids);
    }

    #[tokio::test]
    async fn test_find_by_run_case_testerは三つ組の完全一致のみ返す() {
        let repo = MockTestExecutionRepository::new();
        let new = NewTestExecution::new(
            TestRunId::from_i64(1),
            TestCaseId::from_i64(2),
            UserId::from_i64(5),
        );
        let execution = repo.insert(&new).await.unwrap();

        let hit = repo
            .find_by_run_case_tester(
                TestRunId::from_i64(1),
                TestCaseId::from_i64(2),
                UserId::from_i64(5),
            )
            .await
            .unwrap();
        assert_eq!(hit.map(|e| e.id()), Some(execution.id()));

        let miss = repo
            .find_by_run_case_tester(
                TestRunId::from_i64(1),
                TestCaseId::from_i64(2),
                UserId::from_i64(6),
            )
            .await
            .unwrap();
        assert_eq!(miss, None);
    }
}
