//! QA ワークフロー全体を通すシナリオテスト
//!
//! 要件の作成からテスト結果の報告までを、ユースケース層を通して
//! モックリポジトリ上で一気通貫に検証する。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use qatrack_core_service::usecase::{
    RequirementUseCaseImpl,
    TestCaseUseCaseImpl,
    TestExecutionUseCaseImpl,
    TestRunUseCaseImpl,
};
use qatrack_domain::{
    clock::FixedClock,
    requirement::CreateRequirement,
    test_case::CreateTestCase,
    test_run::CreateTestRun,
    value_objects::{Priority, Status, TestResult, TestRunStatus, UserId},
};
use qatrack_infra::mock::{
    MockRequirementRepository,
    MockTestCaseRepository,
    MockTestExecutionRepository,
    MockTestRunRepository,
};

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

struct TestEnv {
    requirements: RequirementUseCaseImpl,
    test_cases: TestCaseUseCaseImpl,
    test_runs: TestRunUseCaseImpl,
    test_executions: TestExecutionUseCaseImpl,
}

fn test_env() -> TestEnv {
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let requirement_repo = Arc::new(MockRequirementRepository::new());
    let case_repo = Arc::new(MockTestCaseRepository::new());
    let run_repo = Arc::new(MockTestRunRepository::new());
    let execution_repo = Arc::new(MockTestExecutionRepository::new());

    TestEnv {
        requirements: RequirementUseCaseImpl::new(requirement_repo, clock.clone()),
        test_cases: TestCaseUseCaseImpl::new(case_repo.clone(), clock.clone()),
        test_runs: TestRunUseCaseImpl::new(run_repo.clone(), case_repo.clone(), clock),
        test_executions: TestExecutionUseCaseImpl::new(execution_repo, run_repo, case_repo),
    }
}

#[tokio::test]
async fn test_要件作成から結果報告までの一連のフローが通る() {
    let env = test_env();
    let tester = UserId::from_i64(5);

    // 1. 要件を作成する
    let requirement = env
        .requirements
        .create_requirement(CreateRequirement {
            title: "Login".to_string(),
            description: Some("ログインフローの検証".to_string()),
            priority: Some(Priority::High),
        })
        .await
        .unwrap();
    assert_eq!(requirement.status(), Status::Open);
    assert_eq!(requirement.priority(), Priority::High);

    // 2. 要件に紐づくテストケースを作成する
    let test_case = env
        .test_cases
        .create_test_case(CreateTestCase {
            title: "正しい認証情報でログインできる".to_string(),
            description: None,
            requirement_id: requirement.id(),
            status: None,
            created_by: UserId::from_i64(1),
        })
        .await
        .unwrap();
    assert_eq!(test_case.requirement_id(), requirement.id());

    // 3. 翌日開始のテストランを作成する
    let run = env
        .test_runs
        .create_test_run(
            CreateTestRun {
                title: "Sprint 42 regression".to_string(),
                description: None,
                start_time: Some(fixed_now() + Duration::days(1)),
                end_time: Some(fixed_now() + Duration::days(2)),
                created_by: UserId::from_i64(1),
            },
            Vec::new(),
        )
        .await
        .unwrap();
    assert_eq!(run.status(), TestRunStatus::Planned);

    // 4. テストケースをランに追加する
    let run = env
        .test_runs
        .add_test_case(run.id(), test_case.id())
        .await
        .unwrap();
    assert!(run.test_case_ids().contains(&test_case.id()));

    // 5. 担当者を割り当てる
    let execution = env
        .test_executions
        .assign(run.id(), test_case.id(), tester)
        .await
        .unwrap();
    assert_eq!(execution.result(), None);

    // 6. 担当者が結果を報告する
    let execution = env
        .test_executions
        .submit_result(
            execution.id(),
            tester,
            TestResult::Pass,
            Some("ok".to_string()),
        )
        .await
        .unwrap();

    // 7. 報告された結果が参照できる
    assert_eq!(execution.result(), Some(TestResult::Pass));
    assert_eq!(execution.comment(), Some("ok"));

    let assigned = env.test_executions.list_for_tester(tester).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].result(), Some(TestResult::Pass));
}

#[tokio::test]
async fn test_割り当ての冪等性はシナリオ全体でも保たれる() {
    let env = test_env();
    let tester = UserId::from_i64(5);

    let requirement = env
        .requirements
        .create_requirement(CreateRequirement {
            title: "Search".to_string(),
            description: None,
            priority: None,
        })
        .await
        .unwrap();

    let test_case = env
        .test_cases
        .create_test_case(CreateTestCase {
            title: "キーワード検索".to_string(),
            description: None,
            requirement_id: requirement.id(),
            status: None,
            created_by: UserId::from_i64(1),
        })
        .await
        .unwrap();

    let run = env
        .test_runs
        .create_test_run(
            CreateTestRun {
                title: "Smoke".to_string(),
                description: None,
                start_time: Some(fixed_now() + Duration::hours(1)),
                end_time: Some(fixed_now() + Duration::hours(2)),
                created_by: UserId::from_i64(1),
            },
            vec![test_case.id()],
        )
        .await
        .unwrap();
    assert!(run.test_case_ids().contains(&test_case.id()));

    let first = env
        .test_executions
        .assign(run.id(), test_case.id(), tester)
        .await
        .unwrap();
    let second = env
        .test_executions
        .assign(run.id(), test_case.id(), tester)
        .await
        .unwrap();

    assert_eq!(first.id(), second.id());
    let all = env.test_executions.list_for_run(run.id()).await.unwrap();
    assert_eq!(all.len(), 1);
}
