//! # Core Service サーバー
//!
//! QA トラッキングのビジネスロジックを実行する HTTP サービス。
//!
//! ## 役割
//!
//! - **ビジネスロジック**: 要件・テストケース・テストラン・テスト実行の
//!   ライフサイクル管理と状態ゲートの適用
//! - **データ永続化**: PostgreSQL へのエンティティ保存
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `QATRACK_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `QATRACK_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//!
//! ## 起動方法
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo run -p qatrack-core-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post, put},
};
use qatrack_core_service::{
    config::CoreConfig,
    handler::{
        RequirementState,
        TestCaseState,
        TestExecutionState,
        TestRunState,
        add_test_case_to_run,
        assign_tester,
        create_requirement,
        create_test_case,
        create_test_run,
        delete_requirement,
        delete_test_case,
        delete_test_run,
        get_requirement,
        get_test_case,
        get_test_run,
        health_check,
        list_executions_for_run,
        list_executions_for_tester,
        list_requirements,
        list_test_cases,
        list_test_cases_for_requirement,
        list_test_runs,
        list_test_runs_for_user,
        submit_result,
        update_requirement,
        update_test_case,
        update_test_run,
    },
    usecase::{
        RequirementUseCaseImpl,
        TestCaseUseCaseImpl,
        TestExecutionUseCaseImpl,
        TestRunUseCaseImpl,
    },
};
use qatrack_domain::clock::SystemClock;
use qatrack_infra::{
    db,
    repository::{
        PostgresRequirementRepository,
        PostgresTestCaseRepository,
        PostgresTestExecutionRepository,
        PostgresTestRunRepository,
    },
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Core Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化（ErrorLayer は InfraError の SpanTrace 捕捉に必要）
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qatrack=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();

    // 設定読み込み
    let config = CoreConfig::from_env().expect("設定の読み込みに失敗しました");

    tracing::info!(
        "Core Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成し、マイグレーションを適用
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("データベース接続に失敗しました");
    db::run_migrations(&pool)
        .await
        .expect("マイグレーションの適用に失敗しました");
    tracing::info!("データベースに接続しました");

    let clock = Arc::new(SystemClock);

    // 要件関連の依存コンポーネント
    let requirement_repo = Arc::new(PostgresRequirementRepository::new(pool.clone()));
    let requirement_state = Arc::new(RequirementState {
        usecase: RequirementUseCaseImpl::new(requirement_repo, clock.clone()),
    });

    // テストケース関連の依存コンポーネント
    let test_case_repo = Arc::new(PostgresTestCaseRepository::new(pool.clone()));
    let test_case_state = Arc::new(TestCaseState {
        usecase: TestCaseUseCaseImpl::new(test_case_repo.clone(), clock.clone()),
    });

    // テストラン関連の依存コンポーネント
    let test_run_repo = Arc::new(PostgresTestRunRepository::new(pool.clone()));
    let test_run_state = Arc::new(TestRunState {
        usecase: TestRunUseCaseImpl::new(
            test_run_repo.clone(),
            test_case_repo.clone(),
            clock.clone(),
        ),
    });

    // テスト実行関連の依存コンポーネント
    let test_execution_repo = Arc::new(PostgresTestExecutionRepository::new(pool.clone()));
    let test_execution_state = Arc::new(TestExecutionState {
        usecase: TestExecutionUseCaseImpl::new(
            test_execution_repo,
            test_run_repo,
            test_case_repo,
        ),
    });

    // ルーター構築
    let app = Router::new()
        .route("/health", get(health_check))
        // 要件 API
        .route(
            "/api/requirements",
            post(create_requirement).get(list_requirements),
        )
        .route(
            "/api/requirements/{id}",
            get(get_requirement)
                .put(update_requirement)
                .delete(delete_requirement),
        )
        .with_state(requirement_state)
        // テストケース API
        .route(
            "/api/requirements/{id}/test-cases",
            get(list_test_cases_for_requirement),
        )
        .route(
            "/api/test-cases",
            post(create_test_case).get(list_test_cases),
        )
        .route(
            "/api/test-cases/{id}",
            get(get_test_case)
                .put(update_test_case)
                .delete(delete_test_case),
        )
        .with_state(test_case_state)
        // テストラン API
        .route("/api/test-runs", post(create_test_run).get(list_test_runs))
        .route(
            "/api/test-runs/{id}",
            get(get_test_run).put(update_test_run).delete(delete_test_run),
        )
        .route(
            "/api/test-runs/{id}/test-cases/{case_id}",
            post(add_test_case_to_run),
        )
        .route("/api/test-runs/user/{user_id}", get(list_test_runs_for_user))
        .with_state(test_run_state)
        // テスト実行 API
        .route(
            "/api/test-executions/runs/{run_id}/cases/{case_id}/assign/{tester_id}",
            post(assign_tester),
        )
        .route("/api/test-executions/{id}/result", put(submit_result))
        .route(
            "/api/test-executions/tester/{tester_id}",
            get(list_executions_for_tester),
        )
        .route(
            "/api/test-executions/run/{run_id}",
            get(list_executions_for_run),
        )
        .with_state(test_execution_state)
        .layer(TraceLayer::new_for_http());

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("アドレスのパースに失敗しました");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Core Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
