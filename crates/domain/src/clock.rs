//! # Clock（時刻プロバイダ）
//!
//! ユースケース層での `Utc::now()` 直接呼び出しを置き換える抽象化。
//!
//! テストランのスケジュール検証（開始日時の 30 秒クロックスキュー許容）は
//! 「現在時刻」との比較に依存するため、システム時刻を直接読むと
//! 境界値のテストができない。検証に使う時刻は必ずこのトレイト経由で
//! 取得し、テストでは [`FixedClock`] で固定する。
//!
//! ```rust
//! use chrono::{DateTime, Duration, Utc};
//! use qatrack_domain::{
//!     clock::{Clock, FixedClock},
//!     test_run::{CreateTestRun, NewTestRun},
//!     value_objects::UserId,
//! };
//!
//! let clock = FixedClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
//!
//! // 1 時間後に開始するテストランはスキュー検証を通る
//! let draft = NewTestRun::new(
//!     CreateTestRun {
//!         title: "リリース前回帰テスト".to_string(),
//!         description: None,
//!         start_time: Some(clock.now() + Duration::hours(1)),
//!         end_time: Some(clock.now() + Duration::hours(2)),
//!         created_by: UserId::from_i64(1),
//!     },
//!     clock.now(),
//! );
//! assert!(draft.is_ok());
//! ```

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
///
/// 本番のユースケース配線ではこれを注入する。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
///
/// スキュー境界（ちょうど 30 秒前は許容、それより前は拒否）の
/// 検証はこの実装で時刻を固定して行う。
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
