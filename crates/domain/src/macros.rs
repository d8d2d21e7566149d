/// DB 採番（BIGSERIAL）ベースの ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`i64` をラップ）
/// - `derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
///   Serialize, Deserialize, Display)`
/// - `from_i64()`: DB で採番された値から復元
/// - `as_i64()`: 内部の i64 値
/// - `is_positive()`: 1 以上の正整数かどうか
///
/// ID の採番は DB（`BIGSERIAL`）が行うため、`new()` は提供しない。
/// 不正な値（0 以下）の扱いは操作ごとに異なるため（400 を返す操作と
/// 404 を返す操作がある）、検証は呼び出し側の責務とする。
///
/// # 使用例
///
/// ```rust
/// use qatrack_domain::requirement::RequirementId;
///
/// let id = RequirementId::from_i64(42);
/// assert_eq!(id.as_i64(), 42);
/// assert!(id.is_positive());
/// assert!(!RequirementId::from_i64(0).is_positive());
/// ```
macro_rules! define_i64_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(i64);

        impl $Name {
            /// DB で採番された値から ID を作成する
            pub fn from_i64(value: i64) -> Self {
                Self(value)
            }

            /// 内部の i64 値を取得する
            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// 1 以上の正整数かどうか
            pub fn is_positive(&self) -> bool {
                self.0 > 0
            }
        }
    };
}
