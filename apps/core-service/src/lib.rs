//! # Core Service ライブラリ
//!
//! Core Service の設定・エラー・ユースケース・ハンドラを公開する。
//! バイナリ（`main.rs`）と結合テストの両方からこのクレートを利用する。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
