//! corpus-verify - 音声/書き起こしコーパスの事前検証ツール
//!
//! このクレートは、メタデータマニフェストに宣言された音声ファイルと
//! 書き起こしのペアを検証し、学習や配布の前にデータセットの整合性を
//! 確認するための検証パイプラインを提供します。
//!
//! # 検証ルール
//!
//! - **存在チェック**: マニフェストの各ファイル名が音声ディレクトリに実在するか
//! - **書き起こしチェック**: 書き起こしが空文字・空白のみでないか
//! - **読み取りチェック**: 音声ファイルのヘッダが解析できるか（WAV / FLAC）
//!
//! # アーキテクチャ
//!
//! ```text
//! [metadata.csv] → [manifest::load] → [Manifest]
//!                                         ↓
//!                                  [orchestrator::run]
//!                                         ↓ (エントリ毎)
//!                                  [validator::validate] → [audio_probe::probe]
//!                                         ↓
//!                                   [Finding (0..n)]
//!                                         ↓
//!                                 [VerificationReport]
//! ```
//!
//! # 使用例
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use corpus_verify::config::Config;
//! use corpus_verify::orchestrator;
//!
//! let config = Config::load_or_default("config.toml").unwrap();
//! let cancel = AtomicBool::new(false);
//! let report = orchestrator::run(&config, &cancel).unwrap();
//! assert!(report.passed);
//! ```

pub mod audio_probe;
pub mod config;
pub mod manifest;
pub mod orchestrator;
pub mod types;
pub mod validator;
