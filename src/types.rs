use serde::Serialize;
use std::fmt;

/// 検出された問題の種類
///
/// マニフェストの1エントリに対する検証で検出される
/// データ品質の問題を分類する。
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// 音声ファイルがディレクトリに存在しない
    MissingFile,

    /// 書き起こしが欠落、または空白のみ
    EmptyTranscript,

    /// 音声ファイルのヘッダが解析できない
    CorruptAudio,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FindingKind::MissingFile => "MISSING FILE",
            FindingKind::EmptyTranscript => "EMPTY TRANSCRIPT",
            FindingKind::CorruptAudio => "CORRUPT AUDIO",
        };
        write!(f, "{}", label)
    }
}

/// 検証で検出された1件の問題
///
/// マニフェストの特定のエントリに紐づく不変のレコード。
/// 生成後に変更されることはない。
///
/// # JSON出力例
///
/// ```json
/// {
///   "kind": "missing_file",
///   "filename": "c.wav",
///   "message": "音声ファイルが見つかりません: 'c.wav'"
/// }
/// ```
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Finding {
    /// 問題の種類
    pub kind: FindingKind,

    /// 対象のマニフェスト上のファイル名
    pub filename: String,

    /// 人間可読なメッセージ
    pub message: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        filename: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            filename: filename.into(),
            message: message.into(),
        }
    }
}

/// 検証1回分の最終レポート
///
/// 検証した全エントリ数と、マニフェスト順に並んだ全Findingを保持する。
/// 実行完了後に変更されることはなく、JSONとしてそのまま出力できる。
#[derive(Clone, Debug, Serialize)]
pub struct VerificationReport {
    /// 検証したエントリ数
    pub total_entries: usize,

    /// 検出された問題（マニフェスト順）
    pub findings: Vec<Finding>,

    /// 問題が1件もなければ true
    pub passed: bool,

    /// レポート生成時刻 (ISO 8601)
    pub generated_at: String,
}

impl VerificationReport {
    /// 検証結果からレポートを生成
    ///
    /// `passed` は findings の有無から導出される。
    pub fn new(total_entries: usize, findings: Vec<Finding>) -> Self {
        let passed = findings.is_empty();
        Self {
            total_entries,
            findings,
            passed,
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }
}
