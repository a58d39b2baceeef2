use crate::audio_probe;
use crate::manifest::ManifestEntry;
use crate::types::{Finding, FindingKind};
use std::path::Path;

/// マニフェストの1エントリを検証
///
/// (エントリ, ストレージの状態) に対する純粋関数として動作する。
/// 共有状態を変更せず、他のエントリの検証結果にも依存しないため、
/// エントリ間で並列に実行できる。
///
/// # 検証ルール (この順で適用)
///
/// 1. **存在チェック**: ファイルが存在しなければMissingFindingを1件出して
///    打ち切る。存在しないファイルに後続のチェックは意味を持たない。
/// 2. **書き起こしチェック**: 前後の空白を除いて空ならEmptyTranscript。
/// 3. **読み取りチェック**: ヘッダ解析に失敗したらCorruptAudio。
///    失敗理由はメッセージに残すが、種類は常にCorruptAudioのまま。
///
/// 2と3は独立しており、同一エントリに両方のFindingが出ることがある。
///
/// エントリ単位のデータ品質の問題でエラーを返すことはない。
/// 解析中の予期しないI/Oエラーも、実行全体を止めずに
/// CorruptAudioのFindingとして報告する。
pub fn validate(entry: &ManifestEntry, audio_root: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();
    let audio_path = audio_root.join(&entry.filename);

    // 1. 存在チェック (失敗したら残りのチェックは行わない)
    if !audio_path.exists() {
        findings.push(Finding::new(
            FindingKind::MissingFile,
            &entry.filename,
            format!("音声ファイルが見つかりません: '{}'", entry.filename),
        ));
        return findings;
    }

    // 2. 書き起こしチェック
    if entry.transcript.trim().is_empty() {
        findings.push(Finding::new(
            FindingKind::EmptyTranscript,
            &entry.filename,
            format!("'{}' の書き起こしが空です", entry.filename),
        ));
    }

    // 3. 読み取りチェック (ヘッダ解析のみ、全体のデコードはしない)
    if let Err(e) = audio_probe::probe(&audio_path) {
        findings.push(Finding::new(
            FindingKind::CorruptAudio,
            &entry.filename,
            format!("音声ファイルを読み取れません: '{}' ({:#})", entry.filename, e),
        ));
    }

    findings
}
