use crate::config::Config;
use crate::manifest::{self, Manifest};
use crate::types::{Finding, VerificationReport};
use crate::validator;
use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// 検証を実行してレポートを生成
///
/// マニフェストを読み込み、全エントリをマニフェスト順に検証して
/// Findingを集計する。マニフェストの読み込み失敗と音声ディレクトリの
/// 不在は設定上の問題としてエラーを返し、エントリ単位の検証は行わない。
/// 「問題0件で完了」と「検証を実行できなかった」は呼び出し側で
/// 区別できる (前者は `Ok`、後者は `Err`)。
///
/// `cancel` はエントリ間でチェックされる協調的な中断フラグ。
/// 中断された場合は部分的なレポートを返さず、エラーで終了する。
///
/// # Errors
///
/// - 音声ディレクトリが存在しない
/// - マニフェストが存在しない、または読み込めない
/// - 実行が中断された
pub fn run(config: &Config, cancel: &AtomicBool) -> Result<VerificationReport> {
    let audio_root = Path::new(&config.audio.root_dir);
    if !audio_root.is_dir() {
        bail!("音声ディレクトリが見つかりません: {:?}", audio_root);
    }

    let manifest = manifest::load(&config.manifest.path, config.manifest.delimiter)?;

    log::info!("検証を開始します: {} 件", manifest.len());

    let findings = if config.verify.parallel {
        run_parallel(&manifest, audio_root, cancel, config.verify.workers)?
    } else {
        run_sequential(&manifest, audio_root, cancel)?
    };

    log::info!(
        "検証が完了しました: {} 件中 {} 件の問題",
        manifest.len(),
        findings.len()
    );

    Ok(VerificationReport::new(manifest.len(), findings))
}

/// マニフェスト順に逐次検証 (デフォルト)
///
/// Findingは検出され次第ログに出力される。
fn run_sequential(
    manifest: &Manifest,
    audio_root: &Path,
    cancel: &AtomicBool,
) -> Result<Vec<Finding>> {
    let mut all = Vec::new();

    for entry in manifest.entries() {
        if cancel.load(Ordering::SeqCst) {
            bail!("検証が中断されました");
        }

        let findings = validator::validate(entry, audio_root);
        for finding in &findings {
            log::warn!("行 {}: [{}] {}", entry.line, finding.kind, finding.message);
        }
        all.extend(findings);
    }

    Ok(all)
}

/// ワーカープールでエントリを並列検証
///
/// 各エントリの検証は (エントリ, ストレージの状態) の純粋関数なので
/// 完了順に依存せず並列化できる。結果はマニフェスト上の位置で
/// 整列し直すため、レポートの並びは逐次実行と同一になる。
/// ログ出力も整列後に行い、コンソールの順序を決定的に保つ。
fn run_parallel(
    manifest: &Manifest,
    audio_root: &Path,
    cancel: &AtomicBool,
    workers: usize,
) -> Result<Vec<Finding>> {
    let mut indexed = if workers > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("ワーカープールの作成に失敗")?;
        pool.install(|| collect_indexed(manifest, audio_root, cancel))
    } else {
        collect_indexed(manifest, audio_root, cancel)
    };

    if cancel.load(Ordering::SeqCst) {
        bail!("検証が中断されました");
    }

    indexed.sort_by_key(|(index, _)| *index);

    let mut all = Vec::new();
    for (index, findings) in indexed {
        let entry = &manifest.entries()[index];
        for finding in &findings {
            log::warn!("行 {}: [{}] {}", entry.line, finding.kind, finding.message);
        }
        all.extend(findings);
    }

    Ok(all)
}

fn collect_indexed(
    manifest: &Manifest,
    audio_root: &Path,
    cancel: &AtomicBool,
) -> Vec<(usize, Vec<Finding>)> {
    manifest
        .entries()
        .par_iter()
        .enumerate()
        .map(|(index, entry)| {
            if cancel.load(Ordering::SeqCst) {
                // 中断後のエントリは検証しない (呼び出し元でエラーにする)
                return (index, Vec::new());
            }
            (index, validator::validate(entry, audio_root))
        })
        .collect()
}

/// 人間可読なサマリを出力
///
/// レポートのデータ構造自体は出力に依存しないため、
/// 終了コードの導出やJSON出力は呼び出し側で別途行える。
pub fn print_summary(report: &VerificationReport) {
    println!("--- 検証完了 ---");
    if report.passed {
        println!(
            "問題は見つかりませんでした ({} 件検証)",
            report.total_entries
        );
    } else {
        println!(
            "{} 件を検証し、{} 件の問題が見つかりました",
            report.total_entries,
            report.findings.len()
        );
        for finding in &report.findings {
            println!("  - [{}] {}", finding.kind, finding.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FindingKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_valid_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..1600 {
            let sample = ((i as f32 * 0.1).sin() * 10000.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.manifest.path = dir
            .path()
            .join("metadata.csv")
            .to_string_lossy()
            .into_owned();
        config.audio.root_dir = dir.path().join("audio").to_string_lossy().into_owned();
        config
    }

    /// 3レコードの代表的なシナリオ:
    /// a.wav は正常、b.wav は書き起こし空、c.wav は存在しない
    fn setup_example_scenario(dir: &TempDir) -> Config {
        let audio = dir.path().join("audio");
        fs::create_dir(&audio).unwrap();
        write_valid_wav(&audio.join("a.wav"));
        write_valid_wav(&audio.join("b.wav"));
        fs::write(dir.path().join("metadata.csv"), "a.wav|hello\nb.wav|\nc.wav|hi\n").unwrap();
        test_config(dir)
    }

    #[test]
    fn test_example_scenario() {
        let dir = TempDir::new().unwrap();
        let config = setup_example_scenario(&dir);
        let cancel = AtomicBool::new(false);

        let report = run(&config, &cancel).unwrap();

        assert_eq!(report.total_entries, 3);
        assert_eq!(report.findings.len(), 2);
        assert!(!report.passed);

        // マニフェスト順: b.wav (行2) → c.wav (行3)
        assert_eq!(report.findings[0].kind, FindingKind::EmptyTranscript);
        assert_eq!(report.findings[0].filename, "b.wav");
        assert_eq!(report.findings[1].kind, FindingKind::MissingFile);
        assert_eq!(report.findings[1].filename, "c.wav");
    }

    #[test]
    fn test_clean_corpus_passes() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio");
        fs::create_dir(&audio).unwrap();
        write_valid_wav(&audio.join("a.wav"));
        fs::write(dir.path().join("metadata.csv"), "a.wav|こんにちは\n").unwrap();

        let cancel = AtomicBool::new(false);
        let report = run(&test_config(&dir), &cancel).unwrap();

        assert!(report.passed);
        assert_eq!(report.total_entries, 1);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_empty_manifest_passes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("audio")).unwrap();
        fs::write(dir.path().join("metadata.csv"), "").unwrap();

        let cancel = AtomicBool::new(false);
        let report = run(&test_config(&dir), &cancel).unwrap();

        assert_eq!(report.total_entries, 0);
        assert!(report.passed);
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        // マニフェスト不在は「問題0件」ではなくエラーとして区別される
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("audio")).unwrap();

        let cancel = AtomicBool::new(false);
        assert!(run(&test_config(&dir), &cancel).is_err());
    }

    #[test]
    fn test_missing_audio_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("metadata.csv"), "a.wav|hi\n").unwrap();

        let cancel = AtomicBool::new(false);
        assert!(run(&test_config(&dir), &cancel).is_err());
    }

    #[test]
    fn test_idempotence() {
        let dir = TempDir::new().unwrap();
        let config = setup_example_scenario(&dir);
        let cancel = AtomicBool::new(false);

        // 同じマニフェストとストレージに対して2回実行しても結果は同一
        let first = run(&config, &cancel).unwrap();
        let second = run(&config, &cancel).unwrap();

        assert_eq!(first.total_entries, second.total_entries);
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.passed, second.passed);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let mut config = setup_example_scenario(&dir);
        let cancel = AtomicBool::new(false);

        let sequential = run(&config, &cancel).unwrap();

        config.verify.parallel = true;
        config.verify.workers = 2;
        let parallel = run(&config, &cancel).unwrap();

        // 並列実行でもレポートの並びは逐次実行と同一
        assert_eq!(sequential.findings, parallel.findings);
        assert_eq!(sequential.total_entries, parallel.total_entries);
    }

    #[test]
    fn test_cancellation_aborts_run() {
        let dir = TempDir::new().unwrap();
        let config = setup_example_scenario(&dir);

        // 中断フラグが立っていると部分レポートではなくエラーになる
        let cancel = AtomicBool::new(true);
        assert!(run(&config, &cancel).is_err());
    }

    #[test]
    fn test_corrupt_audio_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio");
        fs::create_dir(&audio).unwrap();
        fs::write(audio.join("bad.wav"), b"garbage").unwrap();
        write_valid_wav(&audio.join("good.wav"));
        fs::write(
            dir.path().join("metadata.csv"),
            "bad.wav|text\ngood.wav|text\n",
        )
        .unwrap();

        let cancel = AtomicBool::new(false);
        let report = run(&test_config(&dir), &cancel).unwrap();

        // 壊れたファイルがあっても全エントリが検証される
        assert_eq!(report.total_entries, 2);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, FindingKind::CorruptAudio);
        assert_eq!(report.findings[0].filename, "bad.wav");
    }
}
