use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// マニフェストの読み込みエラー
///
/// 設定上の問題として実行を中断させるエラー。
/// エントリ単位のデータ品質の問題はここでは扱わず、
/// 検証時にFindingとして報告される。
#[derive(Debug, Error)]
pub enum ManifestError {
    /// マニフェストファイルが存在しない
    #[error("マニフェストが見つかりません: {0:?}")]
    NotFound(PathBuf),

    /// ファイルは存在するが読み取り・パースできない
    #[error("マニフェストを読み込めません: {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// マニフェストの1エントリ
///
/// マニフェストの1行に対応する (ファイル名, 書き起こし) のペア。
/// `line` は1始まりの行番号で、レポートの並び順にも使われる。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 音声ディレクトリからの相対ファイル名
    pub filename: String,

    /// 書き起こしテキスト
    ///
    /// 欠落した場合は空文字列として読み込まれ、
    /// 検証時にEmptyTranscriptとして報告される。
    pub transcript: String,

    /// マニフェスト上の行番号 (1始まり)
    pub line: usize,
}

/// 読み込み済みマニフェスト
///
/// エントリの順序付きコレクション。読み込み完了後は読み取り専用で、
/// 部分的に読み込まれた状態が外部に見えることはない。
#[derive(Clone, Debug)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// マニフェスト順のエントリ一覧
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// マニフェストを読み込み
///
/// UTF-8テキストを1行1レコードとして読み込む。ヘッダ行はない。
/// 各行は最初の区切り文字で (ファイル名, 書き起こし) に分割される。
/// 2個目以降の区切り文字は書き起こしの一部として保持されるため、
/// 書き起こしに区切り文字が含まれていてもよい。
///
/// - 区切り文字を含まない行は書き起こしを空として扱う
///   (読み込みは中断しない。後段でEmptyTranscriptとして報告される)
/// - 空行は読み飛ばす
/// - 重複したファイル名は許容し、警告ログのみ出す
///
/// # Errors
///
/// パスが存在しない場合は `ManifestError::NotFound`、
/// 読み取りやUTF-8デコードに失敗した場合は `ManifestError::Parse` を返す。
/// 失敗時に部分的なマニフェストが返ることはない。
pub fn load<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;

        if raw.trim().is_empty() {
            continue;
        }

        // 最初の区切り文字のみで分割する
        let (filename, transcript) = match raw.split_once(delimiter) {
            Some((filename, transcript)) => (filename.to_string(), transcript.to_string()),
            None => (raw.to_string(), String::new()),
        };

        if !seen.insert(filename.clone()) {
            log::warn!("重複したファイル名 (行 {}): '{}'", line, filename);
        }

        entries.push(ManifestEntry {
            filename,
            transcript,
            line,
        });
    }

    log::info!("マニフェストを読み込みました: {} 件 ({:?})", entries.len(), path);

    Ok(Manifest { entries })
}
