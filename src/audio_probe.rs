use anyhow::{anyhow, Context, Result};
use std::path::Path;

/// 音声ファイルの形式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFileFormat {
    Wav,
    Flac,
}

/// ヘッダ解析で得られる音声ファイルの情報
///
/// 「壊れていない」ことの代理指標としてヘッダの解析可否を使うため、
/// ここで得るのはメタデータのみで、サンプルのデコードは行わない。
#[derive(Clone, Copy, Debug)]
pub struct AudioInfo {
    pub format: AudioFileFormat,

    /// サンプリングレート (Hz)
    pub sample_rate: u32,

    /// チャンネル数
    pub channels: u16,
}

/// 音声ファイルのヘッダを解析
///
/// ファイル全体をデコードせず、ヘッダ/メタデータのみを読み取る。
/// 拡張子で形式を判定し、WAVは `hound`、FLACは `claxon` (STREAMINFO)
/// で解析する。未知の拡張子は両形式を順に試す。
///
/// # Errors
///
/// 形式エラー、ファイル途中での切断、未対応コーデックなど、
/// ヘッダが解析できない場合は理由つきのエラーを返す。
/// 呼び出し側 (validator) はこのエラーをCorruptAudioのFindingに変換する。
pub fn probe<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("wav") => probe_wav(path),
        Some("flac") => probe_flac(path),
        _ => probe_wav(path)
            .or_else(|_| probe_flac(path))
            .map_err(|_| anyhow!("未対応または解析できない音声形式: {:?}", path)),
    }
}

fn probe_wav(path: &Path) -> Result<AudioInfo> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("WAVヘッダの解析に失敗: {:?}", path))?;
    let spec = reader.spec();

    log::debug!(
        "WAVヘッダ解析: {:?} ({} Hz, {} ch)",
        path,
        spec.sample_rate,
        spec.channels
    );

    Ok(AudioInfo {
        format: AudioFileFormat::Wav,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn probe_flac(path: &Path) -> Result<AudioInfo> {
    let reader = claxon::FlacReader::open(path)
        .with_context(|| format!("FLACヘッダの解析に失敗: {:?}", path))?;
    let info = reader.streaminfo();

    log::debug!(
        "FLACヘッダ解析: {:?} ({} Hz, {} ch)",
        path,
        info.sample_rate,
        info.channels
    );

    Ok(AudioInfo {
        format: AudioFileFormat::Flac,
        sample_rate: info.sample_rate,
        channels: info.channels as u16,
    })
}
