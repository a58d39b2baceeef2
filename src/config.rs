use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// マニフェスト設定
///
/// メタデータマニフェストの場所とレコード形式に関する設定。
///
/// # デフォルト値
///
/// - `path`: "data/metadata.csv"
/// - `delimiter`: '|' (書き起こし内のカンマを許容するため)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// 音声ストレージ設定
///
/// マニフェストの各ファイル名はこのディレクトリからの相対パスとして解決する。
/// 検証中にこのディレクトリへ書き込むことはない。
///
/// # デフォルト値
///
/// - `root_dir`: "data/audio"
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_root")]
    pub root_dir: String,
}

/// 検証実行設定
///
/// # デフォルト値
///
/// - `parallel`: false (マニフェスト順に逐次検証)
/// - `workers`: 0 (parallel時、0はrayonの自動設定)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// 出力設定
///
/// # デフォルト値
///
/// - `json`: false (人間可読なサマリを出力)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_json")]
    pub json: bool,
}

// Default functions
fn default_manifest_path() -> String {
    "data/metadata.csv".to_string()
}

fn default_delimiter() -> char {
    '|' // カンマは書き起こし内に現れうるため区切りに使わない
}

fn default_audio_root() -> String {
    "data/audio".to_string()
}

fn default_parallel() -> bool {
    false
}

fn default_workers() -> usize {
    0
}

fn default_json() -> bool {
    false
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: ManifestConfig::default(),
            audio: AudioConfig::default(),
            verify: VerifyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
            delimiter: default_delimiter(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            root_dir: default_audio_root(),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            workers: default_workers(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: default_json(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み
    ///
    /// TOML形式の設定ファイルをパースしてConfig構造体を生成する。
    ///
    /// # Errors
    ///
    /// ファイルの読み込みまたはパースに失敗した場合にエラーを返す。
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use corpus_verify::config::Config;
    /// let config = Config::from_file("config.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("設定ファイルの読み込みに失敗: {:?}", path.as_ref()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "設定ファイルのパースに失敗")?;
        Ok(config)
    }

    /// デフォルト設定をファイルに書き出し
    ///
    /// 既存のファイルは上書きされる。
    ///
    /// # Errors
    ///
    /// ファイルの書き込みに失敗した場合にエラーを返す。
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let content =
            toml::to_string_pretty(&config).with_context(|| "設定のシリアライズに失敗")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("設定ファイルの書き込みに失敗: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// 設定ファイルがあれば読み込み、なければデフォルトを使用
    ///
    /// # Errors
    ///
    /// ファイルが存在するがパースに失敗した場合にエラーを返す。
    /// ファイルが存在しない場合はエラーにならず、デフォルト設定を返す。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "設定ファイルが見つかりません。デフォルト設定を使用します: {:?}",
                path.as_ref()
            );
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.manifest.path, "data/metadata.csv");
        assert_eq!(config.manifest.delimiter, '|');
        assert_eq!(config.audio.root_dir, "data/audio");
        assert!(!config.verify.parallel);
        assert_eq!(config.verify.workers, 0);
        assert!(!config.output.json);
    }

    #[test]
    fn test_write_and_read_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        // デフォルト設定を書き込み
        Config::write_default(path).unwrap();

        // 読み込み
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.manifest.delimiter, '|');
        assert_eq!(config.audio.root_dir, "data/audio");
    }

    #[test]
    fn test_custom_config() {
        let toml_content = r#"
[manifest]
path = "corpus/list.psv"
delimiter = "\t"

[audio]
root_dir = "corpus/wav"

[verify]
parallel = true
workers = 4

[output]
json = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.manifest.path, "corpus/list.psv");
        assert_eq!(config.manifest.delimiter, '\t');
        assert_eq!(config.audio.root_dir, "corpus/wav");
        assert!(config.verify.parallel);
        assert_eq!(config.verify.workers, 4);
        assert!(config.output.json);
    }

    #[test]
    fn test_load_or_default_nonexistent() {
        let config = Config::load_or_default("nonexistent_file.toml").unwrap();
        // デフォルト設定が返されることを確認
        assert_eq!(config.manifest.path, "data/metadata.csv");
    }

    #[test]
    fn test_partial_config() {
        // 一部の設定のみ記述した場合、残りはデフォルト値が使われる
        let toml_content = r#"
[audio]
root_dir = "/srv/corpus/audio"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        // 指定した値
        assert_eq!(config.audio.root_dir, "/srv/corpus/audio");

        // デフォルト値
        assert_eq!(config.manifest.path, "data/metadata.csv");
        assert_eq!(config.manifest.delimiter, '|');
        assert!(!config.verify.parallel);
    }
}
