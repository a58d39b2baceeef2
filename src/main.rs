use corpus_verify::config::Config;
use corpus_verify::orchestrator;
use env_logger::Env;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// 終了コード: 自動化された事前チェックから結果を判別できるようにする
const EXIT_CLEAN: i32 = 0;
const EXIT_FINDINGS: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

fn print_usage() {
    eprintln!("使い方: corpus-verify [設定ファイル] [オプション]");
    eprintln!("  --generate-config [パス]  デフォルト設定ファイルを生成");
    eprintln!("  --manifest <パス>         マニフェストのパスを上書き");
    eprintln!("  --audio-root <パス>       音声ディレクトリを上書き");
    eprintln!("  --parallel                エントリを並列に検証");
    eprintln!("  --json                    レポートをJSONで出力");
}

fn main() {
    // ロガーを初期化
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // コマンドライン引数をパース
    let args: Vec<String> = std::env::args().collect();

    let mut config_path = "config.toml".to_string();
    let mut json_flag = false;
    let mut parallel_flag = false;
    let mut manifest_override: Option<String> = None;
    let mut audio_root_override: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            // 設定ファイル生成モード
            "--generate-config" => {
                let path = args
                    .get(i + 1)
                    .map(String::as_str)
                    .unwrap_or("config.toml");
                if let Err(e) = Config::write_default(path) {
                    log::error!("設定ファイルの生成に失敗: {:#}", e);
                    std::process::exit(EXIT_CONFIG_ERROR);
                }
                println!("設定ファイルを生成しました: {}", path);
                return;
            }
            "--json" => json_flag = true,
            "--parallel" => parallel_flag = true,
            "--manifest" => {
                i += 1;
                match args.get(i) {
                    Some(path) => manifest_override = Some(path.clone()),
                    None => {
                        log::error!("--manifest にはパスが必要です");
                        print_usage();
                        std::process::exit(EXIT_CONFIG_ERROR);
                    }
                }
            }
            "--audio-root" => {
                i += 1;
                match args.get(i) {
                    Some(path) => audio_root_override = Some(path.clone()),
                    None => {
                        log::error!("--audio-root にはパスが必要です");
                        print_usage();
                        std::process::exit(EXIT_CONFIG_ERROR);
                    }
                }
            }
            arg if !arg.starts_with("--") => config_path = arg.to_string(),
            other => {
                log::error!("不明なオプション: {}", other);
                print_usage();
                std::process::exit(EXIT_CONFIG_ERROR);
            }
        }
        i += 1;
    }

    // 設定を読み込み、コマンドラインの上書きを適用
    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("設定の読み込みに失敗: {:#}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };
    if let Some(path) = manifest_override {
        config.manifest.path = path;
    }
    if let Some(path) = audio_root_override {
        config.audio.root_dir = path;
    }
    if json_flag {
        config.output.json = true;
    }
    if parallel_flag {
        config.verify.parallel = true;
    }

    // Ctrl+C ハンドラを設定 (エントリ間で協調的に中断する)
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("停止シグナルを受信しました...");
        cancel_clone.store(true, Ordering::SeqCst);
    }) {
        log::warn!("シグナルハンドラの設定に失敗: {}", e);
    }

    log::info!("corpus-verify を起動します");
    log::info!("マニフェスト: {}", config.manifest.path);
    log::info!("音声ディレクトリ: {}", config.audio.root_dir);

    let code = match orchestrator::run(&config, &cancel) {
        Ok(report) => {
            if config.output.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => log::error!("レポートのシリアライズに失敗: {}", e),
                }
            } else {
                orchestrator::print_summary(&report);
            }
            if report.passed {
                EXIT_CLEAN
            } else {
                EXIT_FINDINGS
            }
        }
        Err(e) => {
            // 「検証を実行できなかった」は「問題ありで完了」と区別する
            log::error!("検証を実行できませんでした: {:#}", e);
            EXIT_CONFIG_ERROR
        }
    };

    std::process::exit(code);
}
