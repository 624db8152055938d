//! kataflow CLIエントリポイント

use clap::Parser;
use colored::Colorize;
use kataflow_build::{BuildError, BuildOptions, Orchestrator, Parallelism};
use std::path::PathBuf;

/// テンプレートからDockerfileを動的に生成するDockerイメージビルダー
#[derive(Parser)]
#[command(
    name = "kata",
    version,
    about = "テンプレートからDockerイメージのビルドマトリクスを生成・実行する",
    after_help = "When 'docker build' is just not enough :-)"
)]
struct Cli {
    /// 設定ファイル（Playbook）のパス
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// イメージバージョンとして使うタグ
    #[arg(short, long)]
    tag: String,

    /// 実行内容を表示するだけで、何も実行しない
    #[arg(long)]
    dry_run: bool,

    /// ビルド成功後にイメージをpushする
    #[arg(long)]
    push: bool,

    /// 並列実行数（正の整数 または "max" = CPU数）
    #[arg(long, default_value = "1")]
    parallel: Parallelism,

    /// デバッグログを出力する
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let playbook = match kataflow_core::load_playbook(&cli.config) {
        Ok(playbook) => playbook,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let options = BuildOptions {
        tag: Some(cli.tag),
        push: cli.push,
        dry_run: cli.dry_run,
        parallelism: cli.parallel,
        verbose: cli.verbose,
    };

    let orchestrator = Orchestrator::new(options);
    if let Err(e) = orchestrator.execute(&playbook).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        // ジョブ失敗は設定エラーと区別できる終了コードにする
        let code = match e {
            BuildError::BatchFailed { .. } => 2,
            _ => 1,
        };
        std::process::exit(code);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}
