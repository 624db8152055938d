//! コマンド実行エンジン
//!
//! 1バッチ分の外部コマンドを、設定された並列度で実行します。
//! 各ジョブのstdout/stderrは呼び出し元の端末にそのまま流れるため、
//! docker buildの進捗出力はリアルタイムに見えます。
//!
//! 失敗したジョブがあっても残りのジョブはすべて実行し、完了後に
//! 1つの集約エラーとして報告します（途中キャンセルはしない）。

use crate::command::CommandLine;
use crate::error::{BuildError, Result};
use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info};

/// 並列実行数。`max` はCPU数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    Fixed(usize),
    Max,
}

impl Parallelism {
    pub fn workers(&self) -> usize {
        match self {
            Parallelism::Fixed(workers) => *workers,
            Parallelism::Max => num_cpus::get(),
        }
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Fixed(1)
    }
}

impl FromStr for Parallelism {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("max") {
            return Ok(Parallelism::Max);
        }
        match value.parse::<usize>() {
            Ok(workers) if workers >= 1 => Ok(Parallelism::Fixed(workers)),
            _ => Err(format!(
                "invalid value for parallelism: {}. Must be 'max' or a positive integer.",
                value
            )),
        }
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::Fixed(workers) => write!(f, "{}", workers),
            Parallelism::Max => write!(f, "max"),
        }
    }
}

/// 1ジョブの実行結果
enum JobStatus {
    Success,
    Exited(i32),
    SpawnFailed(String),
}

/// 1バッチ分のコマンドを貯めて実行するランナー
///
/// バッチ間で状態を持たない。pushバッチなど次のバッチは
/// 新しいランナーで始める。
pub struct CommandRunner {
    jobs: Vec<CommandLine>,
    parallelism: Parallelism,
    dry_run: bool,
}

impl CommandRunner {
    pub fn new(parallelism: Parallelism, dry_run: bool) -> Self {
        Self {
            jobs: Vec::new(),
            parallelism,
            dry_run,
        }
    }

    /// ジョブをキューに追加
    pub fn add(&mut self, job: CommandLine) {
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// キュー内容のシェル相当文字列（dry-run表示・テスト用）
    pub fn preview(&self) -> Vec<String> {
        self.jobs.iter().map(CommandLine::shell_string).collect()
    }

    /// バッチを実行する
    ///
    /// dry-runでは何も起動せず、キュー内容をログに出すだけで成功を返す。
    pub async fn run(self) -> Result<()> {
        let workers = self.parallelism.workers().max(1);
        if workers > 1 {
            info!("Setting parallelism to: {}", workers);
        }

        if self.dry_run {
            let listing = self
                .jobs
                .iter()
                .map(|job| format!(" - {}", job))
                .collect::<Vec<_>>()
                .join("\n");
            debug!("DRY-RUN mode, normally would execute:\n{}", listing);
            return Ok(());
        }

        let total = self.jobs.len();
        let outcomes: Vec<(CommandLine, JobStatus)> = stream::iter(self.jobs)
            .map(|job| async move {
                let status = execute(&job).await;
                (job, status)
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        let mut failed = 0;
        for (job, status) in &outcomes {
            match status {
                JobStatus::Success => {}
                JobStatus::Exited(code) => {
                    failed += 1;
                    error!("Command failed with exit code {}: {}", code, job);
                }
                JobStatus::SpawnFailed(message) => {
                    failed += 1;
                    error!("Command failed to start: {}: {}", job, message);
                }
            }
        }

        if failed > 0 {
            return Err(BuildError::BatchFailed { failed, total });
        }
        Ok(())
    }
}

async fn execute(job: &CommandLine) -> JobStatus {
    debug!("Executing: {}", job);

    let mut command = tokio::process::Command::new(job.program());
    command.args(job.tail());

    // stdout/stderrは継承したまま完了を待つ
    match command.status().await {
        Ok(status) if status.success() => JobStatus::Success,
        Ok(status) => JobStatus::Exited(status.code().unwrap_or(-1)),
        Err(e) => JobStatus::SpawnFailed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(program: &str, args: &[&str]) -> CommandLine {
        let mut command = CommandLine::new(program);
        for arg in args {
            command.arg(*arg);
        }
        command
    }

    #[test]
    fn test_parallelism_parsing() {
        assert_eq!("1".parse::<Parallelism>().unwrap(), Parallelism::Fixed(1));
        assert_eq!("8".parse::<Parallelism>().unwrap(), Parallelism::Fixed(8));
        assert_eq!("max".parse::<Parallelism>().unwrap(), Parallelism::Max);
        assert_eq!("MAX".parse::<Parallelism>().unwrap(), Parallelism::Max);

        assert!("0".parse::<Parallelism>().is_err());
        assert!("-2".parse::<Parallelism>().is_err());
        assert!("many".parse::<Parallelism>().is_err());
    }

    #[test]
    fn test_max_parallelism_uses_all_cpus() {
        assert!(Parallelism::Max.workers() >= 1);
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let runner = CommandRunner::new(Parallelism::default(), false);
        assert!(runner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_sequential_batch_succeeds() {
        let mut runner = CommandRunner::new(Parallelism::Fixed(1), false);
        runner.add(job("true", &[]));
        runner.add(job("true", &[]));
        assert!(runner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_parallel_batch_succeeds() {
        let mut runner = CommandRunner::new(Parallelism::Fixed(4), false);
        for _ in 0..8 {
            runner.add(job("true", &[]));
        }
        assert!(runner.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_all_jobs_run_even_when_one_fails() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");

        let mut runner = CommandRunner::new(Parallelism::Fixed(1), false);
        runner.add(job("touch", &[first.to_str().unwrap()]));
        runner.add(job("false", &[]));
        runner.add(job("touch", &[second.to_str().unwrap()]));

        let result = runner.run().await;
        match result {
            Err(BuildError::BatchFailed { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }

        // 失敗の前後のジョブも実行されている
        assert!(first.exists());
        assert!(second.exists());
    }

    #[tokio::test]
    async fn test_spawn_failure_counts_as_job_failure() {
        let mut runner = CommandRunner::new(Parallelism::Fixed(2), false);
        runner.add(job("kataflow-no-such-binary", &[]));
        runner.add(job("true", &[]));

        let result = runner.run().await;
        assert!(matches!(
            result,
            Err(BuildError::BatchFailed { failed: 1, total: 2 })
        ));
    }

    #[tokio::test]
    async fn test_dry_run_executes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");

        let mut runner = CommandRunner::new(Parallelism::Fixed(1), true);
        runner.add(job("touch", &[marker.to_str().unwrap()]));
        runner.add(job("false", &[]));

        // 失敗するはずのジョブが入っていても成功する
        assert!(runner.run().await.is_ok());
        assert!(!marker.exists());
    }

    #[test]
    fn test_preview_lists_queued_jobs() {
        let mut runner = CommandRunner::new(Parallelism::default(), true);
        runner.add(job("docker", &["push", "repo.local/alpine/3.18"]));

        assert_eq!(runner.preview(), ["docker push repo.local/alpine/3.18"]);
    }
}
