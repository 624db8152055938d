//! ビルドオーケストレーション
//!
//! Playbookのイメージを順に処理します。イメージごとに、バリアント展開 →
//! テンプレート展開 → 一時Dockerfile書き出し → ビルドバッチ実行 →
//! 一時ファイル削除、の順で進み、全イメージ完了後に必要ならpushバッチを
//! 実行します。バッチは常に直列で、並列なのはバッチ内のジョブだけです。

use crate::command::{build_command, dockerfile_path, push_command};
use crate::error::{BuildError, Result};
use crate::matrix::{collect_labels, collect_params, config_sets};
use crate::naming::{image_name, opencontainer_labels};
use crate::runner::{CommandRunner, Parallelism};
use colored::Colorize;
use kataflow_core::{GitInfo, ImageSpec, Playbook, TemplateProcessor};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// 1回の実行の設定。構築後は変更されず、各コンポーネントに
/// 参照で渡される（プロセス全体の可変状態は持たない）。
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// イメージバージョンとして使うタグ
    pub tag: Option<String>,
    /// ビルド成功後にpushする
    pub push: bool,
    /// コマンドを実行せず、予定内容の表示だけ行う
    pub dry_run: bool,
    /// バッチ内の並列実行数
    pub parallelism: Parallelism,
    /// 冗長出力（pushの --quiet 抑制を解除する）
    pub verbose: bool,
}

pub struct Orchestrator {
    options: BuildOptions,
}

impl Orchestrator {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Playbook全体を実行し、対象となった全イメージ名を返す
    ///
    /// テンプレートの読み込み・展開に失敗したイメージはスキップして
    /// 他のイメージの処理を続けるが、最終結果は失敗になる。
    /// ビルドバッチの失敗は致命的で、そのイメージの一時ファイル削除後に
    /// 即座に伝播する（以降のイメージもpushも実行しない）。
    pub async fn execute(&self, playbook: &Playbook) -> Result<Vec<String>> {
        let git = GitInfo::discover(Path::new("."));

        let mut collected_images: Vec<String> = Vec::new();
        let mut failed_images = 0usize;

        for (image, spec) in &playbook.images {
            match self
                .process_image(image, spec, playbook, &git, &mut collected_images)
                .await
            {
                Ok(()) => {}
                Err(e @ BuildError::BatchFailed { .. }) => return Err(e),
                Err(e) => {
                    error!("Skipping image {}: {}", image, e);
                    failed_images += 1;
                }
            }
        }

        if self.options.dry_run && !collected_images.is_empty() {
            let listing = collected_images
                .iter()
                .map(|name| format!(" - {}", name))
                .collect::<Vec<_>>()
                .join("\n");
            println!("{}\n{}", "DRY-RUN mode, would create:".yellow(), listing);
        }

        if failed_images > 0 {
            if self.options.push {
                warn!("Not pushing: {} image(s) failed to build", failed_images);
            }
            return Err(BuildError::ImagesFailed {
                count: failed_images,
            });
        }

        if self.options.push {
            self.push_images(&collected_images).await?;
        }

        Ok(collected_images)
    }

    async fn process_image(
        &self,
        image: &str,
        spec: &ImageSpec,
        playbook: &Playbook,
        git: &GitInfo,
        collected_images: &mut Vec<String>,
    ) -> Result<()> {
        debug!("Processing image: {}", image);

        let template_path = playbook.build_context.join(spec.dockerfile.trim());
        if !template_path.is_file() {
            return Err(BuildError::TemplateNotFound(template_path));
        }

        let mut runner = CommandRunner::new(self.options.parallelism, self.options.dry_run);
        let mut temp_files: Vec<PathBuf> = Vec::new();

        let queued = self.queue_variants(
            spec,
            playbook,
            git,
            &template_path,
            &mut runner,
            &mut temp_files,
            collected_images,
        );

        let outcome = match queued {
            Ok(()) => {
                println!(
                    "{}: {}",
                    "Starting build of image set".bold(),
                    image.blue()
                );
                runner.run().await
            }
            Err(e) => Err(e),
        };

        // 一時ファイルの削除はバッチの成否にかかわらず行う
        cleanup_temp_files(&temp_files);

        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn queue_variants(
        &self,
        spec: &ImageSpec,
        playbook: &Playbook,
        git: &GitInfo,
        template_path: &Path,
        runner: &mut CommandRunner,
        temp_files: &mut Vec<PathBuf>,
        collected_images: &mut Vec<String>,
    ) -> Result<()> {
        let tag = self.options.tag.as_deref();

        for config_set in config_sets(&spec.variables) {
            debug!("Current config set: {:?}", config_set);

            let params = collect_params(&config_set, playbook);
            let mut processor = TemplateProcessor::new();
            processor.add_variables(&params);
            let rendered = processor.render_file(template_path)?;

            let labels = collect_labels(&config_set, &spec.labels, tag)?;
            let dockerfile = dockerfile_path(template_path, &config_set);

            if !self.options.dry_run {
                debug!("Creating temporary Dockerfile: {}", dockerfile.display());
                std::fs::write(&dockerfile, &rendered)?;
                temp_files.push(dockerfile.clone());
            }

            let names: Vec<String> = labels
                .iter()
                .map(|label| image_name(playbook.registry(), playbook.prefix(), label))
                .collect();
            let oci_labels = opencontainer_labels(playbook, tag, git);
            let context_dir = template_path.parent().unwrap_or_else(|| Path::new("."));

            let command = build_command(&dockerfile, &names, &oci_labels, context_dir);
            debug!("Collecting build command: {}", command);
            runner.add(command);

            collected_images.extend(names);
        }

        Ok(())
    }

    async fn push_images(&self, collected_images: &[String]) -> Result<()> {
        println!("{}", "Pushing images".bold());

        let mut pusher = CommandRunner::new(self.options.parallelism, self.options.dry_run);
        for image in collected_images {
            pusher.add(push_command(image, !self.options.verbose));
        }
        pusher.run().await?;

        if self.options.dry_run {
            let listing = collected_images
                .iter()
                .map(|name| format!(" - {}", name))
                .collect::<Vec<_>>()
                .join("\n");
            println!("{}\n{}", "DRY-RUN mode, would push:".yellow(), listing);
        }

        Ok(())
    }
}

/// 一時Dockerfileを削除する。既に存在しないファイルは成功扱い。
fn cleanup_temp_files(temp_files: &[PathBuf]) {
    debug!("Removing temporary Dockerfiles: {:?}", temp_files);
    for file in temp_files {
        if let Err(e) = std::fs::remove_file(file) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", file.display(), e);
            }
        }
    }
}
