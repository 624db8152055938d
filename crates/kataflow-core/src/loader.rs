//! Playbookローダー
//!
//! YAML設定ファイルを読み込み、検証し、ビルドコンテキストディレクトリを
//! 設定ファイルの置き場所から導出します。検証は型エラーを拒否するだけでなく、
//! 設定改善のための提案も警告として出します。

use crate::error::{PlaybookError, Result};
use crate::model::Playbook;
use std::path::Path;
use tracing::{debug, info, warn};

/// 設定ファイルをロードして検証済みのPlaybookを返す
pub fn load_playbook(config_file: &Path) -> Result<Playbook> {
    debug!("Opening config file: {}", config_file.display());
    if !config_file.is_file() {
        return Err(PlaybookError::ConfigNotFound(config_file.to_path_buf()));
    }

    let content = std::fs::read_to_string(config_file)?;
    info!("Loading config file: {}", config_file.display());

    let mut playbook: Playbook = serde_yaml::from_str(&content)?;

    // ビルドコンテキストは設定ファイルのあるディレクトリ
    let build_context = config_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    info!("Setting build context dir: {}", build_context.display());
    playbook.build_context = build_context;

    validate(&playbook)?;
    Ok(playbook)
}

fn validate(playbook: &Playbook) -> Result<()> {
    match playbook.registry() {
        Some(registry) => info!("Setting registry to: {}", registry),
        None => warn!("'registry' is not set. Consider adding it for correct configuration."),
    }

    match playbook.prefix() {
        Some(prefix) => info!("Setting prefix to: {}", prefix),
        None => warn!("'prefix' is not set. Consider adding it for better organization."),
    }

    if playbook.images.is_empty() {
        return Err(PlaybookError::InvalidConfig(
            "'images' には少なくとも1つのイメージ定義が必要です".to_string(),
        ));
    }

    for (name, spec) in &playbook.images {
        if spec.dockerfile.trim().is_empty() {
            return Err(PlaybookError::InvalidConfig(format!(
                "イメージ '{}' の 'dockerfile' は空にできません",
                name
            )));
        }

        let template_path = playbook.build_context.join(spec.dockerfile.trim());
        if !template_path.is_file() {
            warn!(
                "Image '{}': Dockerfile template does not exist yet: {}",
                name,
                template_path.display()
            );
        }

        if spec.variables.is_empty() {
            warn!(
                "Image '{}' does not define 'variables'. Consider adding it for customization.",
                name
            );
        }
        for (variable, values) in &spec.variables {
            if values.is_empty() {
                warn!(
                    "Image '{}': variable '{}' has no values; no variants will be built.",
                    name, variable
                );
            }
        }

        if spec.labels.is_empty() {
            warn!(
                "Image '{}' does not define 'labels'. Consider adding it for better tagging.",
                name
            );
        }
    }

    Ok(())
}
