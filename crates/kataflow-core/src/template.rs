//! テンプレート展開機能
//!
//! Teraを使用してDockerfile本体とラベル文字列の展開を行います。
//! 未解決の変数参照はエラーになります（暗黙の空文字にはなりません）。

use crate::error::{PlaybookError, Result};
use indexmap::IndexMap;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

/// テンプレートプロセッサ
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    /// 変数を追加
    pub fn add_variable(&mut self, key: impl Into<String>, value: &str) {
        self.context.insert(key.into(), value);
    }

    /// 複数の変数をまとめて追加
    pub fn add_variables(&mut self, variables: &IndexMap<String, String>) {
        for (key, value) in variables {
            self.context.insert(key.as_str(), value);
        }
    }

    /// 文字列をテンプレートとして展開
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.tera.render_str(template, &self.context).map_err(|e| {
            PlaybookError::TemplateRenderError(extract_tera_error_detail(&e))
        })
    }

    /// ファイルを読み込んでテンプレート展開
    pub fn render_file(&mut self, path: &Path) -> Result<String> {
        debug!("Templating {}", path.display());
        let content = std::fs::read_to_string(path)?;

        self.render_str(&content).map_err(|e| {
            if let PlaybookError::TemplateRenderError(message) = e {
                PlaybookError::TemplateError {
                    file: path.to_path_buf(),
                    message,
                }
            } else {
                e
            }
        })
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Teraのエラーは原因がsourceチェーンに埋まっているため、辿って連結する
fn extract_tera_error_detail(err: &tera::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_str_with_variables() {
        let mut processor = TemplateProcessor::new();
        processor.add_variable("version", "3.18");

        let result = processor.render_str("FROM alpine:{{version}}").unwrap();
        assert_eq!(result, "FROM alpine:3.18");
    }

    #[test]
    fn test_render_str_unresolved_variable_fails() {
        let mut processor = TemplateProcessor::new();

        let result = processor.render_str("FROM alpine:{{version}}");
        assert!(matches!(
            result,
            Err(PlaybookError::TemplateRenderError(_))
        ));
    }

    #[test]
    fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.Dockerfile");
        std::fs::write(&path, "FROM alpine:{{version}}\n").unwrap();

        let mut processor = TemplateProcessor::new();
        processor.add_variable("version", "3.19");

        let result = processor.render_file(&path).unwrap();
        assert_eq!(result, "FROM alpine:3.19\n");
    }

    #[test]
    fn test_render_file_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.Dockerfile");
        std::fs::write(&path, "FROM alpine:{{missing}}\n").unwrap();

        let result = TemplateProcessor::new().render_file(&path);
        match result {
            Err(PlaybookError::TemplateError { file, .. }) => assert_eq!(file, path),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_add_variables_overlays_in_order() {
        let mut variables = IndexMap::new();
        variables.insert("registry".to_string(), "repo.local".to_string());
        variables.insert("version".to_string(), "3.18".to_string());

        let mut processor = TemplateProcessor::new();
        processor.add_variables(&variables);

        let result = processor
            .render_str("{{registry}}/alpine:{{version}}")
            .unwrap();
        assert_eq!(result, "repo.local/alpine:3.18");
    }
}
