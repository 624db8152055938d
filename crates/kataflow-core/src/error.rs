use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybookError {
    #[error("設定ファイルが見つかりません: {0}")]
    ConfigNotFound(PathBuf),

    #[error("YAMLパースエラー: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("テンプレートエラー: {file}\n理由: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),
}

pub type Result<T> = std::result::Result<T, PlaybookError>;
