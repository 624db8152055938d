//! kataflow のコア機能
//!
//! Playbook（YAML設定）のロードと検証、Teraによるテンプレート展開、
//! provenanceラベル用のGitメタデータ取得を提供します。

pub mod error;
pub mod git;
pub mod loader;
pub mod model;
pub mod template;

pub use error::{PlaybookError, Result};
pub use git::GitInfo;
pub use loader::load_playbook;
pub use model::{ImageSpec, Playbook, Scalar};
pub use template::TemplateProcessor;
