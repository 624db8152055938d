//! kataflow ビルドマトリクス機能
//!
//! Playbookからビルドバリアントのマトリクスを展開し、テンプレート展開、
//! イメージ命名、docker build / push コマンドの組み立てと
//! 並列実行までを担当します。

pub mod command;
pub mod error;
pub mod matrix;
pub mod naming;
pub mod orchestrator;
pub mod runner;

pub use command::{CommandLine, build_command, dockerfile_path, push_command};
pub use error::{BuildError, Result};
pub use matrix::{ConfigSet, collect_labels, collect_params, config_sets};
pub use naming::{image_name, opencontainer_labels};
pub use orchestrator::{BuildOptions, Orchestrator};
pub use runner::{CommandRunner, Parallelism};
