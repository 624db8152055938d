//! Gitメタデータ取得
//!
//! provenanceラベル（source / revision / branch）に使うメタデータを
//! `git` コマンドから取得します。リポジトリ外やremote未設定など、
//! 取得できない項目はNoneになります（ソフトフェイル）。

use std::path::Path;
use std::process::Command;
use tracing::debug;

/// 作業ディレクトリから発見したGitメタデータ
#[derive(Debug, Clone, Default)]
pub struct GitInfo {
    pub remote_url: Option<String>,
    pub revision: Option<String>,
    pub branch: Option<String>,
}

impl GitInfo {
    /// 指定ディレクトリを起点にメタデータを収集する
    pub fn discover(dir: &Path) -> Self {
        Self {
            remote_url: git_output(dir, &["remote", "get-url", "origin"]),
            revision: git_output(dir, &["rev-parse", "HEAD"]),
            // detached HEAD では空出力になり、Noneとして扱われる
            branch: git_output(dir, &["branch", "--show-current"]),
        }
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("git {} failed in {}", args.join(" "), dir.display());
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}
