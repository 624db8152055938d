//! 外部コマンドの組み立て
//!
//! docker build / docker push の引数列と、バリアントごとの一時Dockerfile
//! パスを組み立てます。引数はトークン単位で積み上げる（ネストした構造の
//! 再帰的なflattenはしない）。

use crate::matrix::ConfigSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// 外部コマンド1回分の引数列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            args: vec![program.into()],
        }
    }

    /// トークンを1つ追加
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// `-f path` のようなフラグと値の組を追加
    pub fn flag_pair(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.args.push(flag.to_string());
        self.args.push(value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.args[0]
    }

    /// program以降の引数
    pub fn tail(&self) -> &[String] {
        &self.args[1..]
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// dry-run表示用のシェル相当文字列
    pub fn shell_string(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.shell_string())
    }
}

/// docker build コマンドを組み立てる
///
/// 外部ツールは位置引数に敏感なので、順序は固定:
/// `docker build -f <dockerfile> (-t <name>)* (--label k=v)* <context>`
pub fn build_command(
    dockerfile: &Path,
    image_names: &[String],
    oci_labels: &[(String, String)],
    context_dir: &Path,
) -> CommandLine {
    let mut command = CommandLine::new("docker");
    command
        .arg("build")
        .flag_pair("-f", dockerfile.to_string_lossy());

    for name in image_names {
        command.flag_pair("-t", name);
    }
    for (key, value) in oci_labels {
        command.flag_pair("--label", format!("{}={}", key, value));
    }

    command.arg(context_dir.to_string_lossy());
    command
}

/// docker push コマンドを組み立てる
pub fn push_command(image: &str, quiet: bool) -> CommandLine {
    let mut command = CommandLine::new("docker");
    command.arg("push");
    if quiet {
        command.arg("--quiet");
    }
    command.arg(image);
    command
}

/// バリアントごとの一時Dockerfileパスを導出する
///
/// `key-value` の組を宣言順に `-` で連結し、`.Dockerfile` を付けて
/// テンプレートと同じディレクトリに置く。値に含まれる `-` は二重化して
/// エスケープする。これにより同一イメージの異なるConfigSetが同じパスに
/// 写像されることはない（衝突すると一方の一時ファイルが他方を上書きする）。
pub fn dockerfile_path(template_path: &Path, config_set: &ConfigSet) -> PathBuf {
    let stem = config_set
        .iter()
        .map(|(key, value)| format!("{}-{}", key, value.replace('-', "--")))
        .collect::<Vec<_>>()
        .join("-");

    let dir = template_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}.Dockerfile", stem))
}
