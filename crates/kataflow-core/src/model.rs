//! Playbookモデル
//!
//! 1回の実行で使われるビルド設定全体を表すデータモデル。
//! `images` と各イメージの `variables` は宣言順が意味を持つため
//! IndexMapで保持します。

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// 検証済みのビルド設定ルート
#[derive(Debug, Clone, Deserialize)]
pub struct Playbook {
    /// イメージ名の先頭に付くレジストリ（例: repo.local）
    #[serde(default)]
    pub registry: Option<String>,

    /// レジストリとラベルの間に挟まるプレフィックス
    #[serde(default)]
    pub prefix: Option<String>,

    /// OCIラベル `maintainer` に載せる連絡先
    #[serde(default)]
    pub maintainer: Option<String>,

    /// イメージ名 → ビルド定義（宣言順を保持）
    pub images: IndexMap<String, ImageSpec>,

    /// ビルドコンテキストディレクトリ。設定ファイルの置き場所から
    /// ローダーが導出するため、ユーザーは指定しない。
    #[serde(skip)]
    pub build_context: PathBuf,
}

impl Playbook {
    /// 空白のみの値は未設定として扱う
    pub fn registry(&self) -> Option<&str> {
        non_blank(self.registry.as_deref())
    }

    pub fn prefix(&self) -> Option<&str> {
        non_blank(self.prefix.as_deref())
    }

    pub fn maintainer(&self) -> Option<&str> {
        non_blank(self.maintainer.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 1イメージ分のビルド定義
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSpec {
    /// Dockerfileテンプレートの相対パス（build_context基準）
    pub dockerfile: String,

    /// 変数名 → 値の列。全組み合わせ（直積）がビルドバリアントになる
    #[serde(default)]
    pub variables: IndexMap<String, Vec<Scalar>>,

    /// ラベルのテンプレート文字列。展開結果がイメージ名の末尾になる
    #[serde(default)]
    pub labels: Vec<String>,
}

/// YAMLスカラー値。変数の値は文字列として展開される
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(v) => write!(f, "{}", v),
            Scalar::Integer(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
        }
    }
}
