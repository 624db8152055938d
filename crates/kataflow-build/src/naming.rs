//! イメージ名とOCIラベルの導出
//!
//! レジストリ/プレフィックス/ラベルからイメージ名を組み立て、
//! OpenContainers形式のprovenanceラベルを生成します。

use chrono::Utc;
use kataflow_core::{GitInfo, Playbook};

/// registry / prefix / label を `/` で連結してイメージ名を作る
///
/// 未設定の部分は区切りごと省略されるため、`label`、`prefix/label`、
/// `registry/prefix/label` のいずれかに自然に縮退する。
pub fn image_name(registry: Option<&str>, prefix: Option<&str>, label: &str) -> String {
    [registry, prefix, Some(label)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("/")
}

/// OpenContainersのprovenanceラベルを組み立てる
///
/// `created` は常に付与。`maintainer` と `version` は設定されている場合のみ。
/// Gitメタデータ由来の3つは発見できた項目だけ付与する（取得失敗は無視）。
pub fn opencontainer_labels(
    playbook: &Playbook,
    tag: Option<&str>,
    git: &GitInfo,
) -> Vec<(String, String)> {
    let mut labels = Vec::new();

    if let Some(maintainer) = playbook.maintainer() {
        labels.push(("maintainer".to_string(), maintainer.to_string()));
    }

    if let Some(tag) = tag {
        labels.push((
            "org.opencontainers.image.version".to_string(),
            tag.to_string(),
        ));
    }

    if let Some(url) = &git.remote_url {
        labels.push(("org.opencontainers.image.source".to_string(), url.clone()));
    }
    if let Some(revision) = &git.revision {
        labels.push((
            "org.opencontainers.image.revision".to_string(),
            revision.clone(),
        ));
    }
    if let Some(branch) = &git.branch {
        labels.push((
            "org.opencontainers.image.branch".to_string(),
            branch.clone(),
        ));
    }

    labels.push((
        "org.opencontainers.image.created".to_string(),
        Utc::now().to_rfc3339(),
    ));

    labels
}
