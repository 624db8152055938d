//! バリアント展開とパラメータ収集
//!
//! 1イメージ分の `variables` 宣言を、具体的な設定の組（ConfigSet）の列に
//! 展開します。展開はデカルト積で、最後に宣言した変数が最も速く循環する
//! オドメーター順です。

use crate::error::Result;
use indexmap::IndexMap;
use kataflow_core::{Playbook, Scalar, TemplateProcessor};
use tracing::debug;

/// 変数名 → 具体値。1つのビルドバリアントを定義する
pub type ConfigSet = IndexMap<String, String>;

/// `variables` の全組み合わせをConfigSetの列に展開する
///
/// `variables` が空なら空のConfigSetが1つだけ返る（変数なしのイメージも
/// ちょうど1回ビルドされる）。いずれかの変数の値列が空なら結果は空になる。
pub fn config_sets(variables: &IndexMap<String, Vec<Scalar>>) -> Vec<ConfigSet> {
    let mut sets = vec![ConfigSet::new()];

    for (key, values) in variables {
        let mut next = Vec::with_capacity(sets.len() * values.len());
        for set in &sets {
            for value in values {
                let mut expanded = set.clone();
                expanded.insert(key.clone(), value.to_string());
                next.push(expanded);
            }
        }
        sets = next;
    }

    sets
}

/// ConfigSetにregistry/prefixを重ねてテンプレートパラメータを作る
///
/// 未設定・空白のみの値は載せない（テンプレート側で存在判定できるように、
/// 空文字としては渡さない）。元のConfigSetは変更しない。
pub fn collect_params(config_set: &ConfigSet, playbook: &Playbook) -> IndexMap<String, String> {
    let mut params = config_set.clone();

    if let Some(registry) = playbook.registry() {
        params.insert("registry".to_string(), registry.to_string());
    }
    if let Some(prefix) = playbook.prefix() {
        params.insert("prefix".to_string(), prefix.to_string());
    }

    params
}

/// ラベルテンプレートをConfigSet（+tag）で展開する
///
/// 出力の順序はテンプレートの宣言順。1つでも展開に失敗したら
/// そのイメージにとって致命的なエラーとして伝播する。
pub fn collect_labels(
    config_set: &ConfigSet,
    label_templates: &[String],
    tag: Option<&str>,
) -> Result<Vec<String>> {
    let mut params = config_set.clone();
    if let Some(tag) = tag {
        params.insert("tag".to_string(), tag.to_string());
    }
    debug!("Preparing label params: {:?}", params);

    let mut processor = TemplateProcessor::new();
    processor.add_variables(&params);

    let mut labels = Vec::with_capacity(label_templates.len());
    for template in label_templates {
        labels.push(processor.render_str(template)?);
    }

    Ok(labels)
}
