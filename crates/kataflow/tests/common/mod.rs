use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Playbookとテンプレートを置いたテスト用プロジェクト
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write_playbook(&self, content: &str) -> PathBuf {
        let path = self.root.path().join("playbook.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_template(&self, name: &str, content: &str) {
        fs::write(self.root.path().join(name), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクト直下のファイル名一覧（ソート済み）
    #[allow(dead_code)]
    pub fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = fs::read_dir(self.root.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        entries
    }
}
