// Per-problem cache of metadata and test cases, written by `problems set`
// and read back by `problems submit` and `github push`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::api::{Problem, TestCase};

pub struct ProblemCache {
    dir: PathBuf,
}

impl ProblemCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ProblemCache { dir: dir.into() }
    }

    fn path(&self, id: u64, kind: &str) -> PathBuf {
        self.dir.join("problems").join(format!("{id}.{kind}.json"))
    }

    fn write<T: Serialize + ?Sized>(&self, path: PathBuf, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, serde_json::to_vec_pretty(value)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn read<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T> {
        let data = std::fs::read(&path)
            .with_context(|| format!("no cached data at {}; run 'elitecode problems set' first", path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("corrupt cache file {}", path.display()))
    }

    pub fn save_problem(&self, problem: &Problem) -> Result<()> {
        self.write(self.path(problem.id, "problem"), problem)
    }

    pub fn problem(&self, id: u64) -> Result<Problem> {
        self.read(self.path(id, "problem"))
    }

    pub fn save_test_cases(&self, id: u64, cases: &[TestCase]) -> Result<()> {
        self.write(self.path(id, "tests"), cases)
    }

    pub fn test_cases(&self, id: u64) -> Result<Vec<TestCase>> {
        self.read(self.path(id, "tests"))
    }
}
