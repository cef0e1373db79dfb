#![allow(dead_code)]

use anyhow::Result;
use shortlist::embedding::EmbeddingProvider;
use std::path::{Path, PathBuf};

/// Fixed vocabulary for the stub provider. One dimension per word keeps the
/// vectors collision-free and the expected similarities easy to reason about.
const VOCAB: &[&str] = &[
    "java",
    "developer",
    "test",
    "coding",
    "debugging",
    "leadership",
    "assessment",
    "python",
    "numerical",
    "reasoning",
    "verbal",
    "personality",
    "manager",
    "sales",
    "graduate",
    "skills",
];

pub const STUB_DIM: usize = VOCAB.len();

/// Deterministic one-hot bag-of-words provider: each known word adds 1.0 to
/// its own dimension; unknown words are ignored. Same text always produces
/// the same vector, so ranking tests never depend on real model weights.
pub struct StubProvider;

impl EmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; STUB_DIM];
        for token in text.to_lowercase().split_whitespace() {
            if let Some(dim) = VOCAB.iter().position(|&w| w == token) {
                v[dim] += 1.0;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        STUB_DIM
    }
}

/// Build catalog CSV contents from (id, embedding text) pairs.
pub fn catalog_csv(rows: &[(&str, &str)]) -> String {
    let mut csv = String::from(
        "assessment_id,name,url,remote_testing,adaptive_irt,duration_minutes,text_for_embedding\n",
    );
    for (id, text) in rows {
        csv.push_str(&format!(
            "{id},{id} assessment,https://catalog.test/{id},1,0,30,{text}\n"
        ));
    }
    csv
}

/// Write catalog CSV contents into `dir` and return the file path.
pub fn write_catalog(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("catalog.csv");
    std::fs::write(&path, contents).unwrap();
    path
}
