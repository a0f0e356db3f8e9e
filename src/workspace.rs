//! Local problem directories: naming, language templates and source lookup.
//!
//! A problem set up with `problems set` lives in `<id>_<slug>` and holds one
//! source file per language plus `input.txt` / `expected_output.txt`.

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::{Problem, TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    C,
    Cpp,
    Python,
    Java,
    Javascript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Python,
        Language::Java,
        Language::Javascript,
    ];

    /// Name sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Python => "python",
            Language::Java => "java",
            Language::Javascript => "javascript",
        }
    }

    pub fn source_file(self) -> &'static str {
        match self {
            Language::C => "main.c",
            Language::Cpp => "main.cpp",
            Language::Python => "main.py",
            Language::Java => "Main.java",
            Language::Javascript => "main.js",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "c" => Some(Language::C),
            "cpp" | "c++" => Some(Language::Cpp),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "javascript" | "js" => Some(Language::Javascript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "js" => Some(Language::Javascript),
            _ => None,
        }
    }

    /// Starter file for a freshly set-up problem.
    pub fn template(self, problem: &Problem) -> String {
        let header = [
            format!("Problem: {}", problem.title),
            format!("Difficulty: {}", problem.difficulty),
            format!("Category: {}", problem.category),
            String::new(),
            problem.description.clone(),
        ];
        let comment = match self {
            Language::Python => format!("\"\"\"\n{}\n\"\"\"\n\n", header.join("\n")),
            _ => {
                let body: Vec<String> = header
                    .iter()
                    .map(|l| if l.is_empty() { " *".to_string() } else { format!(" * {l}") })
                    .collect();
                format!("/*\n{}\n */\n\n", body.join("\n"))
            }
        };
        match self {
            Language::Java => format!("import java.util.*;\nimport java.io.*;\n\n{}{}", comment, self.body()),
            Language::C | Language::Cpp => format!("{}\n\n{}{}", self.includes(), comment, self.body()),
            _ => format!("{}{}", comment, self.body()),
        }
    }

    /// Starter file without the problem header, used by `problems reset`.
    pub fn blank_template(self) -> String {
        match self {
            Language::C | Language::Cpp => format!("{}\n\n{}", self.includes(), self.body()),
            Language::Java => format!("import java.util.*;\nimport java.io.*;\n\n{}", self.body()),
            _ => self.body().to_string(),
        }
    }

    fn includes(self) -> &'static str {
        match self {
            Language::C => "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>",
            Language::Cpp => {
                "#include <iostream>\n#include <vector>\n#include <string>\n#include <algorithm>\n\nusing namespace std;"
            }
            _ => "",
        }
    }

    fn body(self) -> &'static str {
        match self {
            Language::C | Language::Cpp => "int main() {\n    // Your code here\n\n    return 0;\n}\n",
            Language::Python => "def main():\n    # Your code here\n    pass\n\n\nif __name__ == \"__main__\":\n    main()\n",
            Language::Java => {
                "public class Main {\n    public static void main(String[] args) {\n        // Your code here\n    }\n}\n"
            }
            Language::Javascript => "function main() {\n    // Your code here\n}\n\nmain();\n",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, underscore-separated form of a problem title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

pub fn problem_dir_name(problem: &Problem) -> String {
    let slug = slugify(&problem.title);
    if slug.is_empty() {
        problem.id.to_string()
    } else {
        format!("{}_{}", problem.id, slug)
    }
}

/// Read the problem id out of a `1001_two_sum` directory name.
pub fn problem_id_from_dir(dir: &Path) -> Result<u64> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("cannot read directory name of {}", dir.display()))?;
    let (id, rest) = name
        .split_once('_')
        .ok_or_else(|| anyhow!("'{name}' is not a problem directory (expected <id>_<title>)"))?;
    if rest.is_empty() {
        bail!("'{name}' is not a problem directory (expected <id>_<title>)");
    }
    id.parse()
        .with_context(|| format!("'{name}' does not start with a problem id"))
}

/// All recognised source files directly inside `dir`, sorted by name.
pub fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && Language::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pick the language of the first source file found, in `Language::ALL` order.
pub fn detect_language(dir: &Path) -> Result<Language> {
    let found: Vec<Language> = source_files(dir)?
        .iter()
        .filter_map(|p| Language::from_path(p))
        .collect();
    Language::ALL
        .into_iter()
        .find(|l| found.contains(l))
        .ok_or_else(|| anyhow!("no source files found in {}", dir.display()))
}

/// Write the starter source file and the first sample test into `dir`.
pub fn scaffold(dir: &Path, problem: &Problem, language: Language, tests: &[TestCase]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let source = dir.join(language.source_file());
    std::fs::write(&source, language.template(problem))
        .with_context(|| format!("Failed to create {}", source.display()))?;
    if let Some(first) = tests.first() {
        std::fs::write(dir.join("input.txt"), &first.input).context("Failed to create input.txt")?;
        std::fs::write(dir.join("expected_output.txt"), &first.expected_output)
            .context("Failed to create expected_output.txt")?;
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn two_sum() -> Problem {
        Problem {
            id: 1001,
            title: "Two Sum!".into(),
            description: "Find two numbers.".into(),
            difficulty: "easy".into(),
            category: "arrays".into(),
            tags: vec![],
        }
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slugify("Two Sum!"), "two_sum");
        assert_eq!(slugify("  LRU -- Cache "), "lru_cache");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn dir_name_round_trips_id() {
        let name = problem_dir_name(&two_sum());
        assert_eq!(name, "1001_two_sum");
        assert_eq!(problem_id_from_dir(Path::new("/tmp").join(&name).as_path()).unwrap(), 1001);
    }

    #[test]
    fn dir_without_id_is_rejected() {
        assert!(problem_id_from_dir(Path::new("/tmp/scratch")).is_err());
        assert!(problem_id_from_dir(Path::new("/tmp/abc_two_sum")).is_err());
        assert!(problem_id_from_dir(Path::new("/tmp/12_")).is_err());
    }

    #[test]
    fn templates_carry_problem_header() {
        for lang in Language::ALL {
            let text = lang.template(&two_sum());
            assert!(text.contains("Problem: Two Sum!"), "{lang}");
            assert!(text.contains("Your code here"), "{lang}");
            assert!(!lang.blank_template().contains("Problem:"), "{lang}");
        }
    }

    #[test]
    fn language_lookup() {
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_path(Path::new("Main.java")), Some(Language::Java));
        assert_eq!(Language::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn scaffold_then_detect() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(problem_dir_name(&two_sum()));
        let tests = vec![TestCase { input: "1 2".into(), expected_output: "3".into(), hidden: false }];

        let source = scaffold(&dir, &two_sum(), Language::Python, &tests).unwrap();

        assert_eq!(source.file_name().unwrap(), "main.py");
        assert_eq!(std::fs::read_to_string(dir.join("input.txt")).unwrap(), "1 2");
        assert_eq!(detect_language(&dir).unwrap(), Language::Python);
        assert_eq!(source_files(&dir).unwrap(), vec![source]);
    }

    #[test]
    fn detect_fails_on_empty_dir() {
        let root = TempDir::new().unwrap();
        assert!(detect_language(root.path()).is_err());
    }
}
