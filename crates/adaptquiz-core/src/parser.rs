//! TOML question bank parser.
//!
//! Loads question sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::check_questions;
use crate::model::{AnswerOption, Difficulty, Question, QuestionKind, QuestionSet};

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default = "default_kind")]
    kind: String,
    difficulty: u8,
    category: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
    #[serde(default)]
    correct: bool,
}

fn default_kind() -> String {
    "text".to_string()
}

/// Parse a single bank file into a `QuestionSet`.
pub fn parse_bank(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse TOML text into a `QuestionSet`. `source_path` is only used in errors.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
            let difficulty = Difficulty::new(q.difficulty)
                .with_context(|| format!("question {}", q.id))?;

            Ok(Question {
                id: q.id,
                text: q.text,
                kind,
                difficulty,
                options: q
                    .options
                    .into_iter()
                    .map(|o| AnswerOption {
                        id: o.id,
                        text: o.text,
                        is_correct: o.correct,
                    })
                    .collect(),
                explanation: q.explanation,
                hint: q.hint,
                category: q.category,
                image_url: q.image_url,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load one bank file, or every bank under a directory.
pub fn load_banks(path: &Path) -> Result<Vec<QuestionSet>> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        Ok(vec![parse_bank(path)?])
    }
}

/// A problem found while validating questions.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
    /// Errors make the bank unusable; the rest are advisory.
    pub is_error: bool,
}

/// Validate questions: hard invariant violations plus authoring issues.
pub fn validate_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> = check_questions(questions)
        .into_iter()
        .map(|e| ValidationWarning {
            question_id: Some(e.question_id().to_string()),
            message: e.to_string(),
            is_error: true,
        })
        .collect();

    for q in questions {
        let mut advise = |message: String| {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message,
                is_error: false,
            })
        };

        if q.kind == QuestionKind::Image && q.image_url.is_none() {
            advise("image question has no image_url".into());
        }
        if q.explanation.trim().is_empty() {
            advise("explanation is empty".into());
        }
        if q.hint.as_deref().is_some_and(|h| h.trim().is_empty()) {
            advise("hint is blank and will be treated as missing".into());
        }
        let mut texts = HashSet::new();
        for o in &q.options {
            if !texts.insert(o.text.trim().to_lowercase()) {
                advise(format!("option text '{}' appears twice", o.text));
            }
        }
    }

    warnings
}
