//! Core data model types for adaptquiz.
//!
//! These are the immutable question records a session is built from, plus
//! the difficulty scale and the category filter used when sampling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DifficultyError;

/// A question difficulty on the fixed 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(5);

    /// Create a difficulty, rejecting values outside 1..=5.
    pub fn new(level: u8) -> Result<Self, DifficultyError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DifficultyError(level))
        }
    }

    /// Create a difficulty, clamping out-of-range values into 1..=5.
    pub fn clamped(level: i32) -> Self {
        Self(level.clamp(Self::MIN.0 as i32, Self::MAX.0 as i32) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One level harder, saturating at 5.
    pub fn harder(self) -> Self {
        Self::clamped(self.0 as i32 + 1)
    }

    /// One level easier, saturating at 1.
    pub fn easier(self) -> Self {
        Self::clamped(self.0 as i32 - 1)
    }

    /// Absolute distance between two levels.
    pub fn distance(self, other: Difficulty) -> u8 {
        self.0.abs_diff(other.0)
    }

    /// Human-readable label for the level.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Beginner",
            2 => "Easy",
            3 => "Medium",
            4 => "Hard",
            _ => "Expert",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a question is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Image,
    #[serde(alias = "game")]
    Interactive,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Image => write!(f, "image"),
            QuestionKind::Interactive => write!(f, "interactive"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(QuestionKind::Text),
            "image" => Ok(QuestionKind::Image),
            "interactive" | "game" => Ok(QuestionKind::Interactive),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option identifier, unique within its question (e.g. "a").
    pub id: String,
    /// Text shown to the learner.
    pub text: String,
    /// Whether choosing this option is a correct answer.
    #[serde(rename = "correct", default)]
    pub is_correct: bool,
}

/// A single multiple-choice question.
///
/// Questions are immutable once loaded into a bank; a session only ever
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the bank.
    pub id: String,
    /// The prompt.
    pub text: String,
    /// Presentation kind.
    #[serde(default)]
    pub kind: QuestionKind,
    /// Difficulty level, 1..=5.
    pub difficulty: Difficulty,
    /// Ordered answer options; exactly one must be correct.
    pub options: Vec<AnswerOption>,
    /// Shown after answering.
    #[serde(default)]
    pub explanation: String,
    /// Optional hint; consuming it costs XP.
    #[serde(default)]
    pub hint: Option<String>,
    /// Free-form label used for filtering.
    pub category: String,
    /// Optional media reference.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Question {
    /// Look up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// The first option marked correct.
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Whether `option_id` names a correct option. Unknown ids are incorrect.
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.option(option_id).is_some_and(|o| o.is_correct)
    }

    /// The hint text, if the question has a non-blank one.
    pub fn hint_text(&self) -> Option<&str> {
        self.hint.as_deref().filter(|h| !h.trim().is_empty())
    }
}

/// A named collection of questions, as stored in one bank file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Unique identifier for this set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of the set.
    #[serde(default)]
    pub description: String,
    /// The questions in this set.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Which categories a session draws its questions from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// No filtering.
    All,
    /// A single category.
    One(String),
    /// Any of several categories.
    AnyOf(Vec<String>),
}

impl CategoryFilter {
    pub const ALL_LABEL: &'static str = "All";

    /// Parse a category name; "All" and "All Categories" mean no filter.
    pub fn parse(category: &str) -> Self {
        let trimmed = category.trim();
        if trimmed.eq_ignore_ascii_case(Self::ALL_LABEL)
            || trimmed.eq_ignore_ascii_case("All Categories")
        {
            CategoryFilter::All
        } else {
            CategoryFilter::One(trimmed.to_string())
        }
    }

    /// Whether a question's category passes this filter.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::One(c) => c == category,
            CategoryFilter::AnyOf(cs) => cs.iter().any(|c| c == category),
        }
    }

    /// Label used in summaries and error messages.
    pub fn label(&self) -> String {
        match self {
            CategoryFilter::All => Self::ALL_LABEL.to_string(),
            CategoryFilter::One(c) => c.clone(),
            CategoryFilter::AnyOf(cs) => cs.join(", "),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_bounds_and_labels() {
        assert!(Difficulty::new(0).is_err());
        assert!(Difficulty::new(6).is_err());
        assert_eq!(Difficulty::new(3).unwrap().label(), "Medium");
        assert_eq!(Difficulty::MAX.harder(), Difficulty::MAX);
        assert_eq!(Difficulty::MIN.easier(), Difficulty::MIN);
        assert_eq!(Difficulty::clamped(42), Difficulty::MAX);
        assert_eq!(Difficulty::clamped(-3), Difficulty::MIN);
        assert_eq!(Difficulty::new(1).unwrap().distance(Difficulty::MAX), 4);
    }

    #[test]
    fn difficulty_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Difficulty>("7").is_err());
        assert_eq!(serde_json::from_str::<Difficulty>("4").unwrap().get(), 4);
    }

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(QuestionKind::Image.to_string(), "image");
        assert_eq!(
            "game".parse::<QuestionKind>().unwrap(),
            QuestionKind::Interactive
        );
        assert!("video".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn category_filter_parsing() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("all categories"), CategoryFilter::All);
        let science = CategoryFilter::parse("Science");
        assert!(science.matches("Science"));
        assert!(!science.matches("Art"));
        let mixed = CategoryFilter::AnyOf(vec!["Art".into(), "History".into()]);
        assert!(mixed.matches("History"));
        assert_eq!(mixed.label(), "Art, History");
    }

    #[test]
    fn question_option_lookup() {
        let q = fixtures::question("q1", "Art", 2);
        assert!(q.is_correct("a"));
        assert!(!q.is_correct("b"));
        assert!(!q.is_correct("zz"));
        assert_eq!(q.correct_option().unwrap().id, "a");
        assert!(fixtures::with_hint(q, "  ").hint_text().is_none());
    }
}
