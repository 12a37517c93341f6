use chrono::Local;
use rand::rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const ID_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QuestionType {
    #[default]
    Mcq,
    Descriptive,
    Coding,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::Mcq,
        QuestionType::Descriptive,
        QuestionType::Coding,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Descriptive => "Descriptive",
            QuestionType::Coding => "Coding Problem",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A generated or saved question in the one shape every page shares.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionRecord {
    #[serde(alias = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "question", alias = "content", deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(
        rename = "answer",
        alias = "correctAnswer",
        alias = "correct_answer",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(alias = "type", deserialize_with = "null_as_default")]
    pub question_type: String,
    #[serde(alias = "created_at", deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub saved: bool,
}

// Backend rows may carry `null` where a value is optional.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuestionRecord {
    /// Build a record from one valid generated entry and the request that produced it.
    pub fn from_generated(generated: &GeneratedQuestion, request: &GenerationRequest) -> Self {
        QuestionRecord {
            id: new_id(),
            content: generated
                .question
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            options: generated
                .options
                .iter()
                .flatten()
                .map(|opt| opt.trim().to_string())
                .collect(),
            correct_answer: generated.answer.as_deref().map(|a| a.trim().to_string()),
            subject: request.subject.trim().to_string(),
            topic: request.topic.trim().to_string(),
            difficulty: request.difficulty.label().to_string(),
            question_type: request.question_type.label().to_string(),
            timestamp: now_timestamp(),
            saved: false,
        }
    }

    /// Case-insensitive substring match over the searchable text fields.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        [
            &self.content,
            &self.subject,
            &self.topic,
            &self.question_type,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Parameters for one `POST /generate-question` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub custom_prompt: String,
}

impl GenerationRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            custom_prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn has_custom_prompt(&self) -> bool {
        !self.custom_prompt.trim().is_empty()
    }

    /// A custom prompt alone, or both subject and topic, is enough to generate.
    pub fn is_valid(&self) -> bool {
        self.has_custom_prompt()
            || (!self.subject.trim().is_empty() && !self.topic.trim().is_empty())
    }

    pub(crate) fn to_body(&self) -> GenerationBody<'_> {
        GenerationBody {
            subject: &self.subject,
            topic: &self.topic,
            difficulty: self.difficulty.label(),
            question_type: self.question_type.label(),
            custom_prompt: if self.has_custom_prompt() {
                Some(self.custom_prompt.as_str())
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationBody<'a> {
    subject: &'a str,
    topic: &'a str,
    difficulty: &'a str,
    question_type: &'a str,
    custom_prompt: Option<&'a str>,
}

/// One entry of the backend's `questions` array, as sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl GeneratedQuestion {
    pub fn is_valid(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.question) && present(&self.answer)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub questions: Option<Vec<GeneratedQuestion>>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "totalQuestions", alias = "total_questions", default)]
    pub total_questions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub api_key_loaded: bool,
}

pub fn new_id() -> String {
    let mut rng = rng();
    (0..ID_LEN)
        .filter_map(|_| ID_CHARS.choose(&mut rng).map(|b| *b as char))
        .collect()
}

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
