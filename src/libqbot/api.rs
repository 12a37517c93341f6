//! REST client for the question-generation backend.
//!
//! Every public call makes exactly one request. Failures are logged and turned
//! into a fallback value, so callers never see an error.

use crate::question::{GenerateResponse, GenerationRequest, Health, QuestionRecord, Stats};
use log::{debug, error};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Generation can run for minutes; requests wait for the backend however long it takes.
const REQUEST_TIMEOUT: Option<Duration> = None;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend URL: {0}")]
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// The backend operations the pages depend on.
pub trait QuestionBackend {
    fn generate_question(&self, request: &GenerationRequest) -> Option<GenerateResponse>;
    fn get_saved_questions(&self) -> Vec<QuestionRecord>;
    fn delete_question(&self, id: &str) -> DeleteOutcome;
    fn get_stats(&self) -> Stats;
    fn save_question(&self, question: &QuestionRecord) -> bool;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("qbot/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL with `segments` appended, each percent-encoded as a single path segment.
    fn segment_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| ApiError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("[API] GET {}", path);
        let response = self.http.get(self.url(path)).send()?;
        decode(response)
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!("[API] POST {}", path);
        let response = self.http.post(self.url(path)).json(body).send()?;
        decode(response)
    }

    pub fn try_generate_question(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerateResponse, ApiError> {
        self.post_json("/generate-question", &request.to_body())
    }

    pub fn try_get_saved_questions(&self) -> Result<Vec<QuestionRecord>, ApiError> {
        self.get_json("/get-questions")
    }

    pub fn try_delete_question(&self, id: &str) -> Result<(), ApiError> {
        let url = self.segment_url(&["delete-question", id])?;
        debug!("[API] DELETE {}", url.path());
        let response = self.http.delete(url).send()?;
        check_status(response).map(|_| ())
    }

    pub fn try_get_stats(&self) -> Result<Stats, ApiError> {
        self.get_json("/stats")
    }

    pub fn try_save_question(&self, question: &QuestionRecord) -> Result<(), ApiError> {
        debug!("[API] POST /save-question");
        let response = self
            .http
            .post(self.url("/save-question"))
            .json(question)
            .send()?;
        check_status(response).map(|_| ())
    }

    pub fn try_health(&self) -> Result<Health, ApiError> {
        self.get_json("/health")
    }

    /// `GET /health`, or `None` when the backend is unreachable.
    pub fn health(&self) -> Option<Health> {
        match self.try_health() {
            Ok(health) => Some(health),
            Err(err) => {
                error!("[API] Error checking backend health: {}", err);
                None
            }
        }
    }
}

impl QuestionBackend for ApiClient {
    fn generate_question(&self, request: &GenerationRequest) -> Option<GenerateResponse> {
        match self.try_generate_question(request) {
            Ok(response) => Some(response),
            Err(err) => {
                error!("[API] Error generating question: {}", err);
                None
            }
        }
    }

    fn get_saved_questions(&self) -> Vec<QuestionRecord> {
        self.try_get_saved_questions().unwrap_or_else(|err| {
            error!("[API] Error fetching questions: {}", err);
            Vec::new()
        })
    }

    fn delete_question(&self, id: &str) -> DeleteOutcome {
        match self.try_delete_question(id) {
            Ok(()) => DeleteOutcome {
                success: true,
                error: None,
            },
            Err(err) => {
                error!("[API] Error deleting question {}: {}", id, err);
                DeleteOutcome {
                    success: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    fn get_stats(&self) -> Stats {
        self.try_get_stats().unwrap_or_else(|err| {
            error!("[API] Error fetching stats: {}", err);
            Stats::default()
        })
    }

    fn save_question(&self, question: &QuestionRecord) -> bool {
        match self.try_save_question(question) {
            Ok(()) => true,
            Err(err) => {
                error!("[API] Error saving question: {}", err);
                false
            }
        }
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = check_status(response)?.text()?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Difficulty, QuestionType};
    use crate::testing::{serve, serve_after, Seen};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const UNREACHABLE: &str = "http://127.0.0.1:1";

    fn finish(handle: std::thread::JoinHandle<Vec<Seen>>) -> Vec<Seen> {
        handle.join().expect("stub backend thread panicked")
    }

    #[test]
    fn generate_posts_the_form_and_decodes_questions() {
        let (base, handle) = serve(vec![(
            200,
            r#"{"questions": [{"question": "Q1", "options": ["a", "b"], "answer": "a"}]}"#,
        )]);
        let client = ApiClient::new(&base).unwrap();
        let request = GenerationRequest {
            subject: "History".into(),
            topic: "Rome".into(),
            difficulty: Difficulty::Hard,
            question_type: QuestionType::Descriptive,
            custom_prompt: String::new(),
        };

        let response = client.generate_question(&request).expect("response");
        let questions = response.questions.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer.as_deref(), Some("a"));

        let seen = finish(handle);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].url, "/generate-question");
        let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(body["subject"], "History");
        assert_eq!(body["difficulty"], "Hard");
        assert_eq!(body["question_type"], "Descriptive");
        assert!(body["custom_prompt"].is_null());
    }

    #[test]
    fn slow_generation_is_waited_for() {
        let (base, handle) = serve_after(
            Duration::from_secs(32),
            vec![(200, r#"{"questions": [{"question": "Slow?", "answer": "Yes"}]}"#)],
        );
        let client = ApiClient::new(&base).unwrap();
        let response = client.generate_question(&GenerationRequest::from_prompt("take your time"));
        assert_eq!(response.and_then(|r| r.questions).map(|q| q.len()), Some(1));
        finish(handle);
    }

    #[test]
    fn generate_falls_back_to_none() {
        let client = ApiClient::new(UNREACHABLE).unwrap();
        assert_eq!(client.generate_question(&GenerationRequest::from_prompt("x")), None);

        let (base, handle) = serve(vec![(500, r#"{"detail": "boom"}"#)]);
        let client = ApiClient::new(&base).unwrap();
        assert_eq!(client.generate_question(&GenerationRequest::from_prompt("x")), None);
        finish(handle);
    }

    #[test]
    fn saved_questions_fall_back_to_empty() {
        let client = ApiClient::new(UNREACHABLE).unwrap();
        assert!(client.get_saved_questions().is_empty());

        let (base, handle) = serve(vec![(200, r#"{"not": "an array"}"#)]);
        let client = ApiClient::new(&base).unwrap();
        assert!(client.get_saved_questions().is_empty());
        finish(handle);
    }

    #[test]
    fn saved_questions_decode_records() {
        let (base, handle) = serve(vec![(
            200,
            r#"[{"_id": "1", "question": "A?", "subject": "S", "topic": "T"},
                {"id": "2", "content": "B?", "type": "mcq"}]"#,
        )]);
        let client = ApiClient::new(&format!("{}/", base)).unwrap();
        let saved = client.get_saved_questions();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].id, "1");
        assert_eq!(saved[1].content, "B?");
        assert_eq!(finish(handle)[0].url, "/get-questions");
    }

    #[test]
    fn saved_questions_survive_null_fields() {
        let (base, handle) = serve(vec![(
            200,
            r#"[{"id": "1", "question": "A?", "options": ["x", "y"], "question_type": "MCQ"},
                {"id": "2", "question": "B?", "options": null, "question_type": null}]"#,
        )]);
        let saved = ApiClient::new(&base).unwrap().get_saved_questions();
        assert_eq!(saved.len(), 2);
        assert!(saved[1].options.is_empty());
        assert_eq!(saved[1].question_type, "");
        finish(handle);
    }

    #[test]
    fn delete_reports_success_and_failure() {
        let (base, handle) = serve(vec![(200, "{}"), (404, r#"{"detail": "missing"}"#)]);
        let client = ApiClient::new(&base).unwrap();

        assert_eq!(
            client.delete_question("abc"),
            DeleteOutcome {
                success: true,
                error: None
            }
        );
        let failed = client.delete_question("zzz");
        assert!(!failed.success);
        assert!(failed.error.unwrap().contains("404"));

        let seen = finish(handle);
        assert_eq!(seen[0].method, "DELETE");
        assert_eq!(seen[0].url, "/delete-question/abc");
        assert_eq!(seen[1].url, "/delete-question/zzz");

        let offline = ApiClient::new(UNREACHABLE).unwrap().delete_question("abc");
        assert!(!offline.success);
    }

    #[test]
    fn delete_encodes_the_id_as_one_segment() {
        let (base, handle) = serve(vec![(200, "{}"), (200, "{}")]);
        let client = ApiClient::new(&base).unwrap();
        assert!(client.delete_question("a/b?c#d").success);

        let nested = ApiClient::new(&format!("{}/api/", base)).unwrap();
        assert!(nested.delete_question("x y").success);

        let seen = finish(handle);
        assert_eq!(seen[0].url, "/delete-question/a%2Fb%3Fc%23d");
        assert_eq!(seen[1].url, "/api/delete-question/x%20y");
    }

    #[test]
    fn stats_fall_back_to_zero() {
        let (base, handle) = serve(vec![(200, r#"{"totalQuestions": 12}"#), (200, "not json")]);
        let client = ApiClient::new(&base).unwrap();
        assert_eq!(client.get_stats().total_questions, 12);
        assert_eq!(client.get_stats(), Stats::default());
        finish(handle);

        assert_eq!(ApiClient::new(UNREACHABLE).unwrap().get_stats(), Stats::default());
    }

    #[test]
    fn save_posts_the_record() {
        let (base, handle) = serve(vec![(200, r#"{"ok": true}"#), (500, "")]);
        let client = ApiClient::new(&base).unwrap();
        let record = QuestionRecord {
            id: "q1".into(),
            content: "Define entropy.".into(),
            ..Default::default()
        };

        assert!(client.save_question(&record));
        assert!(!client.save_question(&record));

        let seen = finish(handle);
        assert_eq!(seen[0].url, "/save-question");
        let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(body["question"], "Define entropy.");
        assert_eq!(body["id"], "q1");
    }

    #[test]
    fn health_reads_status() {
        let (base, handle) = serve(vec![(200, r#"{"status": "OK", "api_key_loaded": true}"#)]);
        let client = ApiClient::new(&base).unwrap();
        let health = client.health().unwrap();
        assert_eq!(health.status, "OK");
        assert!(health.api_key_loaded);
        finish(handle);

        assert_eq!(ApiClient::new(UNREACHABLE).unwrap().health(), None);
    }
}
