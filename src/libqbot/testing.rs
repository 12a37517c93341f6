//! Test doubles: a canned HTTP backend and an in-memory `QuestionBackend`.

use crate::api::{DeleteOutcome, QuestionBackend};
use crate::question::{GenerateResponse, GeneratedQuestion, GenerationRequest, QuestionRecord, Stats};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Read;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub url: String,
    pub body: String,
}

/// Serve one canned `(status, body)` per incoming request, then stop.
/// Returns the base URL and a handle yielding the requests that arrived.
pub fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Seen>>) {
    serve_after(Duration::ZERO, responses)
}

/// Like `serve`, but each response is held back for `delay`.
pub fn serve_after(
    delay: Duration,
    responses: Vec<(u16, &'static str)>,
) -> (String, JoinHandle<Vec<Seen>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind stub backend");
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .expect("stub backend port");

    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().expect("stub backend recv");
            let mut content = String::new();
            request
                .as_reader()
                .read_to_string(&mut content)
                .expect("read request body");
            seen.push(Seen {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: content,
            });
            std::thread::sleep(delay);
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    tiny_http::Header::from_bytes("Content-Type", "application/json")
                        .expect("header"),
                );
            request.respond(response).expect("respond");
        }
        seen
    });

    (format!("http://127.0.0.1:{}", port), handle)
}

/// In-memory backend that replays queued generate responses and counts calls.
#[derive(Default)]
pub struct FakeBackend {
    pub generated: RefCell<VecDeque<Option<GenerateResponse>>>,
    pub saved: RefCell<Vec<QuestionRecord>>,
    pub stats: Stats,
    pub fail_writes: bool,
    pub generate_calls: Cell<usize>,
    pub list_calls: Cell<usize>,
    pub delete_calls: Cell<usize>,
    pub save_calls: Cell<usize>,
}

impl FakeBackend {
    pub fn with_responses(responses: Vec<Option<GenerateResponse>>) -> Self {
        FakeBackend {
            generated: RefCell::new(responses.into()),
            ..Default::default()
        }
    }
}

impl QuestionBackend for FakeBackend {
    fn generate_question(&self, _request: &GenerationRequest) -> Option<GenerateResponse> {
        self.generate_calls.set(self.generate_calls.get() + 1);
        self.generated.borrow_mut().pop_front().flatten()
    }

    fn get_saved_questions(&self) -> Vec<QuestionRecord> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.saved.borrow().clone()
    }

    fn delete_question(&self, id: &str) -> DeleteOutcome {
        self.delete_calls.set(self.delete_calls.get() + 1);
        if self.fail_writes {
            return DeleteOutcome {
                success: false,
                error: Some("offline".into()),
            };
        }
        self.saved.borrow_mut().retain(|q| q.id != id);
        DeleteOutcome {
            success: true,
            error: None,
        }
    }

    fn get_stats(&self) -> Stats {
        self.stats
    }

    fn save_question(&self, question: &QuestionRecord) -> bool {
        self.save_calls.set(self.save_calls.get() + 1);
        if self.fail_writes {
            return false;
        }
        self.saved.borrow_mut().push(question.clone());
        true
    }
}

pub fn generated(question: &str, answer: Option<&str>) -> GeneratedQuestion {
    GeneratedQuestion {
        question: Some(question.to_string()),
        options: None,
        answer: answer.map(str::to_string),
    }
}

pub fn batch(entries: Vec<GeneratedQuestion>) -> Option<GenerateResponse> {
    Some(GenerateResponse {
        questions: Some(entries),
        ..Default::default()
    })
}

pub fn record(id: &str, content: &str) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        content: content.to_string(),
        subject: "Physics".into(),
        topic: "Optics".into(),
        difficulty: "Easy".into(),
        question_type: "MCQ".into(),
        timestamp: "2024-01-01 10:00:00".into(),
        ..Default::default()
    }
}
