use crate::alert::Alert;
use crate::api::QuestionBackend;
use crate::question::{GenerateResponse, GenerationRequest, QuestionRecord};
use log::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
}

/// State behind the Generate page: the form, the growing list and the submit state.
#[derive(Debug, Default)]
pub struct GeneratePage {
    pub form: GenerationRequest,
    pub questions: Vec<QuestionRecord>,
    /// First question of the latest batch.
    pub preview: Option<String>,
    state: SubmitState,
}

impl GeneratePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    /// Validate the form and enter `Submitting`. Nothing is sent on `Err`.
    pub fn begin_submit(&mut self) -> Result<GenerationRequest, Alert> {
        if !self.form.is_valid() {
            warn!("[Generate] Rejected submission without subject/topic or prompt.");
            return Err(Alert::MissingInput);
        }
        self.state = SubmitState::Submitting;
        debug!("[Generate] Submitting {:?}", self.form);
        Ok(self.form.clone())
    }

    /// Return to `Idle` and fold the backend's answer into the list.
    /// Returns how many questions were appended.
    pub fn finish_submit(
        &mut self,
        request: &GenerationRequest,
        response: Option<GenerateResponse>,
    ) -> Result<usize, Alert> {
        self.state = SubmitState::Idle;

        let Some(questions) = response.and_then(|r| r.questions) else {
            error!("[Generate] Invalid question format received.");
            return Err(Alert::InvalidResponse);
        };

        let fresh: Vec<QuestionRecord> = questions
            .iter()
            .filter(|q| q.is_valid())
            .map(|q| QuestionRecord::from_generated(q, request))
            .collect();
        if fresh.is_empty() {
            error!("[Generate] No valid questions found in API response.");
            return Err(Alert::NoValidQuestions);
        }

        let appended = fresh.len();
        info!(
            "[Generate] Appending {} of {} questions.",
            appended,
            questions.len()
        );
        self.preview = fresh.first().map(|q| q.content.clone());
        self.questions.extend(fresh);
        Ok(appended)
    }

    pub fn submit<B: QuestionBackend + ?Sized>(&mut self, backend: &B) -> Result<usize, Alert> {
        let request = self.begin_submit()?;
        let response = backend.generate_question(&request);
        self.finish_submit(&request, response)
    }

    /// Quick generation from a bare prompt. A blank prompt does nothing.
    pub fn submit_prompt<B: QuestionBackend + ?Sized>(
        &mut self,
        backend: &B,
        prompt: &str,
    ) -> Option<Result<usize, Alert>> {
        if prompt.trim().is_empty() {
            return None;
        }
        let request = GenerationRequest::from_prompt(prompt);
        self.state = SubmitState::Submitting;
        let response = backend.generate_question(&request);
        Some(self.finish_submit(&request, response))
    }

    /// Replace the list with what the backend has saved.
    pub fn load_saved<B: QuestionBackend + ?Sized>(&mut self, backend: &B) -> usize {
        self.questions = backend.get_saved_questions();
        debug!("[Generate] Loaded {} saved questions.", self.questions.len());
        self.questions.len()
    }

    pub fn save<B: QuestionBackend + ?Sized>(
        &mut self,
        backend: &B,
        index: usize,
    ) -> Result<(), Alert> {
        let question = self
            .questions
            .get_mut(index)
            .ok_or(Alert::NoSuchQuestion(index + 1))?;
        if question.saved {
            return Ok(());
        }
        question.saved = true;
        if backend.save_question(question) {
            info!("[Generate] Saved question {}.", question.id);
            Ok(())
        } else {
            question.saved = false;
            Err(Alert::SaveFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{Difficulty, GeneratedQuestion};
    use crate::testing::{batch, generated, record, FakeBackend};

    fn filled() -> GeneratePage {
        let mut page = GeneratePage::new();
        page.form.subject = "Biology".into();
        page.form.topic = "Cells".into();
        page.form.difficulty = Difficulty::Medium;
        page
    }

    #[test]
    fn empty_form_never_calls_backend() {
        let backend = FakeBackend::with_responses(vec![batch(vec![generated("Q", Some("A"))])]);
        let mut page = GeneratePage::new();
        page.form.subject = "Biology".into();

        assert_eq!(page.submit(&backend), Err(Alert::MissingInput));
        assert_eq!(backend.generate_calls.get(), 0);
        assert_eq!(page.state(), SubmitState::Idle);
        assert!(page.questions.is_empty());
    }

    #[test]
    fn custom_prompt_alone_is_enough() {
        let backend = FakeBackend::with_responses(vec![batch(vec![generated("Q", Some("A"))])]);
        let mut page = GeneratePage::new();
        page.form.custom_prompt = "Five MCQs on WW2".into();

        assert_eq!(page.submit(&backend), Ok(1));
        assert_eq!(backend.generate_calls.get(), 1);
    }

    #[test]
    fn appends_only_valid_entries_in_order() {
        let backend = FakeBackend::with_responses(vec![
            batch(vec![generated("First", Some("1"))]),
            batch(vec![
                generated("Second", Some("2")),
                generated("No answer", None),
                GeneratedQuestion {
                    question: None,
                    options: None,
                    answer: Some("orphan".into()),
                },
                generated("Third", Some("3")),
            ]),
        ]);
        let mut page = filled();

        assert_eq!(page.submit(&backend), Ok(1));
        assert_eq!(page.submit(&backend), Ok(2));

        let contents: Vec<&str> = page.questions.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(contents, vec!["First", "Second", "Third"]);
        assert_eq!(page.preview.as_deref(), Some("Second"));
        assert!(page.questions.iter().all(|q| q.subject == "Biology"));
        assert!(page.questions.iter().all(|q| q.difficulty == "Medium"));
        assert!(!page.is_submitting());
    }

    #[test]
    fn malformed_or_empty_responses_leave_list_unchanged() {
        let backend = FakeBackend::with_responses(vec![
            batch(vec![generated("Kept", Some("k"))]),
            None,
            Some(GenerateResponse {
                question: Some("bare text".into()),
                ..Default::default()
            }),
            batch(vec![]),
            batch(vec![generated("No answer", None)]),
        ]);
        let mut page = filled();
        page.submit(&backend).unwrap();

        assert_eq!(page.submit(&backend), Err(Alert::InvalidResponse));
        assert_eq!(page.submit(&backend), Err(Alert::InvalidResponse));
        assert_eq!(page.submit(&backend), Err(Alert::NoValidQuestions));
        assert_eq!(page.submit(&backend), Err(Alert::NoValidQuestions));
        assert_eq!(page.questions.len(), 1);
        assert_eq!(page.questions[0].content, "Kept");
        assert_eq!(page.state(), SubmitState::Idle);
    }

    #[test]
    fn split_submit_tracks_state() {
        let mut page = filled();
        let request = page.begin_submit().unwrap();
        assert!(page.is_submitting());
        let result = page.finish_submit(&request, batch(vec![generated("Q", Some("A"))]));
        assert_eq!(result, Ok(1));
        assert!(!page.is_submitting());
    }

    #[test]
    fn blank_quick_prompt_is_ignored() {
        let backend = FakeBackend::default();
        let mut page = GeneratePage::new();
        assert_eq!(page.submit_prompt(&backend, "   "), None);
        assert_eq!(backend.generate_calls.get(), 0);
    }

    #[test]
    fn save_marks_question_saved() {
        let backend = FakeBackend::default();
        let mut page = GeneratePage::new();
        page.questions.push(record("a", "Alpha"));

        assert_eq!(page.save(&backend, 0), Ok(()));
        assert!(page.questions[0].saved);
        assert_eq!(backend.saved.borrow().len(), 1);
        assert!(backend.saved.borrow()[0].saved);

        // already saved: no second call
        assert_eq!(page.save(&backend, 0), Ok(()));
        assert_eq!(backend.save_calls.get(), 1);
        assert_eq!(page.save(&backend, 5), Err(Alert::NoSuchQuestion(6)));
    }

    #[test]
    fn failed_save_keeps_flag_clear() {
        let backend = FakeBackend {
            fail_writes: true,
            ..Default::default()
        };
        let mut page = GeneratePage::new();
        page.questions.push(record("a", "Alpha"));

        assert_eq!(page.save(&backend, 0), Err(Alert::SaveFailed));
        assert!(!page.questions[0].saved);
    }

    #[test]
    fn load_saved_replaces_list() {
        let backend = FakeBackend::default();
        backend.saved.borrow_mut().push(record("s1", "Saved one"));
        let mut page = GeneratePage::new();
        page.questions.push(record("x", "Local"));

        assert_eq!(page.load_saved(&backend), 1);
        assert_eq!(page.questions[0].id, "s1");
    }
}
