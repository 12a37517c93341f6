use crate::alert::Alert;
use crate::api::QuestionBackend;
use crate::question::QuestionRecord;
use log::{debug, info, warn};

/// Saved questions from the backend, filtered locally by a search string.
#[derive(Debug, Default)]
pub struct SavedPage {
    pub questions: Vec<QuestionRecord>,
    pub search: String,
}

impl SavedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh<B: QuestionBackend + ?Sized>(&mut self, backend: &B) -> usize {
        self.questions = backend
            .get_saved_questions()
            .into_iter()
            .map(|mut q| {
                q.saved = true;
                q
            })
            .collect();
        debug!("[Saved] Fetched {} questions.", self.questions.len());
        self.questions.len()
    }

    pub fn visible(&self) -> Vec<&QuestionRecord> {
        let needle = self.search.trim().to_lowercase();
        self.questions.iter().filter(|q| q.matches(&needle)).collect()
    }

    /// Delete on the backend, then drop the local copy. The list is untouched on failure.
    pub fn delete<B: QuestionBackend + ?Sized>(&mut self, backend: &B, id: &str) -> Result<(), Alert> {
        if id.trim().is_empty() {
            return Err(Alert::MissingId);
        }
        let outcome = backend.delete_question(id);
        if !outcome.success {
            warn!(
                "[Saved] Delete of {} failed: {}",
                id,
                outcome.error.unwrap_or_default()
            );
            return Err(Alert::DeleteFailed);
        }
        self.questions.retain(|q| q.id != id);
        info!("[Saved] Deleted question {}.", id);
        Ok(())
    }
}
