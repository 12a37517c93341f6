use crate::api::QuestionBackend;
use crate::question::Stats;

pub const TAGLINE: &str = "Create high-quality, customized exam questions in seconds using AI.";
pub const ABOUT: &str = "Q-Bot is an AI-based exam question generator. Pick a subject, topic, \
difficulty and question type, or describe what you need in a custom prompt, then save the \
results and export them as PDF or text.";

#[derive(Debug, Default)]
pub struct HomePage {
    pub stats: Option<Stats>,
}

impl HomePage {
    pub fn refresh<B: QuestionBackend + ?Sized>(&mut self, backend: &B) {
        self.stats = Some(backend.get_stats());
    }

    pub fn headline(&self) -> String {
        match self.stats {
            Some(stats) => format!("Over {} questions generated!", stats.total_questions),
            None => "Loading stats...".to_string(),
        }
    }
}
