use crate::alert::Alert;
use crate::api::QuestionBackend;
use crate::question::{GenerationRequest, QuestionRecord};
use log::{debug, info, warn};
use std::ops::RangeInclusive;

pub const QUESTION_COUNT: RangeInclusive<u32> = 1..=50;
pub const DURATION_MINUTES: RangeInclusive<u32> = 15..=180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperConfig {
    pub question_count: u32,
    pub duration_minutes: u32,
}

impl Default for PaperConfig {
    fn default() -> Self {
        PaperConfig {
            question_count: 10,
            duration_minutes: 60,
        }
    }
}

impl PaperConfig {
    pub fn validate(&self) -> Result<(), Alert> {
        if !QUESTION_COUNT.contains(&self.question_count) {
            return Err(Alert::QuestionCountOutOfRange {
                min: *QUESTION_COUNT.start(),
                max: *QUESTION_COUNT.end(),
            });
        }
        if !DURATION_MINUTES.contains(&self.duration_minutes) {
            return Err(Alert::DurationOutOfRange {
                min: *DURATION_MINUTES.start(),
                max: *DURATION_MINUTES.end(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Paper {
    pub duration_minutes: u32,
    pub questions: Vec<QuestionRecord>,
}

/// Call the backend one request at a time until `question_count` valid questions
/// are collected, a call yields nothing usable, or one call per question has been spent.
pub fn generate_paper<B: QuestionBackend + ?Sized>(
    backend: &B,
    request: &GenerationRequest,
    config: &PaperConfig,
) -> Result<Paper, Alert> {
    config.validate()?;
    if !request.is_valid() {
        return Err(Alert::MissingInput);
    }

    let wanted = config.question_count as usize;
    let mut questions: Vec<QuestionRecord> = Vec::with_capacity(wanted);
    for call in 1..=wanted {
        let batch: Vec<QuestionRecord> = backend
            .generate_question(request)
            .and_then(|r| r.questions)
            .unwrap_or_default()
            .iter()
            .filter(|q| q.is_valid())
            .map(|q| QuestionRecord::from_generated(q, request))
            .collect();
        if batch.is_empty() {
            warn!("[Paper] Call {} returned no valid questions, stopping.", call);
            break;
        }
        debug!("[Paper] Call {} returned {} questions.", call, batch.len());
        questions.extend(batch);
        if questions.len() >= wanted {
            break;
        }
    }
    questions.truncate(wanted);

    if questions.is_empty() {
        return Err(Alert::NoValidQuestions);
    }
    info!(
        "[Paper] Collected {} of {} questions.",
        questions.len(),
        wanted
    );
    Ok(Paper {
        duration_minutes: config.duration_minutes,
        questions,
    })
}
