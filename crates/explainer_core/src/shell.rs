//! crates/explainer_core/src/shell.rs
//!
//! The top-level state of one explainer session: the raw text being collected,
//! the last generated explanation, the inline error, and the busy flag.

use tokio_util::sync::CancellationToken;

use crate::domain::Explanation;
use crate::ports::{PortError, PortResult};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to explain.";

/// Which view the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No explanation held; the input view is shown. `busy` may be overlaid.
    Collecting,
    /// An explanation is held; the explanation view is shown.
    Reviewing,
}

/// Handed out when a submission starts. Completing with a stale ticket is a no-op.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: u64,
    pub transcript: String,
    pub cancel: CancellationToken,
}

/// What `Shell::complete` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Stored,
    Failed,
    Discarded,
}

#[derive(Debug, Default)]
pub struct Shell {
    transcript: String,
    explanation: Option<Explanation>,
    error: Option<String>,
    busy: bool,
    generation: u64,
    cancel: CancellationToken,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.explanation.is_some() {
            Phase::Reviewing
        } else {
            Phase::Collecting
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Edits the collected text. Ignored while reviewing or while a request is in flight.
    pub fn set_transcript(&mut self, text: impl Into<String>) -> bool {
        if self.busy || self.phase() == Phase::Reviewing {
            return false;
        }
        self.transcript = text.into();
        true
    }

    /// Starts a submission of the current transcript.
    ///
    /// Blank input records a validation error and never yields a ticket, so the
    /// generation service is not contacted.
    pub fn begin_submit(&mut self) -> PortResult<Ticket> {
        if self.busy {
            return Err(PortError::Busy);
        }
        if self.phase() == Phase::Reviewing {
            return Err(PortError::Validation(
                "Start a new topic before submitting more text.".to_string(),
            ));
        }
        if self.transcript.trim().is_empty() {
            self.error = Some(EMPTY_INPUT_MESSAGE.to_string());
            return Err(PortError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }

        self.busy = true;
        self.error = None;
        self.generation += 1;
        self.cancel = CancellationToken::new();

        Ok(Ticket {
            generation: self.generation,
            transcript: self.transcript.clone(),
            cancel: self.cancel.clone(),
        })
    }

    /// Applies the result of a submission, unless the session moved on since it started.
    pub fn complete(&mut self, ticket: &Ticket, result: PortResult<Explanation>) -> Outcome {
        if ticket.generation != self.generation || !self.busy {
            return Outcome::Discarded;
        }
        self.busy = false;
        match result {
            Ok(explanation) => {
                self.explanation = Some(explanation);
                self.error = None;
                Outcome::Stored
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Outcome::Failed
            }
        }
    }

    /// Returns to an empty input view. Any outstanding submission is cancelled and its
    /// result will be discarded.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.generation += 1;
        self.transcript.clear();
        self.explanation = None;
        self.error = None;
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::sample_explanation;

    #[test]
    fn blank_input_never_yields_a_ticket() {
        let mut shell = Shell::new();
        for text in ["", "   ", "\n\t "] {
            shell.set_transcript(text);
            let err = shell.begin_submit().unwrap_err();
            assert!(matches!(err, PortError::Validation(_)));
            assert_eq!(shell.error(), Some(EMPTY_INPUT_MESSAGE));
            assert!(!shell.is_busy());
        }
    }

    #[test]
    fn success_moves_to_reviewing() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain the concept of quantum entanglement.");
        let ticket = shell.begin_submit().unwrap();
        assert!(shell.is_busy());
        assert_eq!(ticket.transcript, "Explain the concept of quantum entanglement.");

        let outcome = shell.complete(&ticket, Ok(sample_explanation("Quantum Entanglement")));
        assert_eq!(outcome, Outcome::Stored);
        assert_eq!(shell.phase(), Phase::Reviewing);
        assert!(shell.error().is_none());
        assert!(!shell.is_busy());
    }

    #[test]
    fn failure_keeps_text_and_surfaces_error() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain X");
        let ticket = shell.begin_submit().unwrap();
        let outcome = shell.complete(&ticket, Err(PortError::MalformedResponse("missing glossary".into())));
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(shell.phase(), Phase::Collecting);
        assert_eq!(shell.transcript(), "Explain X");
        assert_eq!(shell.error(), Some(crate::ports::MALFORMED_RESPONSE_MESSAGE));
        assert!(shell.explanation().is_none());
        assert!(!shell.is_busy());
    }

    #[test]
    fn second_submission_while_busy_is_rejected() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain X");
        let _ticket = shell.begin_submit().unwrap();
        assert!(matches!(shell.begin_submit(), Err(PortError::Busy)));
        assert!(!shell.set_transcript("changed"));
        assert_eq!(shell.transcript(), "Explain X");
    }

    #[test]
    fn reset_clears_everything_at_once() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain X");
        let ticket = shell.begin_submit().unwrap();
        shell.complete(&ticket, Ok(sample_explanation("X")));

        shell.reset();
        assert_eq!(shell.phase(), Phase::Collecting);
        assert_eq!(shell.transcript(), "");
        assert!(shell.explanation().is_none());
        assert!(shell.error().is_none());
        assert!(!shell.is_busy());
    }

    #[test]
    fn stale_result_after_reset_is_discarded() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain X");
        let ticket = shell.begin_submit().unwrap();

        shell.reset();
        assert!(ticket.cancel.is_cancelled());

        let outcome = shell.complete(&ticket, Ok(sample_explanation("X")));
        assert_eq!(outcome, Outcome::Discarded);
        assert_eq!(shell.phase(), Phase::Collecting);
        assert!(shell.explanation().is_none());
    }

    #[test]
    fn stale_result_does_not_clobber_a_newer_submission() {
        let mut shell = Shell::new();
        shell.set_transcript("first");
        let first = shell.begin_submit().unwrap();
        shell.reset();
        shell.set_transcript("second");
        let second = shell.begin_submit().unwrap();

        assert_eq!(shell.complete(&first, Ok(sample_explanation("First"))), Outcome::Discarded);
        assert!(shell.is_busy());
        assert_eq!(shell.complete(&second, Ok(sample_explanation("Second"))), Outcome::Stored);
        assert_eq!(shell.explanation().map(|e| e.subject.as_str()), Some("Second"));
    }

    #[test]
    fn editing_is_ignored_while_reviewing() {
        let mut shell = Shell::new();
        shell.set_transcript("Explain X");
        let ticket = shell.begin_submit().unwrap();
        shell.complete(&ticket, Ok(sample_explanation("X")));
        assert!(!shell.set_transcript("other"));
        assert!(matches!(shell.begin_submit(), Err(PortError::Validation(_))));
    }
}
