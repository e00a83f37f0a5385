use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question text cannot be empty")]
    EmptyQuestion,
    #[error("a question needs at least two choices, got {0}")]
    TooFewChoices(usize),
    #[error("correct index {index} is out of range for {choices} choices")]
    CorrectIndexOutOfRange { index: usize, choices: usize },
    #[error("choice {index} is out of range for {choices} choices")]
    ChoiceOutOfRange { index: usize, choices: usize },
    #[error("question already answered")]
    AlreadyAnswered,
    #[error("quiz already finished")]
    Finished,
}

//
// ─── QUESTIONS ────────────────────────────────────────────────────────────────
//

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    question: String,
    choices: Vec<String>,
    correct_index: usize,
}

impl QuizQuestion {
    /// # Errors
    ///
    /// Returns `QuizError` if the question is blank, has fewer than two
    /// choices, or `correct_index` does not point at a choice.
    pub fn new(
        question: impl Into<String>,
        choices: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuizError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }
        if choices.len() < 2 {
            return Err(QuizError::TooFewChoices(choices.len()));
        }
        if correct_index >= choices.len() {
            return Err(QuizError::CorrectIndexOutOfRange {
                index: correct_index,
                choices: choices.len(),
            });
        }
        Ok(Self {
            question,
            choices,
            correct_index,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }
}

//
// ─── RESULT ───────────────────────────────────────────────────────────────────
//

/// Final score of a quiz run, `score <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
}

impl QuizResult {
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        u8::try_from(self.score * 100 / self.total).unwrap_or(100)
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Question-by-question quiz state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    answers: Vec<Option<usize>>,
    finished: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        let finished = questions.is_empty();
        Self {
            questions,
            current: 0,
            answers,
            finished,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The choice recorded for the current question, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers.get(self.current).copied().flatten()
    }

    /// Record an answer for the current question.
    ///
    /// Returns whether the answer was correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the quiz is finished, the question was already
    /// answered, or `choice` is out of range.
    pub fn answer(&mut self, choice: usize) -> Result<bool, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        let question = self.questions.get(self.current).ok_or(QuizError::Finished)?;
        if self.answers[self.current].is_some() {
            return Err(QuizError::AlreadyAnswered);
        }
        if choice >= question.choices.len() {
            return Err(QuizError::ChoiceOutOfRange {
                index: choice,
                choices: question.choices.len(),
            });
        }
        self.answers[self.current] = Some(choice);
        Ok(choice == question.correct_index)
    }

    /// Move past an answered question. Returns `false` if the current
    /// question has no answer yet.
    pub fn advance(&mut self) -> bool {
        if self.finished || self.current_answer().is_none() {
            return false;
        }
        if self.current + 1 >= self.questions.len() {
            self.finished = true;
        } else {
            self.current += 1;
        }
        true
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn result(&self) -> QuizResult {
        let score = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| **answer == Some(question.correct_index))
            .count();
        QuizResult {
            score,
            total: self.questions.len(),
        }
    }

    /// Clear every answer and go back to the first question.
    pub fn restart(&mut self) {
        self.current = 0;
        self.answers.iter_mut().for_each(|answer| *answer = None);
        self.finished = self.questions.is_empty();
    }
}
