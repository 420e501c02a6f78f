//! Scripted oracle: a deterministic stand-in for the remote guessing service.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use akigame_core::answer::Answer;
use akigame_core::error::OracleError;
use akigame_core::oracle::{Guess, Oracle, OracleFactory, Question};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Describes how a [`ScriptedOracle`] behaves.
#[derive(Debug, Clone)]
pub struct OracleScript {
    /// Progression reported after the n-th successful answer. The last value
    /// repeats once the list is exhausted; an empty list means `0.0`.
    pub progressions: Vec<f64>,
    /// Answer call numbers (1-based) that fail with `MalformedResponse`.
    pub malformed_calls: HashSet<u32>,
    /// Once this many answers were accepted, further answers fail with
    /// `NoQuestionsLeft`.
    pub questions_available: Option<u32>,
    /// Error returned by `start`, if any.
    pub start_error: Option<OracleError>,
    /// Answer call number (1-based) that fails with the given fatal error.
    pub fatal_answer: Option<(u32, OracleError)>,
    /// Answer call number (1-based) that waits for a notification before
    /// returning.
    pub held_answer: Option<(u32, Arc<Notify>)>,
    /// Guess returned by `commit_guess`.
    pub guess: Guess,
}

impl OracleScript {
    /// A script whose progression follows `progressions`.
    #[must_use]
    pub fn with_progressions(progressions: Vec<f64>) -> Self {
        Self {
            progressions,
            ..Self::default()
        }
    }

    /// A script whose progression never moves.
    #[must_use]
    pub fn flat(progression: f64) -> Self {
        Self::with_progressions(vec![progression])
    }
}

impl Default for OracleScript {
    fn default() -> Self {
        Self {
            progressions: Vec::new(),
            malformed_calls: HashSet::new(),
            questions_available: None,
            start_error: None,
            fatal_answer: None,
            held_answer: None,
            guess: Guess {
                name: "Ada Lovelace".to_owned(),
                description: "Mathematician".to_owned(),
                image_ref: "https://example.test/ada.jpg".to_owned(),
            },
        }
    }
}

/// Counters shared between a factory and every oracle it creates.
#[derive(Debug, Default)]
pub struct OracleCalls {
    starts: AtomicU32,
    answers: AtomicU32,
    backs: AtomicU32,
    commits: AtomicU32,
    answered: Mutex<Vec<Answer>>,
    languages: Mutex<Vec<(String, bool)>>,
}

impl OracleCalls {
    /// Number of `start` calls.
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of `answer` calls, including failed ones.
    pub fn answers(&self) -> u32 {
        self.answers.load(Ordering::SeqCst)
    }

    /// Number of `back` calls, including rejected ones.
    pub fn backs(&self) -> u32 {
        self.backs.load(Ordering::SeqCst)
    }

    /// Number of `commit_guess` calls.
    pub fn commits(&self) -> u32 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Every answer passed to `answer`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn answered(&self) -> Vec<Answer> {
        self.answered.lock().unwrap().clone()
    }

    /// `(language, child_mode)` of every `start` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn started_with(&self) -> Vec<(String, bool)> {
        self.languages.lock().unwrap().clone()
    }
}

/// An [`Oracle`] that follows an [`OracleScript`].
#[derive(Debug)]
pub struct ScriptedOracle {
    script: OracleScript,
    calls: Arc<OracleCalls>,
    started: bool,
    step: u32,
    history: Vec<f64>,
    guess: Option<Guess>,
}

impl ScriptedOracle {
    /// Creates an oracle reporting into `calls`.
    #[must_use]
    pub fn new(script: OracleScript, calls: Arc<OracleCalls>) -> Self {
        Self {
            script,
            calls,
            started: false,
            step: 0,
            history: Vec::new(),
            guess: None,
        }
    }

    fn question(&self) -> Question {
        Question {
            text: format!("Scripted question {}", self.step + 1),
            step: self.step,
            progression: self.progression(),
        }
    }

    fn progression_for(&self, accepted: u32) -> f64 {
        let index = accepted.saturating_sub(1) as usize;
        self.script
            .progressions
            .get(index)
            .or_else(|| self.script.progressions.last())
            .copied()
            .unwrap_or(0.0)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn start(&mut self, language: &str, child_mode: bool) -> Result<Question, OracleError> {
        self.calls.starts.fetch_add(1, Ordering::SeqCst);
        self.calls
            .languages
            .lock()
            .unwrap()
            .push((language.to_owned(), child_mode));
        if let Some(err) = &self.script.start_error {
            return Err(err.clone());
        }
        self.started = true;
        Ok(self.question())
    }

    async fn answer(&mut self, answer: Answer) -> Result<Question, OracleError> {
        let call = self.calls.answers.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.answered.lock().unwrap().push(answer);
        if !self.started {
            return Err(OracleError::NotStarted);
        }
        if let Some((held_call, release)) = self.script.held_answer.clone() {
            if held_call == call {
                release.notified().await;
            }
        }
        if let Some((fatal_call, err)) = &self.script.fatal_answer {
            if *fatal_call == call {
                return Err(err.clone());
            }
        }
        if self.script.malformed_calls.contains(&call) {
            return Err(OracleError::MalformedResponse("scripted garbage".to_owned()));
        }
        if self
            .script
            .questions_available
            .is_some_and(|available| self.step >= available)
        {
            return Err(OracleError::NoQuestionsLeft);
        }
        self.step += 1;
        let progression = self.progression_for(self.step);
        self.history.push(progression);
        Ok(self.question())
    }

    async fn back(&mut self) -> Result<Question, OracleError> {
        self.calls.backs.fetch_add(1, Ordering::SeqCst);
        if self.step == 0 {
            return Err(OracleError::CannotGoBackFurther);
        }
        self.step -= 1;
        self.history.pop();
        Ok(self.question())
    }

    async fn commit_guess(&mut self) -> Result<Guess, OracleError> {
        self.calls.commits.fetch_add(1, Ordering::SeqCst);
        let guess = self.script.guess.clone();
        self.guess = Some(guess.clone());
        Ok(guess)
    }

    fn progression(&self) -> f64 {
        self.history.last().copied().unwrap_or(0.0)
    }

    fn first_guess(&self) -> Option<&Guess> {
        self.guess.as_ref()
    }
}

/// Hands out [`ScriptedOracle`]s that all report into the same counters.
#[derive(Debug)]
pub struct ScriptedOracleFactory {
    script: OracleScript,
    calls: Arc<OracleCalls>,
    languages: Vec<String>,
}

impl ScriptedOracleFactory {
    /// Creates a factory accepting the languages `en`, `fr` and `de`.
    #[must_use]
    pub fn new(script: OracleScript) -> Self {
        Self {
            script,
            calls: Arc::new(OracleCalls::default()),
            languages: vec!["en".to_owned(), "fr".to_owned(), "de".to_owned()],
        }
    }

    /// Counters shared by every oracle this factory creates.
    #[must_use]
    pub fn calls(&self) -> Arc<OracleCalls> {
        Arc::clone(&self.calls)
    }
}

impl OracleFactory for ScriptedOracleFactory {
    fn create(&self) -> Box<dyn Oracle> {
        Box::new(ScriptedOracle::new(
            self.script.clone(),
            Arc::clone(&self.calls),
        ))
    }

    fn validate_language(&self, code: &str) -> bool {
        self.languages.iter().any(|l| l == code)
    }
}
