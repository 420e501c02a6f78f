//! HTTP oracle client.

use std::time::Duration;

use akigame_core::answer::Answer;
use akigame_core::error::OracleError;
use akigame_core::oracle::{Guess, Oracle, OracleFactory, Question};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::language::Language;
use crate::wire::{ElementList, Envelope, NewSession, StepInformation};

/// Per-request timeout used by [`HttpOracleFactory::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Number of candidates requested when committing to a guess.
const GUESS_LIST_SIZE: &str = "2";

#[derive(Debug, Clone)]
struct SessionKeys {
    session: String,
    signature: String,
}

/// An [`Oracle`] backed by the remote guessing service.
#[derive(Debug)]
pub struct HttpOracle {
    http: reqwest::Client,
    base_url: String,
    keys: Option<SessionKeys>,
    step: u32,
    progression: f64,
    guess: Option<Guess>,
}

impl HttpOracle {
    /// Creates an unstarted client talking to `base_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            keys: None,
            step: 0,
            progression: 0.0,
            guess: None,
        }
    }

    /// Current zero-based step.
    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }

    fn keys(&self) -> Result<&SessionKeys, OracleError> {
        self.keys.as_ref().ok_or(OracleError::NotStarted)
    }

    fn session_query(&self) -> Result<Vec<(&'static str, String)>, OracleError> {
        let keys = self.keys()?;
        Ok(vec![
            ("session", keys.session.clone()),
            ("signature", keys.signature.clone()),
            ("step", self.step.to_string()),
        ])
    }

    async fn call<P: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<P, OracleError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| OracleError::ServiceUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %status, "oracle request failed");
            return Err(OracleError::ServiceUnavailable(format!(
                "{endpoint} returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| OracleError::ServiceUnavailable(err.to_string()))?;
        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|err| OracleError::MalformedResponse(err.to_string()))?;
        debug!(endpoint, completion = %envelope.completion, "oracle replied");
        envelope.into_parameters()
    }

    /// Decodes a step reply and, only if it is well formed, moves to it.
    fn advance(&mut self, info: StepInformation) -> Result<Question, OracleError> {
        let step = info.step.to_u32("step")?;
        let progression = info.progression.to_f64("progression")?;
        self.step = step;
        self.progression = progression;
        Ok(Question {
            text: info.question,
            step,
            progression,
        })
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    #[instrument(skip(self))]
    async fn start(&mut self, language: &str, child_mode: bool) -> Result<Question, OracleError> {
        let language = Language::parse(language)?;
        let query = [
            ("lang", language.region().to_owned()),
            ("theme", language.theme().wire_name().to_owned()),
            ("child_mode", child_mode.to_string()),
        ];
        let started: NewSession = self.call("new_session", &query).await?;

        let keys = SessionKeys {
            session: started.identification.session.into_text(),
            signature: started.identification.signature.into_text(),
        };
        let question = self.advance(started.step_information)?;
        self.keys = Some(keys);
        self.guess = None;
        debug!(language = %language, "oracle session opened");
        Ok(question)
    }

    #[instrument(skip(self), fields(step = self.step))]
    async fn answer(&mut self, answer: Answer) -> Result<Question, OracleError> {
        let mut query = self.session_query()?;
        query.push(("answer", answer.code().to_string()));
        let info: StepInformation = self.call("answer", &query).await?;
        self.advance(info)
    }

    #[instrument(skip(self), fields(step = self.step))]
    async fn back(&mut self) -> Result<Question, OracleError> {
        let query = self.session_query()?;
        if self.step == 0 {
            return Err(OracleError::CannotGoBackFurther);
        }
        let info: StepInformation = self.call("cancel_answer", &query).await?;
        self.advance(info)
    }

    #[instrument(skip(self), fields(step = self.step))]
    async fn commit_guess(&mut self) -> Result<Guess, OracleError> {
        let mut query = self.session_query()?;
        query.push(("size", GUESS_LIST_SIZE.to_owned()));
        let list: ElementList = self.call("list", &query).await?;

        let element = list
            .elements
            .into_iter()
            .next()
            .map(|entry| entry.element)
            .ok_or(OracleError::NoQuestionsLeft)?;
        let guess = Guess {
            name: element.name,
            description: element.description,
            image_ref: element.absolute_picture_path.unwrap_or_default(),
        };
        self.guess = Some(guess.clone());
        Ok(guess)
    }

    fn progression(&self) -> f64 {
        self.progression
    }

    fn first_guess(&self) -> Option<&Guess> {
        self.guess.as_ref()
    }
}

/// Creates [`HttpOracle`]s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpOracleFactory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpOracleFactory {
    /// Builds a factory for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("akigame/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

impl OracleFactory for HttpOracleFactory {
    fn create(&self) -> Box<dyn Oracle> {
        Box::new(HttpOracle::new(self.http.clone(), self.base_url.clone()))
    }

    fn validate_language(&self, code: &str) -> bool {
        Language::parse(code).is_ok()
    }
}
