//! Process configuration, read from `AKIGAME_*` environment variables.

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use akigame_core::transport::ChannelId;
use akigame_oracle::DEFAULT_REQUEST_TIMEOUT;
use akigame_session::config::SessionConfig;

use crate::error::AppError;

/// Oracle base URL used when `AKIGAME_ORACLE_URL` is unset.
pub const DEFAULT_ORACLE_URL: &str = "https://api.akinator.example/ws";

/// Command prefix used when `AKIGAME_COMMAND_PREFIX` is unset.
pub const DEFAULT_COMMAND_PREFIX: &str = "aki";

/// Everything the bot needs at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Oracle service base URL.
    pub oracle_url: String,
    /// Per-request timeout for oracle calls.
    pub oracle_timeout: Duration,
    /// Session tunables.
    pub session: SessionConfig,
    /// Channels where the game refuses to run.
    pub blocked_channels: HashSet<ChannelId>,
    /// Word that introduces a command, e.g. `aki start`.
    pub command_prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            oracle_url: DEFAULT_ORACLE_URL.to_owned(),
            oracle_timeout: DEFAULT_REQUEST_TIMEOUT,
            session: SessionConfig::default(),
            blocked_channels: HashSet::new(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_owned(),
        }
    }
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        // Quick mode only moves the default; an explicit answer timeout wins.
        let session_defaults = if parsed(&lookup, "AKIGAME_QUICK_MODE", false)? {
            SessionConfig::quick()
        } else {
            defaults.session.clone()
        };

        let session = SessionConfig {
            answer_timeout: seconds(
                &lookup,
                "AKIGAME_ANSWER_TIMEOUT_SECS",
                session_defaults.answer_timeout,
            )?,
            confirm_timeout: seconds(
                &lookup,
                "AKIGAME_CONFIRM_TIMEOUT_SECS",
                session_defaults.confirm_timeout,
            )?,
            prompt_timeout: seconds(
                &lookup,
                "AKIGAME_PROMPT_TIMEOUT_SECS",
                session_defaults.prompt_timeout,
            )?,
            progression_threshold: parsed(
                &lookup,
                "AKIGAME_PROGRESSION_THRESHOLD",
                session_defaults.progression_threshold,
            )?,
            max_questions: parsed(&lookup, "AKIGAME_MAX_QUESTIONS", session_defaults.max_questions)?,
            max_malformed_retries: parsed(
                &lookup,
                "AKIGAME_MAX_MALFORMED_RETRIES",
                session_defaults.max_malformed_retries,
            )?,
            default_language: text(&lookup, "AKIGAME_DEFAULT_LANGUAGE")
                .map_or(session_defaults.default_language, |s| s.to_lowercase()),
            ask_ready: parsed(&lookup, "AKIGAME_ASK_READY", session_defaults.ask_ready)?,
        };

        if !(0.0..=100.0).contains(&session.progression_threshold) {
            return Err(AppError::Config(format!(
                "AKIGAME_PROGRESSION_THRESHOLD must be within 0..=100, got {}",
                session.progression_threshold
            )));
        }
        if session.max_questions == 0 {
            return Err(AppError::Config(
                "AKIGAME_MAX_QUESTIONS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            oracle_url: text(&lookup, "AKIGAME_ORACLE_URL").unwrap_or(defaults.oracle_url),
            oracle_timeout: seconds(
                &lookup,
                "AKIGAME_ORACLE_TIMEOUT_SECS",
                defaults.oracle_timeout,
            )?,
            session,
            blocked_channels: channel_list(&lookup, "AKIGAME_BLOCKED_CHANNELS")?,
            command_prefix: text(&lookup, "AKIGAME_COMMAND_PREFIX")
                .map_or(defaults.command_prefix, |s| s.to_lowercase()),
        })
    }
}

fn text(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match text(lookup, name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid ({raw:?}): {e}"))),
        None => Ok(default),
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, AppError> {
    let secs: u64 = parsed(lookup, name, default.as_secs())?;
    if secs == 0 {
        return Err(AppError::Config(format!("{name} must be at least 1 second")));
    }
    Ok(Duration::from_secs(secs))
}

fn channel_list(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<HashSet<ChannelId>, AppError> {
    let Some(raw) = text(lookup, name) else {
        return Ok(HashSet::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse()
                .map(ChannelId)
                .map_err(|e| AppError::Config(format!("{name} contains {id:?}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use akigame_session::config::{
        DEFAULT_ANSWER_TIMEOUT, DEFAULT_CONFIRM_TIMEOUT, QUICK_ANSWER_TIMEOUT,
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_unset_environment_yields_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.oracle_url, DEFAULT_ORACLE_URL);
        assert_eq!(config.session, SessionConfig::default());
        assert!(config.blocked_channels.is_empty());
        assert_eq!(config.command_prefix, "aki");
    }

    #[test]
    fn test_variables_override_defaults() {
        // Arrange
        let lookup = lookup_from(&[
            ("AKIGAME_ORACLE_URL", "http://localhost:9000/ws"),
            ("AKIGAME_DEFAULT_LANGUAGE", "FR"),
            ("AKIGAME_ANSWER_TIMEOUT_SECS", "60"),
            ("AKIGAME_PROGRESSION_THRESHOLD", "90.5"),
            ("AKIGAME_MAX_QUESTIONS", "40"),
            ("AKIGAME_MAX_MALFORMED_RETRIES", "1"),
            ("AKIGAME_ASK_READY", "true"),
            ("AKIGAME_BLOCKED_CHANNELS", "12, 34,"),
            ("AKIGAME_COMMAND_PREFIX", "Akinator"),
        ]);

        // Act
        let config = BotConfig::from_lookup(lookup).unwrap();

        // Assert
        assert_eq!(config.oracle_url, "http://localhost:9000/ws");
        assert_eq!(config.session.default_language, "fr");
        assert_eq!(config.session.answer_timeout, Duration::from_secs(60));
        assert_eq!(config.session.confirm_timeout, DEFAULT_CONFIRM_TIMEOUT);
        assert!((config.session.progression_threshold - 90.5).abs() < f64::EPSILON);
        assert_eq!(config.session.max_questions, 40);
        assert_eq!(config.session.max_malformed_retries, 1);
        assert!(config.session.ask_ready);
        assert_eq!(
            config.blocked_channels,
            HashSet::from([ChannelId(12), ChannelId(34)])
        );
        assert_eq!(config.command_prefix, "akinator");
    }

    #[test]
    fn test_quick_mode_shortens_answer_wait_only() {
        let config =
            BotConfig::from_lookup(lookup_from(&[("AKIGAME_QUICK_MODE", "true")])).unwrap();

        assert_eq!(config.session.answer_timeout, QUICK_ANSWER_TIMEOUT);
        assert_eq!(config.session.confirm_timeout, DEFAULT_CONFIRM_TIMEOUT);
    }

    #[test]
    fn test_explicit_answer_timeout_overrides_quick_mode() {
        let lookup = lookup_from(&[
            ("AKIGAME_QUICK_MODE", "true"),
            ("AKIGAME_ANSWER_TIMEOUT_SECS", "120"),
        ]);

        let config = BotConfig::from_lookup(lookup).unwrap();

        assert_eq!(config.session.answer_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_blank_values_are_treated_as_unset() {
        let config =
            BotConfig::from_lookup(lookup_from(&[("AKIGAME_ANSWER_TIMEOUT_SECS", "  ")])).unwrap();

        assert_eq!(config.session.answer_timeout, DEFAULT_ANSWER_TIMEOUT);
    }

    #[test]
    fn test_invalid_number_is_a_config_error() {
        let result = BotConfig::from_lookup(lookup_from(&[("AKIGAME_MAX_QUESTIONS", "lots")]));

        match result {
            Err(AppError::Config(message)) => assert!(message.contains("AKIGAME_MAX_QUESTIONS")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result =
            BotConfig::from_lookup(lookup_from(&[("AKIGAME_CONFIRM_TIMEOUT_SECS", "0")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let result =
            BotConfig::from_lookup(lookup_from(&[("AKIGAME_PROGRESSION_THRESHOLD", "150")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_channel_id_is_rejected() {
        let result =
            BotConfig::from_lookup(lookup_from(&[("AKIGAME_BLOCKED_CHANNELS", "12,general")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
