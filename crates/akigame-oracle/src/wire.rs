//! Response bodies of the oracle service.
//!
//! Every endpoint answers `{"completion": "...", "parameters": {...}}`.
//! Numbers arrive either as JSON numbers or as strings, depending on the
//! endpoint, so they are read as [`Scalar`]s and converted on use.

use akigame_core::error::OracleError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Outer envelope. `parameters` is kept raw until the completion is checked,
/// since failed calls carry no (or differently shaped) parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub completion: String,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

impl Envelope {
    /// Checks the completion code and decodes the parameters.
    pub(crate) fn into_parameters<P: DeserializeOwned>(self) -> Result<P, OracleError> {
        check_completion(&self.completion)?;
        let parameters = self
            .parameters
            .ok_or_else(|| OracleError::MalformedResponse("missing parameters".to_owned()))?;
        serde_json::from_value(parameters)
            .map_err(|err| OracleError::MalformedResponse(err.to_string()))
    }
}

/// Maps a completion code onto the error taxonomy.
pub(crate) fn check_completion(completion: &str) -> Result<(), OracleError> {
    match completion.trim() {
        "OK" => Ok(()),
        "KO - SERVER DOWN" | "KO - TECHNICAL ERROR" | "KO - TIMEOUT" => {
            Err(OracleError::ServiceUnavailable(completion.to_owned()))
        }
        "WARN - NO QUESTION" | "KO - ELEM LIST IS EMPTY" => Err(OracleError::NoQuestionsLeft),
        other => Err(OracleError::Unexpected(other.to_owned())),
    }
}

/// A number or a string holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }

    pub(crate) fn to_u32(&self, field: &str) -> Result<u32, OracleError> {
        let parsed = match self {
            Self::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Self::Text(text) => text.trim().parse().ok(),
        };
        parsed.ok_or_else(|| OracleError::MalformedResponse(format!("{field} is not a step: {self:?}")))
    }

    pub(crate) fn to_f64(&self, field: &str) -> Result<f64, OracleError> {
        let parsed = match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(text) => text.trim().parse().ok(),
        };
        parsed
            .filter(|value: &f64| value.is_finite())
            .ok_or_else(|| OracleError::MalformedResponse(format!("{field} is not a number: {self:?}")))
    }
}

/// `new_session` parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct NewSession {
    pub identification: Identification,
    pub step_information: StepInformation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Identification {
    pub session: Scalar,
    pub signature: Scalar,
}

/// `answer` and `cancel_answer` parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct StepInformation {
    pub question: String,
    pub step: Scalar,
    pub progression: Scalar,
}

/// `list` parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct ElementList {
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElementEntry {
    pub element: Element,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Element {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub absolute_picture_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_completion_codes_map_to_errors() {
        assert!(check_completion("OK").is_ok());
        assert!(matches!(
            check_completion("KO - TIMEOUT"),
            Err(OracleError::ServiceUnavailable(_))
        ));
        assert_eq!(
            check_completion("WARN - NO QUESTION"),
            Err(OracleError::NoQuestionsLeft)
        );
        assert_eq!(
            check_completion("KO - MISSING PARAMETERS"),
            Err(OracleError::Unexpected("KO - MISSING PARAMETERS".to_owned()))
        );
    }

    #[test]
    fn test_step_information_accepts_strings_and_numbers() {
        let envelope: Envelope = serde_json::from_value(json!({
            "completion": "OK",
            "parameters": {"question": "Is it real?", "step": "3", "progression": 42.5}
        }))
        .unwrap();

        let info: StepInformation = envelope.into_parameters().unwrap();

        assert_eq!(info.step.to_u32("step").unwrap(), 3);
        assert!((info.progression.to_f64("progression").unwrap() - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unparseable_progression_is_malformed() {
        let scalar = Scalar::Text("eighty".to_owned());

        assert!(matches!(
            scalar.to_f64("progression"),
            Err(OracleError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_parameters_on_ok_is_malformed() {
        let envelope: Envelope = serde_json::from_value(json!({"completion": "OK"})).unwrap();

        let result: Result<StepInformation, _> = envelope.into_parameters();

        assert!(matches!(result, Err(OracleError::MalformedResponse(_))));
    }
}
