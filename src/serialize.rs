use crate::{
    annotate::{AnnotateError, is_constrained},
    batch::Outcome,
    version::ReleaseVersion,
};
use pep508_rs::{Requirement, VersionOrUrl};
use serde::Serialize;

#[derive(Serialize)]
pub struct SerializableOutcome {
    input: String,
    name: String,
    requirement: Option<String>,
    version: Option<String>,
    error: Option<SerializableError>,
}

#[derive(Serialize)]
struct SerializableError {
    kind: ErrorKind,
    message: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    NoValidVersion,
    UnpinnableVersion,
}

impl From<&AnnotateError> for ErrorKind {
    fn from(value: &AnnotateError) -> Self {
        match value {
            AnnotateError::Fetch { .. } => Self::Fetch,
            AnnotateError::NoValidVersion { .. } => Self::NoValidVersion,
            AnnotateError::UnpinnableVersion { .. } => Self::UnpinnableVersion,
        }
    }
}

impl SerializableOutcome {
    pub fn new(input: &Requirement, outcome: &Outcome) -> Self {
        let (requirement, version, error) = match outcome {
            Ok(requirement) => (
                Some(requirement.to_string()),
                // A requirement that was already constrained was not resolved.
                if is_constrained(input) {
                    None
                } else {
                    upper_bound(requirement).map(|version| version.to_string())
                },
                None,
            ),
            Err(error) => (
                None,
                None,
                Some(SerializableError {
                    kind: ErrorKind::from(error),
                    message: error.to_string(),
                }),
            ),
        };
        Self {
            input: input.to_string(),
            name: input.name.to_string(),
            requirement,
            version,
            error,
        }
    }
}

/// The version of a lone `<=` specifier, i.e., the one added by annotation.
fn upper_bound(requirement: &Requirement) -> Option<ReleaseVersion> {
    let Some(VersionOrUrl::VersionSpecifier(specifiers)) = &requirement.version_or_url else {
        return None;
    };
    let [specifier] = &specifiers[..] else {
        return None;
    };
    (*specifier.operator() == pep440_rs::Operator::LessThanEqual)
        .then(|| ReleaseVersion::Pep440(specifier.version().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{index::FetchError, resolve::NoValidVersion};
    use serde_json::json;
    use std::str::FromStr;

    fn requirement(s: &str) -> Requirement {
        Requirement::from_str(s).unwrap()
    }

    #[test]
    fn annotated() {
        let outcome = Ok(requirement("demo<=1.2"));
        let value = serde_json::to_value(SerializableOutcome::new(&requirement("demo"), &outcome))
            .unwrap();
        assert_eq!(
            json!({
                "input": "demo",
                "name": "demo",
                "requirement": "demo<=1.2",
                "version": "1.2",
                "error": null,
            }),
            value
        );
    }

    #[test]
    fn already_constrained() {
        let input = requirement("demo<=1.0");
        let outcome = Ok(input.clone());
        let value = serde_json::to_value(SerializableOutcome::new(&input, &outcome)).unwrap();
        assert_eq!(json!(null), value["version"]);
        assert_eq!(json!("demo<=1.0"), value["requirement"]);
    }

    #[test]
    fn errors_are_tagged() {
        let cutoff = crate::date::normalize("2000").unwrap();
        let input = requirement("demo");
        for (error, kind) in [
            (
                AnnotateError::Fetch {
                    name: "demo".to_owned(),
                    source: FetchError::Status {
                        url: crate::index::Pypi::url("demo"),
                        code: 503,
                    },
                },
                "fetch",
            ),
            (
                AnnotateError::NoValidVersion {
                    name: "demo".to_owned(),
                    source: NoValidVersion { cutoff },
                },
                "no_valid_version",
            ),
        ] {
            let message = error.to_string();
            let value =
                serde_json::to_value(SerializableOutcome::new(&input, &Err(error))).unwrap();
            assert_eq!(json!(kind), value["error"]["kind"]);
            assert_eq!(json!(message), value["error"]["message"]);
            assert_eq!(json!(null), value["requirement"]);
        }
    }
}
