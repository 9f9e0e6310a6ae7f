use pep440_rs::Version;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// A release key from the package index.
///
/// Keys that parse as PEP 440 versions are ordered by PEP 440 precedence. Keys that do not are
/// kept verbatim as `Legacy` versions, which sort below every PEP 440 version and among themselves
/// by their raw text. The variant order matters: the derived `Ord` relies on it.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ReleaseVersion {
    Legacy(String),
    Pep440(Version),
}

impl ReleaseVersion {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Version::from_str(s).map_or_else(|_| Self::Legacy(s.to_owned()), Self::Pep440)
    }

    #[must_use]
    pub fn as_pep440(&self) -> Option<&Version> {
        match self {
            Self::Legacy(_) => None,
            Self::Pep440(version) => Some(version),
        }
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.as_pep440().is_none()
    }
}

impl From<&str> for ReleaseVersion {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy(raw) => write!(f, "{raw}"),
            Self::Pep440(version) => write!(f, "{version}"),
        }
    }
}

impl Serialize for ReleaseVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
