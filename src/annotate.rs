use crate::{
    date::Cutoff,
    index::{FetchError, ReleaseSource},
    resolve::{NoValidVersion, resolve},
    version::ReleaseVersion,
};
use pep440_rs::{Operator, VersionSpecifier, VersionSpecifiers};
use pep508_rs::{Requirement, VersionOrUrl};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("failed to fetch releases of `{name}`: {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },
    #[error("`{name}`: {source}")]
    NoValidVersion {
        name: String,
        #[source]
        source: NoValidVersion,
    },
    #[error("`{name}` resolved to `{version}`, which cannot be used as an upper bound")]
    UnpinnableVersion {
        name: String,
        version: ReleaseVersion,
    },
}

impl AnnotateError {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Fetch { name, .. }
            | Self::NoValidVersion { name, .. }
            | Self::UnpinnableVersion { name, .. } => name,
        }
    }
}

/// Whether `requirement` already constrains which release is installed.
#[must_use]
pub fn is_constrained(requirement: &Requirement) -> bool {
    requirement.version_or_url.is_some()
}

/// Adds `<=VERSION` to `requirement`, where `VERSION` is the latest release of the named project
/// as of `cutoff`.
///
/// A requirement that already has a version specifier or a direct url is returned unchanged, and
/// `source` is not consulted.
pub fn annotate(
    mut requirement: Requirement,
    cutoff: Cutoff,
    source: &impl ReleaseSource,
) -> Result<Requirement, AnnotateError> {
    if is_constrained(&requirement) {
        return Ok(requirement);
    }

    let name = requirement.name.to_string();

    let releases = source
        .releases(&name)
        .map_err(|source| AnnotateError::Fetch {
            name: name.clone(),
            source,
        })?;

    let latest = resolve(cutoff, &releases).map_err(|source| AnnotateError::NoValidVersion {
        name: name.clone(),
        source,
    })?;

    let Some(version) = latest.as_pep440() else {
        return Err(AnnotateError::UnpinnableVersion {
            name,
            version: latest.clone(),
        });
    };

    let specifier = VersionSpecifier::from_version(Operator::LessThanEqual, version.clone())
        .map_err(|_| AnnotateError::UnpinnableVersion {
            name,
            version: latest.clone(),
        })?;

    requirement.version_or_url = Some(VersionOrUrl::VersionSpecifier(
        VersionSpecifiers::from_iter([specifier]),
    ));

    Ok(requirement)
}
