use crate::{
    date::Cutoff,
    releases::{Artifact, ReleaseMap},
    version::ReleaseVersion,
};
use log::debug;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("no version has all of its files uploaded before {cutoff}")]
pub struct NoValidVersion {
    pub cutoff: Cutoff,
}

/// Returns the highest version all of whose files were uploaded strictly before `cutoff`.
///
/// Versions without files are never considered released.
pub fn resolve(cutoff: Cutoff, releases: &ReleaseMap) -> Result<&ReleaseVersion, NoValidVersion> {
    releases
        .iter()
        .filter(|&(version, artifacts)| released_before(cutoff, version, artifacts))
        .map(|(version, _)| version)
        .max()
        .ok_or(NoValidVersion { cutoff })
}

fn released_before(cutoff: Cutoff, version: &ReleaseVersion, artifacts: &[Artifact]) -> bool {
    if artifacts.is_empty() {
        debug!("skipping {version}: no files");
        return false;
    }
    if let Some(late) = artifacts
        .iter()
        .find(|artifact| !cutoff.admits(artifact.upload_time))
    {
        debug!(
            "skipping {version}: {} uploaded at {}",
            late.describe(),
            late.upload_time
        );
        return false;
    }
    true
}
