use crate::{
    annotate::{AnnotateError, annotate},
    date::Cutoff,
    index::ReleaseSource,
};
use pep508_rs::Requirement;
use rayon::{ThreadPoolBuildError, ThreadPoolBuilder, prelude::*};
use std::num::NonZeroUsize;

pub type Outcome = Result<Requirement, AnnotateError>;

pub const DEFAULT_JOBS: usize = 10;

/// Annotates every requirement on a pool of `jobs` worker threads.
///
/// The outcomes are in the same order as `requirements`. A failing requirement does not stop the
/// others.
pub fn annotate_all(
    requirements: &[Requirement],
    cutoff: Cutoff,
    source: &impl ReleaseSource,
    jobs: NonZeroUsize,
) -> Result<Vec<Outcome>, ThreadPoolBuildError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(jobs.get())
        .thread_name(|i| format!("goodolpypi-worker-{i}"))
        .build()?;

    Ok(pool.install(|| {
        requirements
            .par_iter()
            .map(|requirement| annotate(requirement.clone(), cutoff, source))
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        index::FetchError,
        releases::{Artifact, ReleaseMap},
    };
    use chrono::Duration;
    use std::{str::FromStr, thread::sleep, time::Duration as StdDuration};

    fn cutoff() -> Cutoff {
        crate::date::normalize("2020").unwrap()
    }

    // Each project `pN` has releases `0.1` through `0.N`, all uploaded before the cutoff. Lower
    // numbers take longer to fetch, so completion order is the reverse of input order.
    fn source(name: &str) -> Result<ReleaseMap, FetchError> {
        let Some(n) = name.strip_prefix('p').and_then(|n| u64::from_str(n).ok()) else {
            return Err(FetchError::NotFound {
                url: crate::index::Pypi::url(name),
            });
        };
        sleep(StdDuration::from_millis(10 * 10u64.saturating_sub(n)));
        let artifact = Artifact::uploaded_at(cutoff().instant() - Duration::days(1));
        Ok(ReleaseMap::from_raw(
            (1..=n).map(|i| (format!("0.{i}"), vec![artifact.clone()])),
        ))
    }

    fn requirements(names: &[&str]) -> Vec<Requirement> {
        names
            .iter()
            .map(|name| Requirement::from_str(name).unwrap())
            .collect()
    }

    fn rendered(outcomes: &[Outcome]) -> Vec<String> {
        outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(requirement) => requirement.to_string(),
                Err(error) => format!("error: {}", error.name()),
            })
            .collect()
    }

    #[test]
    fn preserves_input_order() {
        let requirements = requirements(&["p1", "p2", "p3", "p4", "p5", "p6"]);
        for jobs in [1, 3, DEFAULT_JOBS] {
            let outcomes = annotate_all(
                &requirements,
                cutoff(),
                &source,
                NonZeroUsize::new(jobs).unwrap(),
            )
            .unwrap();
            assert_eq!(
                vec![
                    "p1<=0.1", "p2<=0.2", "p3<=0.3", "p4<=0.4", "p5<=0.5", "p6<=0.6"
                ],
                rendered(&outcomes)
            );
        }
    }

    #[test]
    fn failures_are_per_item() {
        let requirements = requirements(&["p2", "missing", "p3", "p1>=5"]);
        let outcomes = annotate_all(
            &requirements,
            cutoff(),
            &source,
            NonZeroUsize::new(DEFAULT_JOBS).unwrap(),
        )
        .unwrap();
        assert_eq!(
            vec!["p2<=0.2", "error: missing", "p3<=0.3", "p1>=5"],
            rendered(&outcomes)
        );
    }

    #[test]
    fn empty_input() {
        let outcomes =
            annotate_all(&[], cutoff(), &source, NonZeroUsize::new(1).unwrap()).unwrap();
        assert!(outcomes.is_empty());
    }
}
