#![deny(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::{Parser, crate_version};
use pep508_rs::Requirement;
use std::{num::NonZeroUsize, process::exit, str::FromStr};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub mod annotate;
pub mod batch;
pub mod date;
pub mod index;
pub mod releases;
pub mod resolve;
pub mod version;

mod curl;
mod opts;
mod serialize;
mod verbose;

use annotate::AnnotateError;
use batch::{DEFAULT_JOBS, Outcome};
use date::Cutoff;
use index::{FetchError, Pypi, ReleaseSource};
use releases::ReleaseMap;
use serialize::{ErrorKind, SerializableOutcome};

#[derive(Debug, Parser)]
#[remain::sorted]
#[clap(
    version = crate_version!(),
    about = "Fetch the latest version of PyPI packages as of a given date",
    after_help = "\
Requirements that already have a version specifier or a url are printed unchanged. Every other \
requirement is printed with `<=VERSION` appended, where VERSION is the highest version all of \
whose files were uploaded before DATE.

Exit status is 0 if every requirement was resolved, 1 if some package had no version released \
before DATE, and 2 if any other error occurred."
)]
struct Opts {
    #[clap(
        long,
        help = "When to use color: always, auto, or never",
        default_value = "auto",
        value_name = "WHEN"
    )]
    color: ColorChoice,

    #[clap(
        help = "Cutoff date as YEAR, YEAR-MONTH, or YEAR-MONTH-DAY; missing components default \
                to 1",
        value_name = "DATE"
    )]
    date: Cutoff,

    #[clap(
        long,
        short,
        help = "Number of packages to look up concurrently",
        value_name = "N",
        default_value_t = NonZeroUsize::new(DEFAULT_JOBS).unwrap_or(NonZeroUsize::MIN)
    )]
    jobs: NonZeroUsize,

    #[clap(long, help = "Output JSON")]
    json: bool,

    #[clap(long, help = "Do not show warnings")]
    no_warnings: bool,

    #[clap(
        help = "Requirements, e.g., `requests` or `numpy[dev]>=1.16`",
        value_name = "PKG",
        required = true,
        value_parser = parse_requirement
    )]
    requirements: Vec<Requirement>,

    #[clap(long, help = "Show information about what goodolpypi is doing")]
    verbose: bool,
}

fn parse_requirement(s: &str) -> Result<Requirement, String> {
    Requirement::from_str(s).map_err(|error| error.to_string())
}

#[macro_export]
macro_rules! warn {
    ($fmt:expr, $($arg:tt)*) => {
        if $crate::opts::get().no_warnings {
            log::debug!($fmt, $($arg)*);
        } else {
            eprintln!(concat!("warning: ", $fmt), $($arg)*);
        }
    };
}

/// A [`ReleaseSource`], with verbose reporting and warnings about the data it returns.
struct Reporting<S>(S);

impl<S: ReleaseSource> ReleaseSource for Reporting<S> {
    fn releases(&self, name: &str) -> Result<ReleaseMap, FetchError> {
        let releases = verbose::wrap!(
            || self.0.releases(name),
            |releases: &ReleaseMap| format!("{} versions", releases.len()),
            "releases of `{}` using PyPI JSON API",
            name
        )?;
        for warning in data_warnings(name, &releases) {
            warn!("{}", warning);
        }
        Ok(releases)
    }
}

fn data_warnings(name: &str, releases: &ReleaseMap) -> Vec<String> {
    let mut warnings = releases
        .collisions()
        .iter()
        .map(|collision| {
            format!(
                "`{name}` lists both `{}` and `{}` as versions; using the files of `{}`",
                collision.replaced, collision.kept, collision.kept
            )
        })
        .collect::<Vec<_>>();
    if let Some(version) = releases.legacy_versions().next() {
        warnings.push(format!(
            "`{name}` has versions that are not PEP 440 compliant, e.g., `{version}`; they sort \
             below all other versions"
        ));
    }
    warnings
}

pub fn run() -> Result<()> {
    env_logger::init();

    opts::init(Opts::parse());

    match goodolpypi() {
        Ok(code) => exit(code),
        Err(error) => {
            eprintln!("Error: {error:?}");
            exit(2);
        }
    }
}

fn goodolpypi() -> Result<i32> {
    let Opts {
        date,
        jobs,
        requirements,
        ..
    } = opts::get();

    let outcomes = batch::annotate_all(requirements, *date, &Reporting(Pypi), *jobs)
        .with_context(|| "failed to build thread pool")?;

    if opts::get().json {
        let serializable = requirements
            .iter()
            .zip(&outcomes)
            .map(|(input, outcome)| SerializableOutcome::new(input, outcome))
            .collect::<Vec<_>>();

        let json = serde_json::to_string_pretty(&serializable)?;

        println!("{json}");
    } else {
        display_outcomes(&outcomes)?;
    }

    Ok(exit_code(&outcomes))
}

fn exit_code(outcomes: &[Outcome]) -> i32 {
    let kinds = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err().map(ErrorKind::from))
        .collect::<Vec<_>>();
    if kinds.iter().any(|&kind| kind != ErrorKind::NoValidVersion) {
        2
    } else {
        i32::from(!kinds.is_empty())
    }
}

#[cfg_attr(dylint_lib = "try_io_result", allow(try_io_result))]
fn display_outcomes(outcomes: &[Outcome]) -> Result<()> {
    let mut stderr = StandardStream::stderr(opts::get().color);
    for outcome in outcomes {
        match outcome {
            Ok(requirement) => println!("{requirement}"),
            Err(error) => display_error(&mut stderr, error)?,
        }
    }
    Ok(())
}

#[cfg_attr(dylint_lib = "try_io_result", allow(try_io_result))]
fn display_error(stream: &mut impl WriteColor, error: &AnnotateError) -> std::io::Result<()> {
    let color = match error {
        AnnotateError::NoValidVersion { .. } => Color::Yellow,
        AnnotateError::Fetch { .. } | AnnotateError::UnpinnableVersion { .. } => Color::Red,
    };
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "error")?;
    stream.reset()?;
    writeln!(stream, ": {error}")?;
    Ok(())
}
