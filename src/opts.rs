//! Command-line options, readable from the output layer once [`init`] has run.

use super::Opts;
use std::sync::OnceLock;

static OPTS: OnceLock<Opts> = OnceLock::new();

/// Stores the parsed options. A second call keeps the first options.
pub(crate) fn init(opts: Opts) {
    if OPTS.set(opts).is_err() {
        log::debug!("options were already initialized");
    }
}

/// Panics if called before [`init`].
#[allow(clippy::unwrap_used)]
pub(crate) fn get() -> &'static Opts {
    OPTS.get().unwrap()
}
