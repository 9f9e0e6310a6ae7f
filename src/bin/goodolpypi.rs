//! `goodolpypi`
//!
//! Find the latest version of PyPI packages as of a given date.
//!
//! For each requirement given on the command line, `goodolpypi` fetches the package's release
//! history from PyPI and determines the highest version all of whose files were uploaded before
//! the date. Requirements without a version specifier are printed with `<=VERSION` appended;
//! requirements that already have one are printed unchanged.

fn main() -> anyhow::Result<()> {
    goodolpypi::run()
}
