// Fetches run concurrently, so each report is written as a single line once the operation
// finishes. `eprintln!` locks stderr for the duration of the line.

macro_rules! __println {
    ($fmt:expr, $($arg:tt)*) => {
        if crate::opts::get().verbose {
            eprintln!($fmt, $($arg)*);
        }
    };
}

macro_rules! wrap {
    ($f:expr, $to_string:expr, $fmt:expr, $($arg:tt)*) => {{
        let result = $f();
        match &result {
            Ok(value) => {
                $crate::verbose::__println!(concat!($fmt, "...{}"), $($arg)*, $to_string(value));
            }
            Err(_) => {
                $crate::verbose::__println!(concat!($fmt, "...failed"), $($arg)*);
            }
        }
        result
    }};
}

// "The trick": https://stackoverflow.com/a/31749071
pub(crate) use {__println, wrap};
