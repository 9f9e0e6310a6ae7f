use curl::easy::{Easy, List};
use std::time::Duration;

const TIMEOUT: u64 = 60; // seconds

const USER_AGENT: &str = concat!(
    "goodolpypi/",
    env!("CARGO_PKG_VERSION"),
    " (github.com/gchaperon/goodolpypi)"
);

pub(crate) struct Response {
    pub code: u32,
    pub body: Vec<u8>,
}

/// Performs a GET request and returns the final response code and body, following redirects.
pub(crate) fn get(url: &str, accept: &str) -> Result<Response, curl::Error> {
    let mut list = List::new();
    list.append(&format!("Accept: {accept}"))?;

    let mut handle = handle(url)?;
    handle.http_headers(list)?;

    let mut body = Vec::new();
    {
        let mut transfer = handle.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = handle.response_code()?;

    Ok(Response { code, body })
}

fn handle(url: &str) -> Result<Easy, curl::Error> {
    let mut handle = Easy::new();
    handle.url(url)?;
    handle.follow_location(true)?;
    handle.useragent(USER_AGENT)?;
    handle.timeout(Duration::from_secs(TIMEOUT))?;
    Ok(handle)
}
