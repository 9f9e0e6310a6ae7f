use super::{FetchError, ReleaseSource};
use crate::{
    curl,
    releases::{Artifact, ReleaseMap},
};
use log::debug;
use serde::Deserialize;

const BASE_URL: &str = "https://pypi.org/pypi";

/// The PyPI JSON API, `GET /pypi/{name}/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pypi;

impl Pypi {
    #[must_use]
    pub fn url(name: &str) -> String {
        format!("{BASE_URL}/{name}/json")
    }
}

impl ReleaseSource for Pypi {
    fn releases(&self, name: &str) -> Result<ReleaseMap, FetchError> {
        let url = Self::url(name);
        debug!("GET {url}");
        let response = curl::get(&url, "application/json").map_err(|source| {
            FetchError::Transport {
                url: url.clone(),
                source,
            }
        })?;
        from_response(url, response.code, &response.body)
    }
}

fn from_response(url: String, code: u32, body: &[u8]) -> Result<ReleaseMap, FetchError> {
    match code {
        200..=299 => parse_releases(body).map_err(|source| FetchError::Malformed { url, source }),
        404 => Err(FetchError::NotFound { url }),
        code => Err(FetchError::Status { url, code }),
    }
}

// `releases` is read into a `Vec` of pairs so that document order survives until keys are parsed.
#[derive(Deserialize)]
struct Project {
    #[serde(deserialize_with = "pairs")]
    releases: Vec<(String, Vec<Artifact>)>,
}

fn pairs<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<Artifact>)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Vec<(String, Vec<Artifact>)>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a map from version to files")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or_default());
            while let Some(pair) = map.next_entry()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(Visitor)
}

/// Parses the body of a PyPI JSON API response into a [`ReleaseMap`].
pub fn parse_releases(body: &[u8]) -> Result<ReleaseMap, serde_json::Error> {
    let project = serde_json::from_slice::<Project>(body)?;
    Ok(ReleaseMap::from_raw(project.releases))
}
