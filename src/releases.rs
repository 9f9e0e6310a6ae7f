//! Release history of a single project, as published by the package index.

use crate::version::ReleaseVersion;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, btree_map};

/// One uploaded file of a release, e.g., an sdist or a wheel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Artifact {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub packagetype: Option<String>,
    #[serde(rename = "upload_time_iso_8601")]
    pub upload_time: DateTime<Utc>,
}

impl Artifact {
    #[must_use]
    pub fn uploaded_at(upload_time: DateTime<Utc>) -> Self {
        Self {
            filename: None,
            packagetype: None,
            upload_time,
        }
    }

    /// File name and package type, for log messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let filename = self.filename.as_deref().unwrap_or("file");
        match &self.packagetype {
            Some(packagetype) => format!("{filename} ({packagetype})"),
            None => filename.to_owned(),
        }
    }
}

/// Keys that parsed to equal [`ReleaseVersion`]s. The later key, and its files, replaced the
/// earlier one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Collision {
    pub replaced: String,
    pub kept: String,
}

/// Version → uploaded files, ordered by version.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReleaseMap {
    releases: BTreeMap<ReleaseVersion, Vec<Artifact>>,
    collisions: Vec<Collision>,
}

impl ReleaseMap {
    /// Builds a map from raw index keys, in document order.
    pub fn from_raw(raw: impl IntoIterator<Item = (String, Vec<Artifact>)>) -> Self {
        let mut map = Self::default();
        let mut keys = BTreeMap::<ReleaseVersion, String>::new();
        for (key, artifacts) in raw {
            let version = ReleaseVersion::parse(&key);
            if let Some(replaced) = keys.insert(version.clone(), key.clone()) {
                // `insert` alone would keep the earlier key's spelling.
                map.releases.remove(&version);
                map.collisions.push(Collision {
                    replaced,
                    kept: key,
                });
            }
            map.releases.insert(version, artifacts);
        }
        map
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    #[must_use]
    pub fn get(&self, version: &ReleaseVersion) -> Option<&[Artifact]> {
        self.releases.get(version).map(Vec::as_slice)
    }

    /// Entries in ascending version order.
    pub fn iter(&self) -> btree_map::Iter<'_, ReleaseVersion, Vec<Artifact>> {
        self.releases.iter()
    }

    #[must_use]
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn legacy_versions(&self) -> impl Iterator<Item = &ReleaseVersion> {
        self.releases.keys().filter(|version| version.is_legacy())
    }
}

impl FromIterator<(ReleaseVersion, Vec<Artifact>)> for ReleaseMap {
    fn from_iter<T: IntoIterator<Item = (ReleaseVersion, Vec<Artifact>)>>(iter: T) -> Self {
        Self {
            releases: iter.into_iter().collect(),
            collisions: Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a ReleaseMap {
    type Item = (&'a ReleaseVersion, &'a Vec<Artifact>);
    type IntoIter = btree_map::Iter<'a, ReleaseVersion, Vec<Artifact>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn artifact(year: i32) -> Artifact {
        Artifact::uploaded_at(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn later_key_wins() {
        let map = ReleaseMap::from_raw([
            ("1.0".to_owned(), vec![artifact(2001)]),
            ("1.0.0".to_owned(), vec![artifact(2002)]),
        ]);
        assert_eq!(1, map.len());
        assert_eq!(
            vec!["1.0.0"],
            map.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>()
        );
        assert_eq!(
            Some(&[artifact(2002)][..]),
            map.get(&ReleaseVersion::parse("1.0"))
        );
        assert_eq!(
            &[Collision {
                replaced: "1.0".to_owned(),
                kept: "1.0.0".to_owned(),
            }],
            map.collisions()
        );
    }

    #[test]
    fn iterates_in_version_order() {
        let map = ReleaseMap::from_raw([
            ("1.10".to_owned(), vec![]),
            ("1.9".to_owned(), vec![]),
            ("legacy-thing".to_owned(), vec![]),
        ]);
        let keys = map.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>();
        assert_eq!(vec!["legacy-thing", "1.9", "1.10"], keys);
        assert_eq!(1, map.legacy_versions().count());
    }

    #[test]
    fn deserializes_zulu_timestamps() {
        let artifact: Artifact = serde_json::from_str(
            r#"{
                "filename": "pkg-1.0.tar.gz",
                "packagetype": "sdist",
                "upload_time": "2010-03-04T05:06:07",
                "upload_time_iso_8601": "2010-03-04T05:06:07.123456Z"
            }"#,
        )
        .unwrap();
        assert_eq!("pkg-1.0.tar.gz (sdist)", artifact.describe());
        assert_eq!(
            "2010-03-04T05:06:07.123456+00:00",
            artifact.upload_time.to_rfc3339()
        );
    }

    #[test]
    fn describe_without_metadata() {
        assert_eq!("file", artifact(2001).describe());
        let wheel = Artifact {
            filename: Some("pkg-1.0-py3-none-any.whl".to_owned()),
            ..artifact(2001)
        };
        assert_eq!("pkg-1.0-py3-none-any.whl", wheel.describe());
    }

    #[test]
    fn deserializes_offset_timestamps() {
        let artifact: Artifact =
            serde_json::from_str(r#"{"upload_time_iso_8601": "2010-03-04T05:06:07+02:00"}"#)
                .unwrap();
        assert_eq!(
            Utc.with_ymd_and_hms(2010, 3, 4, 3, 6, 7).unwrap(),
            artifact.upload_time
        );
    }
}
