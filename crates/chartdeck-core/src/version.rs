//! Chart version coercion and ordering
//!
//! Repository indices contain whatever version strings chart authors published:
//! `v1.2`, `1.0.0+build.5`, `2024.01`, or nothing at all. Ordering those
//! lexically puts `1.10.0` before `1.2.0`, so every string is first coerced to
//! the nearest `major.minor.patch` and compared semantically.
//!
//! Coercion never fails. Input without any digits becomes `0.0.0`, the floor of
//! the ordering. Prerelease and build parts are dropped, so `1.0.0-rc.1` and
//! `1.0.0` compare equal and keep their relative order under a stable sort.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use std::cmp::Ordering;

/// A chart version after coercion
pub type NormalizedVersion = Version;

/// First run of up to three dot-separated numeric components, each at most
/// 16 digits and not embedded in a longer digit run.
static COERCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
        .expect("version coercion pattern is valid")
});

/// Coerce a version string to a semantic version
///
/// # Examples
///
/// ```
/// use chartdeck_core::version::normalize;
/// use semver::Version;
///
/// assert_eq!(normalize("v1.2"), Version::new(1, 2, 0));
/// assert_eq!(normalize("1.4.0+build.7"), Version::new(1, 4, 0));
/// assert_eq!(normalize(""), Version::new(0, 0, 0));
/// ```
pub fn normalize(version: &str) -> NormalizedVersion {
    let Some(caps) = COERCE_PATTERN.captures(version) else {
        return Version::new(0, 0, 0);
    };

    let component = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    Version::new(component(1), component(2), component(3))
}

/// Order two version strings so that the higher version comes first
pub fn compare_descending(a: &str, b: &str) -> Ordering {
    normalize(b).cmp(&normalize(a))
}

/// Return a new vector of `items` sorted by descending version
///
/// The sort is stable: items whose versions coerce to the same value keep
/// their input order.
pub fn sorted_descending<T, F>(items: &[T], version_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let mut keyed: Vec<(NormalizedVersion, &T)> = items
        .iter()
        .map(|item| (normalize(version_of(item)), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}
