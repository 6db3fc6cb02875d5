//! Matching x86_64 and arm64 wheels that belong together.
//!
//! A wheel filename is `{dist}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
//! Two wheels that differ only in the platform tag are halves of one universal2
//! wheel, so the base name is the filename minus `.whl` minus the platform tag:
//!
//! ```text
//! pkg-1.0-cp311-cp311-macosx_10_9_x86_64.whl  ->  pkg-1.0-cp311-cp311
//! pkg-1.0-cp311-cp311-macosx_11_0_arm64.whl   ->  pkg-1.0-cp311-cp311
//! ```
//!
//! For every distinct base name, the first two sorted filenames starting with
//! it form the pair. Pure-Python wheels (`-none-any`) download identically for
//! both architectures and end up unmatched, which is fine: they need no merge.

use crate::error::{FatwheelError, Result};
use std::collections::BTreeSet;

pub const WHEEL_SUFFIX: &str = ".whl";

/// Base name of a wheel filename, or `None` if it is not a `.whl` with a
/// platform tag.
pub fn base_name(filename: &str) -> Option<&str> {
    let stem = filename.strip_suffix(WHEEL_SUFFIX)?;
    let (base, platform) = stem.rsplit_once('-')?;
    if base.is_empty() || platform.is_empty() {
        return None;
    }
    Some(base)
}

/// Distribution name: the first dash-separated segment of the filename.
pub fn distribution_name(filename: &str) -> &str {
    let stem = filename.strip_suffix(WHEEL_SUFFIX).unwrap_or(filename);
    stem.split('-').next().unwrap_or(stem)
}

/// Two wheels to merge into one universal2 wheel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelPair {
    pub base: String,
    pub first: String,
    pub second: String,
}

/// One line of the pairing plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    Pair(WheelPair),
    /// Only one wheel carries this base name; nothing to merge.
    Unmatched { base: String },
}

impl PairOutcome {
    pub fn base(&self) -> &str {
        match self {
            Self::Pair(pair) => &pair.base,
            Self::Unmatched { base } => base,
        }
    }
}

/// Pairing decisions for one scratch directory, ordered by base name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingPlan {
    pub entries: Vec<PairOutcome>,
}

impl PairingPlan {
    pub fn pairs(&self) -> impl Iterator<Item = &WheelPair> {
        self.entries.iter().filter_map(|entry| match entry {
            PairOutcome::Pair(pair) => Some(pair),
            PairOutcome::Unmatched { .. } => None,
        })
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            PairOutcome::Unmatched { base } => Some(base.as_str()),
            PairOutcome::Pair(_) => None,
        })
    }
}

/// Build the pairing plan for a set of filenames.
///
/// Non-wheel names are ignored. Fewer than two wheels is an error: the
/// downloads did not produce anything that could be merged.
pub fn plan_pairs<I, S>(filenames: I) -> Result<PairingPlan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut wheels: Vec<String> = filenames
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .filter(|name| name.ends_with(WHEEL_SUFFIX))
        .collect();
    wheels.sort();
    wheels.dedup();

    if wheels.len() < 2 {
        return Err(FatwheelError::pairing(
            "Wheels not downloaded or not valid .whl files.",
        ));
    }

    let bases: BTreeSet<&str> = wheels.iter().filter_map(|w| base_name(w)).collect();

    let entries = bases
        .into_iter()
        .map(|base| {
            let mut matching = wheels.iter().filter(|w| w.starts_with(base));
            match (matching.next(), matching.next()) {
                (Some(first), Some(second)) => PairOutcome::Pair(WheelPair {
                    base: base.to_string(),
                    first: first.clone(),
                    second: second.clone(),
                }),
                _ => PairOutcome::Unmatched {
                    base: base.to_string(),
                },
            }
        })
        .collect();

    Ok(PairingPlan { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    const X86: &str = "pkg-1.0-cp311-cp311-macosx_10_9_x86_64.whl";
    const ARM: &str = "pkg-1.0-cp311-cp311-macosx_11_0_arm64.whl";

    #[test]
    fn test_base_name_strips_platform_tag() {
        assert_eq!(base_name(X86), Some("pkg-1.0-cp311-cp311"));
        assert_eq!(base_name(ARM), Some("pkg-1.0-cp311-cp311"));
    }

    #[test]
    fn test_base_name_rejects_non_wheels() {
        assert_eq!(base_name("pkg-1.0.tar.gz"), None);
        assert_eq!(base_name("nodashes.whl"), None);
        assert_eq!(base_name("-any.whl"), None);
        assert_eq!(base_name("pkg-.whl"), None);
    }

    #[test]
    fn test_distribution_name() {
        assert_eq!(distribution_name(X86), "pkg");
        assert_eq!(distribution_name("typing_extensions-4.9.0-py3-none-any.whl"), "typing_extensions");
    }

    #[test]
    fn test_plan_pairs_matches_architectures() {
        let plan = plan_pairs([ARM, X86]).unwrap();
        assert_eq!(
            plan.entries,
            vec![PairOutcome::Pair(WheelPair {
                base: "pkg-1.0-cp311-cp311".to_string(),
                first: X86.to_string(),
                second: ARM.to_string(),
            })]
        );
    }

    #[test]
    fn test_plan_pairs_reports_unmatched_pure_wheels() {
        let plan = plan_pairs([X86, ARM, "six-1.16.0-py2.py3-none-any.whl"]).unwrap();
        assert_eq!(plan.pairs().count(), 1);
        assert_eq!(plan.unmatched().collect::<Vec<_>>(), vec!["six-1.16.0-py2.py3-none"]);
    }

    #[test]
    fn test_plan_pairs_multiple_packages_in_base_order() {
        let plan = plan_pairs([
            "numpy-1.26.4-cp311-cp311-macosx_11_0_arm64.whl",
            X86,
            "numpy-1.26.4-cp311-cp311-macosx_10_9_x86_64.whl",
            ARM,
        ])
        .unwrap();
        let bases: Vec<&str> = plan.entries.iter().map(|e| e.base()).collect();
        assert_eq!(bases, vec!["numpy-1.26.4-cp311-cp311", "pkg-1.0-cp311-cp311"]);
        assert_eq!(plan.pairs().count(), 2);
    }

    #[test]
    fn test_plan_pairs_ignores_non_wheels() {
        let plan = plan_pairs([X86, "notes.txt", ARM, "pkg-1.0.tar.gz"]).unwrap();
        assert_eq!(plan.entries.len(), 1);
    }

    #[test]
    fn test_plan_pairs_needs_two_wheels() {
        assert!(plan_pairs([X86]).is_err());
        assert!(plan_pairs(Vec::<String>::new()).is_err());
        assert!(plan_pairs([X86, X86]).is_err());
    }
}
