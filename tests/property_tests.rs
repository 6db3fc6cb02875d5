//! Property-based tests for wheel pairing
//!
//! These tests verify:
//! - base names strip exactly the platform tag
//! - every wheel pair shares the base name and is unique
//! - pairing does not depend on the input order
//! - enum string round-trips

use fatwheel::types::{Arch, InstallPolicy};
use fatwheel::workflow::{PairOutcome, base_name, plan_pairs};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies
// =============================================================================

/// `{dist}-{version}-{python}-{abi}` without the platform tag
fn base_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z][a-z0-9_]{0,8}",
        "[0-9]{1,2}\\.[0-9]{1,2}",
        prop_oneof![Just("cp311"), Just("cp312"), Just("cp39")],
    )
        .prop_map(|(dist, version, py)| format!("{}-{}-{}-{}", dist, version, py, py))
}

fn platform_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("macosx_10_9_x86_64"),
        Just("macosx_11_0_arm64"),
        Just("macosx_10_13_universal2"),
    ]
}

fn wheel_strategy() -> impl Strategy<Value = String> {
    (base_strategy(), platform_strategy())
        .prop_map(|(base, platform)| format!("{}-{}.whl", base, platform))
}

fn arch_strategy() -> impl Strategy<Value = Arch> {
    prop_oneof![Just(Arch::X86_64), Just(Arch::Arm64)]
}

fn policy_strategy() -> impl Strategy<Value = InstallPolicy> {
    prop_oneof![
        Just(InstallPolicy::Ask),
        Just(InstallPolicy::Always),
        Just(InstallPolicy::Never),
    ]
}

// =============================================================================
// Base name
// =============================================================================

proptest! {
    /// The base name is the filename minus `.whl` minus the platform tag
    #[test]
    fn base_name_strips_platform(base in base_strategy(), platform in platform_strategy()) {
        let filename = format!("{}-{}.whl", base, platform);
        prop_assert_eq!(base_name(&filename), Some(base.as_str()));
    }

    /// Both architecture wheels of one build share a base name
    #[test]
    fn architectures_share_base(base in base_strategy()) {
        let x86 = format!("{}-macosx_10_9_x86_64.whl", base);
        let arm = format!("{}-macosx_11_0_arm64.whl", base);
        prop_assert_eq!(base_name(&x86), base_name(&arm));
    }

    /// Names without the wheel suffix have no base name
    #[test]
    fn non_wheels_have_no_base(name in "[a-z0-9._-]{0,30}") {
        prop_assume!(!name.ends_with(".whl"));
        prop_assert_eq!(base_name(&name), None);
    }
}

// =============================================================================
// Pairing plan
// =============================================================================

proptest! {
    /// Each pair holds two distinct wheels that both start with its base
    #[test]
    fn pairs_are_consistent(wheels in prop::collection::vec(wheel_strategy(), 2..12)) {
        prop_assume!(wheels.iter().collect::<HashSet<_>>().len() >= 2);
        let plan = plan_pairs(&wheels).unwrap();

        for pair in plan.pairs() {
            prop_assert_ne!(&pair.first, &pair.second);
            prop_assert!(pair.first.starts_with(&pair.base));
            prop_assert!(pair.second.starts_with(&pair.base));
            prop_assert!(pair.first < pair.second);
        }
    }

    /// One entry per distinct base name, in sorted order
    #[test]
    fn one_entry_per_base(wheels in prop::collection::vec(wheel_strategy(), 2..12)) {
        prop_assume!(wheels.iter().collect::<HashSet<_>>().len() >= 2);
        let plan = plan_pairs(&wheels).unwrap();

        let bases: Vec<&str> = plan.entries.iter().map(PairOutcome::base).collect();
        let mut expected: Vec<&str> = wheels.iter().filter_map(|w| base_name(w)).collect();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(bases, expected);
    }

    /// Shuffled or duplicated input gives the same plan
    #[test]
    fn plan_ignores_order_and_duplicates(wheels in prop::collection::vec(wheel_strategy(), 2..10)) {
        prop_assume!(wheels.iter().collect::<HashSet<_>>().len() >= 2);
        let mut reversed = wheels.clone();
        reversed.reverse();
        reversed.extend(wheels.iter().cloned());

        prop_assert_eq!(plan_pairs(&wheels).unwrap(), plan_pairs(&reversed).unwrap());
    }

    /// Every x86_64/arm64 build pair is merged
    #[test]
    fn matched_builds_are_paired(bases in prop::collection::hash_set(base_strategy(), 1..6)) {
        let mut wheels = Vec::new();
        for base in &bases {
            wheels.push(format!("{}-macosx_10_9_x86_64.whl", base));
            wheels.push(format!("{}-macosx_11_0_arm64.whl", base));
        }
        let plan = plan_pairs(&wheels).unwrap();
        let paired: HashSet<String> = plan.pairs().map(|p| p.base.clone()).collect();

        prop_assert_eq!(paired.len(), bases.len());
        prop_assert_eq!(plan.unmatched().count(), 0);
    }
}

// =============================================================================
// Enum round-trips
// =============================================================================

proptest! {
    #[test]
    fn arch_roundtrip(arch in arch_strategy()) {
        let parsed: Arch = arch.to_string().parse().expect("Should parse");
        prop_assert_eq!(arch, parsed);
    }

    #[test]
    fn arch_flag_is_dashed_name(arch in arch_strategy()) {
        prop_assert_eq!(arch.arch_flag(), format!("-{}", arch));
    }

    #[test]
    fn install_policy_roundtrip(policy in policy_strategy()) {
        let parsed: InstallPolicy = policy.to_string().parse().expect("Should parse");
        prop_assert_eq!(policy, parsed);
    }
}

#[test]
fn single_wheel_is_an_error() {
    let err = plan_pairs(["pkg-1.0-cp311-cp311-macosx_10_9_x86_64.whl"]).unwrap_err();
    assert!(err.to_string().contains("Wheels not downloaded"));
}
