//! Type-safe enums shared by the workflow, CLI and UI

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// CPU architecture a wheel is fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum Arch {
    #[strum(serialize = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
    #[strum(serialize = "arm64")]
    #[serde(rename = "arm64")]
    Arm64,
}

impl Arch {
    /// Both halves of a universal2 wheel, in fetch order
    pub const UNIVERSAL2: [Arch; 2] = [Arch::X86_64, Arch::Arm64];

    /// Flag understood by macOS `arch(1)`
    pub fn arch_flag(&self) -> &'static str {
        match self {
            Self::X86_64 => "-x86_64",
            Self::Arm64 => "-arm64",
        }
    }
}

/// What to do once a merged wheel has been published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum InstallPolicy {
    /// Ask for every merged wheel
    #[default]
    Ask,
    Always,
    Never,
}
