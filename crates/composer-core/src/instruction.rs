//! Instruction-set identifiers and the user's selection.
//!
//! The identifier set is closed. [`BaseId`] and [`AddOn`] are separate types
//! so a selection always carries exactly one base and add-ons can never
//! contain a base variant.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown identifier string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instruction set {0:?}")]
pub struct UnknownInstruction(pub String);

/// Any instruction-set identifier. The string form doubles as the file-name
/// stem and as the key in the mapping document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstructionId {
    BaseShort,
    BaseStandard,
    CodeReview,
    Security,
    Performance,
    PythonDs,
}

impl InstructionId {
    /// Every identifier, bases first, then add-ons in canonical order.
    pub const ALL: [InstructionId; 6] = [
        InstructionId::BaseShort,
        InstructionId::BaseStandard,
        InstructionId::CodeReview,
        InstructionId::Security,
        InstructionId::Performance,
        InstructionId::PythonDs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionId::BaseShort => "base-short",
            InstructionId::BaseStandard => "base-standard",
            InstructionId::CodeReview => "code-review",
            InstructionId::Security => "security",
            InstructionId::Performance => "performance",
            InstructionId::PythonDs => "python-ds",
        }
    }

    /// Human-readable form label.
    pub fn label(self) -> &'static str {
        match self {
            InstructionId::BaseShort => "Short (lean)",
            InstructionId::BaseStandard => "Standard",
            InstructionId::CodeReview => "Code Review",
            InstructionId::Security => "Security",
            InstructionId::Performance => "Performance",
            InstructionId::PythonDs => "Python DS",
        }
    }

    pub fn is_base(self) -> bool {
        matches!(self, InstructionId::BaseShort | InstructionId::BaseStandard)
    }

    /// File name of this set inside an instruction-sets directory.
    pub fn file_name(self) -> String {
        format!("{}.md", self.as_str())
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionId {
    type Err = UnknownInstruction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstructionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownInstruction(s.to_string()))
    }
}

/// The mandatory base instruction set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseId {
    #[default]
    #[serde(rename = "base-short")]
    Short,
    #[serde(rename = "base-standard")]
    Standard,
}

impl BaseId {
    pub const ALL: [BaseId; 2] = [BaseId::Short, BaseId::Standard];

    pub fn id(self) -> InstructionId {
        match self {
            BaseId::Short => InstructionId::BaseShort,
            BaseId::Standard => InstructionId::BaseStandard,
        }
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().as_str())
    }
}

impl FromStr for BaseId {
    type Err = UnknownInstruction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseId::ALL
            .into_iter()
            .find(|b| b.id().as_str() == s)
            .ok_or_else(|| UnknownInstruction(s.to_string()))
    }
}

/// An optional add-on instruction set.
///
/// Variant order is the canonical merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddOn {
    CodeReview,
    Security,
    Performance,
    PythonDs,
}

impl AddOn {
    /// Add-ons in canonical merge order.
    pub const ALL: [AddOn; 4] = [
        AddOn::CodeReview,
        AddOn::Security,
        AddOn::Performance,
        AddOn::PythonDs,
    ];

    pub fn id(self) -> InstructionId {
        match self {
            AddOn::CodeReview => InstructionId::CodeReview,
            AddOn::Security => InstructionId::Security,
            AddOn::Performance => InstructionId::Performance,
            AddOn::PythonDs => InstructionId::PythonDs,
        }
    }
}

impl fmt::Display for AddOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().as_str())
    }
}

impl FromStr for AddOn {
    type Err = UnknownInstruction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddOn::ALL
            .into_iter()
            .find(|a| a.id().as_str() == s)
            .ok_or_else(|| UnknownInstruction(s.to_string()))
    }
}

impl From<BaseId> for InstructionId {
    fn from(base: BaseId) -> Self {
        base.id()
    }
}

impl From<AddOn> for InstructionId {
    fn from(add_on: AddOn) -> Self {
        add_on.id()
    }
}

/// What the user has picked: one base plus any subset of add-ons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub base: BaseId,
    #[serde(default)]
    pub add_ons: BTreeSet<AddOn>,
}

impl SelectionState {
    pub fn new(base: BaseId) -> Self {
        Self {
            base,
            add_ons: BTreeSet::new(),
        }
    }

    pub fn with_add_on(mut self, add_on: AddOn) -> Self {
        self.add_ons.insert(add_on);
        self
    }

    pub fn contains(&self, add_on: AddOn) -> bool {
        self.add_ons.contains(&add_on)
    }

    /// Flip an add-on on or off. Returns whether it is now selected.
    pub fn toggle(&mut self, add_on: AddOn) -> bool {
        if self.add_ons.remove(&add_on) {
            false
        } else {
            self.add_ons.insert(add_on);
            true
        }
    }

    /// Selected identifiers in canonical order: base first, then add-ons in
    /// declared order regardless of toggle order.
    pub fn ordered_ids(&self) -> Vec<InstructionId> {
        std::iter::once(self.base.id())
            .chain(
                AddOn::ALL
                    .into_iter()
                    .filter(|a| self.add_ons.contains(a))
                    .map(AddOn::id),
            )
            .collect()
    }

    /// Compact form used in commit messages, e.g. `base-short+security`.
    pub fn summary(&self) -> String {
        self.ordered_ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}
