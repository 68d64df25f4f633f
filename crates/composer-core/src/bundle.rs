//! Bundled default instruction-set templates.
//!
//! The defaults are compiled in with `include_str!` so the binaries work in
//! any project without extra files. Project-local overrides take precedence
//! (see [`crate::resolver`]).

use std::borrow::Cow;
use std::collections::HashMap;

use crate::instruction::InstructionId;

const BASE_SHORT: &str = include_str!("../templates/base-short.md");
const BASE_STANDARD: &str = include_str!("../templates/base-standard.md");
const CODE_REVIEW: &str = include_str!("../templates/code-review.md");
const SECURITY: &str = include_str!("../templates/security.md");
const PERFORMANCE: &str = include_str!("../templates/performance.md");
const PYTHON_DS: &str = include_str!("../templates/python-ds.md");

/// A set of default templates keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    templates: HashMap<InstructionId, Cow<'static, str>>,
}

impl Bundle {
    /// The templates shipped with the binary, one per identifier.
    pub fn embedded() -> Self {
        let templates = InstructionId::ALL
            .into_iter()
            .map(|id| (id, Cow::Borrowed(embedded_text(id))))
            .collect();
        Self { templates }
    }

    /// A bundle with no templates at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace one template.
    pub fn with(mut self, id: InstructionId, text: impl Into<Cow<'static, str>>) -> Self {
        self.templates.insert(id, text.into());
        self
    }

    /// Remove one template.
    pub fn without(mut self, id: InstructionId) -> Self {
        self.templates.remove(&id);
        self
    }

    pub fn get(&self, id: InstructionId) -> Option<&str> {
        self.templates.get(&id).map(|t| t.as_ref())
    }

    pub fn contains(&self, id: InstructionId) -> bool {
        self.templates.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn embedded_text(id: InstructionId) -> &'static str {
    match id {
        InstructionId::BaseShort => BASE_SHORT,
        InstructionId::BaseStandard => BASE_STANDARD,
        InstructionId::CodeReview => CODE_REVIEW,
        InstructionId::Security => SECURITY,
        InstructionId::Performance => PERFORMANCE,
        InstructionId::PythonDs => PYTHON_DS,
    }
}
