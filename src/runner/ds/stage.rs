use std::fmt;
use std::fmt::{Display, Formatter};

/// Progress of a single construction call.
///
/// ```text
/// Requested -> TemplateLoaded -> Substituted -> Sanitized -> Activated
///      \_____________\________________\_____________\______> Failed
/// ```
///
/// `Activated` and `Failed` are terminal. Nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionStage {
    Requested,
    TemplateLoaded,
    Substituted,
    Sanitized,
    Activated,
    Failed,
}

impl ConstructionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConstructionStage::Activated | ConstructionStage::Failed)
    }
}

impl Display for ConstructionStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstructionStage::Requested => "requested",
            ConstructionStage::TemplateLoaded => "template-loaded",
            ConstructionStage::Substituted => "substituted",
            ConstructionStage::Sanitized => "sanitized",
            ConstructionStage::Activated => "activated",
            ConstructionStage::Failed => "failed",
        };
        f.write_str(s)
    }
}
