//! Error types shared across the study navigator core.

use thiserror::Error;

/// A structural problem with a single node of an authored topic tree.
///
/// These are raised while deserializing the topic catalog and surface to
/// callers wrapped in [`TopicError::Malformed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeShapeError {
    #[error("node carries code but no content")]
    CodeWithoutContent,
    #[error("node has neither content nor children")]
    Empty,
    #[error("node content is blank")]
    BlankContent,
    #[error("child label is blank")]
    BlankLabel,
}

/// Failures while constructing subject trees or the decision map.
///
/// Any of these is fatal to the operation that raised it: there is no
/// partially assembled map.
#[derive(Debug, Error)]
pub enum TopicError {
    #[error("failed to build subject '{subject}': {source}")]
    Malformed {
        subject: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("subject '{0}' has no refinements to choose from")]
    NoRefinements(&'static str),
    #[error("subject '{0}' appears more than once in the decision map")]
    DuplicateSubject(&'static str),
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),
}

/// Rejected navigator transitions. The navigator state is untouched whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("invalid transition: '{label}' is not available here{}", did_you_mean(.suggestion))]
    InvalidTransition {
        label: String,
        suggestion: Option<String>,
    },
    #[error("stored path diverges from the decision map at step {depth} ('{label}')")]
    PathDiverged { depth: usize, label: String },
    #[error(
        "stored state is misaligned: {path} labels, {content} content entries, {code} code entries"
    )]
    MisalignedState {
        path: usize,
        content: usize,
        code: usize,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(label) => format!(" (did you mean '{}'?)", label),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let plain = NavigationError::InvalidTransition {
            label: "NotARealTopic".to_string(),
            suggestion: None,
        };
        assert_eq!(
            plain.to_string(),
            "invalid transition: 'NotARealTopic' is not available here"
        );

        let hinted = NavigationError::InvalidTransition {
            label: "arrays".to_string(),
            suggestion: Some("Arrays".to_string()),
        };
        assert_eq!(
            hinted.to_string(),
            "invalid transition: 'arrays' is not available here (did you mean 'Arrays'?)"
        );
    }

    #[test]
    fn test_topic_error_display() {
        assert_eq!(
            TopicError::NoRefinements("Strings").to_string(),
            "subject 'Strings' has no refinements to choose from"
        );
        assert_eq!(
            TopicError::UnknownSubject("Heaps".to_string()).to_string(),
            "unknown subject 'Heaps'"
        );
    }
}
