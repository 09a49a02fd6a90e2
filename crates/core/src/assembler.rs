//! Tree Assembler
//!
//! Composes the six subject trees into a single decision map. The map is
//! immutable once built and can be shared read-only between any number of
//! navigation sessions.

use crate::{
    error::TopicError,
    library::{CONSTRUCTORS, Constructor, Subject},
    topic::{Children, TopicNode},
};
use tracing::info;

/// The rooted map every navigator walks. Its root is a content-less category
/// whose children are the subject trees keyed by subject name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionMap {
    root: TopicNode,
}

impl DecisionMap {
    /// Builds the map from the full topic library, calling each constructor once.
    pub fn assemble() -> Result<Self, TopicError> {
        Self::assemble_from(&CONSTRUCTORS)
    }

    /// Builds a map from an explicit constructor table.
    ///
    /// Any constructor failure aborts assembly; subject names must not repeat.
    pub fn assemble_from(constructors: &[(Subject, Constructor)]) -> Result<Self, TopicError> {
        let mut children = Children::new();
        for (subject, build) in constructors {
            let tree = build()?;
            if children.insert(subject.name().to_string(), tree).is_some() {
                return Err(TopicError::DuplicateSubject(subject.name()));
            }
        }

        let root = TopicNode::category(children);
        info!(
            subjects = constructors.len(),
            nodes = root.node_count(),
            depth = root.depth(),
            "Decision map assembled"
        );
        Ok(Self { root })
    }

    pub fn root(&self) -> &TopicNode {
        &self.root
    }

    pub fn subject(&self, subject: Subject) -> Option<&TopicNode> {
        self.root.child(subject.name())
    }

    /// Subject labels available at the root, in lexical order.
    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.root.labels()
    }

    /// Follows `path` from the root one label at a time.
    ///
    /// Returns `None` as soon as a label is not a child of the node reached so far.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&TopicNode> {
        path.iter()
            .try_fold(&self.root, |node, label| node.child(label.as_ref()))
    }
}

/// Shorthand for [`DecisionMap::assemble`].
pub fn assemble() -> Result<DecisionMap, TopicError> {
    DecisionMap::assemble()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{library, topic::NodeKind};

    fn broken() -> Result<TopicNode, TopicError> {
        Err(TopicError::NoRefinements("Broken"))
    }

    #[test]
    fn test_root_holds_exactly_six_subjects() {
        let map = assemble().unwrap();
        let root = map.root();

        assert_eq!(root.kind(), NodeKind::Category);
        assert_eq!(root.content(), None);
        assert_eq!(root.children().unwrap().len(), 6);
        for subject in Subject::ALL {
            assert!(map.subject(subject).is_some(), "missing {subject}");
        }
        assert_eq!(
            map.subject_names().collect::<Vec<_>>(),
            vec!["Arrays", "Edge Lists", "Linked Lists", "Matrices", "Strings", "Trees"]
        );
    }

    #[test]
    fn test_subjects_match_their_constructors() {
        let map = assemble().unwrap();
        assert_eq!(map.subject(Subject::Trees).unwrap(), &library::trees().unwrap());
        assert_eq!(map.subject(Subject::Strings).unwrap(), &library::strings().unwrap());
    }

    #[test]
    fn test_assembly_is_deterministic() {
        assert_eq!(assemble().unwrap(), assemble().unwrap());
    }

    #[test]
    fn test_resolve_follows_labels() {
        let map = assemble().unwrap();
        assert_eq!(map.resolve::<&str>(&[]), Some(map.root()));

        let node = map
            .resolve(&["Arrays", "Perform Reversal", "Two Pointers"])
            .unwrap();
        assert!(node.content().unwrap().starts_with("The Two Pointers technique is"));

        assert!(map.resolve(&["Arrays", "NotARealTopic"]).is_none());
        assert!(map.resolve(&["Perform Reversal"]).is_none());
    }

    #[test]
    fn test_constructor_failure_aborts_assembly() {
        let table: [(Subject, Constructor); 2] =
            [(Subject::Arrays, library::arrays), (Subject::Strings, broken)];
        let err = DecisionMap::assemble_from(&table).unwrap_err();
        assert!(matches!(err, TopicError::NoRefinements("Broken")));
    }

    #[test]
    fn test_duplicate_subjects_are_rejected() {
        let table: [(Subject, Constructor); 2] = [
            (Subject::Arrays, library::arrays),
            (Subject::Arrays, library::arrays),
        ];
        let err = DecisionMap::assemble_from(&table).unwrap_err();
        assert!(matches!(err, TopicError::DuplicateSubject("Arrays")));
    }
}
