//! Topic Library
//!
//! The six subject trees learners can study. Each subject is authored as a
//! JSON asset compiled into the binary, and each constructor parses its asset
//! afresh, so every call hands back an independent tree.

use crate::{error::TopicError, topic::TopicNode};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A subject constructor: argument-free, deterministic, and independent across calls.
pub type Constructor = fn() -> Result<TopicNode, TopicError>;

/// Every subject paired with its constructor, in catalog order.
pub const CONSTRUCTORS: [(Subject, Constructor); 6] = [
    (Subject::LinkedLists, linked_lists),
    (Subject::Strings, strings),
    (Subject::Arrays, arrays),
    (Subject::Trees, trees),
    (Subject::EdgeLists, edge_lists),
    (Subject::Matrices, matrices),
];

/// The fixed set of subjects in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "Linked Lists")]
    LinkedLists,
    Strings,
    Arrays,
    Trees,
    #[serde(rename = "Edge Lists")]
    EdgeLists,
    Matrices,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::LinkedLists,
        Subject::Strings,
        Subject::Arrays,
        Subject::Trees,
        Subject::EdgeLists,
        Subject::Matrices,
    ];

    /// The label this subject is filed under in the decision map.
    pub fn name(self) -> &'static str {
        match self {
            Subject::LinkedLists => "Linked Lists",
            Subject::Strings => "Strings",
            Subject::Arrays => "Arrays",
            Subject::Trees => "Trees",
            Subject::EdgeLists => "Edge Lists",
            Subject::Matrices => "Matrices",
        }
    }

    /// Builds a fresh copy of this subject's tree.
    pub fn build(self) -> Result<TopicNode, TopicError> {
        match self {
            Subject::LinkedLists => linked_lists(),
            Subject::Strings => strings(),
            Subject::Arrays => arrays(),
            Subject::Trees => trees(),
            Subject::EdgeLists => edge_lists(),
            Subject::Matrices => matrices(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subject {
    type Err = TopicError;

    /// Accepts the display name in any case, e.g. `"edge lists"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TopicError::UnknownSubject(s.to_string()))
    }
}

pub fn linked_lists() -> Result<TopicNode, TopicError> {
    parse_subject(
        Subject::LinkedLists.name(),
        include_str!("../topics/linked_lists.json"),
    )
}

pub fn strings() -> Result<TopicNode, TopicError> {
    parse_subject(Subject::Strings.name(), include_str!("../topics/strings.json"))
}

pub fn arrays() -> Result<TopicNode, TopicError> {
    parse_subject(Subject::Arrays.name(), include_str!("../topics/arrays.json"))
}

pub fn trees() -> Result<TopicNode, TopicError> {
    parse_subject(Subject::Trees.name(), include_str!("../topics/trees.json"))
}

pub fn edge_lists() -> Result<TopicNode, TopicError> {
    parse_subject(
        Subject::EdgeLists.name(),
        include_str!("../topics/edge_lists.json"),
    )
}

pub fn matrices() -> Result<TopicNode, TopicError> {
    parse_subject(Subject::Matrices.name(), include_str!("../topics/matrices.json"))
}

/// Parses one authored subject tree. A subject root must offer at least one
/// refinement, otherwise there is nothing to navigate.
pub(crate) fn parse_subject(subject: &'static str, source: &str) -> Result<TopicNode, TopicError> {
    let tree: TopicNode = serde_json::from_str(source)
        .map_err(|source| TopicError::Malformed { subject, source })?;
    if tree.is_leaf() {
        return Err(TopicError::NoRefinements(subject));
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::NodeKind;

    #[test]
    fn test_every_constructor_builds() {
        for (subject, build) in CONSTRUCTORS {
            let tree = build().unwrap_or_else(|e| panic!("{subject} failed: {e}"));
            assert!(!tree.is_leaf(), "{subject} has no refinements");
            assert!(tree.content().is_some(), "{subject} root has no explanation");
            assert!(tree.node_count() > 5);
        }
    }

    #[test]
    fn test_constructors_return_independent_equal_trees() {
        for (subject, build) in CONSTRUCTORS {
            let first = build().unwrap();
            let second = build().unwrap();
            assert_eq!(first, second, "{subject} is not deterministic");

            // Pruning and then mutating the first copy leaves the second alone.
            let mut pruned = first.pruned();
            if let TopicNode::Hybrid { children, .. } = &mut pruned {
                children.clear();
            }
            assert!(!second.is_leaf());
            assert!(second.contains_code());
            assert_eq!(second, build().unwrap());
        }
    }

    #[test]
    fn test_subject_build_matches_constructor_table() {
        for (subject, build) in CONSTRUCTORS {
            assert_eq!(subject.build().unwrap(), build().unwrap());
        }
    }

    #[test]
    fn test_subject_names_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(subject.name().parse::<Subject>().unwrap(), subject);
            assert_eq!(subject.to_string(), subject.name());
        }
        assert_eq!("edge lists".parse::<Subject>().unwrap(), Subject::EdgeLists);
        assert!(matches!(
            "Heaps".parse::<Subject>(),
            Err(TopicError::UnknownSubject(name)) if name == "Heaps"
        ));
    }

    #[test]
    fn test_subject_serializes_as_display_name() {
        assert_eq!(
            serde_json::to_string(&Subject::LinkedLists).unwrap(),
            "\"Linked Lists\""
        );
        let parsed: Subject = serde_json::from_str("\"Edge Lists\"").unwrap();
        assert_eq!(parsed, Subject::EdgeLists);
    }

    #[test]
    fn test_arrays_reversal_branch() {
        let arrays = arrays().unwrap();
        let two_pointers = arrays
            .child("Perform Reversal")
            .and_then(|n| n.child("Two Pointers"))
            .expect("Arrays > Perform Reversal > Two Pointers");

        assert!(
            two_pointers
                .content()
                .unwrap()
                .starts_with("The Two Pointers technique is")
        );
        assert!(two_pointers.code().unwrap().contains("left, right = 0, len(arr) - 1"));
    }

    #[test]
    fn test_weighted_edges_is_a_pure_category() {
        let edge_lists = edge_lists().unwrap();
        let weighted = edge_lists
            .child("Graph")
            .and_then(|n| n.child("Find Shortest Path"))
            .and_then(|n| n.child("Weighted Edges?"))
            .unwrap();
        assert_eq!(weighted.kind(), NodeKind::Category);
        assert_eq!(weighted.labels().collect::<Vec<_>>(), vec!["No", "Yes"]);
    }

    #[test]
    fn test_malformed_source_is_a_construction_failure() {
        let err = parse_subject("Broken", r#"{ "code": "x()" }"#).unwrap_err();
        assert!(matches!(err, TopicError::Malformed { subject: "Broken", .. }));

        let err = parse_subject("Broken", "not json").unwrap_err();
        assert!(matches!(err, TopicError::Malformed { .. }));
    }

    #[test]
    fn test_subject_without_refinements_is_rejected() {
        let err = parse_subject("Lonely", r#"{ "content": "Nothing below" }"#).unwrap_err();
        assert!(matches!(err, TopicError::NoRefinements("Lonely")));
    }
}
