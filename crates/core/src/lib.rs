//! Leetmigo Core
//!
//! A decision-tree navigator for algorithm study. Six authored subject trees
//! are assembled into one immutable decision map; learners walk it one labeled
//! edge at a time, while a sampler draws code-free subject trees for problem
//! generation.

pub mod assembler;
pub mod coach;
pub mod content;
pub mod error;
pub mod library;
pub mod navigator;
pub mod outline;
pub mod prompts;
pub mod sampler;
pub mod tools;
pub mod topic;

pub use assembler::{DecisionMap, assemble};
pub use error::{NavigationError, TopicError};
pub use library::Subject;
pub use navigator::{HistoryStep, Navigator, NavigatorState, Snapshot};
pub use sampler::{PrunedTree, Sampler};
pub use topic::{NodeKind, TopicNode};
