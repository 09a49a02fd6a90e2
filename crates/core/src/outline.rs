//! ASCII outline rendering for topic trees.

use crate::topic::{NodeKind, TopicNode};

const CATEGORY: char = '◇';
const HYBRID: char = '◐';
const LEAF: char = '●';

fn kind_symbol(kind: NodeKind) -> char {
    match kind {
        NodeKind::Category => CATEGORY,
        NodeKind::Hybrid => HYBRID,
        NodeKind::Leaf => LEAF,
    }
}

/// Render a topic tree as ASCII art, one line per node.
///
/// Example output:
/// ```text
/// Arrays
/// ├── ◐ Perform Reversal </>
/// │   └── ◐ Two Pointers </>
/// │       └── ● Fast & Slow Pointers </>
/// └── ◇ Weighted Edges?
/// ```
///
/// `max_depth` limits how many levels below the root are drawn.
pub fn render_outline(title: &str, node: &TopicNode, max_depth: Option<usize>) -> String {
    let mut output = String::new();
    output.push_str(title);
    output.push('\n');
    render_children(&mut output, node, "", 1, max_depth);
    output
}

fn render_children(
    output: &mut String,
    node: &TopicNode,
    prefix: &str,
    depth: usize,
    max_depth: Option<usize>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }
    let Some(children) = node.children() else {
        return;
    };

    let count = children.len();
    for (i, (label, child)) in children.iter().enumerate() {
        let is_last = i == count - 1;
        let branch = if is_last { "└── " } else { "├── " };

        output.push_str(prefix);
        output.push_str(branch);
        output.push(kind_symbol(child.kind()));
        output.push(' ');
        output.push_str(label);
        if child.code().is_some() {
            output.push_str(" </>");
        }
        output.push('\n');

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        render_children(output, child, &child_prefix, depth + 1, max_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Children;

    fn small_tree() -> TopicNode {
        let mut inner = Children::new();
        inner.insert("No".to_string(), TopicNode::leaf("Use BFS", None));
        inner.insert(
            "Yes".to_string(),
            TopicNode::leaf("Use Dijkstra", Some("dijkstra()".to_string())),
        );

        let mut children = Children::new();
        children.insert("Weighted Edges?".to_string(), TopicNode::category(inner));
        children.insert(
            "Hash Map".to_string(),
            TopicNode::leaf("Adjacency map", Some("map()".to_string())),
        );
        TopicNode::hybrid("Edge lists", None, children)
    }

    #[test]
    fn test_render_outline_draws_branches_and_markers() {
        let rendered = render_outline("Edge Lists", &small_tree(), None);
        let expected = "\
Edge Lists
├── ● Hash Map </>
└── ◇ Weighted Edges?
    ├── ● No
    └── ● Yes </>
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_outline_respects_max_depth() {
        let rendered = render_outline("Edge Lists", &small_tree(), Some(1));
        assert_eq!(rendered.lines().count(), 3);
        assert!(!rendered.contains("Yes"));
    }

    #[test]
    fn test_render_leaf_has_only_title() {
        let rendered = render_outline("Alone", &TopicNode::leaf("x", None), None);
        assert_eq!(rendered, "Alone\n");
    }
}
