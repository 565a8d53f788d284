use crate::flow::{FlowNode, Mark};

/// Visitor pattern for traversing flow trees immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &FlowNode) {
        walk_node(self, node);
    }

    fn visit_mark(&mut self, _mark: &Mark) {
        // Leaf, no children to walk
    }
}

/// Mutable visitor pattern for transforming flow trees
///
/// Similar to Visitor, but provides mutable access to nodes.
/// Use this when you need to rewrite the tree during traversal.
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut FlowNode) {
        walk_node_mut(self, node);
    }

    fn visit_mark_mut(&mut self, _mark: &mut Mark) {
        // Leaf, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &FlowNode) {
    for mark in node.marks() {
        visitor.visit_mark(mark);
    }
    for child in node.children() {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut FlowNode) {
    if let Some(marks) = &mut node.marks {
        for mark in marks {
            visitor.visit_mark_mut(mark);
        }
    }
    if let Some(children) = &mut node.content {
        for child in children {
            visitor.visit_node_mut(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{MarkType, NodeType};

    struct Counter {
        nodes: usize,
        marks: usize,
    }

    impl Visitor for Counter {
        fn visit_node(&mut self, node: &FlowNode) {
            self.nodes += 1;
            walk_node(self, node);
        }

        fn visit_mark(&mut self, _mark: &Mark) {
            self.marks += 1;
        }
    }

    struct Uppercase;

    impl VisitorMut for Uppercase {
        fn visit_node_mut(&mut self, node: &mut FlowNode) {
            if let Some(text) = &mut node.text {
                *text = text.to_uppercase();
            }
            walk_node_mut(self, node);
        }
    }

    fn sample() -> FlowNode {
        FlowNode::doc(vec![FlowNode::paragraph(vec![
            FlowNode::text("plain"),
            FlowNode::marked_text(
                "bold",
                vec![Mark::new(MarkType::Bold), Mark::new(MarkType::Italic)],
            ),
        ])])
    }

    #[test]
    fn test_visitor_counts_nodes_and_marks() {
        let mut counter = Counter { nodes: 0, marks: 0 };
        counter.visit_node(&sample());
        assert_eq!(counter.nodes, 4);
        assert_eq!(counter.marks, 2);
    }

    #[test]
    fn test_visitor_mut_rewrites_text() {
        let mut doc = sample();
        Uppercase.visit_node_mut(&mut doc);
        assert_eq!(doc.plain_text(), "PLAINBOLD");
        assert_eq!(doc.node_type, NodeType::Doc);
    }
}
