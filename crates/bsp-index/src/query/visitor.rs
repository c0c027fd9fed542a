//! Ordered node traversal relative to an eye position.

use nalgebra::Point3;

use crate::{BspModel, BspNode, NodeIndex, PlaneSide};

/// Receives nodes in traversal order.
///
/// A coplanar chain is reported right after the node owning it, before the
/// far subtree.
pub trait NodeVisitor {
    fn visit(&mut self, index: NodeIndex, node: &BspNode);
}

/// Records node indices in the order they were visited.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    order: Vec<NodeIndex>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn into_nodes(self) -> Vec<NodeIndex> {
        self.order
    }
}

impl NodeVisitor for CollectingVisitor {
    fn visit(&mut self, index: NodeIndex, _node: &BspNode) {
        self.order.push(index);
    }
}

/// Adapts a closure taking `(index, node)` into a [`NodeVisitor`].
pub struct FnVisitor<F>(pub F);

impl<F: FnMut(NodeIndex, &BspNode)> NodeVisitor for FnVisitor<F> {
    fn visit(&mut self, index: NodeIndex, node: &BspNode) {
        (self.0)(index, node);
    }
}

impl BspModel {
    /// Visits every node nearest-first relative to `eye`.
    pub fn traverse_front_to_back<V: NodeVisitor>(&self, eye: Point3<f32>, visitor: &mut V) {
        if !self.nodes.is_empty() {
            self.traverse_node(0, eye, true, visitor);
        }
    }

    /// Visits every node farthest-first relative to `eye`.
    pub fn traverse_back_to_front<V: NodeVisitor>(&self, eye: Point3<f32>, visitor: &mut V) {
        if !self.nodes.is_empty() {
            self.traverse_node(0, eye, false, visitor);
        }
    }

    fn traverse_node<V: NodeVisitor>(
        &self,
        index: NodeIndex,
        eye: Point3<f32>,
        near_first: bool,
        visitor: &mut V,
    ) {
        let node = &self.nodes[index];
        let eye_in_front = node.plane().classify_point(eye) != PlaneSide::Back;
        let (near, far) = if eye_in_front {
            (node.front(), node.back())
        } else {
            (node.back(), node.front())
        };
        let (first, last) = if near_first { (near, far) } else { (far, near) };

        if let Some(first) = first {
            self.traverse_node(first, eye, near_first, visitor);
        }

        let mut link = Some(index);
        while let Some(current) = link {
            let coplanar = &self.nodes[current];
            visitor.visit(current, coplanar);
            link = coplanar.coplanar();
        }

        if let Some(last) = last {
            self.traverse_node(last, eye, near_first, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Plane;
    use nalgebra::Vector3;

    /// Root at z = 0 with a coplanar partner, front child at z = 1, back child
    /// at z = -1.
    fn layered_model() -> BspModel {
        let mut model = BspModel::default();
        let mut root = BspNode::new(Plane::new(Vector3::z(), 0.0), 0);
        root.set_front(Some(1));
        root.set_back(Some(2));
        root.set_coplanar(Some(3));
        model.push_node(root);
        model.push_node(BspNode::new(Plane::new(Vector3::z(), 1.0), 0));
        model.push_node(BspNode::new(Plane::new(Vector3::z(), -1.0), 0));
        model.push_node(BspNode::new(Plane::new(Vector3::z(), 0.0), 0));
        model
    }

    #[test]
    fn empty_model_visits_nothing() {
        let model = BspModel::default();
        let mut visitor = CollectingVisitor::new();
        model.traverse_front_to_back(Point3::origin(), &mut visitor);
        assert!(visitor.nodes().is_empty());
    }

    #[test]
    fn front_to_back_from_above() {
        let model = layered_model();
        let mut visitor = CollectingVisitor::new();
        model.traverse_front_to_back(Point3::new(0.0, 0.0, 10.0), &mut visitor);
        assert_eq!(visitor.into_nodes(), vec![1, 0, 3, 2]);
    }

    #[test]
    fn back_to_front_from_below() {
        let model = layered_model();
        let mut visitor = CollectingVisitor::new();
        model.traverse_back_to_front(Point3::new(0.0, 0.0, -10.0), &mut visitor);
        assert_eq!(visitor.into_nodes(), vec![1, 0, 3, 2]);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let model = layered_model();
        let mut count = 0;
        {
            let mut visitor = FnVisitor(|_, _: &BspNode| count += 1);
            model.traverse_front_to_back(Point3::origin(), &mut visitor);
        }
        assert_eq!(count, 4);
    }
}
