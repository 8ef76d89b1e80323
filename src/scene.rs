//! Depth-first traversal of the layer hierarchy.

use crate::layer::{Group, LayerNode};
use crate::map::Map;
use macroquad::math::Vec2;
use std::slice;

/// A visible node together with what it inherits from its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct SceneItem<'a> {
    /// The node itself.
    pub node: &'a LayerNode,
    /// 0 for top-level nodes.
    pub depth: usize,
    /// Node opacity multiplied by every ancestor group's opacity.
    pub opacity: f32,
    /// Node offset plus every ancestor group's offset.
    pub offset: Vec2,
}

struct Level<'a> {
    nodes: slice::Iter<'a, LayerNode>,
    depth: usize,
    opacity: f32,
    offset: Vec2,
}

/// Pre-order walk over visible nodes in document order.
///
/// An invisible group hides its whole subtree. Groups themselves are yielded
/// before their children.
pub struct SceneWalker<'a> {
    stack: Vec<Level<'a>>,
}

impl<'a> SceneWalker<'a> {
    /// Walks `nodes` as top-level content.
    pub fn new(nodes: &'a [LayerNode]) -> Self {
        Self::nested(nodes, 0, 1.0, Vec2::ZERO)
    }

    /// Walks the children of `group`, inheriting its opacity and offset.
    pub fn group(group: &'a Group) -> Self {
        Self::nested(&group.layers, 1, group.opacity, group.offset)
    }

    fn nested(nodes: &'a [LayerNode], depth: usize, opacity: f32, offset: Vec2) -> Self {
        SceneWalker {
            stack: vec![Level {
                nodes: nodes.iter(),
                depth,
                opacity,
                offset,
            }],
        }
    }
}

impl<'a> Iterator for SceneWalker<'a> {
    type Item = SceneItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let Some(node) = level.nodes.next() else {
                self.stack.pop();
                continue;
            };
            if !node.visible() {
                continue;
            }

            let item = SceneItem {
                node,
                depth: level.depth,
                opacity: level.opacity * node.opacity(),
                offset: level.offset + node.offset(),
            };
            if let LayerNode::Group(g) = node {
                self.stack.push(Level {
                    nodes: g.layers.iter(),
                    depth: item.depth + 1,
                    opacity: item.opacity,
                    offset: item.offset,
                });
            }
            return Some(item);
        }
    }
}

impl Map {
    /// Every visible node of the map, depth first.
    pub fn walk(&self) -> SceneWalker<'_> {
        SceneWalker::new(&self.layers)
    }
}
