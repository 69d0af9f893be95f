//! Move tree built from parsed notation.
//!
//! Nodes live in an arena owned by [`MoveTree`]; parents are plain indices used
//! for upward navigation only. The first child of a node is the main-line
//! continuation, later children are alternatives. Every node caches its
//! position, so navigation never replays moves.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::engine::{PositionEngine, PositionKey};
use crate::error::{BranchPath, IllegalMoveError};
use crate::notation::MoveToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct PositionNode<P> {
    /// SAN of the move leading here; `None` only at the root.
    pub move_text: Option<String>,
    pub key: PositionKey,
    pub position: P,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Half-moves from the start position.
    pub ply: usize,
}

impl<P> PositionNode<P> {
    /// Move with its number, e.g. `"3. Bb5"` or `"3... a6"`.
    pub fn label(&self) -> Option<String> {
        let text = self.move_text.as_deref()?;
        Some(if self.ply % 2 == 1 {
            format!("{}. {}", self.ply.div_ceil(2), text)
        } else {
            format!("{}... {}", self.ply / 2, text)
        })
    }
}

#[derive(Debug, Clone)]
pub struct MoveTree<P> {
    nodes: Vec<PositionNode<P>>,
}

/// A built tree plus the branches that had to be dropped.
#[derive(Debug)]
pub struct BuiltTree<P> {
    pub tree: MoveTree<P>,
    pub errors: Vec<IllegalMoveError>,
}

/// Build the tree for a game's main line (with its variations) from the
/// engine's initial position.
///
/// An illegal move stops only the line it belongs to. Plies already added for
/// that line stay, as does everything else in the tree.
pub fn build_tree<E: PositionEngine>(engine: &E, main_line: &[MoveToken]) -> BuiltTree<E::Position> {
    let start = engine.new_game();
    let mut builder = TreeBuilder {
        engine,
        tree: MoveTree::new(engine.position_key(&start), start),
        errors: Vec::new(),
    };
    let root = builder.tree.root();
    builder.build(root, main_line);

    BuiltTree {
        tree: builder.tree,
        errors: builder.errors,
    }
}

struct TreeBuilder<'e, E: PositionEngine> {
    engine: &'e E,
    tree: MoveTree<E::Position>,
    errors: Vec<IllegalMoveError>,
}

impl<E: PositionEngine> TreeBuilder<'_, E> {
    /// Lines are built depth-first from an explicit stack, in the order they
    /// appear in the notation.
    fn build(&mut self, root: NodeId, main_line: &[MoveToken]) {
        let mut pending = vec![(root, main_line, BranchPath::main_line())];

        while let Some((from, line, path)) = pending.pop() {
            let befores = self.play_line(from, line, &path);

            // Alternatives to a move start from the position before it.
            let mut branches = Vec::new();
            for (index, (token, &before)) in line.iter().zip(&befores).enumerate() {
                for (v, variation) in token.variations.iter().enumerate() {
                    branches.push((before, variation.as_slice(), path.enter(index, v)));
                }
            }
            pending.extend(branches.into_iter().rev());
        }
    }

    /// Attach the moves of one line and return the node each move was played
    /// from. The line itself goes in before its variations so each
    /// continuation is its parent's first child.
    fn play_line(&mut self, from: NodeId, line: &[MoveToken], path: &BranchPath) -> Vec<NodeId> {
        let mut befores = Vec::with_capacity(line.len());
        let mut current = from;

        for token in line {
            befores.push(current);
            let applied = self
                .engine
                .apply_move(&self.tree.node(current).position, &token.text);

            match applied {
                Ok(position) => {
                    let key = self.engine.position_key(&position);
                    current = self.tree.attach(current, token.text.clone(), key, position);
                }
                Err(reason) => {
                    let error = IllegalMoveError {
                        move_text: token.text.clone(),
                        path: path.clone(),
                        ply: self.tree.node(current).ply + 1,
                        reason,
                    };
                    debug!("dropping rest of line: {error}");
                    self.errors.push(error);
                    break;
                }
            }
        }

        befores
    }
}

impl<P> MoveTree<P> {
    fn new(key: PositionKey, position: P) -> Self {
        Self {
            nodes: vec![PositionNode {
                move_text: None,
                key,
                position,
                parent: None,
                children: Vec::new(),
                ply: 0,
            }],
        }
    }

    /// Add a child, reusing an existing child that reaches the same position.
    fn attach(&mut self, parent: NodeId, move_text: String, key: PositionKey, position: P) -> NodeId {
        if let Some(&existing) = self.nodes[parent.0]
            .children
            .iter()
            .find(|&&child| self.nodes[child.0].key == key)
        {
            return existing;
        }

        let id = NodeId(self.nodes.len());
        let ply = self.nodes[parent.0].ply + 1;
        self.nodes.push(PositionNode {
            move_text: Some(move_text),
            key,
            position,
            parent: Some(parent),
            children: Vec::new(),
            ply,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Panics if `id` does not come from this tree.
    pub fn node(&self, id: NodeId) -> &PositionNode<P> {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionNode<P>> {
        self.nodes.get(id.0)
    }

    pub fn advance(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.children.first().copied()
    }

    pub fn retreat(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn jump_to_start(&self) -> NodeId {
        self.root()
    }

    /// Follow first children from `id` to the end of its line.
    pub fn jump_to_end(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(next) = self.advance(current) {
            current = next;
        }
        current
    }

    /// The `index`-th continuation of `id` (0 is the main line).
    pub fn select_branch(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.get(id)?.children.get(index).copied()
    }

    /// Moves of the main line from the start position.
    pub fn main_line(&self) -> Vec<&str> {
        let mut moves = Vec::new();
        let mut current = self.root();
        while let Some(next) = self.advance(current) {
            if let Some(text) = self.node(next).move_text.as_deref() {
                moves.push(text);
            }
            current = next;
        }
        moves
    }

    /// Moves from the root down to `id`.
    pub fn path_to(&self, id: NodeId) -> Vec<&str> {
        let mut moves = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|n| self.get(n)) {
            if let Some(text) = node.move_text.as_deref() {
                moves.push(text);
            }
            current = node.parent;
        }
        moves.reverse();
        moves
    }

    /// Pre-order traversal of every node.
    pub fn walk(&self) -> Walk<'_, P> {
        Walk {
            tree: self,
            stack: vec![WalkStep {
                id: self.root(),
                depth: 0,
                is_variation: false,
            }],
        }
    }

    pub fn cursor(&self) -> TreeCursor<'_, P> {
        TreeCursor {
            tree: self,
            current: self.root(),
        }
    }

    /// Nested JSON view: `{move, key, ply, children}`.
    pub fn to_json(&self) -> JsonValue {
        self.node_to_json(self.root())
    }

    fn node_to_json(&self, id: NodeId) -> JsonValue {
        let node = self.node(id);
        let children: Vec<JsonValue> = node
            .children
            .iter()
            .map(|&child| self.node_to_json(child))
            .collect();

        serde_json::json!({
            "move": node.move_text,
            "key": node.key.as_str(),
            "ply": node.ply,
            "children": children,
        })
    }
}

/// One step of [`MoveTree::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkStep {
    pub id: NodeId,
    /// Variation nesting level; 0 on the main line.
    pub depth: usize,
    /// True when the node opens an alternative (it is not its parent's first child).
    pub is_variation: bool,
}

pub struct Walk<'t, P> {
    tree: &'t MoveTree<P>,
    stack: Vec<WalkStep>,
}

impl<P> Iterator for Walk<'_, P> {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        let step = self.stack.pop()?;
        let children = &self.tree.node(step.id).children;

        for (i, &child) in children.iter().enumerate().rev() {
            self.stack.push(WalkStep {
                id: child,
                depth: if i == 0 { step.depth } else { step.depth + 1 },
                is_variation: i > 0,
            });
        }
        Some(step)
    }
}

/// Interactive position inside a tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeCursor<'t, P> {
    tree: &'t MoveTree<P>,
    current: NodeId,
}

impl<'t, P> TreeCursor<'t, P> {
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn node(&self) -> &'t PositionNode<P> {
        self.tree.node(self.current)
    }

    /// Returns false when already at the end of the line.
    pub fn advance(&mut self) -> bool {
        self.move_to(self.tree.advance(self.current))
    }

    pub fn retreat(&mut self) -> bool {
        self.move_to(self.tree.retreat(self.current))
    }

    pub fn select_branch(&mut self, index: usize) -> bool {
        self.move_to(self.tree.select_branch(self.current, index))
    }

    pub fn jump_to_start(&mut self) {
        self.current = self.tree.jump_to_start();
    }

    pub fn jump_to_end(&mut self) {
        self.current = self.tree.jump_to_end(self.current);
    }

    fn move_to(&mut self, target: Option<NodeId>) -> bool {
        match target {
            Some(id) => {
                self.current = id;
                true
            }
            None => false,
        }
    }
}
