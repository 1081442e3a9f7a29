//! Arena-backed search tree for the PUCT selection loop.
//!
//! Nodes live in a flat `Vec` and reference each other by index, which keeps
//! the tree free of interior mutability and cheap to drop after each turn.

use std::collections::HashMap;

pub const ROOT: usize = 0;

#[derive(Debug)]
pub struct Node {
    pub parent: Option<usize>,
    /// Move index -> child node index.
    pub children: HashMap<usize, usize>,
    pub visits: u32,
    /// Mean action value from the perspective of the player who moved into
    /// this node.
    pub q: f64,
    pub prior: f64,
}

#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    pub fn new() -> SearchTree {
        SearchTree {
            nodes: vec![Node {
                parent: None,
                children: HashMap::new(),
                visits: 0,
                q: 0.0,
                prior: 1.0,
            }],
        }
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn is_leaf(&self, idx: usize) -> bool {
        self.nodes[idx].children.is_empty()
    }

    /// PUCT score of a child: Q + c_puct · P · sqrt(N_parent) / (1 + N).
    fn puct(&self, parent_visits: u32, child: usize, c_puct: f64) -> f64 {
        let node = &self.nodes[child];
        let u = c_puct * node.prior * (parent_visits as f64).sqrt() / (1.0 + node.visits as f64);
        node.q + u
    }

    /// Pick the child of `idx` with the highest PUCT score.
    pub fn select(&self, idx: usize, c_puct: f64) -> (usize, usize) {
        let parent_visits = self.nodes[idx].visits;
        let mut best: Option<(usize, usize, f64)> = None;
        for (&mv, &child) in &self.nodes[idx].children {
            let score = self.puct(parent_visits, child, c_puct);
            match best {
                Some((_, _, top)) if score <= top => {}
                _ => best = Some((mv, child, score)),
            }
        }
        // Callers only descend into non-leaf nodes.
        let (mv, child, _) = best.unwrap_or((usize::MAX, idx, 0.0));
        (mv, child)
    }

    /// Attach one child per `(move, prior)` pair under `idx`.
    pub fn expand(&mut self, idx: usize, priors: &[(usize, f64)]) {
        for &(mv, prior) in priors {
            if self.nodes[idx].children.contains_key(&mv) {
                continue;
            }
            let child = self.nodes.len();
            self.nodes.push(Node {
                parent: Some(idx),
                children: HashMap::new(),
                visits: 0,
                q: 0.0,
                prior,
            });
            self.nodes[idx].children.insert(mv, child);
        }
    }

    /// Back up a leaf value along the path to the root, alternating the sign
    /// each ply (a good position for the mover is bad for the opponent).
    pub fn update_recursive(&mut self, leaf: usize, mut value: f64) {
        let mut idx = Some(leaf);
        while let Some(i) = idx {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.q += (value - node.q) / node.visits as f64;
            value = -value;
            idx = node.parent;
        }
    }
}
