use std::fmt;

use log::debug;

use crate::{
    config::MIN_DEGREE,
    error::TreeError,
    node::{Keys, Node},
};

/// Balanced multi-way search tree of minimum degree `t`.
///
/// Every node except the root holds between `t - 1` and `2t - 1` keys and all
/// leaves sit at the same depth. Full nodes are split on the way down during
/// insertion and minimal nodes are filled on the way down during removal, so
/// neither operation ever has to walk back up.
#[derive(Debug)]
pub struct BalancedTree {
    root: Option<Node>,
    min_degree: usize,
    len: usize,
}

impl BalancedTree {
    pub fn new(min_degree: usize) -> Result<Self, TreeError> {
        if min_degree < MIN_DEGREE {
            return Err(TreeError::InvalidDegree(min_degree));
        }

        Ok(Self {
            root: None,
            min_degree,
            len: 0,
        })
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Number of levels, zero for an empty tree.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    /// Adds `key`. Returns false and leaves the key set unchanged if it was already present.
    pub fn insert(&mut self, key: i32) -> bool {
        let inserted = match self.root.take() {
            None => {
                self.root = Some(Node::leaf_with_key(self.min_degree, key));
                true
            }
            Some(root) => {
                let mut root = if root.is_full() {
                    debug!("root is full, splitting before inserting {}", key);
                    root.split_root()
                } else {
                    root
                };
                let inserted = root.insert_non_full(key);
                self.root = Some(root);
                inserted
            }
        };

        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Deletes `key`. An empty tree or an absent key is reported as an error and
    /// the tree is not touched.
    pub fn remove(&mut self, key: i32) -> Result<(), TreeError> {
        let Some(root) = self.root.as_mut() else {
            debug!("cannot remove {}: the tree is empty", key);
            return Err(TreeError::EmptyTree);
        };

        if !root.search_key(key) {
            debug!("cannot remove {}: key not found", key);
            return Err(TreeError::KeyNotFound(key));
        }

        root.remove_key(key)?;
        self.len -= 1;

        if root.keys().is_empty() {
            debug!("root ran out of keys, collapsing one level");
            self.root = self.root.take().and_then(Node::into_only_child);
        }

        Ok(())
    }

    pub fn search(&self, key: i32) -> bool {
        match &self.root {
            None => {
                debug!("search for {} in an empty tree", key);
                false
            }
            Some(root) => {
                let found = root.search_key(key);
                debug!("search for {}: found = {}", key, found);
                found
            }
        }
    }

    /// Lazy in-order walk over all keys. Can be called again to restart.
    pub fn iter(&self) -> Keys<'_> {
        Keys::new(self.root.as_ref())
    }

    /// All keys in ascending order.
    pub fn traverse(&self) -> Vec<i32> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Walks the whole tree and reports the first broken invariant.
    pub fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = &self.root else {
            return match self.len {
                0 => Ok(()),
                len => Err(TreeError::InvariantViolation(format!("empty tree reports {} keys", len))),
            };
        };

        let mut leaf_depth = None;
        let count = root.validate(true, None, None, 0, &mut leaf_depth)?;
        if count != self.len {
            return Err(TreeError::InvariantViolation(format!(
                "tree holds {} keys but reports {}",
                count, self.len
            )));
        }

        Ok(())
    }

    pub fn print_tree(&self) {
        print!("{}", self);
    }
}

impl<'a> IntoIterator for &'a BalancedTree {
    type Item = i32;
    type IntoIter = Keys<'a>;

    fn into_iter(self) -> Keys<'a> {
        self.iter()
    }
}

impl Extend<i32> for BalancedTree {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}

/// One line per level, e.g. `[20]` then `[10] [30,40,50]`.
impl fmt::Display for BalancedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = &self.root else {
            return writeln!(f, "[]");
        };

        let mut level = vec![root];
        while !level.is_empty() {
            let line = level
                .iter()
                .map(|node| {
                    let keys = node.keys().iter().map(|k| k.to_string()).collect::<Vec<String>>().join(",");
                    format!("[{}]", keys)
                })
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(f, "{}", line)?;

            level = level.into_iter().flat_map(|node| node.children().iter()).collect();
        }

        Ok(())
    }
}
