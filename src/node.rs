use std::{cmp::Ordering, mem};

use derive_getters::Getters;
use log::trace;

use crate::error::TreeError;

enum FindKeyResponse {
    GreaterThanTheLast(usize),
    Equal(usize),
    LessThan(usize),
}

/// A node of the balanced tree. Children are owned exclusively, a leaf has
/// none. An internal node with `k` keys always holds `k + 1` children.
#[derive(Debug, Getters)]
pub struct Node {
    keys: Vec<i32>,
    children: Vec<Node>,
    #[getter(skip)]
    leaf: bool,
    #[getter(skip)]
    min_degree: usize,
}

impl Node {
    pub(crate) fn new(min_degree: usize, leaf: bool) -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            leaf,
            min_degree,
        }
    }

    pub(crate) fn leaf_with_key(min_degree: usize, key: i32) -> Self {
        let mut node = Self::new(min_degree, true);
        node.keys.push(key);
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys()
    }

    /// A node holding at least `t` keys can give one away and stay valid.
    pub fn can_lend_keys(&self) -> bool {
        self.keys.len() >= self.min_degree
    }

    fn is_minimal(&self) -> bool {
        self.keys.len() <= self.min_keys()
    }

    // TODO: switch to binary search once the linear scan shows up in the search benchmark
    fn find_key_index(&self, key: i32) -> FindKeyResponse {
        for (i, &k) in self.keys.iter().enumerate() {
            match key.cmp(&k) {
                Ordering::Less => return FindKeyResponse::LessThan(i),
                Ordering::Equal => return FindKeyResponse::Equal(i),
                Ordering::Greater => {}
            }
        }

        FindKeyResponse::GreaterThanTheLast(self.keys.len())
    }

    /// Puts a full root under a fresh root and splits it, the tree grows by one level.
    pub(crate) fn split_root(self) -> Node {
        let mut new_root = Node::new(self.min_degree, false);
        new_root.children.push(self);
        new_root.split_child(0);
        new_root
    }

    /// Splits the full child at `index`. Its median moves up into this node and
    /// the upper `t - 1` keys (and upper `t` children) go to a new right sibling.
    fn split_child(&mut self, index: usize) {
        let t = self.min_degree;
        let child = &mut self.children[index];
        debug_assert!(child.is_full(), "only full children are split");

        let right_keys = child.keys.split_off(t);
        let median = child.keys.remove(t - 1);
        let right_children = if child.leaf {
            Vec::new()
        } else {
            child.children.split_off(t)
        };

        let sibling = Node {
            keys: right_keys,
            children: right_children,
            leaf: child.leaf,
            min_degree: t,
        };

        self.keys.insert(index, median);
        self.children.insert(index + 1, sibling);
    }

    /// Inserts into a subtree whose root is known not to be full. Returns false
    /// when the key is already stored.
    pub(crate) fn insert_non_full(&mut self, key: i32) -> bool {
        let mut index = match self.find_key_index(key) {
            FindKeyResponse::Equal(_) => return false,
            FindKeyResponse::LessThan(i) | FindKeyResponse::GreaterThanTheLast(i) => i,
        };

        if self.leaf {
            self.keys.insert(index, key);
            return true;
        }

        if self.children[index].is_full() {
            self.split_child(index);

            // the promoted median now separates the two halves
            match key.cmp(&self.keys[index]) {
                Ordering::Greater => index += 1,
                Ordering::Equal => return false,
                Ordering::Less => {}
            }
        }

        self.children[index].insert_non_full(key)
    }

    pub(crate) fn search_key(&self, key: i32) -> bool {
        match self.find_key_index(key) {
            FindKeyResponse::Equal(_) => true,
            _ if self.leaf => false,
            FindKeyResponse::LessThan(i) | FindKeyResponse::GreaterThanTheLast(i) => {
                self.children[i].search_key(key)
            }
        }
    }

    /// Deletes `key` from this subtree. Every child descended into is first
    /// raised to at least `t` keys so the removal never underflows it.
    pub(crate) fn remove_key(&mut self, key: i32) -> Result<(), TreeError> {
        let (index, present) = match self.find_key_index(key) {
            FindKeyResponse::Equal(i) => (i, true),
            FindKeyResponse::LessThan(i) | FindKeyResponse::GreaterThanTheLast(i) => (i, false),
        };

        if self.leaf {
            if !present {
                return Err(TreeError::KeyNotFound(key));
            }
            self.keys.remove(index);
            return Ok(());
        }

        if present {
            return self.remove_from_internal(index);
        }

        let index = if self.children[index].is_minimal() {
            self.fill_child(index)
        } else {
            index
        };

        self.children[index].remove_key(key)
    }

    fn remove_from_internal(&mut self, index: usize) -> Result<(), TreeError> {
        let key = self.keys[index];

        if self.children[index].can_lend_keys() {
            let predecessor = self.children[index].max_key();
            self.keys[index] = predecessor;
            self.children[index].remove_key(predecessor)
        } else if self.children[index + 1].can_lend_keys() {
            let successor = self.children[index + 1].min_key();
            self.keys[index] = successor;
            self.children[index + 1].remove_key(successor)
        } else {
            self.merge_children(index);
            self.children[index].remove_key(key)
        }
    }

    fn max_key(&self) -> i32 {
        let mut node = self;
        while !node.leaf {
            node = &node.children[node.children.len() - 1];
        }
        node.keys[node.keys.len() - 1]
    }

    fn min_key(&self) -> i32 {
        let mut node = self;
        while !node.leaf {
            node = &node.children[0];
        }
        node.keys[0]
    }

    /// Raises child `index` to at least `t` keys and returns the index the
    /// caller must descend into, which moves left when merged with its left sibling.
    fn fill_child(&mut self, index: usize) -> usize {
        let last = self.keys.len();

        if index > 0 && self.children[index - 1].can_lend_keys() {
            self.borrow_from_left(index);
            index
        } else if index < last && self.children[index + 1].can_lend_keys() {
            self.borrow_from_right(index);
            index
        } else if index < last {
            self.merge_children(index);
            index
        } else {
            self.merge_children(index - 1);
            index - 1
        }
    }

    fn borrow_from_left(&mut self, index: usize) {
        trace!("borrowing key for child {} from its left sibling", index);
        let (left, right) = self.children.split_at_mut(index);
        let sibling = &mut left[index - 1];
        let child = &mut right[0];

        let lifted = sibling.keys.remove(sibling.keys.len() - 1);
        let separator = mem::replace(&mut self.keys[index - 1], lifted);
        child.keys.insert(0, separator);

        if !child.leaf {
            let moved = sibling.children.remove(sibling.children.len() - 1);
            child.children.insert(0, moved);
        }
    }

    fn borrow_from_right(&mut self, index: usize) {
        trace!("borrowing key for child {} from its right sibling", index);
        let (left, right) = self.children.split_at_mut(index + 1);
        let child = &mut left[index];
        let sibling = &mut right[0];

        let lifted = sibling.keys.remove(0);
        let separator = mem::replace(&mut self.keys[index], lifted);
        child.keys.push(separator);

        if !child.leaf {
            child.children.push(sibling.children.remove(0));
        }
    }

    /// Folds child `index + 1` and the separator between them into child `index`.
    fn merge_children(&mut self, index: usize) {
        trace!("merging children {} and {}", index, index + 1);
        let sibling = self.children.remove(index + 1);
        let separator = self.keys.remove(index);

        let child = &mut self.children[index];
        child.keys.push(separator);
        child.keys.extend(sibling.keys);
        child.children.extend(sibling.children);
    }

    /// Hands out the single remaining child of an emptied internal root.
    pub(crate) fn into_only_child(self) -> Option<Node> {
        if self.leaf {
            return None;
        }
        self.children.into_iter().next()
    }

    pub(crate) fn depth(&self) -> usize {
        let mut node = self;
        let mut depth = 1;
        while !node.leaf {
            node = &node.children[0];
            depth += 1;
        }
        depth
    }

    /// Checks this subtree against the structural invariants. Keys must lie in
    /// the open interval `(lower, upper)`. Returns the number of keys in the subtree.
    pub(crate) fn validate(
        &self,
        is_root: bool,
        lower: Option<i32>,
        upper: Option<i32>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, TreeError> {
        let violation = |msg: String| -> Result<usize, TreeError> { Err(TreeError::InvariantViolation(msg)) };

        if self.keys.len() > self.max_keys() {
            return violation(format!("node {:?} holds more than {} keys", self.keys, self.max_keys()));
        }
        if !is_root && self.keys.len() < self.min_keys() {
            return violation(format!("node {:?} holds fewer than {} keys", self.keys, self.min_keys()));
        }
        if is_root && self.keys.is_empty() {
            return violation("a present root must hold at least one key".to_owned());
        }
        if !self.keys.windows(2).all(|pair| pair[0] < pair[1]) {
            return violation(format!("keys {:?} are not strictly increasing", self.keys));
        }
        if lower.is_some_and(|lower| self.keys.iter().any(|k| *k <= lower)) {
            return violation(format!("keys {:?} must be greater than {:?}", self.keys, lower));
        }
        if upper.is_some_and(|upper| self.keys.iter().any(|k| *k >= upper)) {
            return violation(format!("keys {:?} must be less than {:?}", self.keys, upper));
        }

        if self.leaf {
            if !self.children.is_empty() {
                return violation(format!("leaf {:?} has children", self.keys));
            }
            return match *leaf_depth {
                Some(expected) if expected != depth => {
                    violation(format!("leaf {:?} at depth {} but others at {}", self.keys, depth, expected))
                }
                Some(_) => Ok(self.keys.len()),
                None => {
                    *leaf_depth = Some(depth);
                    Ok(self.keys.len())
                }
            };
        }

        if self.children.len() != self.keys.len() + 1 {
            return violation(format!(
                "internal node {:?} has {} children, expected {}",
                self.keys,
                self.children.len(),
                self.keys.len() + 1
            ));
        }

        let mut count = self.keys.len();
        for (i, child) in self.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(self.keys[i - 1]) };
            let child_upper = if i < self.keys.len() { Some(self.keys[i]) } else { upper };
            count += child.validate(false, child_lower, child_upper, depth + 1, leaf_depth)?;
        }

        Ok(count)
    }
}

/// In-order iterator over the keys of a subtree. Keeps an explicit stack of
/// `(node, next key position)` pairs along the current path.
#[derive(Debug, Clone)]
pub struct Keys<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(root: Option<&'a Node>) -> Self {
        let mut keys = Self { stack: Vec::new() };
        if let Some(root) = root {
            keys.descend_leftmost(root);
        }
        keys
    }

    fn descend_leftmost(&mut self, mut node: &'a Node) {
        loop {
            self.stack.push((node, 0));
            if node.leaf {
                break;
            }
            node = &node.children[0];
        }
    }
}

impl Iterator for Keys<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        loop {
            let (node, position) = self.stack.last_mut()?;
            let node = *node;

            if *position < node.keys.len() {
                let key = node.keys[*position];
                *position += 1;
                let next_child = *position;

                if !node.leaf {
                    self.descend_leftmost(&node.children[next_child]);
                }
                return Some(key);
            }

            self.stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(t: usize, keys: &[i32]) -> Node {
        Node {
            keys: keys.to_vec(),
            children: Vec::new(),
            leaf: true,
            min_degree: t,
        }
    }

    fn internal(t: usize, keys: &[i32], children: Vec<Node>) -> Node {
        Node {
            keys: keys.to_vec(),
            children,
            leaf: false,
            min_degree: t,
        }
    }

    fn in_order(node: &Node) -> Vec<i32> {
        Keys::new(Some(node)).collect()
    }

    fn check(node: &Node) {
        let mut leaf_depth = None;
        node.validate(true, None, None, 0, &mut leaf_depth).unwrap();
    }

    #[test]
    fn split_child_promotes_median() {
        let mut parent = internal(2, &[], vec![leaf(2, &[1, 2, 3])]);
        parent.split_child(0);

        assert_eq!(parent.keys(), &vec![2]);
        assert_eq!(parent.children()[0].keys(), &vec![1]);
        assert_eq!(parent.children()[1].keys(), &vec![3]);
        assert!(parent.children()[1].is_leaf());
        check(&parent);
    }

    #[test]
    fn split_internal_child_moves_upper_children() {
        let t = 2;
        let full = internal(
            t,
            &[10, 20, 30],
            vec![leaf(t, &[5]), leaf(t, &[15]), leaf(t, &[25]), leaf(t, &[35])],
        );
        let root = full.split_root();

        assert_eq!(root.keys(), &vec![20]);
        assert_eq!(root.children()[0].keys(), &vec![10]);
        assert_eq!(root.children()[0].children().len(), 2);
        assert_eq!(root.children()[1].keys(), &vec![30]);
        assert_eq!(root.children()[1].children()[0].keys(), &vec![25]);
        assert_eq!(in_order(&root), vec![5, 10, 15, 20, 25, 30, 35]);
        check(&root);
    }

    #[test]
    fn insert_non_full_descends_right_of_promoted_key() {
        let mut root = internal(2, &[50], vec![leaf(2, &[10, 20, 30]), leaf(2, &[60])]);

        assert!(root.insert_non_full(25));
        assert_eq!(root.keys(), &vec![20, 50]);
        assert_eq!(root.children()[1].keys(), &vec![25, 30]);
        check(&root);
    }

    #[test]
    fn insert_non_full_ignores_duplicates() {
        let mut root = internal(2, &[50], vec![leaf(2, &[10, 20, 30]), leaf(2, &[60])]);

        assert!(!root.insert_non_full(50));
        // a duplicate that equals the freshly promoted median
        assert!(!root.insert_non_full(20));
        assert!(!root.insert_non_full(60));
        assert_eq!(in_order(&root), vec![10, 20, 30, 50, 60]);
        check(&root);
    }

    #[test]
    fn search_key_walks_down() {
        let root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30, 40])]);
        assert!(root.search_key(20));
        assert!(root.search_key(40));
        assert!(!root.search_key(35));
        assert!(!root.search_key(0));
    }

    #[test]
    fn remove_internal_key_uses_predecessor() {
        let mut root = internal(2, &[20], vec![leaf(2, &[5, 10]), leaf(2, &[30])]);

        root.remove_key(20).unwrap();
        assert_eq!(root.keys(), &vec![10]);
        assert_eq!(in_order(&root), vec![5, 10, 30]);
        check(&root);
    }

    #[test]
    fn remove_internal_key_uses_successor() {
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30, 40])]);

        root.remove_key(20).unwrap();
        assert_eq!(root.keys(), &vec![30]);
        assert_eq!(in_order(&root), vec![10, 30, 40]);
        check(&root);
    }

    #[test]
    fn remove_internal_key_merges_minimal_children() {
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30])]);

        root.remove_key(20).unwrap();
        assert!(root.keys().is_empty());
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].keys(), &vec![10, 30]);

        let only = root.into_only_child().unwrap();
        assert_eq!(only.keys(), &vec![10, 30]);
    }

    #[test]
    fn fill_borrows_from_left_sibling() {
        let t = 2;
        let mut root = internal(
            t,
            &[30],
            vec![
                internal(t, &[10, 20], vec![leaf(t, &[5]), leaf(t, &[15]), leaf(t, &[25])]),
                internal(t, &[40], vec![leaf(t, &[35]), leaf(t, &[45])]),
            ],
        );

        assert_eq!(root.fill_child(1), 1);
        assert_eq!(root.keys(), &vec![20]);
        assert_eq!(root.children()[0].keys(), &vec![10]);
        assert_eq!(root.children()[1].keys(), &vec![30, 40]);
        assert_eq!(root.children()[1].children()[0].keys(), &vec![25]);
        assert_eq!(in_order(&root), vec![5, 10, 15, 20, 25, 30, 35, 40, 45]);
        check(&root);
    }

    #[test]
    fn fill_borrows_from_right_sibling() {
        let t = 2;
        let mut root = internal(t, &[20], vec![leaf(t, &[10]), leaf(t, &[30, 40])]);

        assert_eq!(root.fill_child(0), 0);
        assert_eq!(root.keys(), &vec![30]);
        assert_eq!(root.children()[0].keys(), &vec![10, 20]);
        assert_eq!(root.children()[1].keys(), &vec![40]);
        check(&root);
    }

    #[test]
    fn fill_last_child_merges_left_and_shifts_index() {
        let t = 2;
        let mut root = internal(t, &[20, 40], vec![leaf(t, &[10]), leaf(t, &[30]), leaf(t, &[50])]);

        assert_eq!(root.fill_child(2), 1);
        assert_eq!(root.keys(), &vec![20]);
        assert_eq!(root.children()[1].keys(), &vec![30, 40, 50]);
        check(&root);
    }

    #[test]
    fn remove_from_leaf_reports_missing_key() {
        let mut node = leaf(3, &[1, 2, 3]);
        assert_eq!(node.remove_key(7), Err(TreeError::KeyNotFound(7)));
        assert_eq!(node.keys(), &vec![1, 2, 3]);
    }

    #[test]
    fn keys_iterator_is_in_order() {
        let t = 2;
        let root = internal(
            t,
            &[20, 40],
            vec![leaf(t, &[5, 10]), leaf(t, &[30]), leaf(t, &[50, 60, 70])],
        );
        assert_eq!(in_order(&root), vec![5, 10, 20, 30, 40, 50, 60, 70]);
        assert_eq!(Keys::new(None).count(), 0);
    }

    #[test]
    fn validate_catches_broken_nodes() {
        let unsorted = leaf(2, &[3, 1]);
        let mut leaf_depth = None;
        assert!(unsorted.validate(true, None, None, 0, &mut leaf_depth).is_err());

        let uneven = internal(2, &[10], vec![leaf(2, &[5]), internal(2, &[20], vec![leaf(2, &[15]), leaf(2, &[25])])]);
        let mut leaf_depth = None;
        assert!(matches!(
            uneven.validate(true, None, None, 0, &mut leaf_depth),
            Err(TreeError::InvariantViolation(_))
        ));
    }
}
