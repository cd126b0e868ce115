use super::node::MAX_KEYS;
use super::node_id::NodeId;
use super::raw_tree::RawTwoThreeTree;
use crate::error::InvariantViolation;

/// Exclusive key bounds a subtree must respect.
struct Bounds<'a, K> {
    lower: Option<&'a K>,
    upper: Option<&'a K>,
}

impl<K: Ord> RawTwoThreeTree<K> {
    /// Walks the whole tree and reports the first structural property that does not hold.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root() else {
            return if self.len() == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::LengthMismatch {
                    len: self.len(),
                    reachable: 0,
                })
            };
        };

        if self.node(root).parent().is_some() {
            return Err(InvariantViolation::RootHasParent);
        }

        let mut leaf_depth = None;
        let bounds = Bounds { lower: None, upper: None };
        let reachable = self.check_subtree(root, 0, &bounds, &mut leaf_depth)?;

        if reachable == self.len() {
            Ok(())
        } else {
            Err(InvariantViolation::LengthMismatch {
                len: self.len(),
                reachable,
            })
        }
    }

    /// Checks the subtree under `id` and returns how many keys it holds.
    fn check_subtree(
        &self,
        id: NodeId,
        depth: usize,
        bounds: &Bounds<'_, K>,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, InvariantViolation> {
        let node = self.node(id);
        let keys = node.keys();

        if keys.is_empty() || keys.len() > MAX_KEYS {
            return Err(InvariantViolation::KeyCount { depth, keys: keys.len() });
        }

        let sorted = keys.windows(2).all(|pair| pair[0] < pair[1]);
        let above_lower = bounds.lower.is_none_or(|lower| keys[0] > *lower);
        let below_upper = bounds.upper.is_none_or(|upper| keys[keys.len() - 1] < *upper);
        if !(sorted && above_lower && below_upper) {
            return Err(InvariantViolation::Unordered { depth });
        }

        if node.is_leaf() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(InvariantViolation::UnevenLeaves { expected, found: depth });
                }
                Some(_) => {}
            }
            return Ok(keys.len());
        }

        if node.child_count() != keys.len() + 1 {
            return Err(InvariantViolation::ChildCount {
                depth,
                keys: keys.len(),
                children: node.child_count(),
            });
        }

        let mut total = keys.len();
        for (index, &child) in node.children().iter().enumerate() {
            if self.node(child).parent() != Some(id) {
                return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
            }

            let child_bounds = Bounds {
                lower: if index == 0 { bounds.lower } else { Some(&keys[index - 1]) },
                upper: keys.get(index).or(bounds.upper),
            };
            total += self.check_subtree(child, depth + 1, &child_bounds, leaf_depth)?;
        }
        Ok(total)
    }
}
