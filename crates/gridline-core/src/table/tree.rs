// ── Parent/child tree view ──
//
// Records reference their parent through a configurable field. A missing
// parent, an empty one, or `"0"` marks a root. Records whose parent is
// not in the set are never reached from a root and so are not shown.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::model::Record;

/// Parent value that marks a root.
pub const ROOT_PARENT: &str = "0";

/// Roots plus a parent id → children index, both in input order.
#[derive(Debug)]
pub struct Forest<T> {
    pub roots: Vec<Arc<T>>,
    pub children: HashMap<String, Vec<Arc<T>>>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            children: HashMap::new(),
        }
    }
}

/// One displayable row with its tree position.
#[derive(Debug)]
pub struct FlatRow<T> {
    pub record: Arc<T>,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

impl<T> Clone for FlatRow<T> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
            depth: self.depth,
            has_children: self.has_children,
            expanded: self.expanded,
        }
    }
}

impl<T> FlatRow<T> {
    /// A depth-0 row without tree structure.
    pub fn flat(record: Arc<T>) -> Self {
        Self {
            record,
            depth: 0,
            has_children: false,
            expanded: false,
        }
    }
}

/// Parent id of a record, or `None` for roots.
pub fn parent_of<T: Record>(record: &T, parent_field: &str) -> Option<String> {
    let parent = record.field(parent_field)?.to_string();
    if parent.is_empty() || parent == ROOT_PARENT {
        None
    } else {
        Some(parent)
    }
}

/// Split already filtered and sorted rows into roots and child lists.
pub fn build_tree<T: Record>(rows: &[Arc<T>], parent_field: &str) -> Forest<T> {
    let mut forest = Forest::default();
    for row in rows {
        match parent_of(row.as_ref(), parent_field) {
            None => forest.roots.push(Arc::clone(row)),
            Some(parent) => forest.children.entry(parent).or_default().push(Arc::clone(row)),
        }
    }
    forest
}

/// Pre-order flatten, descending only into expanded nodes.
///
/// Each id is emitted at most once, so cyclic or duplicated parent links
/// cannot loop.
pub fn flatten<T: Record>(forest: &Forest<T>, expanded: &HashSet<String>) -> Vec<FlatRow<T>> {
    let mut out = Vec::with_capacity(forest.roots.len());
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&Arc<T>, usize)> = forest.roots.iter().rev().map(|r| (r, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let id = node.id();
        if !visited.insert(id) {
            continue;
        }
        let kids = forest.children.get(id).filter(|k| !k.is_empty());
        let is_expanded = expanded.contains(id);
        out.push(FlatRow {
            record: Arc::clone(node),
            depth,
            has_children: kids.is_some(),
            expanded: is_expanded,
        });
        if is_expanded {
            if let Some(kids) = kids {
                stack.extend(kids.iter().rev().map(|k| (k, depth + 1)));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use pretty_assertions::assert_eq;

    fn node(id: &str, parent: &str) -> Arc<Entity> {
        Arc::new(Entity::new(id).with("parentId", parent))
    }

    fn sample() -> Vec<Arc<Entity>> {
        vec![
            node("1", "0"),
            node("2", "1"),
            node("3", "2"),
            node("4", "1"),
            node("5", "0"),
            Arc::new(Entity::new("6")),
        ]
    }

    fn shape(rows: &[FlatRow<Entity>]) -> Vec<(&str, usize)> {
        rows.iter().map(|r| (r.record.id.as_str(), r.depth)).collect()
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn collapsed_tree_shows_only_roots() {
        let forest = build_tree(&sample(), "parentId");
        let rows = flatten(&forest, &HashSet::new());
        assert_eq!(shape(&rows), [("1", 0), ("5", 0), ("6", 0)]);
        assert!(rows[0].has_children);
        assert!(!rows[1].has_children);
    }

    #[test]
    fn expanded_children_follow_their_parent() {
        let forest = build_tree(&sample(), "parentId");
        let rows = flatten(&forest, &set(&["1", "2"]));
        assert_eq!(
            shape(&rows),
            [
                ("1", 0),
                ("2", 1),
                ("3", 2),
                ("4", 1),
                ("5", 0),
                ("6", 0),
            ]
        );
    }

    #[test]
    fn expanding_a_hidden_node_has_no_effect() {
        let forest = build_tree(&sample(), "parentId");
        let rows = flatten(&forest, &set(&["2"]));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn orphans_and_cycles_are_not_shown() {
        let data = vec![node("1", "0"), node("a", "b"), node("b", "a"), node("x", "missing")];
        let forest = build_tree(&data, "parentId");
        let rows = flatten(&forest, &set(&["1", "a", "b"]));
        assert_eq!(shape(&rows), [("1", 0)]);
    }

    #[test]
    fn duplicate_ids_are_emitted_once() {
        let data = vec![node("1", "0"), node("1", "1")];
        let forest = build_tree(&data, "parentId");
        let rows = flatten(&forest, &set(&["1"]));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn numeric_parent_ids_resolve() {
        let data = vec![
            Arc::new(Entity::new("1").with("parentId", 0)),
            Arc::new(Entity::new("2").with("parentId", 1)),
        ];
        let forest = build_tree(&data, "parentId");
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.children["1"].len(), 1);
    }
}
