//! Category tree resolution over the full category list of one kind.
//!
//! All traversals are pure functions on in-memory rows and carry a visited
//! set, so a cycle in stored `parent_id` links terminates the walk instead
//! of looping. Sibling order is always category id ascending.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::catalog::CategoryRow;

/// A category with its resolved children.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: CategoryRow,
    pub children: Vec<CategoryNode>,
}

/// Tree endpoint payload: either one rooted subtree or the full forest.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TreeResponse {
    Subtree(CategoryNode),
    Forest { categories: Vec<CategoryNode> },
}

fn by_id(rows: &[CategoryRow]) -> HashMap<i64, &CategoryRow> {
    rows.iter().map(|r| (r.id, r)).collect()
}

/// Direct children of `parent_id` (None = roots), id ascending.
pub fn children_of(rows: &[CategoryRow], parent_id: Option<i64>) -> Vec<CategoryRow> {
    let mut children: Vec<CategoryRow> = rows
        .iter()
        .filter(|r| r.parent_id == parent_id)
        .cloned()
        .collect();
    children.sort_by_key(|r| r.id);
    children
}

fn build_node(
    rows: &[CategoryRow],
    root: &CategoryRow,
    shallow: bool,
    visited: &mut HashSet<i64>,
) -> CategoryNode {
    visited.insert(root.id);
    let mut children = Vec::new();
    for child in children_of(rows, Some(root.id)) {
        if visited.contains(&child.id) {
            continue;
        }
        if shallow {
            visited.insert(child.id);
            children.push(CategoryNode {
                category: child,
                children: vec![],
            });
        } else {
            children.push(build_node(rows, &child, false, visited));
        }
    }
    CategoryNode {
        category: root.clone(),
        children,
    }
}

/// Resolves the subtree rooted at `root_id`, or None if the root is unknown.
/// `shallow` limits resolution to direct children.
pub fn build_subtree(rows: &[CategoryRow], root_id: i64, shallow: bool) -> Option<CategoryNode> {
    let root = rows.iter().find(|r| r.id == root_id)?;
    Some(build_node(rows, root, shallow, &mut HashSet::new()))
}

/// Resolves every root category (parent null) into a forest.
pub fn build_forest(rows: &[CategoryRow], shallow: bool) -> Vec<CategoryNode> {
    let mut visited = HashSet::new();
    children_of(rows, None)
        .into_iter()
        .map(|root| build_node(rows, &root, shallow, &mut visited))
        .collect()
}

/// Walks the parent chain from `id` up to a root, nearest ancestor first.
/// Stops if a link is dangling or an id repeats in its own chain.
pub fn ancestors(rows: &[CategoryRow], id: i64) -> Vec<CategoryRow> {
    let index = by_id(rows);
    let mut visited = HashSet::from([id]);
    let mut chain = Vec::new();

    let mut current = index.get(&id).copied();
    while let Some(row) = current {
        let Some(parent_id) = row.parent_id else { break };
        if !visited.insert(parent_id) {
            break; // cycle in stored data
        }
        match index.get(&parent_id).copied() {
            Some(parent) => {
                chain.push(parent.clone());
                current = Some(parent);
            }
            None => break,
        }
    }
    chain
}

fn collect_descendants(
    rows: &[CategoryRow],
    parent_id: i64,
    visited: &mut HashSet<i64>,
    out: &mut Vec<CategoryRow>,
) {
    for child in children_of(rows, Some(parent_id)) {
        if !visited.insert(child.id) {
            continue;
        }
        let child_id = child.id;
        out.push(child);
        collect_descendants(rows, child_id, visited, out);
    }
}

/// Depth-first subtree below `id` (excluding `id` itself), id ascending
/// among siblings.
pub fn descendants(rows: &[CategoryRow], id: i64) -> Vec<CategoryRow> {
    let mut out = Vec::new();
    collect_descendants(rows, id, &mut HashSet::from([id]), &mut out);
    out
}

/// True when `candidate_id` is `root_id` itself or sits inside its subtree.
/// Backs the no-cycle check on reparenting.
pub fn subtree_contains(rows: &[CategoryRow], root_id: i64, candidate_id: i64) -> bool {
    root_id == candidate_id || descendants(rows, root_id).iter().any(|r| r.id == candidate_id)
}

/// The level a child of `parent` must carry (roots are level 1).
pub fn child_level(parent: Option<&CategoryRow>) -> i32 {
    parent.map(|p| p.level + 1).unwrap_or(1)
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveError {
    CategoryNotFound,
    ParentNotFound,
    WouldCycle,
}

/// Planned effects of reparenting one category: its new level plus the
/// cascaded level of every descendant.
#[derive(Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub new_level: i32,
    pub descendant_levels: Vec<(i64, i32)>,
}

/// Validates a reparent and computes the level cascade. Rejects moving a
/// category under itself or any of its descendants.
pub fn plan_move(
    rows: &[CategoryRow],
    id: i64,
    new_parent_id: Option<i64>,
) -> Result<MovePlan, MoveError> {
    let category = rows
        .iter()
        .find(|r| r.id == id)
        .ok_or(MoveError::CategoryNotFound)?;

    let new_level = match new_parent_id {
        None => 1,
        Some(pid) => {
            if subtree_contains(rows, id, pid) {
                return Err(MoveError::WouldCycle);
            }
            let parent = rows
                .iter()
                .find(|r| r.id == pid)
                .ok_or(MoveError::ParentNotFound)?;
            parent.level + 1
        }
    };

    let delta = new_level - category.level;
    let descendant_levels = descendants(rows, id)
        .into_iter()
        .map(|d| (d.id, d.level + delta))
        .collect();

    Ok(MovePlan {
        new_level,
        descendant_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cat(id: i64, parent_id: Option<i64>, level: i32) -> CategoryRow {
        CategoryRow {
            id,
            name: format!("category-{id}"),
            parent_id,
            level,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// 1 ─ 2 ─ 4
    ///   └ 3     5 (root)
    fn sample() -> Vec<CategoryRow> {
        vec![
            cat(1, None, 1),
            cat(2, Some(1), 2),
            cat(3, Some(1), 2),
            cat(4, Some(2), 3),
            cat(5, None, 1),
        ]
    }

    #[test]
    fn test_children_ordered_by_id() {
        let rows = vec![cat(1, None, 1), cat(9, Some(1), 2), cat(3, Some(1), 2)];
        let children = children_of(&rows, Some(1));
        assert_eq!(children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 9]);
    }

    #[test]
    fn test_full_subtree() {
        let node = build_subtree(&sample(), 1, false).unwrap();
        assert_eq!(node.category.id, 1);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].category.id, 2);
        assert_eq!(node.children[0].children[0].category.id, 4);
        assert_eq!(node.children[1].category.id, 3);
    }

    #[test]
    fn test_shallow_subtree_stops_at_direct_children() {
        let node = build_subtree(&sample(), 1, true).unwrap();
        assert_eq!(node.children.len(), 2);
        assert!(node.children[0].children.is_empty());
    }

    #[test]
    fn test_subtree_unknown_root() {
        assert!(build_subtree(&sample(), 99, false).is_none());
    }

    #[test]
    fn test_forest_lists_all_roots() {
        let forest = build_forest(&sample(), false);
        assert_eq!(forest.iter().map(|n| n.category.id).collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let chain = ancestors(&sample(), 4);
        assert_eq!(chain.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_ancestors_of_root_empty() {
        assert!(ancestors(&sample(), 1).is_empty());
    }

    #[test]
    fn test_descendants_depth_first() {
        let subtree = descendants(&sample(), 1);
        assert_eq!(subtree.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 4, 3]);
    }

    #[test]
    fn test_cycle_in_stored_data_terminates() {
        // 10 → 11 → 10: corrupt parent links must not hang any traversal.
        let rows = vec![cat(10, Some(11), 1), cat(11, Some(10), 2)];
        let chain = ancestors(&rows, 10);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].id, 11);

        let subtree = descendants(&rows, 10);
        assert_eq!(subtree.len(), 1);

        let node = build_subtree(&rows, 10, false).unwrap();
        assert_eq!(node.children.len(), 1);
        assert!(node.children[0].children.is_empty());
    }

    #[test]
    fn test_self_parent_terminates() {
        let rows = vec![cat(7, Some(7), 1)];
        assert!(ancestors(&rows, 7).is_empty());
        assert!(descendants(&rows, 7).is_empty());
    }

    #[test]
    fn test_child_level() {
        assert_eq!(child_level(None), 1);
        let parent = cat(1, None, 2);
        assert_eq!(child_level(Some(&parent)), 3);
    }

    #[test]
    fn test_plan_move_to_root() {
        let plan = plan_move(&sample(), 2, None).unwrap();
        assert_eq!(plan.new_level, 1);
        // 4 was level 3 under level-2 parent; delta -1.
        assert_eq!(plan.descendant_levels, vec![(4, 2)]);
    }

    #[test]
    fn test_plan_move_cascades_levels_down() {
        // Reparent root 1 (level 1) under 5 → level 2; children shift by +1.
        let plan = plan_move(&sample(), 1, Some(5)).unwrap();
        assert_eq!(plan.new_level, 2);
        assert_eq!(plan.descendant_levels, vec![(2, 3), (4, 4), (3, 3)]);
    }

    #[test]
    fn test_plan_move_rejects_own_descendant() {
        assert_eq!(plan_move(&sample(), 1, Some(4)), Err(MoveError::WouldCycle));
        assert_eq!(plan_move(&sample(), 1, Some(1)), Err(MoveError::WouldCycle));
    }

    #[test]
    fn test_plan_move_missing_nodes() {
        assert_eq!(plan_move(&sample(), 99, None), Err(MoveError::CategoryNotFound));
        assert_eq!(plan_move(&sample(), 1, Some(99)), Err(MoveError::ParentNotFound));
    }

    #[test]
    fn test_level_invariant_holds_after_move() {
        // The spec's reparenting example: a root moved under a level-2 parent
        // becomes level 3, and its children become level 4.
        let rows = vec![cat(31, None, 1), cat(32, Some(31), 2), cat(10, Some(5), 2), cat(5, None, 1)];
        let plan = plan_move(&rows, 31, Some(10)).unwrap();
        assert_eq!(plan.new_level, 3);
        assert_eq!(plan.descendant_levels, vec![(32, 4)]);
    }
}
