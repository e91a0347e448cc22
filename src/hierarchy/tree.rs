//! Wheel Tree Module
//! Aggregates hierarchy paths into counted nodes.

use crate::data::{ColorValue, PathRow};
use std::collections::HashMap;

/// Color value aggregated over every row below a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorAggregate {
    #[default]
    Empty,
    /// All rows share this category.
    Category(String),
    /// Rows disagree on the category.
    Mixed,
    Numeric {
        sum: f64,
        n: u64,
    },
}

impl ColorAggregate {
    fn merge(&mut self, value: &ColorValue) {
        match (&mut *self, value) {
            (ColorAggregate::Empty, ColorValue::Category(c)) => {
                *self = ColorAggregate::Category(c.clone());
            }
            (ColorAggregate::Empty, ColorValue::Number(v)) => {
                *self = ColorAggregate::Numeric { sum: *v, n: 1 };
            }
            (ColorAggregate::Category(current), ColorValue::Category(c)) => {
                if current != c {
                    *self = ColorAggregate::Mixed;
                }
            }
            (ColorAggregate::Numeric { sum, n }, ColorValue::Number(v)) => {
                *sum += v;
                *n += 1;
            }
            (ColorAggregate::Mixed, _) => {}
            _ => *self = ColorAggregate::Mixed,
        }
    }

    /// Mean of a numeric aggregate.
    pub fn mean(&self) -> Option<f64> {
        match self {
            ColorAggregate::Numeric { sum, n } if *n > 0 => Some(sum / *n as f64),
            _ => None,
        }
    }
}

/// A single sector of the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelNode {
    /// Labels from the center to this node joined with `/`.
    pub id: String,
    pub label: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// 0 for the center.
    pub depth: usize,
    /// Number of rows passing through this node.
    pub count: u64,
    pub color: ColorAggregate,
}

/// Hierarchy of counted nodes. Node 0 is always the center.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelTree {
    nodes: Vec<WheelNode>,
}

impl WheelTree {
    pub const ROOT: usize = 0;

    /// Aggregate rows into a tree. Siblings are ordered by count, largest first.
    pub fn from_rows(rows: &[PathRow]) -> Self {
        let root_label = rows
            .first()
            .and_then(|row| row.path.first())
            .cloned()
            .unwrap_or_default();

        let mut nodes = vec![WheelNode {
            id: root_label.clone(),
            label: root_label,
            parent: None,
            children: Vec::new(),
            depth: 0,
            count: 0,
            color: ColorAggregate::Empty,
        }];
        let mut index: HashMap<(usize, String), usize> = HashMap::new();

        for row in rows {
            let mut current = Self::ROOT;
            nodes[current].count += 1;
            nodes[current].color.merge(&row.color);

            for (depth, label) in row.path.iter().enumerate().skip(1) {
                let key = (current, label.clone());
                let next = match index.get(&key) {
                    Some(&idx) => idx,
                    None => {
                        let idx = nodes.len();
                        let id = format!("{}/{}", nodes[current].id, label);
                        nodes.push(WheelNode {
                            id,
                            label: label.clone(),
                            parent: Some(current),
                            children: Vec::new(),
                            depth,
                            count: 0,
                            color: ColorAggregate::Empty,
                        });
                        nodes[current].children.push(idx);
                        index.insert(key, idx);
                        idx
                    }
                };
                nodes[next].count += 1;
                nodes[next].color.merge(&row.color);
                current = next;
            }
        }

        // Stable sort keeps first-appearance order for ties.
        for i in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[i].children);
            children.sort_by(|a, b| nodes[*b].count.cmp(&nodes[*a].count));
            nodes[i].children = children;
        }

        Self { nodes }
    }

    pub fn root(&self) -> &WheelNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, idx: usize) -> Option<&WheelNode> {
        self.nodes.get(idx)
    }

    pub fn nodes(&self) -> &[WheelNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels, counting the center.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0) + 1
    }

    /// Levels below `idx`, counting `idx` itself.
    pub fn height_below(&self, idx: usize) -> usize {
        match self.nodes.get(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&c| self.height_below(c))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    pub fn parent_label(&self, idx: usize) -> &str {
        self.nodes
            .get(idx)
            .and_then(|n| n.parent)
            .map(|p| self.nodes[p].label.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(path: &[&str], color: &str) -> PathRow {
        PathRow {
            path: path.iter().map(|s| s.to_string()).collect(),
            color: ColorValue::Category(color.to_string()),
        }
    }

    fn sample_tree() -> WheelTree {
        WheelTree::from_rows(&[
            row(&["World", "EU", "FR"], "EU"),
            row(&["World", "AS", "JP"], "AS"),
            row(&["World", "EU", "DE"], "EU"),
            row(&["World", "EU", "FR"], "EU"),
            row(&["World", "AS", "CN"], "AS"),
            row(&["World", "US", "US"], "US"),
            row(&["World", "EU", "IT"], "EU"),
        ])
    }

    fn child_labels(tree: &WheelTree, idx: usize) -> Vec<&str> {
        tree.node(idx)
            .unwrap()
            .children
            .iter()
            .map(|&c| tree.node(c).unwrap().label.as_str())
            .collect()
    }

    #[test]
    fn test_counts_and_order() {
        let tree = sample_tree();
        let root = tree.root();
        assert_eq!(root.label, "World");
        assert_eq!(root.count, 7);
        assert_eq!(child_labels(&tree, WheelTree::ROOT), vec!["EU", "AS", "US"]);

        let eu = root.children[0];
        assert_eq!(tree.node(eu).unwrap().count, 4);
        // FR has two rows; DE and IT tie and keep appearance order.
        assert_eq!(child_labels(&tree, eu), vec!["FR", "DE", "IT"]);
    }

    #[test]
    fn test_children_counts_sum_to_parent() {
        let tree = sample_tree();
        for node in tree.nodes() {
            if node.children.is_empty() {
                continue;
            }
            let sum: u64 = node
                .children
                .iter()
                .map(|&c| tree.node(c).unwrap().count)
                .sum();
            assert_eq!(sum, node.count);
        }
    }

    #[test]
    fn test_ids_depth_and_parent() {
        let tree = sample_tree();
        let fr = tree
            .nodes()
            .iter()
            .position(|n| n.id == "World/EU/FR")
            .unwrap();
        assert_eq!(tree.node(fr).unwrap().depth, 2);
        assert_eq!(tree.parent_label(fr), "EU");
        assert_eq!(tree.parent_label(WheelTree::ROOT), "");
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.height_below(WheelTree::ROOT), 3);
        assert_eq!(tree.height_below(fr), 1);
    }

    #[test]
    fn test_same_label_under_different_parents_is_distinct() {
        let tree = WheelTree::from_rows(&[row(&["", "A", "x"], "a"), row(&["", "B", "x"], "b")]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_color_aggregation() {
        let tree = sample_tree();
        assert_eq!(tree.root().color, ColorAggregate::Mixed);
        let eu = tree.root().children[0];
        assert_eq!(
            tree.node(eu).unwrap().color,
            ColorAggregate::Category("EU".to_string())
        );

        let numeric = WheelTree::from_rows(&[
            PathRow {
                path: vec!["c".into(), "a".into()],
                color: ColorValue::Number(2.0),
            },
            PathRow {
                path: vec!["c".into(), "a".into()],
                color: ColorValue::Number(4.0),
            },
        ]);
        assert_eq!(numeric.root().color.mean(), Some(3.0));
    }

    #[test]
    fn test_empty_rows() {
        let tree = WheelTree::from_rows(&[]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().count, 0);
        assert_eq!(tree.height(), 1);
    }
}
