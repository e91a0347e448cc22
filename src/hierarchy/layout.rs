//! Sunburst Layout Module
//! Places tree nodes on concentric rings.
//!
//! Angles are fractions of a full turn, starting at 12 o'clock and growing
//! clockwise. Radii are fractions of the wheel radius. Unit coordinates have
//! the origin at the wheel center with y pointing up.

use crate::hierarchy::WheelTree;
use std::f64::consts::TAU;

/// Angular step used when turning arcs into polylines.
const ARC_STEP: f64 = 1.0 / 180.0;

/// One drawn sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub node: usize,
    /// 0 is the center disk.
    pub ring: usize,
    pub start: f64,
    pub end: f64,
    pub inner: f64,
    pub outer: f64,
}

impl Sector {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_full_turn(&self) -> bool {
        self.span() >= 1.0 - 1e-9
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn mid_radius(&self) -> f64 {
        if self.inner == 0.0 {
            0.0
        } else {
            (self.inner + self.outer) / 2.0
        }
    }

    /// Unit coordinates of the polar point `(t, r)`.
    pub fn point(t: f64, r: f64) -> (f64, f64) {
        let angle = t * TAU;
        (r * angle.sin(), r * angle.cos())
    }

    /// Number of polyline segments used for this sector's arcs.
    pub fn arc_steps(&self) -> usize {
        ((self.span() / ARC_STEP).ceil() as usize).max(2)
    }

    /// Closed outline: outer arc clockwise, then inner arc back.
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let steps = self.arc_steps();
        let mut points = Vec::with_capacity(2 * steps + 2);
        for i in 0..=steps {
            let t = self.start + self.span() * i as f64 / steps as f64;
            points.push(Self::point(t, self.outer));
        }
        if self.inner > 0.0 {
            for i in (0..=steps).rev() {
                let t = self.start + self.span() * i as f64 / steps as f64;
                points.push(Self::point(t, self.inner));
            }
        } else if !self.is_full_turn() {
            points.push((0.0, 0.0));
        }
        points
    }

    /// Four-corner pieces small enough to be convex, covering the sector.
    pub fn convex_pieces(&self) -> Vec<[(f64, f64); 4]> {
        let steps = self.arc_steps();
        (0..steps)
            .map(|i| {
                let t0 = self.start + self.span() * i as f64 / steps as f64;
                let t1 = self.start + self.span() * (i + 1) as f64 / steps as f64;
                [
                    Self::point(t0, self.inner),
                    Self::point(t0, self.outer),
                    Self::point(t1, self.outer),
                    Self::point(t1, self.inner),
                ]
            })
            .collect()
    }

    fn contains(&self, t: f64, r: f64) -> bool {
        r >= self.inner && r < self.outer && (self.is_full_turn() || (t >= self.start && t < self.end))
    }
}

/// Sectors for one view of the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelLayout {
    pub sectors: Vec<Sector>,
    /// Node drawn at the center.
    pub focus: usize,
    pub rings: usize,
}

impl WheelLayout {
    /// Lay out `focus` and its descendants, showing at most `max_depth` rings.
    pub fn compute(tree: &WheelTree, focus: usize, max_depth: Option<usize>) -> Self {
        let focus = if tree.node(focus).is_some() {
            focus
        } else {
            WheelTree::ROOT
        };
        let available = tree.height_below(focus).max(1);
        let rings = max_depth
            .map(|d| d.clamp(1, available))
            .unwrap_or(available);

        let mut layout = Self {
            sectors: Vec::new(),
            focus,
            rings,
        };

        let has_rows = tree.node(focus).map(|n| n.count > 0).unwrap_or(false);
        if has_rows {
            layout.place(tree, focus, 0, 0.0, 1.0);
        }
        layout
    }

    fn place(&mut self, tree: &WheelTree, idx: usize, ring: usize, start: f64, end: f64) {
        let Some(node) = tree.node(idx) else {
            return;
        };
        let thickness = 1.0 / self.rings as f64;
        self.sectors.push(Sector {
            node: idx,
            ring,
            start,
            end,
            inner: ring as f64 * thickness,
            outer: (ring + 1) as f64 * thickness,
        });

        if ring + 1 >= self.rings || node.count == 0 {
            return;
        }

        let span = end - start;
        let mut cursor = start;
        for &child in &node.children {
            let Some(child_node) = tree.node(child) else {
                continue;
            };
            let share = span * child_node.count as f64 / node.count as f64;
            self.place(tree, child, ring + 1, cursor, cursor + share);
            cursor += share;
        }
    }

    /// Sector under the unit-coordinate point `(x, y)`, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&Sector> {
        let r = x.hypot(y);
        if r >= 1.0 {
            return None;
        }
        let t = x.atan2(y).rem_euclid(TAU) / TAU;
        self.sectors.iter().find(|s| s.contains(t, r))
    }
}
