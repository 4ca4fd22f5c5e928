//! Connection graph: line segments between particles closer than a threshold.
//!
//! Checking every unordered pair is O(n²) and is the one quadratic pass in
//! the engine. `ConnectionGraph` buckets particles into a uniform grid with
//! cells one threshold wide, so only neighbouring cells are compared. The set
//! of connected pairs and each line's opacity are identical to the all-pairs
//! scan (`brute_force_edges`), which is kept as the reference.

use std::collections::HashMap;

use glam::DVec2;

use crate::renderer::color::Color;
use crate::renderer::surface::Surface;

/// Opacity of a connection between two coincident particles.
pub const CONNECTION_OPACITY_CAP: f64 = 0.2;
pub const CONNECTION_WIDTH: f64 = 0.5;
pub const CONNECTION_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.1);

/// An undirected connection, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

impl Edge {
    fn new(i: usize, j: usize, distance: f64) -> Self {
        Edge { a: i.min(j), b: i.max(j), distance }
    }
}

/// `(1 - distance / threshold) * CONNECTION_OPACITY_CAP`.
#[inline]
pub fn connection_opacity(distance: f64, threshold: f64) -> f64 {
    (1.0 - distance / threshold) * CONNECTION_OPACITY_CAP
}

/// Every pair closer than `threshold`, by exhaustive O(n²) comparison.
pub fn brute_force_edges(positions: &[DVec2], threshold: f64) -> Vec<Edge> {
    let mut edges = Vec::new();
    if !(threshold > 0.0) {
        return edges;
    }
    for i in 0..positions.len() {
        for j in i + 1..positions.len() {
            let distance = positions[i].distance(positions[j]);
            if distance < threshold {
                edges.push(Edge::new(i, j, distance));
            }
        }
    }
    edges
}

/// Grid-accelerated connection finder. Buffers are reused across frames.
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    cells: HashMap<(i64, i64), Vec<usize>>,
    edges: Vec<Edge>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the edge set, sorted by `(a, b)`.
    pub fn rebuild(&mut self, positions: &[DVec2], threshold: f64) -> &[Edge] {
        self.edges.clear();
        self.cells.clear();
        if !(threshold > 0.0) || positions.len() < 2 {
            return &self.edges;
        }

        let cell_of = |p: DVec2| ((p.x / threshold).floor() as i64, (p.y / threshold).floor() as i64);
        for (i, p) in positions.iter().enumerate() {
            self.cells.entry(cell_of(*p)).or_default().push(i);
        }

        for (i, p) in positions.iter().enumerate() {
            let (cx, cy) = cell_of(*p);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                        continue;
                    };
                    for &j in bucket {
                        if j <= i {
                            continue;
                        }
                        let distance = p.distance(positions[j]);
                        if distance < threshold {
                            self.edges.push(Edge::new(i, j, distance));
                        }
                    }
                }
            }
        }
        self.edges.sort_by_key(|e| (e.a, e.b));
        &self.edges
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Stroke the current edges. `positions` must be the slice passed to `rebuild`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, positions: &[DVec2], threshold: f64) {
        if self.edges.is_empty() {
            return;
        }
        surface.save();
        for edge in &self.edges {
            surface.set_alpha(connection_opacity(edge.distance, threshold));
            surface.stroke_line(positions[edge.a], positions[edge.b], CONNECTION_WIDTH, CONNECTION_COLOR);
        }
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;
    use crate::renderer::surface::recording::{DrawCall, RecordingSurface};

    fn scatter(n: usize, seed: u64) -> Vec<DVec2> {
        let mut rng = Rng::new(seed);
        (0..n)
            .map(|_| DVec2::new(rng.range(-50.0, 450.0), rng.range(-50.0, 350.0)))
            .collect()
    }

    #[test]
    fn opacity_falls_off_linearly() {
        assert_eq!(connection_opacity(0.0, 100.0), CONNECTION_OPACITY_CAP);
        assert!((connection_opacity(50.0, 100.0) - 0.1).abs() < 1e-12);
        assert!(connection_opacity(99.999, 100.0) > 0.0);
    }

    #[test]
    fn grid_matches_all_pairs_scan() {
        let mut graph = ConnectionGraph::new();
        for (seed, threshold) in [(1, 40.0), (2, 120.0), (3, 7.5)] {
            let positions = scatter(300, seed);
            let expected = brute_force_edges(&positions, threshold);
            let found = graph.rebuild(&positions, threshold).to_vec();
            assert_eq!(found.len(), expected.len(), "threshold {}", threshold);
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn relation_is_symmetric_in_enumeration_order() {
        let positions = scatter(80, 11);
        let mut reversed = positions.clone();
        reversed.reverse();
        let n = positions.len();

        let mut graph = ConnectionGraph::new();
        let forward: Vec<(usize, usize)> =
            graph.rebuild(&positions, 60.0).iter().map(|e| (e.a, e.b)).collect();
        let mut backward: Vec<(usize, usize)> = graph
            .rebuild(&reversed, 60.0)
            .iter()
            .map(|e| {
                let (a, b) = (n - 1 - e.b, n - 1 - e.a);
                (a.min(b), a.max(b))
            })
            .collect();
        backward.sort();
        assert_eq!(forward, backward);
    }

    #[test]
    fn grid_only_holds_occupied_cells() {
        let mut graph = ConnectionGraph::new();
        let mut positions = scatter(200, 5);
        for frame in 0..500 {
            for (i, p) in positions.iter_mut().enumerate() {
                *p += DVec2::new(1.0 + i as f64 * 0.01, 0.7);
            }
            let threshold = if frame % 50 == 0 { 120.0 } else { 5.0 };
            graph.rebuild(&positions, threshold);
            assert!(graph.cells.len() <= positions.len(), "{} cells", graph.cells.len());
        }
        graph.rebuild(&positions[..2], 120.0);
        assert!(graph.cells.len() <= 2);
    }

    #[test]
    fn threshold_is_strict() {
        let positions = [DVec2::ZERO, DVec2::new(10.0, 0.0)];
        let mut graph = ConnectionGraph::new();
        assert!(graph.rebuild(&positions, 10.0).is_empty());
        assert_eq!(graph.rebuild(&positions, 10.5).len(), 1);
        assert!(graph.rebuild(&positions, 0.0).is_empty());
    }

    #[test]
    fn draw_strokes_each_edge_with_falloff() {
        let positions = [DVec2::ZERO, DVec2::new(30.0, 0.0), DVec2::new(500.0, 500.0)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&positions, 60.0);
        let mut surface = RecordingSurface::new(600.0, 600.0);
        graph.draw(&mut surface, &positions, 60.0);
        assert_eq!(surface.lines().len(), 1);
        assert!(surface.calls.contains(&DrawCall::Alpha(connection_opacity(30.0, 60.0))));
        assert_eq!(
            surface.lines()[0],
            &DrawCall::Polyline {
                points: vec![DVec2::ZERO, DVec2::new(30.0, 0.0)],
                width: CONNECTION_WIDTH,
                color: CONNECTION_COLOR,
            }
        );
    }
}
