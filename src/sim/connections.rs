//! Proximity connection graph
//!
//! Rebuilt every tick from particle positions. Pairs within the connection
//! radius (or every pair in full-matrix mode) become edges whose opacity falls
//! off with distance and with the fainter endpoint's alpha. Without persistent
//! connections, a pair that drops out of range keeps a fading edge until its
//! link alpha reaches zero.

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::particle::Particle;
use crate::settings::Config;

/// Source of candidate particle pairs
///
/// The brute-force implementation checks every pair; a spatial index can be
/// dropped in here without touching the graph.
pub trait PairQuery {
    /// Visit every unordered pair `(i, j)`, `i < j`, with their distance.
    /// With `radius = Some(r)` only pairs strictly closer than `r` are visited.
    fn for_each_pair<F: FnMut(usize, usize, f32)>(
        &self,
        positions: &[Vec2],
        radius: Option<f32>,
        visit: F,
    );
}

/// O(n²) pair scan
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForcePairs;

impl PairQuery for BruteForcePairs {
    fn for_each_pair<F: FnMut(usize, usize, f32)>(
        &self,
        positions: &[Vec2],
        radius: Option<f32>,
        mut visit: F,
    ) {
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let d = positions[i].distance(positions[j]);
                if radius.is_none_or(|r| d < r) {
                    visit(i, j, d);
                }
            }
        }
    }
}

/// A drawable connection between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Lower particle id
    pub a: u32,
    /// Higher particle id
    pub b: u32,
    pub from: Vec2,
    pub to: Vec2,
    pub distance: f32,
    pub opacity: f32,
}

/// Fade state of a pair seen in range at some point
#[derive(Debug, Clone, Copy, PartialEq)]
struct PairLink {
    fade: f32,
    /// Distance factor when last in range
    strength: f32,
}

#[inline]
fn pair_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// Per-tick connection graph over the live particles
#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph<Q: PairQuery = BruteForcePairs> {
    query: Q,
    links: BTreeMap<(u32, u32), PairLink>,
    edges: Vec<Edge>,
}

impl ConnectionGraph<BruteForcePairs> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Q: PairQuery> ConnectionGraph<Q> {
    pub fn with_query(query: Q) -> Self {
        Self {
            query,
            links: BTreeMap::new(),
            edges: Vec::new(),
        }
    }

    /// Edges produced by the last rebuild, ordered by `(a, b)`
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Pairs currently fading (or in range) in non-persistent mode
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.edges.clear();
    }

    /// Recompute edges and every particle's neighbor set
    pub fn rebuild(&mut self, particles: &mut [Particle], config: &Config) {
        self.edges.clear();
        for p in particles.iter_mut() {
            p.neighbors.clear();
        }

        let positions: Vec<Vec2> = particles.iter().map(|p| p.pos).collect();
        let max_distance = config.connection_distance;
        let line_opacity = config.line_opacity / 100.0;
        let radius = if config.full_matrix_mode {
            None
        } else if max_distance > 0.0 {
            Some(max_distance)
        } else {
            Some(0.0)
        };
        let fading = !config.persistent_connections;

        let mut seen = BTreeSet::new();
        let links = &mut self.links;
        let edges = &mut self.edges;

        self.query.for_each_pair(&positions, radius, |i, j, d| {
            let (id_i, id_j) = (particles[i].id, particles[j].id);
            let (a, b) = pair_key(id_i, id_j);
            particles[i].neighbors.insert(id_j);
            particles[j].neighbors.insert(id_i);

            let strength = if max_distance > 0.0 {
                (1.0 - d / max_distance).clamp(0.0, 1.0)
            } else {
                0.0
            };
            if fading {
                links.insert((a, b), PairLink { fade: 1.0, strength });
                seen.insert((a, b));
            }

            let (from, to) = if id_i == a {
                (positions[i], positions[j])
            } else {
                (positions[j], positions[i])
            };
            edges.push(Edge {
                a,
                b,
                from,
                to,
                distance: d,
                opacity: strength * line_opacity * particles[i].alpha.min(particles[j].alpha),
            });
        });

        if fading {
            self.fade_stale_links(particles, &positions, &seen, config);
        } else {
            self.links.clear();
        }

        self.edges.sort_by_key(|e| (e.a, e.b));
    }

    /// Decay links that left range this tick and emit their fading edges
    fn fade_stale_links(
        &mut self,
        particles: &[Particle],
        positions: &[Vec2],
        seen: &BTreeSet<(u32, u32)>,
        config: &Config,
    ) {
        let index: HashMap<u32, usize> = particles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        let line_opacity = config.line_opacity / 100.0;
        let decay = config.connection_fade_speed;

        let edges = &mut self.edges;
        self.links.retain(|&(a, b), link| {
            if seen.contains(&(a, b)) {
                return true;
            }
            let (Some(&ia), Some(&ib)) = (index.get(&a), index.get(&b)) else {
                return false;
            };
            link.fade -= decay;
            if link.fade <= 0.0 {
                return false;
            }
            let alpha = particles[ia].alpha.min(particles[ib].alpha);
            edges.push(Edge {
                a,
                b,
                from: positions[ia],
                to: positions[ib],
                distance: positions[ia].distance(positions[ib]),
                opacity: link.strength * line_opacity * alpha * link.fade,
            });
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sampler::SpawnPoint;

    fn make(id: u32, x: f32, y: f32, config: &Config) -> Particle {
        let spawn = SpawnPoint {
            pos: Vec2::new(x, y),
            size: 1.0,
            color: [1.0; 3],
        };
        // Mid-life so alpha = 1
        Particle::new(id, &spawn, [1.0; 3], Vec2::ZERO, 0.5, 1.0, config)
    }

    fn base_config() -> Config {
        Config {
            connection_distance: 100.0,
            line_opacity: 100.0,
            connection_fade_speed: 0.25,
            ..Default::default()
        }
    }

    #[test]
    fn test_edges_within_distance_only() {
        let config = base_config();
        let mut particles = vec![
            make(1, 0.0, 0.0, &config),
            make(2, 50.0, 0.0, &config),
            make(3, 500.0, 0.0, &config),
        ];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);

        assert_eq!(graph.edges().len(), 1);
        let edge = graph.edges()[0];
        assert_eq!((edge.a, edge.b), (1, 2));
        assert!((edge.opacity - 0.5).abs() < 1e-5);
        assert!(particles[0].neighbors.contains(&2));
        assert!(particles[2].neighbors.is_empty());
    }

    #[test]
    fn test_opacity_uses_fainter_endpoint_and_line_opacity() {
        let config = Config {
            line_opacity: 50.0,
            ..base_config()
        };
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 25.0, 0.0, &config)];
        particles[1].alpha = 0.4;
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        // (1 - 25/100) * 0.5 * 0.4
        assert!((graph.edges()[0].opacity - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_neighbors_symmetric_and_order_independent() {
        let config = base_config();
        let coords = [(0.0, 0.0), (30.0, 40.0), (60.0, 10.0), (300.0, 300.0), (320.0, 290.0)];
        let mut forward: Vec<Particle> = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| make(i as u32 + 1, x, y, &config))
            .collect();
        let mut reversed: Vec<Particle> = forward.iter().rev().cloned().collect();

        let mut g1 = ConnectionGraph::new();
        let mut g2 = ConnectionGraph::new();
        g1.rebuild(&mut forward, &config);
        g2.rebuild(&mut reversed, &config);

        for p in &forward {
            for n in &p.neighbors {
                let other = forward.iter().find(|q| q.id == *n);
                assert!(other.is_some_and(|q| q.neighbors.contains(&p.id)));
            }
        }
        assert_eq!(g1.edges().len(), g2.edges().len());
        for (e1, e2) in g1.edges().iter().zip(g2.edges()) {
            assert_eq!((e1.a, e1.b), (e2.a, e2.b));
            assert_eq!(e1.opacity, e2.opacity);
        }
    }

    #[test]
    fn test_full_matrix_connects_every_pair() {
        let config = Config {
            full_matrix_mode: true,
            ..base_config()
        };
        let mut particles = vec![
            make(1, 0.0, 0.0, &config),
            make(2, 500.0, 0.0, &config),
            make(3, 0.0, 500.0, &config),
        ];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        assert_eq!(graph.edges().len(), 3);
        assert!(particles.iter().all(|p| p.neighbors.len() == 2));
        // Beyond the connection distance the distance factor clamps to zero
        assert!(graph.edges().iter().all(|e| e.opacity == 0.0));
    }

    #[test]
    fn test_stale_link_fades_out() {
        let config = base_config();
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 50.0, 0.0, &config)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        let initial = graph.edges()[0].opacity;

        particles[1].pos = Vec2::new(400.0, 0.0);
        graph.rebuild(&mut particles, &config);
        assert_eq!(graph.edges().len(), 1);
        assert!((graph.edges()[0].opacity - initial * 0.75).abs() < 1e-5);
        // Out-of-range pairs are no longer neighbors
        assert!(particles[0].neighbors.is_empty());

        for _ in 0..3 {
            graph.rebuild(&mut particles, &config);
        }
        assert!(graph.edges().is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_link_rearms_on_reconnect() {
        let config = base_config();
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 50.0, 0.0, &config)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        particles[1].pos = Vec2::new(400.0, 0.0);
        graph.rebuild(&mut particles, &config);
        particles[1].pos = Vec2::new(50.0, 0.0);
        graph.rebuild(&mut particles, &config);
        assert!((graph.edges()[0].opacity - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_persistent_mode_has_no_lingering_edges() {
        let config = Config {
            persistent_connections: true,
            ..base_config()
        };
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 50.0, 0.0, &config)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        assert_eq!(graph.edges().len(), 1);

        particles[1].pos = Vec2::new(400.0, 0.0);
        graph.rebuild(&mut particles, &config);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_retired_particle_drops_links() {
        let config = base_config();
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 50.0, 0.0, &config)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        particles.pop();
        graph.rebuild(&mut particles, &config);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_zero_connection_distance_is_safe() {
        let config = Config {
            connection_distance: 0.0,
            ..base_config()
        };
        let mut particles = vec![make(1, 0.0, 0.0, &config), make(2, 0.0, 0.0, &config)];
        let mut graph = ConnectionGraph::new();
        graph.rebuild(&mut particles, &config);
        assert!(graph.edges().is_empty());
    }
}
