//! In-memory road graph.
//!
//! Nodes are snapped to with an R*-tree over their planar (lat, lon)
//! coordinates. Paths are found with Dijkstra on edge length in metres.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::path::{Path, PathBuf};

use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RoutingUnavailable;
use crate::geometry::{Point, haversine_m};
use crate::network::{NetworkNode, RoadNetworkProvider};

type IndexedNode = GeomWithData<[f64; 2], usize>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u64,
    pub location: Point,
}

/// One-way road segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: u64,
    pub to: u64,
    pub length_m: f64,
}

impl GraphEdge {
    pub fn new(from: u64, to: u64, length_m: f64) -> Self {
        Self { from, to, length_m }
    }

    /// Both directions of a two-way road.
    pub fn two_way(a: u64, b: u64, length_m: f64) -> [Self; 2] {
        [Self::new(a, b, length_m), Self::new(b, a, length_m)]
    }
}

/// Serialized form of a [`RoadGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadGraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} is listed more than once")]
    DuplicateNode(u64),

    #[error("node {0} has non-finite coordinates")]
    NonFiniteNode(u64),

    #[error("edge {from} -> {to} references an unknown node")]
    DanglingEdge { from: u64, to: u64 },

    #[error("edge {from} -> {to} has invalid length {length_m}")]
    InvalidLength { from: u64, to: u64, length_m: f64 },

    #[error("failed to read road graph from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse road graph: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct RoadGraph {
    nodes: Vec<GraphNode>,
    index_of: HashMap<u64, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    tree: RTree<IndexedNode>,
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

impl RoadGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Result<Self, GraphError> {
        let mut index_of = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if !node.location.is_finite() {
                return Err(GraphError::NonFiniteNode(node.id));
            }
            if index_of.insert(node.id, index).is_some() {
                return Err(GraphError::DuplicateNode(node.id));
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            let (Some(&from), Some(&to)) = (index_of.get(&edge.from), index_of.get(&edge.to)) else {
                return Err(GraphError::DanglingEdge {
                    from: edge.from,
                    to: edge.to,
                });
            };
            if !edge.length_m.is_finite() || edge.length_m < 0.0 {
                return Err(GraphError::InvalidLength {
                    from: edge.from,
                    to: edge.to,
                    length_m: edge.length_m,
                });
            }
            adjacency[from].push((to, edge.length_m));
        }

        let tree = RTree::bulk_load(
            nodes
                .iter()
                .enumerate()
                .map(|(index, node)| {
                    GeomWithData::new([node.location.lat, node.location.lon], index)
                })
                .collect(),
        );

        Ok(Self {
            nodes,
            index_of,
            adjacency,
            tree,
        })
    }

    /// Two-way graph whose edge lengths are the great-circle distance between
    /// their end nodes.
    pub fn from_segments(
        nodes: Vec<GraphNode>,
        segments: &[(u64, u64)],
    ) -> Result<Self, GraphError> {
        let locations: HashMap<u64, Point> =
            nodes.iter().map(|node| (node.id, node.location)).collect();
        let mut edges = Vec::with_capacity(segments.len() * 2);
        for &(a, b) in segments {
            let (Some(&pa), Some(&pb)) = (locations.get(&a), locations.get(&b)) else {
                return Err(GraphError::DanglingEdge { from: a, to: b });
            };
            edges.extend(GraphEdge::two_way(a, b, haversine_m(pa, pb)));
        }
        Self::new(nodes, edges)
    }

    pub fn from_data(data: RoadGraphData) -> Result<Self, GraphError> {
        Self::new(data.nodes, data.edges)
    }

    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let data: RoadGraphData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GraphError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    fn node_index(&self, id: u64) -> Result<usize, RoutingUnavailable> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or(RoutingUnavailable::UnknownNode(id))
    }

    /// Node indices along the shortest path by length, both ends included.
    fn dijkstra(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if from == to {
            return Some(vec![from]);
        }

        let n = self.nodes.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        dist[from] = 0.0;
        heap.push(State { cost: 0.0, node: from });

        while let Some(State { cost, node }) = heap.pop() {
            if node == to {
                break;
            }
            // stale entry
            if cost > dist[node] {
                continue;
            }
            for &(next, length) in &self.adjacency[node] {
                let candidate = cost + length;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(node);
                    heap.push(State { cost: candidate, node: next });
                }
            }
        }

        if dist[to].is_infinite() {
            return None;
        }

        let mut path = vec![to];
        let mut current = to;
        while let Some(previous) = prev[current] {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}

impl RoadNetworkProvider for RoadGraph {
    fn nearest_node(&self, point: Point) -> Result<NetworkNode, RoutingUnavailable> {
        if !point.is_finite() {
            return Err(RoutingUnavailable::NoNearbyNode {
                lat: point.lat,
                lon: point.lon,
            });
        }
        let found = self
            .tree
            .nearest_neighbor(&[point.lat, point.lon])
            .ok_or(RoutingUnavailable::NoNearbyNode {
                lat: point.lat,
                lon: point.lon,
            })?;
        let node = self.nodes[found.data];
        Ok(NetworkNode {
            id: node.id,
            location: node.location,
        })
    }

    fn shortest_path(
        &self,
        from: &NetworkNode,
        to: &NetworkNode,
    ) -> Result<Vec<Point>, RoutingUnavailable> {
        let start = self.node_index(from.id)?;
        let goal = self.node_index(to.id)?;
        let path = self.dijkstra(start, goal).ok_or(RoutingUnavailable::NoPath {
            from: from.id,
            to: to.id,
        })?;
        Ok(path.into_iter().map(|index| self.nodes[index].location).collect())
    }
}

/// Heap entry ordered so that `BinaryHeap` pops the cheapest node first.
/// Equal costs pop the lower node index first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
