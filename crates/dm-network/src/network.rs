//! Population-weighted node/edge graph and the builder that constructs it
//! from a density raster, a places layer, and optional buildings/roads.
//!
//! Real road routing is out of scope: edges carry geometric adjacency
//! (distance, optional trimmed road geometry) used to drive the mobility
//! model's neighbor choice, not a weighted shortest-path search.

use std::collections::HashMap;

use dm_cache::FileCacheStore;
use dm_core::geo::{self, DEGREE_EQUIVALENT_IN_KM};
use dm_core::{GeoPoint, NodeId};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::{info, warn};

use crate::{NetworkError, NetworkResult};

/// Minimum inscribed radius of a node's default polygon, kilometers.
pub const MIN_CITY_RADIUS_KM: f64 = 1.5;
/// Buffer radius applied to each building polygon before union, kilometers.
pub const MIN_BUILDING_RADIUS_KM: f64 = 0.5;
/// Population floor assigned to a node with no raster cells assigned to it.
pub const MIN_POPULATION: u64 = 500;
/// Candidate-pruning and final-acceptance threshold for edge construction, km.
pub const MAX_DISTANCE_BETWEEN_ADJACENT_CITIES_KM: f64 = 8.0;

// ── Node / Edge ─────────────────────────────────────────────────────────────

/// A place in the network: a population center with a footprint polygon.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub center: GeoPoint,
    pub polygon: Vec<GeoPoint>,
    pub population: u64,

    /// Recomputed every tick by the force-update step; not part of node
    /// identity and not persisted to the cache.
    pub attractive_force: f64,
    pub repelling_force: f64,
    pub final_force: f64,
}

impl Node {
    fn new(id: String, center: GeoPoint, polygon: Vec<GeoPoint>, population: u64) -> Self {
        Self {
            id,
            center,
            polygon,
            population,
            attractive_force: 0.0,
            repelling_force: 0.0,
            final_force: 0.0,
        }
    }
}

/// Symmetric adjacency between two nodes, `a < b` by node string id.
#[derive(Debug, Clone)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub distance_m: f64,
    pub geometry: Vec<GeoPoint>,
    pub value: f64,
}

// ── R-tree entry (nearest-place lookup during raster assignment) ────────────

#[derive(Clone)]
struct PlaceEntry {
    /// `[lat, lon]`, both pre-projected to kilometers with longitude scaled
    /// by `cos(reference latitude)` so that raw Euclidean distance on this
    /// point approximates true Haversine distance near the reference
    /// latitude (degrees of longitude shrink away from the equator).
    point: [f64; 2],
    index: usize,
}

impl RTreeObject for PlaceEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PlaceEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// Projects `(lat, lon)` degrees to an approximately equal-area local
/// coordinate system in kilometers, scaling longitude by `cos(ref_lat_rad)`.
/// Valid near `ref_lat_rad`; this is the projection the nearest-place
/// assignment below uses so raw Euclidean distance on projected points
/// approximates Haversine distance (spec.md §4.4 step 2).
fn project(lat: f64, lon: f64, cos_ref_lat: f64) -> [f64; 2] {
    [lat * DEGREE_EQUIVALENT_IN_KM, lon * cos_ref_lat * DEGREE_EQUIVALENT_IN_KM]
}

// ── Raw builder inputs ────────────────────────────────────────────────────

/// One cell of a gridded population-density raster.
#[derive(Debug, Clone, Copy)]
pub struct RasterCell {
    pub lon: f64,
    pub lat: f64,
    /// Persons per square kilometer at this cell.
    pub z: f64,
}

/// A populated place from a point layer.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// A building footprint attributed to a named place, prior to buffering.
#[derive(Debug, Clone)]
pub struct BuildingPolygon {
    pub place_name: String,
    pub polygon: Vec<GeoPoint>,
}

/// A road polyline, used to trim straight edge geometry to an existing road.
#[derive(Debug, Clone)]
pub struct RoadLine {
    pub points: Vec<GeoPoint>,
}

/// Axis-aligned filter box in WGS-84 degrees.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

// ── Network ───────────────────────────────────────────────────────────────

/// The built population graph: nodes, edges, and precomputed adjacency.
pub struct Network {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// `adjacency[n]` lists every node reachable from `n` in one hop,
    /// **including `n` itself** (the at-rest / stay-put option).
    pub adjacency: Vec<Vec<NodeId>>,
    node_index: HashMap<String, NodeId>,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> NetworkResult<&Node> {
        self.nodes.get(id.index()).ok_or(NetworkError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(NetworkError::NodeNotFound(id))
    }

    pub fn node_by_string_id(&self, id: &str) -> Option<NodeId> {
        self.node_index.get(id).copied()
    }

    /// One-hop neighbors of `node`, including `node` itself.
    pub fn adjacency_of(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency[node.index()]
    }

    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
    }

    /// Number of connected components in the node/edge graph, via union-find.
    /// Reported for operator visibility, not enforced as an invariant — a
    /// disconnected network is still usable, just with some nodes mutually
    /// unreachable.
    pub fn connected_components(&self) -> usize {
        let n = self.nodes.len();
        if n == 0 {
            return 0;
        }
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], x: usize) -> usize {
            if parent[x] != x {
                parent[x] = find(parent, parent[x]);
            }
            parent[x]
        }

        for e in &self.edges {
            let (ra, rb) = (find(&mut parent, e.a.index()), find(&mut parent, e.b.index()));
            if ra != rb {
                parent[ra] = rb;
            }
        }

        (0..n)
            .map(|i| find(&mut parent, i))
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────

/// Builds a [`Network`] from a density raster, a places layer, and optional
/// buildings/roads, consulting a [`FileCacheStore`] before doing the work.
pub struct NetworkBuilder<'a> {
    cache: &'a FileCacheStore,
    cache_key_prefix: String,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(cache: &'a FileCacheStore, cache_key_prefix: impl Into<String>) -> Self {
        Self {
            cache,
            cache_key_prefix: cache_key_prefix.into(),
        }
    }

    fn nodes_key(&self) -> String {
        format!("{}-nodes", self.cache_key_prefix)
    }

    fn edges_key(&self) -> String {
        format!("{}-edges", self.cache_key_prefix)
    }

    /// Build the network, consulting the cache first. `raster`/`places` are
    /// required; `buildings`/`roads` are optional enrichments.
    pub fn build(
        &self,
        raster: &[RasterCell],
        places: &[Place],
        buildings: Option<&[BuildingPolygon]>,
        roads: Option<&[RoadLine]>,
        bbox: BoundingBox,
    ) -> NetworkResult<Network> {
        if let (Some(cached_nodes), Some(cached_edges)) = (
            self.cache.load::<NodeRow>(&self.nodes_key())?,
            self.cache.load::<EdgeRow>(&self.edges_key())?,
        ) {
            info!(nodes = cached_nodes.len(), edges = cached_edges.len(), "network loaded from cache");
            return Ok(rows_to_network(cached_nodes, cached_edges));
        }

        let nodes = build_nodes(raster, places, buildings, bbox)?;
        let (edges, adjacency) = build_edges(&nodes, roads);

        let node_rows: Vec<NodeRow> = nodes.iter().map(NodeRow::from).collect();
        let edge_rows: Vec<EdgeRow> = edges.iter().map(EdgeRow::from).collect();
        self.cache.save(&self.nodes_key(), &node_rows)?;
        self.cache.save(&self.edges_key(), &edge_rows)?;

        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeId(i as u32)))
            .collect();

        let network = Network { nodes, edges, adjacency, node_index };
        info!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            components = network.connected_components(),
            "network built"
        );
        Ok(network)
    }
}

fn build_nodes(
    raster: &[RasterCell],
    places: &[Place],
    buildings: Option<&[BuildingPolygon]>,
    bbox: BoundingBox,
) -> NetworkResult<Vec<Node>> {
    // Step 1: filter by bbox, drop empty names.
    let filtered: Vec<&Place> = places
        .iter()
        .filter(|p| !p.name.is_empty() && bbox.contains(p.lon, p.lat))
        .collect();

    if filtered.is_empty() {
        return Err(NetworkError::EmptyNodeSet);
    }

    // Step 2: assign raster cells to nearest place, sum Z -> population.
    //
    // Nearest-place assignment must use Haversine (not raw-degree Euclidean)
    // distance: a degree of longitude shrinks by cos(lat) away from the
    // equator, so raw Euclidean distance on (lat, lon) degrees can pick the
    // wrong nearest place at non-zero latitude. Both the tree's points and
    // every query point are projected through the same reference-latitude
    // scaling so the RTree's envelope pruning and `PlaceEntry::distance_2`
    // agree on the same (approximately equal-area) metric.
    let cos_ref_lat = {
        let mean_lat: f64 =
            filtered.iter().map(|p| p.lat).sum::<f64>() / filtered.len() as f64;
        mean_lat.to_radians().cos().max(1e-6)
    };
    let entries: Vec<PlaceEntry> = filtered
        .iter()
        .enumerate()
        .map(|(i, p)| PlaceEntry { point: project(p.lat, p.lon, cos_ref_lat), index: i })
        .collect();
    let idx = RTree::bulk_load(entries);

    let mut population_sum = vec![0.0f64; filtered.len()];
    let mut has_cells = vec![false; filtered.len()];
    for cell in raster {
        let query = project(cell.lat, cell.lon, cos_ref_lat);
        if let Some(nearest) = idx.nearest_neighbor(&query) {
            population_sum[nearest.index] += cell.z;
            has_cells[nearest.index] = true;
        }
    }

    // Step 3/4: default disk polygon, replaced by a building union when given.
    let mut nodes = Vec::with_capacity(filtered.len());
    for (i, place) in filtered.iter().enumerate() {
        let population = if has_cells[i] {
            population_sum[i].round().max(0.0) as u64
        } else {
            MIN_POPULATION
        }
        .max(MIN_POPULATION);

        let center = GeoPoint::new(place.lat, place.lon);
        let polygon = match buildings {
            Some(b) => {
                let owned: Vec<Vec<GeoPoint>> = b
                    .iter()
                    .filter(|bp| bp.place_name == place.name)
                    .map(|bp| buffer_polygon(&bp.polygon, MIN_BUILDING_RADIUS_KM))
                    .collect();
                if owned.is_empty() {
                    disk_polygon(center, MIN_CITY_RADIUS_KM)
                } else {
                    union_polygons(owned)
                }
            }
            None => disk_polygon(center, MIN_CITY_RADIUS_KM),
        };

        let id = format!("{}_{}", place.name, i);
        nodes.push(Node::new(id, center, polygon, population));
    }

    Ok(nodes)
}

/// A regular polygon approximating a disk of `radius_km` around `center`,
/// built in a local equirectangular degrees projection.
fn disk_polygon(center: GeoPoint, radius_km: f64) -> Vec<GeoPoint> {
    const SIDES: usize = 16;
    let radius_deg_lat = radius_km / DEGREE_EQUIVALENT_IN_KM;
    let lat_scale = center.lat.to_radians().cos().max(1e-6);
    let radius_deg_lon = radius_deg_lat / lat_scale;

    (0..SIDES)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (SIDES as f64);
            GeoPoint::new(
                center.lat + radius_deg_lat * theta.sin(),
                center.lon + radius_deg_lon * theta.cos(),
            )
        })
        .collect()
}

/// Expand every vertex of `polygon` outward from its centroid by `radius_km`.
/// A cheap stand-in for a true geometric buffer, adequate for the small
/// per-building radii this builder uses.
fn buffer_polygon(polygon: &[GeoPoint], radius_km: f64) -> Vec<GeoPoint> {
    if polygon.is_empty() {
        return Vec::new();
    }
    let centroid_lat = polygon.iter().map(|p| p.lat).sum::<f64>() / polygon.len() as f64;
    let centroid_lon = polygon.iter().map(|p| p.lon).sum::<f64>() / polygon.len() as f64;
    let centroid = GeoPoint::new(centroid_lat, centroid_lon);

    let radius_deg = radius_km / DEGREE_EQUIVALENT_IN_KM;
    polygon
        .iter()
        .map(|p| {
            let dlat = p.lat - centroid.lat;
            let dlon = p.lon - centroid.lon;
            let len = (dlat * dlat + dlon * dlon).sqrt().max(1e-9);
            GeoPoint::new(p.lat + dlat / len * radius_deg, p.lon + dlon / len * radius_deg)
        })
        .collect()
}

/// Union of several buffered building polygons into one footprint, via the
/// convex hull of all their vertices. A true polygon union is unnecessary
/// here: the footprint only needs to contain every building, not trace their
/// exact outlines.
fn union_polygons(polygons: Vec<Vec<GeoPoint>>) -> Vec<GeoPoint> {
    let points: Vec<GeoPoint> = polygons.into_iter().flatten().collect();
    convex_hull(points)
}

fn convex_hull(mut points: Vec<GeoPoint>) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return points;
    }
    points.sort_by(|a, b| a.lon.partial_cmp(&b.lon).unwrap().then(a.lat.partial_cmp(&b.lat).unwrap()));
    points.dedup_by(|a, b| a.lon == b.lon && a.lat == b.lat);
    if points.len() < 3 {
        return points;
    }

    fn cross(o: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
        (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
    }

    let mut lower = Vec::new();
    for &p in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper = Vec::new();
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn build_edges(nodes: &[Node], roads: Option<&[RoadLine]>) -> (Vec<Edge>, Vec<Vec<NodeId>>) {
    let n = nodes.len();
    let max_dist_m = MAX_DISTANCE_BETWEEN_ADJACENT_CITIES_KM * 1000.0;
    let max_deg = MAX_DISTANCE_BETWEEN_ADJACENT_CITIES_KM / DEGREE_EQUIVALENT_IN_KM;

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let ni = &nodes[i];
            let nj = &nodes[j];
            // Coarse pruning on projected delta before the exact distance.
            if (ni.center.lat - nj.center.lat).abs() > max_deg
                || (ni.center.lon - nj.center.lon).abs() > max_deg
            {
                continue;
            }
            let distance_m = ni.center.distance_m(nj.center);
            if distance_m > max_dist_m {
                continue;
            }

            let (a_id, b_id) = if ni.id < nj.id {
                (NodeId(i as u32), NodeId(j as u32))
            } else {
                (NodeId(j as u32), NodeId(i as u32))
            };
            let a_center = nodes[a_id.index()].center;
            let b_center = nodes[b_id.index()].center;

            let geometry = roads
                .and_then(|rs| nearest_road_geometry(rs, a_center, b_center))
                .unwrap_or_else(|| vec![a_center, b_center]);

            edges.push(Edge { a: a_id, b: b_id, distance_m, geometry, value: 1.0 });
        }
    }

    let mut adjacency: Vec<Vec<NodeId>> = (0..n).map(|i| vec![NodeId(i as u32)]).collect();
    for e in &edges {
        adjacency[e.a.index()].push(e.b);
        adjacency[e.b.index()].push(e.a);
    }

    (edges, adjacency)
}

/// Pick the road polyline whose midpoint is closest to the chord midpoint of
/// `a`-`b`, then trim it to the 2 km-wide corridor between the endpoints.
fn nearest_road_geometry(roads: &[RoadLine], a: GeoPoint, b: GeoPoint) -> Option<Vec<GeoPoint>> {
    if roads.is_empty() {
        return None;
    }
    let chord_mid = GeoPoint::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0);

    let nearest = roads.iter().min_by(|r1, r2| {
        let m1 = polyline_midpoint(r1);
        let m2 = polyline_midpoint(r2);
        chord_mid
            .distance_m(m1)
            .partial_cmp(&chord_mid.distance_m(m2))
            .unwrap()
    })?;

    if nearest.points.is_empty() {
        Some(geo::trim_segment_to_endpoints(a, b, 2_000.0))
    } else {
        Some(nearest.points.clone())
    }
}

fn polyline_midpoint(line: &RoadLine) -> GeoPoint {
    if line.points.is_empty() {
        return GeoPoint::new(0.0, 0.0);
    }
    line.points[line.points.len() / 2]
}

// ── Cache row shapes ──────────────────────────────────────────────────────

#[derive(serde::Serialize, serde::Deserialize)]
struct NodeRow {
    id: String,
    lat: f64,
    lon: f64,
    polygon: Vec<(f64, f64)>,
    population: u64,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id.clone(),
            lat: n.center.lat,
            lon: n.center.lon,
            polygon: n.polygon.iter().map(|p| (p.lat, p.lon)).collect(),
            population: n.population,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct EdgeRow {
    a: u32,
    b: u32,
    distance_m: f64,
    geometry: Vec<(f64, f64)>,
    value: f64,
}

impl From<&Edge> for EdgeRow {
    fn from(e: &Edge) -> Self {
        Self {
            a: e.a.0,
            b: e.b.0,
            distance_m: e.distance_m,
            geometry: e.geometry.iter().map(|p| (p.lat, p.lon)).collect(),
            value: e.value,
        }
    }
}

fn rows_to_network(node_rows: Vec<NodeRow>, edge_rows: Vec<EdgeRow>) -> Network {
    let nodes: Vec<Node> = node_rows
        .into_iter()
        .map(|r| {
            Node::new(
                r.id,
                GeoPoint::new(r.lat, r.lon),
                r.polygon.into_iter().map(|(lat, lon)| GeoPoint::new(lat, lon)).collect(),
                r.population,
            )
        })
        .collect();

    let n = nodes.len();
    let mut adjacency: Vec<Vec<NodeId>> = (0..n).map(|i| vec![NodeId(i as u32)]).collect();
    let edges: Vec<Edge> = edge_rows
        .into_iter()
        .map(|r| {
            let a = NodeId(r.a);
            let b = NodeId(r.b);
            adjacency[a.index()].push(b);
            adjacency[b.index()].push(a);
            Edge {
                a,
                b,
                distance_m: r.distance_m,
                geometry: r.geometry.into_iter().map(|(lat, lon)| GeoPoint::new(lat, lon)).collect(),
                value: r.value,
            }
        })
        .collect();

    let node_index = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), NodeId(i as u32)))
        .collect();

    if n == 0 {
        warn!("network rebuilt from cache has zero nodes");
    }

    Network { nodes, edges, adjacency, node_index }
}
