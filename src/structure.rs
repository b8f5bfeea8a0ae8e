//! Core data structures and algorithms for rod-and-anchor structures.

use std::collections::HashSet;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, trace, warn};

use crate::anchor::Anchor;
use crate::errors::{ConsistencyError, StructureEditError};
use crate::geometry::SpherePoint;
use crate::handle::{AnchorId, Generations, RodId};
use crate::rod::{Rod, RodSnapshot};

/// Container for anchors and the rods joining them.
///
/// Anchors and rods are addressed by handles that stay valid while other
/// anchors and rods are removed. Once an anchor or rod is removed its handle
/// never resolves again, even after the underlying slot is reused for a new
/// element: every lookup through it reports `None` or an `Unknown*` error.
///
/// Every rod caches whether it is extensible, meaning that no path of other
/// rods joins its endpoints. The cache is filled when the rod is created and
/// is only flagged as stale, never recomputed, when the topology changes
/// afterwards; call [`Structure::recompute_extensible`] or
/// [`Structure::recompute_all`] to refresh it.
///
/// A structure has no interior mutability. Hosts sharing one between threads
/// should guard it with a single lock held for each edit or traversal.
#[derive(Clone, Debug, Default)]
pub struct Structure {
    /// Anchors are nodes and rods are edges.
    graph: StableUnGraph<Anchor, Rod>,
    /// Generation of every node slot.
    anchor_generations: Generations,
    /// Generation of every edge slot.
    rod_generations: Generations,
    /// Incremented on every change to the rod network.
    revision: u64,
}

impl Structure {
    /// Create an empty structure.
    ///
    /// # Examples
    /// ```
    /// use spheretruss::Structure;
    ///
    /// let structure = Structure::new();
    /// assert_eq!(structure.anchor_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            anchor_generations: Generations::default(),
            rod_generations: Generations::default(),
            revision: 0,
        }
    }

    /// Return the number of anchors in the structure.
    #[must_use]
    pub fn anchor_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of rods in the structure.
    #[must_use]
    pub fn rod_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add an anchor to the structure.
    ///
    /// Any rods already listed on `anchor` are dropped; incidence is managed by
    /// the structure.
    ///
    /// # Examples
    /// ```
    /// use spheretruss::{Anchor, Structure};
    ///
    /// let mut structure = Structure::new();
    /// let anchor = structure.add_anchor(Anchor::from_polar(1.0, 2.0, 3.0));
    /// assert_eq!(structure.anchor(anchor).map(Anchor::mass), Some(3.0));
    /// ```
    pub fn add_anchor(&mut self, mut anchor: Anchor) -> AnchorId {
        let dropped = anchor.take_rods();
        if !dropped.is_empty() {
            warn!(count = dropped.len(), "discarding rods listed on a new anchor");
        }
        let node = self.graph.add_node(anchor);
        let id = self.anchor_id(node);
        debug!(anchor = ?id, "added anchor");
        id
    }

    /// Borrow an anchor.
    #[must_use]
    pub fn anchor(&self, anchor: AnchorId) -> Option<&Anchor> {
        self.node(anchor).map(|node| &self.graph[node])
    }

    /// Move an anchor across the sphere by the given angles.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `anchor` is not part of this structure.
    pub fn translate_anchor(
        &mut self,
        anchor: AnchorId,
        d_theta: f64,
        d_phi: f64,
    ) -> Result<(), StructureEditError> {
        self.anchor_mut(anchor)?.translate(d_theta, d_phi);
        Ok(())
    }

    /// Replace the mass of an anchor.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `anchor` is not part of this structure.
    pub fn resize_anchor(&mut self, anchor: AnchorId, mass: f64) -> Result<(), StructureEditError> {
        self.anchor_mut(anchor)?.resize(mass);
        Ok(())
    }

    /// Remove an anchor together with every rod attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `anchor` is not part of this structure.
    pub fn remove_anchor(&mut self, anchor: AnchorId) -> Result<Anchor, StructureEditError> {
        let node = self.require_node(anchor)?;
        let attached: Vec<EdgeIndex> = self.graph.edges(node).map(|edge| edge.id()).collect();
        for edge in attached {
            self.remove_rod(self.rod_id(edge))?;
        }
        let mut removed = self
            .graph
            .remove_node(node)
            .ok_or(StructureEditError::UnknownAnchor(anchor))?;
        self.anchor_generations.retire(node.index());
        removed.take_rods();
        debug!(?anchor, "removed anchor");
        Ok(removed)
    }

    /// Connect two existing anchors with a new rod.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when either anchor is not part of
    /// this structure and [`StructureEditError::SelfLoop`] when `head` and `tail` are
    /// the same anchor.
    ///
    /// # Examples
    /// ```
    /// use spheretruss::{Anchor, Structure};
    ///
    /// let mut structure = Structure::new();
    /// let a = structure.add_anchor(Anchor::from_polar(0.5, 0.0, 1.0));
    /// let b = structure.add_anchor(Anchor::from_polar(0.5, 2.0, 1.0));
    /// let c = structure.add_anchor(Anchor::from_polar(0.5, 4.0, 1.0));
    ///
    /// let ab = structure.add_rod(a, b)?;
    /// assert_eq!(structure.rod_extensible(ab), Some(true));
    ///
    /// structure.add_rod(b, c)?;
    /// structure.add_rod(c, a)?;
    /// assert_eq!(structure.rod_extensible(ab), Some(true));
    /// assert!(!structure.recompute_extensible(ab)?);
    /// # Ok::<(), spheretruss::StructureEditError>(())
    /// ```
    pub fn add_rod(&mut self, head: AnchorId, tail: AnchorId) -> Result<RodId, StructureEditError> {
        let head_node = self.require_node(head)?;
        let tail_node = self.require_node(tail)?;
        if head_node == tail_node {
            return Err(StructureEditError::SelfLoop(head));
        }
        Ok(self.connect(head_node, tail_node))
    }

    /// Create a new anchor offset from `head` by the given angles and connect it
    /// to `head` with a new rod.
    ///
    /// Returns the new rod and the new tail anchor. The tail has no other rods,
    /// so the new rod is always extensible.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `head` is not part of this structure.
    pub fn add_rod_with_offset(
        &mut self,
        head: AnchorId,
        d_theta: f64,
        d_phi: f64,
        mass: f64,
    ) -> Result<(RodId, AnchorId), StructureEditError> {
        let head_node = self.require_node(head)?;
        let location = self.graph[head_node].location().rotated(d_theta, d_phi);
        let tail = self.add_anchor(Anchor::new(location, mass));
        let rod = self.connect(head_node, tail.node);
        Ok((rod, tail))
    }

    /// Add a second rod between the endpoints of `rod`.
    ///
    /// The extensibility of the new rod is computed, not copied.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn duplicate_rod(&mut self, rod: RodId) -> Result<RodId, StructureEditError> {
        let (_, head, tail) = self.require_edge(rod)?;
        Ok(self.connect(head, tail))
    }

    /// Remove a rod and unregister it from both of its anchors.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn remove_rod(&mut self, rod: RodId) -> Result<(), StructureEditError> {
        let (edge, head, tail) = self.require_edge(rod)?;
        self.graph.remove_edge(edge);
        self.rod_generations.retire(edge.index());
        self.graph[head].remove_rod(rod);
        self.graph[tail].remove_rod(rod);
        self.touch();
        debug!(?rod, head = head.index(), tail = tail.index(), "removed rod");
        Ok(())
    }

    /// Remove the entry at `index` from an anchor's incidence list.
    ///
    /// Only the anchor's list changes: the rod stays in the structure and is
    /// still listed by its other endpoint, but traversals no longer follow it
    /// out of `anchor`. Returns `None` when `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `anchor` is not part of this structure.
    pub fn detach_rod_at(
        &mut self,
        anchor: AnchorId,
        index: usize,
    ) -> Result<Option<RodId>, StructureEditError> {
        let removed = self.anchor_mut(anchor)?.remove_rod_at(index);
        if let Some(rod) = removed {
            self.touch();
            debug!(?anchor, ?rod, index, "detached rod from anchor");
        }
        Ok(removed)
    }

    /// Remove `rod` from an anchor's incidence list, returning whether it was listed.
    ///
    /// See [`Structure::detach_rod_at`].
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownAnchor`] when `anchor` is not part of this structure.
    pub fn detach_rod(&mut self, anchor: AnchorId, rod: RodId) -> Result<bool, StructureEditError> {
        let removed = self.anchor_mut(anchor)?.remove_rod(rod);
        if removed {
            self.touch();
            debug!(?anchor, ?rod, "detached rod from anchor");
        }
        Ok(removed)
    }

    /// Return the head and tail anchors of a rod.
    #[must_use]
    pub fn rod_endpoints(&self, rod: RodId) -> Option<(AnchorId, AnchorId)> {
        let (_, head, tail) = self.require_edge(rod).ok()?;
        Some((self.anchor_id(head), self.anchor_id(tail)))
    }

    /// Return the cached extensibility of a rod without traversing the structure.
    #[must_use]
    pub fn rod_extensible(&self, rod: RodId) -> Option<bool> {
        self.edge(rod).map(|edge| self.graph[edge].extensible())
    }

    /// Return whether the topology changed since the rod's cache was computed.
    #[must_use]
    pub fn rod_is_stale(&self, rod: RodId) -> Option<bool> {
        self.edge(rod)
            .map(|edge| self.graph[edge].is_stale(self.revision))
    }

    /// Determine whether a rod can change length without straining other rods.
    ///
    /// A rod is extensible when no path of other rods joins its head to its
    /// tail. The structure and the rod's cache are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn is_extensible(&self, rod: RodId) -> Result<bool, StructureEditError> {
        let (_, head, tail) = self.require_edge(rod)?;
        Ok(self.traverse(rod, head, tail))
    }

    /// Recompute and cache the extensibility of a rod.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn recompute_extensible(&mut self, rod: RodId) -> Result<bool, StructureEditError> {
        let (edge, head, tail) = self.require_edge(rod)?;
        let extensible = self.traverse(rod, head, tail);
        self.graph[edge].refresh(extensible, self.revision);
        trace!(?rod, extensible, "recomputed extensibility");
        Ok(extensible)
    }

    /// Recompute the extensibility of every rod, returning how many cached values changed.
    pub fn recompute_all(&mut self) -> usize {
        let edges: Vec<EdgeIndex> = self.graph.edge_indices().collect();
        let mut changed = 0;
        for edge in edges {
            let Some((head, tail)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let extensible = self.traverse(self.rod_id(edge), head, tail);
            let revision = self.revision;
            let cached = &mut self.graph[edge];
            if cached.extensible() != extensible {
                changed += 1;
            }
            cached.refresh(extensible, revision);
        }
        debug!(rods = self.rod_count(), changed, "recomputed all rods");
        changed
    }

    /// Midpoint of a rod's arc.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn rod_midpoint(&self, rod: RodId) -> Result<SpherePoint, StructureEditError> {
        let (head, tail) = self.rod_locations(rod)?;
        Ok(head.midpoint(&tail))
    }

    /// Great-circle length of a rod in radians.
    ///
    /// # Errors
    ///
    /// Returns [`StructureEditError::UnknownRod`] when `rod` is not part of this structure.
    pub fn rod_arc_length(&self, rod: RodId) -> Result<f64, StructureEditError> {
        let (head, tail) = self.rod_locations(rod)?;
        Ok(head.arc_to(&tail))
    }

    /// Iterate over every anchor.
    pub fn anchors(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> + '_ {
        self.graph
            .node_indices()
            .map(move |node| (self.anchor_id(node), &self.graph[node]))
    }

    /// Iterate over every rod with its endpoint positions and cached extensibility.
    pub fn rods(&self) -> impl Iterator<Item = RodSnapshot> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (head, tail) = self.graph.edge_endpoints(edge)?;
            let rod = &self.graph[edge];
            Some(RodSnapshot {
                id: self.rod_id(edge),
                head: self.anchor_id(head),
                tail: self.anchor_id(tail),
                head_position: self.graph[head].position(),
                tail_position: self.graph[tail].position(),
                extensible: rod.extensible(),
                stale: rod.is_stale(self.revision),
            })
        })
    }

    /// Sum of the masses of all anchors.
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.anchors().map(|(_, anchor)| anchor.mass()).sum()
    }

    /// Verify that every rod is listed by both of its anchors and that anchors
    /// list only rods attached to them, each once.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConsistencyError`] found.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        for edge in self.graph.edge_indices() {
            let Some((head, tail)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let rod = self.rod_id(edge);
            for node in [head, tail] {
                if !self.graph[node].rods().contains(&rod) {
                    let anchor = self.anchor_id(node);
                    warn!(?rod, ?anchor, "rod missing from anchor incidence list");
                    return Err(ConsistencyError::MissingIncidence { rod, anchor });
                }
            }
        }

        for (anchor, node) in self.anchors() {
            let listed = node.rods();
            for (position, &rod) in listed.iter().enumerate() {
                let attached = self
                    .require_edge(rod)
                    .is_ok_and(|(_, head, tail)| head == anchor.node || tail == anchor.node);
                if !attached {
                    warn!(?rod, ?anchor, "anchor lists a rod not attached to it");
                    return Err(ConsistencyError::StrayIncidence { anchor, rod });
                }
                if listed[..position].contains(&rod) {
                    warn!(?rod, ?anchor, "anchor lists a rod twice");
                    return Err(ConsistencyError::DuplicateIncidence { anchor, rod });
                }
            }
        }
        Ok(())
    }

    /// Register a new rod between two distinct, existing anchors and compute its cache.
    fn connect(&mut self, head: NodeIndex, tail: NodeIndex) -> RodId {
        if self.graph[head]
            .location()
            .approx_eq(&self.graph[tail].location())
        {
            debug!(head = head.index(), tail = tail.index(), "rod has zero length");
        }
        self.touch();
        let edge = self
            .graph
            .add_edge(head, tail, Rod::new(false, self.revision));
        let rod = self.rod_id(edge);
        self.graph[head].add_rod(rod);
        self.graph[tail].add_rod(rod);
        let extensible = self.traverse(rod, head, tail);
        self.graph[edge].refresh(extensible, self.revision);
        debug!(?rod, head = head.index(), tail = tail.index(), extensible, "added rod");
        rod
    }

    /// Search for a path from `tail` to `head` that avoids `rod`.
    ///
    /// Walks the anchors' incidence lists depth first with an explicit stack.
    /// Each anchor is expanded and each rod followed at most once. Returns
    /// `true` when `head` is unreachable, so `rod` is extensible.
    fn traverse(&self, rod: RodId, head: NodeIndex, tail: NodeIndex) -> bool {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut traversed: HashSet<RodId> = HashSet::new();
        let mut stack = vec![tail];

        while let Some(current) = stack.pop() {
            if current == head {
                trace!(?rod, via = current.index(), "found alternate path");
                return false;
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(anchor) = self.graph.node_weight(current) else {
                continue;
            };
            trace!(?rod, anchor = current.index(), "visiting anchor");
            for &next in anchor.rods() {
                if next == rod || !traversed.insert(next) {
                    continue;
                }
                let Ok((_, a, b)) = self.require_edge(next) else {
                    continue;
                };
                let far = if a == current { b } else { a };
                if !visited.contains(&far) {
                    stack.push(far);
                }
            }
        }
        true
    }

    /// Record a change to the rod network, leaving every cached value stale.
    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Handle for the anchor currently occupying `node`.
    fn anchor_id(&self, node: NodeIndex) -> AnchorId {
        AnchorId::new(node, self.anchor_generations.current(node.index()))
    }

    /// Handle for the rod currently occupying `edge`.
    fn rod_id(&self, edge: EdgeIndex) -> RodId {
        RodId::new(edge, self.rod_generations.current(edge.index()))
    }

    /// Resolve an anchor handle, rejecting handles whose slot has been reused.
    fn node(&self, anchor: AnchorId) -> Option<NodeIndex> {
        let live = self.graph.contains_node(anchor.node)
            && self.anchor_generations.current(anchor.index()) == anchor.generation;
        live.then_some(anchor.node)
    }

    /// Resolve a rod handle, rejecting handles whose slot has been reused.
    fn edge(&self, rod: RodId) -> Option<EdgeIndex> {
        let live = self.graph.edge_weight(rod.edge).is_some()
            && self.rod_generations.current(rod.index()) == rod.generation;
        live.then_some(rod.edge)
    }

    /// Resolve an anchor handle or report it as unknown.
    fn require_node(&self, anchor: AnchorId) -> Result<NodeIndex, StructureEditError> {
        self.node(anchor)
            .ok_or(StructureEditError::UnknownAnchor(anchor))
    }

    /// Resolve a rod handle and its endpoints or report it as unknown.
    fn require_edge(
        &self,
        rod: RodId,
    ) -> Result<(EdgeIndex, NodeIndex, NodeIndex), StructureEditError> {
        self.edge(rod)
            .and_then(|edge| {
                let (head, tail) = self.graph.edge_endpoints(edge)?;
                Some((edge, head, tail))
            })
            .ok_or(StructureEditError::UnknownRod(rod))
    }

    /// Borrow an anchor mutably or report it as unknown.
    fn anchor_mut(&mut self, anchor: AnchorId) -> Result<&mut Anchor, StructureEditError> {
        let node = self.require_node(anchor)?;
        Ok(&mut self.graph[node])
    }

    /// Locations of a rod's head and tail.
    fn rod_locations(&self, rod: RodId) -> Result<(SpherePoint, SpherePoint), StructureEditError> {
        let (_, head, tail) = self.require_edge(rod)?;
        Ok((self.graph[head].location(), self.graph[tail].location()))
    }
}
