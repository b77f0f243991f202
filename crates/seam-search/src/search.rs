//! The geometric search engine.
//!
//! [`GeometricSearch`] owns every locator built for one problem, the
//! synthetic-node registries, and the registered element-pair locators.
//! Callers obtain locators by boundary name and get back handles; the
//! driver calls [`update`](GeometricSearch::update) each iteration and
//! [`reinit`](GeometricSearch::reinit) after topology changes.

use std::cell::RefMut;
use std::fmt;

use indexmap::IndexMap;
use seam_core::{BoundaryId, BoundaryPairKey, ConstraintSide, InterfaceId, Order, SearchError};
use tracing::{debug, info};

use crate::cache::LocatorCache;
use crate::config::SearchConfig;
use crate::context::SearchContext;
use crate::element_pair::{ElementPairLocator, SharedElementPairLocator};
use crate::nearest_node::NearestNodeLocator;
use crate::penetration::PenetrationLocator;
use crate::quadrature_nodes::{MortarView, QuadratureNodeManager};

// ── SearchKind ─────────────────────────────────────────────────────

/// Which locator families an [`update`](GeometricSearch::update) refreshes.
///
/// | kind          | quadrature | mortar | nearest node | penetration + pairs |
/// |---------------|------------|--------|--------------|---------------------|
/// | `All`         | yes        | yes    | yes          | yes                 |
/// | `Quadrature`  | yes        |        |              |                     |
/// | `NearestNode` | yes        |        | yes          |                     |
/// | `Penetration` |            |        |              | yes                 |
/// | `Mortar`      |            | yes    |              |                     |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchKind {
    /// Everything.
    All,
    /// Face quadrature node positions only.
    Quadrature,
    /// Quadrature node positions, then nearest-node searches.
    NearestNode,
    /// Penetration detection and element-pair locators.
    Penetration,
    /// Mortar node positions only.
    Mortar,
}

impl SearchKind {
    /// Whether face quadrature nodes are refreshed.
    pub fn includes_quadrature(self) -> bool {
        matches!(self, Self::All | Self::Quadrature | Self::NearestNode)
    }

    /// Whether mortar nodes are refreshed.
    pub fn includes_mortar(self) -> bool {
        matches!(self, Self::All | Self::Mortar)
    }

    /// Whether nearest-node searches run.
    pub fn includes_nearest_node(self) -> bool {
        matches!(self, Self::All | Self::NearestNode)
    }

    /// Whether penetration detection and element-pair updates run.
    pub fn includes_penetration(self) -> bool {
        matches!(self, Self::All | Self::Penetration)
    }
}

/// Engine lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// No quadrature-bearing update has run yet.
    Uninitialized,
    /// Quadrature nodes generated and element-pair locators initialized.
    Ready,
}

// ── Handles ────────────────────────────────────────────────────────

/// Handle to a cached [`NearestNodeLocator`].
///
/// Equal requests yield equal handles. Resolve with
/// [`GeometricSearch::nearest_node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NearestNodeHandle(BoundaryPairKey);

impl NearestNodeHandle {
    /// The locator's (master, slave) key.
    pub fn key(&self) -> BoundaryPairKey {
        self.0
    }
}

/// Handle to a cached [`PenetrationLocator`].
///
/// Resolve with [`GeometricSearch::penetration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PenetrationHandle(BoundaryPairKey);

impl PenetrationHandle {
    /// The locator's (master, slave) key.
    pub fn key(&self) -> BoundaryPairKey {
        self.0
    }
}

fn borrow_locator(
    interface: InterfaceId,
    locator: &SharedElementPairLocator,
) -> Result<RefMut<'_, dyn ElementPairLocator + 'static>, SearchError> {
    locator
        .try_borrow_mut()
        .map_err(|_| SearchError::LocatorBusy { interface })
}

// ── GeometricSearch ────────────────────────────────────────────────

/// Owner of all proximity searches for one mesh.
///
/// Holds shared element-pair locators, so it is neither `Send` nor `Sync`.
///
/// # Example
///
/// ```
/// use seam_core::{BoundaryId, Order, Point, ProcessorId, SearchMesh};
/// use seam_mesh::{FeAssembly, MeshBuilder};
/// use seam_search::{GeometricSearch, SearchConfig, SearchContext, SearchKind};
///
/// let mut b = MeshBuilder::new();
/// let lower = b.add_quad_grid(Point::origin(), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
/// let upper = b.add_quad_grid(Point::new(0.0, 1.1, 0.0), 2, 1, 1.0, 1.0, |_, _| ProcessorId(0));
/// b.add_boundary("top", BoundaryId(1)).unwrap();
/// b.add_boundary("bottom", BoundaryId(2)).unwrap();
/// for (e, s) in lower.top_sides() {
///     b.add_side("top", e, s).unwrap();
/// }
/// for (e, s) in upper.bottom_sides() {
///     b.add_side("bottom", e, s).unwrap();
/// }
/// let mut mesh = b.build();
/// let mut fe = FeAssembly::new(ProcessorId(0), Order::First);
///
/// let mut search = GeometricSearch::new(SearchConfig::default()).unwrap();
/// let mut ctx = SearchContext::new(&mut mesh, &mut fe);
/// let h = search.get_penetration_locator(&mut ctx, "top", "bottom", Order::First).unwrap();
/// search.update(&mut ctx, SearchKind::All).unwrap();
///
/// let pl = search.penetration(&h).unwrap();
/// assert!(pl.results().all(|(_, info)| (info.gap() - 0.1).abs() < 1e-12));
/// ```
pub struct GeometricSearch {
    config: SearchConfig,
    nearest_node_locators: LocatorCache<NearestNodeLocator>,
    penetration_locators: LocatorCache<PenetrationLocator>,
    element_pair_locators: IndexMap<InterfaceId, SharedElementPairLocator>,
    quadrature: QuadratureNodeManager,
    state: SearchState,
}

impl fmt::Debug for GeometricSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometricSearch")
            .field("config", &self.config)
            .field("nearest_node_locators", &self.nearest_node_locators.len())
            .field("penetration_locators", &self.penetration_locators.len())
            .field(
                "element_pair_locators",
                &self.element_pair_locators.keys().collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl GeometricSearch {
    /// Validate `config` and create an empty engine.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            nearest_node_locators: LocatorCache::new(),
            penetration_locators: LocatorCache::new(),
            element_pair_locators: IndexMap::new(),
            quadrature: QuadratureNodeManager::new(),
            state: SearchState::Uninitialized,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Synthetic-node registries.
    pub fn quadrature_nodes(&self) -> &QuadratureNodeManager {
        &self.quadrature
    }

    /// All nearest-node locators.
    pub fn nearest_node_locators(&self) -> &LocatorCache<NearestNodeLocator> {
        &self.nearest_node_locators
    }

    /// All penetration locators.
    pub fn penetration_locators(&self) -> &LocatorCache<PenetrationLocator> {
        &self.penetration_locators
    }

    /// Registered element-pair locators.
    pub fn element_pair_locators(&self) -> &IndexMap<InterfaceId, SharedElementPairLocator> {
        &self.element_pair_locators
    }

    /// Resolve a nearest-node handle.
    pub fn nearest_node(&self, handle: &NearestNodeHandle) -> Option<&NearestNodeLocator> {
        self.nearest_node_locators.get(&handle.0)
    }

    /// Resolve a penetration handle.
    pub fn penetration(&self, handle: &PenetrationHandle) -> Option<&PenetrationLocator> {
        self.penetration_locators.get(&handle.0)
    }

    fn ensure_nearest_node(&mut self, key: BoundaryPairKey) -> NearestNodeHandle {
        let patch_size = self.config.patch_size;
        self.nearest_node_locators.get_or_insert_with(key, || {
            debug!(%key, patch_size, "nearest-node locator created");
            NearestNodeLocator::new(key, patch_size)
        });
        NearestNodeHandle(key)
    }

    fn ensure_penetration(&mut self, key: BoundaryPairKey, order: Order) -> PenetrationHandle {
        let tolerance = self.config.tangential_tolerance;
        self.penetration_locators.get_or_insert_with(key, || {
            debug!(%key, %order, "penetration locator created");
            PenetrationLocator::new(key, order, tolerance)
        });
        PenetrationHandle(key)
    }

    fn resolve_pair(
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
    ) -> Result<(BoundaryId, BoundaryId), SearchError> {
        let master_id = ctx.mesh.boundary_id(master)?;
        let slave_id = ctx.mesh.boundary_id(slave)?;
        ctx.mesh.add_ghosted_boundary(master_id);
        ctx.mesh.add_ghosted_boundary(slave_id);
        Ok((master_id, slave_id))
    }

    // ── Nearest-node lookups ───────────────────────────────────────

    /// Nearest-node locator searching `master` for the nodes of `slave`.
    pub fn get_nearest_node_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
    ) -> Result<NearestNodeHandle, SearchError> {
        let (master_id, slave_id) = Self::resolve_pair(ctx, master, slave)?;
        Ok(self.get_nearest_node_locator_by_id(ctx, master_id, slave_id))
    }

    /// Nearest-node locator for already resolved boundary ids.
    pub fn get_nearest_node_locator_by_id(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: BoundaryId,
        slave: BoundaryId,
    ) -> NearestNodeHandle {
        ctx.mesh.add_ghosted_boundary(master);
        ctx.mesh.add_ghosted_boundary(slave);
        self.ensure_nearest_node(BoundaryPairKey::new(master, slave))
    }

    /// Nearest-node locator searching `master` for the face quadrature
    /// points of `slave`.
    ///
    /// Generates the slave's quadrature nodes now if they do not exist yet.
    pub fn get_quadrature_nearest_node_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
    ) -> Result<NearestNodeHandle, SearchError> {
        let (master_id, slave_id) = Self::resolve_pair(ctx, master, slave)?;
        let synthetic = slave_id.quadrature()?;
        self.quadrature.record_quadrature(slave_id, synthetic);
        self.quadrature
            .generate_quadrature_nodes(ctx.mesh, ctx.assembly, slave_id, synthetic)?;
        Ok(self.get_nearest_node_locator_by_id(ctx, master_id, synthetic))
    }

    /// Nearest-node locator for one side's view of a mortar interface.
    ///
    /// The master view searches `master` against mortar nodes tagged with
    /// the slave's mortar id; the slave view searches `slave` against nodes
    /// tagged with the master's mortar id. Mortar nodes are generated now.
    pub fn get_mortar_nearest_node_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
        side: ConstraintSide,
    ) -> Result<NearestNodeHandle, SearchError> {
        let (master_id, slave_id) = Self::resolve_pair(ctx, master, slave)?;
        if ctx.mesh.mortar_interface(master_id, slave_id).is_none() {
            return Err(SearchError::MissingMortarInterface {
                master: master_id,
                slave: slave_id,
            });
        }
        let (operative, other) = match side {
            ConstraintSide::Master => (master_id, slave_id),
            ConstraintSide::Slave => (slave_id, master_id),
        };
        let synthetic = other.mortar()?;
        let key = BoundaryPairKey::new(operative, synthetic);
        let view = MortarView {
            interface: BoundaryPairKey::new(master_id, slave_id),
            side,
            synthetic,
        };
        self.quadrature.record_mortar_view(key, other, view)?;
        self.quadrature
            .generate_mortar_nodes(ctx.mesh, ctx.assembly, key)?;
        Ok(self.get_nearest_node_locator_by_id(ctx, operative, synthetic))
    }

    // ── Penetration lookups ────────────────────────────────────────

    /// Penetration locator of `slave` nodes into `master`.
    ///
    /// `order` is recorded on first creation; later requests for the same
    /// pair return the existing locator unchanged.
    pub fn get_penetration_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
        order: Order,
    ) -> Result<PenetrationHandle, SearchError> {
        let nnl = self.get_nearest_node_locator(ctx, master, slave)?;
        Ok(self.ensure_penetration(nnl.key(), order))
    }

    /// Penetration locator of `slave`'s face quadrature points into `master`.
    pub fn get_quadrature_penetration_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
        order: Order,
    ) -> Result<PenetrationHandle, SearchError> {
        let nnl = self.get_quadrature_nearest_node_locator(ctx, master, slave)?;
        Ok(self.ensure_penetration(nnl.key(), order))
    }

    /// Penetration locator for one side's view of a mortar interface.
    pub fn get_mortar_penetration_locator(
        &mut self,
        ctx: &mut SearchContext<'_>,
        master: &str,
        slave: &str,
        side: ConstraintSide,
        order: Order,
    ) -> Result<PenetrationHandle, SearchError> {
        let nnl = self.get_mortar_nearest_node_locator(ctx, master, slave, side)?;
        Ok(self.ensure_penetration(nnl.key(), order))
    }

    // ── Element-pair locators ──────────────────────────────────────

    /// Register `locator` under `interface`, returning any locator it replaces.
    pub fn add_element_pair_locator(
        &mut self,
        interface: InterfaceId,
        locator: SharedElementPairLocator,
    ) -> Option<SharedElementPairLocator> {
        debug!(%interface, "element-pair locator registered");
        self.element_pair_locators.insert(interface, locator)
    }

    /// The locator registered under `interface`.
    pub fn element_pair_locator(&self, interface: InterfaceId) -> Option<&SharedElementPairLocator> {
        self.element_pair_locators.get(&interface)
    }

    // ── Driving ────────────────────────────────────────────────────

    /// Largest patch percentage over all nearest-node locators; `0.0` when
    /// there are none.
    pub fn max_patch_percentage(&self) -> f64 {
        self.nearest_node_locators
            .iter()
            .map(|(_, nnl)| nnl.max_patch_percentage())
            .fold(0.0, f64::max)
    }

    /// Refresh the locator families selected by `kind` from current
    /// positions. Node identities never change here.
    ///
    /// Fails with [`SearchError::LocatorBusy`] if a registered element-pair
    /// locator is borrowed by the caller at the time.
    pub fn update(&mut self, ctx: &mut SearchContext<'_>, kind: SearchKind) -> Result<(), SearchError> {
        let mesh = &mut *ctx.mesh;
        let assembly = &mut *ctx.assembly;
        debug!(?kind, state = ?self.state, "search update");

        if kind.includes_quadrature() {
            if self.state == SearchState::Uninitialized {
                self.quadrature.generate_all_quadrature_nodes(mesh, assembly)?;
                for (&interface, locator) in &self.element_pair_locators {
                    borrow_locator(interface, locator)?.reinit(mesh)?;
                }
                self.state = SearchState::Ready;
            }
            self.quadrature.update_all_quadrature_nodes(mesh, assembly)?;
        }

        if kind.includes_mortar() {
            self.quadrature.update_mortar_nodes(mesh, assembly)?;
        }

        if kind.includes_nearest_node() {
            for nnl in self.nearest_node_locators.values_mut() {
                nnl.find_nodes(mesh)?;
            }
        }

        if kind.includes_penetration() {
            for pl in self.penetration_locators.values_mut() {
                let Some(nnl) = self.nearest_node_locators.get(&pl.nearest_node_key()) else {
                    continue;
                };
                pl.detect_penetration(mesh, nnl)?;
            }
            for (&interface, locator) in &self.element_pair_locators {
                borrow_locator(interface, locator)?.update(mesh)?;
            }
        }
        Ok(())
    }

    /// Rebuild everything after a topology change: regenerate synthetic
    /// nodes from scratch and invalidate every locator.
    pub fn reinit(&mut self, ctx: &mut SearchContext<'_>) -> Result<(), SearchError> {
        let mesh = &mut *ctx.mesh;
        let assembly = &mut *ctx.assembly;
        info!(
            nearest_node = self.nearest_node_locators.len(),
            penetration = self.penetration_locators.len(),
            element_pair = self.element_pair_locators.len(),
            "reinitializing geometric search"
        );

        mesh.clear_quadrature_nodes();
        self.quadrature.clear_quadrature_registry();
        self.quadrature.reinit_quadrature_nodes(mesh, assembly)?;
        self.quadrature.reinit_mortar_nodes(mesh, assembly)?;

        for nnl in self.nearest_node_locators.values_mut() {
            nnl.reinit();
        }
        for pl in self.penetration_locators.values_mut() {
            pl.reinit();
        }
        for (&interface, locator) in &self.element_pair_locators {
            borrow_locator(interface, locator)?.reinit(mesh)?;
        }
        Ok(())
    }

    /// Ask the mesh to ghost off-process elements near every patch.
    pub fn update_ghosted_elems(&self, ctx: &mut SearchContext<'_>) {
        let processor = ctx.assembly.processor_id();
        for (_, nnl) in self.nearest_node_locators.iter() {
            nnl.update_ghosted_elems(ctx.mesh, processor);
        }
    }

    /// Invalidate every nearest-node locator, leaving everything else alone.
    pub fn clear_nearest_node_locators(&mut self) {
        for nnl in self.nearest_node_locators.values_mut() {
            nnl.reinit();
        }
    }
}
