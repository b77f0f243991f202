//! Integration test: cache identity, selective updates and element-pair
//! driving on the plain (node-to-surface) contact strip.

use std::rc::Rc;

use approx::assert_relative_eq;
use seam_core::{BoundaryPairKey, InterfaceId, Order, ProcessorId, SearchError, Vector};
use seam_mesh::{FeAssembly, Mesh};
use seam_search::{
    GeometricSearch, OverlapPairLocator, SearchConfig, SearchContext, SearchKind, SearchState,
    SharedElementPairLocator,
};
use seam_test_utils::fixtures::{contact_strip, contact_strip_with, MASTER, MASTER_ID, SLAVE, SLAVE_ID};
use seam_test_utils::{init_tracing, CountingElementPairLocator};

fn ctx<'a>(mesh: &'a mut Mesh, fe: &'a mut FeAssembly) -> SearchContext<'a> {
    SearchContext::new(mesh, fe)
}

fn setup(gap: f64) -> (Mesh, FeAssembly, GeometricSearch) {
    (
        contact_strip_with(gap, |_| ProcessorId(0)),
        FeAssembly::new(ProcessorId(0), Order::First),
        GeometricSearch::new(SearchConfig::default()).unwrap(),
    )
}

fn lift_slave(mesh: &mut Mesh, dy: f64) {
    mesh.displace(|_, x| {
        if x.y > 1.0 + 1e-9 {
            Vector::new(0.0, dy, 0.0)
        } else {
            Vector::zeros()
        }
    });
}

// ── Cache identity ───────────────────────────────────────────────────

#[test]
fn equal_requests_share_one_locator() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let a = search
        .get_nearest_node_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE)
        .unwrap();
    let b = search
        .get_nearest_node_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE)
        .unwrap();
    let c = search.get_nearest_node_locator_by_id(&mut ctx(&mut mesh, &mut fe), MASTER_ID, SLAVE_ID);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert!(std::ptr::eq(
        search.nearest_node(&a).unwrap(),
        search.nearest_node(&b).unwrap()
    ));
    assert_eq!(search.nearest_node_locators().len(), 1);
}

#[test]
fn pair_order_matters() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let ab = search
        .get_nearest_node_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE)
        .unwrap();
    let ba = search
        .get_nearest_node_locator(&mut ctx(&mut mesh, &mut fe), SLAVE, MASTER)
        .unwrap();
    assert_ne!(ab, ba);
    assert_eq!(ba.key(), BoundaryPairKey::new(SLAVE_ID, MASTER_ID));
    assert_eq!(search.nearest_node_locators().len(), 2);
}

#[test]
fn first_penetration_request_fixes_order() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let a = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE, Order::First)
        .unwrap();
    let b = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE, Order::Third)
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(search.penetration(&b).unwrap().order(), Order::First);
    assert_eq!(search.penetration_locators().len(), 1);
    // The penetration lookup also built the matching nearest-node locator.
    assert_eq!(search.nearest_node_locators().len(), 1);
}

#[test]
fn unknown_boundary_creates_nothing() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let err = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, "nope", Order::First)
        .unwrap_err();
    assert_eq!(
        err,
        SearchError::UnknownBoundary {
            name: "nope".to_string()
        }
    );
    assert!(search.nearest_node_locators().is_empty());
    assert!(search.penetration_locators().is_empty());
}

// ── Selective updates ────────────────────────────────────────────────

#[test]
fn nearest_node_update_leaves_penetration_alone() {
    init_tracing();
    let (mut mesh, mut fe, mut search) = setup(0.1);
    let h = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE, Order::First)
        .unwrap();
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();

    let nn = search.penetration(&h).unwrap().nearest_node_key();
    let nn = search
        .nearest_node_locators()
        .get(&nn)
        .unwrap();
    assert_eq!(nn.nearest_nodes().count(), 4);
    for (_, info) in nn.nearest_nodes() {
        assert_relative_eq!(info.distance, 0.1, epsilon = 1e-12);
    }

    lift_slave(&mut mesh, 0.1);
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::NearestNode).unwrap();
    let nnl = search.nearest_node_locators().iter().next().unwrap().1;
    for (_, info) in nnl.nearest_nodes() {
        assert_relative_eq!(info.distance, 0.2, epsilon = 1e-12);
    }
    for (_, info) in search.penetration(&h).unwrap().results() {
        assert_relative_eq!(info.gap(), 0.1, epsilon = 1e-12);
    }

    lift_slave(&mut mesh, 0.3);
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::Penetration).unwrap();
    let nnl = search.nearest_node_locators().iter().next().unwrap().1;
    for (_, info) in nnl.nearest_nodes() {
        assert_relative_eq!(info.distance, 0.2, epsilon = 1e-12);
    }
    for (_, info) in search.penetration(&h).unwrap().results() {
        assert_relative_eq!(info.gap(), 0.4, epsilon = 1e-12);
    }
}

#[test]
fn clearing_nearest_node_locators_keeps_penetration_results() {
    let (mut mesh, mut fe, mut search) = setup(0.1);
    let h = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE, Order::First)
        .unwrap();
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    search.clear_nearest_node_locators();

    let nnl = search.nearest_node_locators().iter().next().unwrap().1;
    assert!(nnl.needs_rebuild());
    assert_eq!(nnl.nearest_nodes().count(), 0);
    assert_eq!(search.penetration(&h).unwrap().len(), 4);
    assert_eq!(search.max_patch_percentage(), 0.0);

    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    assert_eq!(search.penetration(&h).unwrap().len(), 4);
}

#[test]
fn reinit_invalidates_every_locator() {
    let (mut mesh, mut fe, mut search) = setup(0.1);
    let h = search
        .get_penetration_locator(&mut ctx(&mut mesh, &mut fe), MASTER, SLAVE, Order::First)
        .unwrap();
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    search.reinit(&mut ctx(&mut mesh, &mut fe)).unwrap();
    assert!(search.penetration(&h).unwrap().is_empty());
    assert!(search.nearest_node_locators().iter().all(|(_, n)| n.needs_rebuild()));

    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    assert_eq!(search.penetration(&h).unwrap().len(), 4);
}

// ── Element-pair locators ────────────────────────────────────────────

#[test]
fn element_pair_locators_follow_the_state_machine() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let counting = CountingElementPairLocator::new().shared();
    let shared: SharedElementPairLocator = counting.clone();
    assert!(search.add_element_pair_locator(InterfaceId(7), shared).is_none());

    // Penetration does not initialize.
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::Penetration).unwrap();
    assert_eq!(search.state(), SearchState::Uninitialized);
    assert_eq!((counting.borrow().reinits, counting.borrow().updates), (0, 1));

    // The first quadrature-bearing update does, once.
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::Quadrature).unwrap();
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::NearestNode).unwrap();
    assert_eq!(search.state(), SearchState::Ready);
    assert_eq!((counting.borrow().reinits, counting.borrow().updates), (1, 1));

    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::Mortar).unwrap();
    assert_eq!((counting.borrow().reinits, counting.borrow().updates), (1, 2));

    search.reinit(&mut ctx(&mut mesh, &mut fe)).unwrap();
    assert_eq!(counting.borrow().reinits, 2);
}

#[test]
fn registering_twice_replaces() {
    let mut search = GeometricSearch::new(SearchConfig::default()).unwrap();
    let first: SharedElementPairLocator = CountingElementPairLocator::new().shared();
    let second: SharedElementPairLocator = CountingElementPairLocator::new().shared();
    search.add_element_pair_locator(InterfaceId(1), first.clone());
    let replaced = search
        .add_element_pair_locator(InterfaceId(1), second.clone())
        .unwrap();
    assert!(Rc::ptr_eq(&replaced, &first));
    assert!(Rc::ptr_eq(
        search.element_pair_locator(InterfaceId(1)).unwrap(),
        &second
    ));
    assert_eq!(search.element_pair_locators().len(), 1);
}

#[test]
fn element_pair_failure_aborts_the_update() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    search.add_element_pair_locator(
        InterfaceId(0),
        CountingElementPairLocator::failing_on_update(1).shared(),
    );
    let err = search
        .update(&mut ctx(&mut mesh, &mut fe), SearchKind::All)
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidConfig { .. }));
}

#[test]
fn borrowed_element_pair_locator_fails_the_call() {
    let (mut mesh, mut fe, mut search) = setup(0.0);
    let counting = CountingElementPairLocator::new().shared();
    search.add_element_pair_locator(InterfaceId(5), counting.clone());

    {
        let _held = counting.borrow();
        let err = search
            .update(&mut ctx(&mut mesh, &mut fe), SearchKind::All)
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::LocatorBusy {
                interface: InterfaceId(5)
            }
        );
        let err = search.reinit(&mut ctx(&mut mesh, &mut fe)).unwrap_err();
        assert!(matches!(err, SearchError::LocatorBusy { .. }));
    }

    // Released, the same calls go through.
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::Penetration).unwrap();
    search.reinit(&mut ctx(&mut mesh, &mut fe)).unwrap();
    assert_eq!(counting.borrow().updates, 1);
}

#[test]
fn overlap_locator_is_driven_by_the_engine() {
    let mut mesh = contact_strip();
    let mut fe = FeAssembly::new(ProcessorId(0), Order::First);
    let mut search = GeometricSearch::new(SearchConfig::default()).unwrap();
    let overlap = Rc::new(std::cell::RefCell::new(OverlapPairLocator::from_boundaries(
        &mesh, MASTER_ID, SLAVE_ID, 0.0,
    )));
    search.add_element_pair_locator(InterfaceId(3), overlap.clone());
    search.update(&mut ctx(&mut mesh, &mut fe), SearchKind::All).unwrap();
    // Slave quads [0,1], [1,2], [2,3] over master quads [0,1] .. [3,4].
    assert_eq!(overlap.borrow().pairs().len(), 8);
}
