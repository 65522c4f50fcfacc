//! A command-line demonstration of the Kaleidoscope advertisement engine:
//! builds an in-memory mesh of toy nodes, each with its own RRT over the
//! same neighbor set, and runs `advertise_self` through it; separately,
//! round-trips a table's snapshot through the reference persistence
//! adapter.
//!
//! This binary is demo scaffolding, not part of the protocol core — it
//! owns no routing logic of its own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::process::exit;

use clap::{crate_description, crate_name, App, AppSettings, Arg, SubCommand};
use kaleidoscope_core::{
    AdvertisementSink, Engine, NodeId, Params, PersistenceAdapter, RoutingTable,
    TextFilePersistenceAdapter,
};

/// An in-memory stand-in for the network transport (§1's "external
/// collaborator"): every node shares the same set of neighbors but builds
/// its own independently-randomized RRT over them.
struct Mesh {
    tables: HashMap<NodeId, RoutingTable>,
    params: Params,
}

impl Mesh {
    fn new(node_count: usize, params: Params) -> Self {
        let ids: Vec<NodeId> = (0..node_count).map(|_| NodeId::random()).collect();
        let mut tables = HashMap::with_capacity(node_count);
        for &id in &ids {
            let table = RoutingTable::new();
            table.add_neighbors(ids.iter().copied().filter(|other| *other != id));
            tables.insert(id, table);
        }
        Self { tables, params }
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.tables.keys().copied().collect()
    }
}

/// Delivers a message synchronously to its destination's own engine,
/// recording every hop along the way.
struct MeshSink<'a> {
    mesh: &'a Mesh,
    hops: RefCell<Vec<(NodeId, NodeId, u32)>>,
}

impl<'a> MeshSink<'a> {
    fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            hops: RefCell::new(Vec::new()),
        }
    }
}

impl<'a> AdvertisementSink for MeshSink<'a> {
    fn send_advertisement(
        &self,
        message: kaleidoscope_core::Advertisement,
        neighbor: NodeId,
        ttl: u32,
    ) {
        self.hops.borrow_mut().push((message.sender(), neighbor, ttl));
        if let Some(table) = self.mesh.tables.get(&neighbor) {
            let engine = Engine::new(neighbor, table, self.mesh.params);
            engine.handle_advertisement(&message, self);
        }
    }
}

fn run_demo(node_count: usize, params: Params) {
    log::info!("building in-memory mesh of {node_count} nodes");
    let mesh = Mesh::new(node_count, params);
    let ids = mesh.node_ids();
    let origin = ids[0];
    let table = &mesh.tables[&origin];
    let engine = Engine::new(origin, table, params);
    let sink = MeshSink::new(&mesh);

    log::info!("{origin} advertising self with ideal reach {}", params.ideal_reach);
    engine.advertise_self(b"hello, mesh".to_vec(), &sink);

    for (from, to, ttl) in sink.hops.borrow().iter() {
        println!("{from} -> {to} (ttl {ttl})");
    }
    println!(
        "{} nodes, {} total hops",
        node_count,
        sink.hops.borrow().len()
    );
}

fn run_snapshot_round_trip(node_count: usize, path: &str) {
    let table = RoutingTable::new();
    table.add_neighbors((0..node_count).map(|_| NodeId::random()));
    let snapshot = table.snapshot();

    let adapter = TextFilePersistenceAdapter::new(path);
    if let Err(err) = adapter.store(&snapshot) {
        eprintln!("failed to store snapshot: {err}");
        exit(1);
    }
    match adapter.load() {
        Ok(loaded) if loaded == snapshot => {
            println!("round-trip OK: {} routes at {}", node_count, path);
        }
        Ok(_) => {
            eprintln!("round-trip mismatch: loaded snapshot differs from the one stored");
            exit(1);
        }
        Err(err) => {
            eprintln!("failed to load snapshot: {err}");
            exit(1);
        }
    }
}

fn main() {
    kaleidoscope_logger::setup_with_filter("kaleidoscope=info");

    let matches = App::new(crate_name!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("demo")
                .about("Run advertise_self through an in-memory mesh of toy nodes")
                .arg(
                    Arg::with_name("nodes")
                        .long("nodes")
                        .value_name("COUNT")
                        .default_value("20")
                        .help("Number of toy nodes in the mesh"),
                ),
        )
        .subcommand(
            SubCommand::with_name("snapshot-round-trip")
                .about("Round-trip a routing table snapshot through the reference adapter")
                .arg(
                    Arg::with_name("nodes")
                        .long("nodes")
                        .value_name("COUNT")
                        .default_value("50")
                        .help("Number of neighbors to seed the table with"),
                )
                .arg(
                    Arg::with_name("path")
                        .long("path")
                        .value_name("FILE")
                        .default_value("kaleidoscope-snapshot.json")
                        .help("File to store the snapshot at"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("demo", Some(sub)) => {
            let node_count: usize = sub
                .value_of("nodes")
                .unwrap()
                .parse()
                .unwrap_or_else(|_| {
                    eprintln!("--nodes must be a positive integer");
                    exit(1);
                });
            run_demo(node_count, Params::default());
        }
        ("snapshot-round-trip", Some(sub)) => {
            let node_count: usize = sub
                .value_of("nodes")
                .unwrap()
                .parse()
                .unwrap_or_else(|_| {
                    eprintln!("--nodes must be a positive integer");
                    exit(1);
                });
            let path = sub.value_of("path").unwrap();
            run_snapshot_round_trip(node_count, path);
        }
        _ => unreachable!(),
    }
}
