use std::hash::BuildHasher;

use clap::Parser;
use robin_hash::DeletionMode;
use robin_hash::HashTable;
use robin_hash::TableConfig;
use robin_hash::hash_table::Entry;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load", default_value_t = 0.75)]
    load: f64,

    /// Remove every other value after filling, leaving tombstones behind
    /// unless backward shifting is enabled.
    #[arg(long)]
    churn: bool,

    #[arg(long)]
    backward_shift: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let deletion = if args.backward_shift {
        DeletionMode::BackwardShift
    } else {
        DeletionMode::Tombstone
    };

    println!(
        "Creating HashTable with target capacity {} at load {}",
        args.target_capacity, args.load
    );

    let config = TableConfig::new()
        .with_capacity(args.target_capacity)
        .with_load(args.load)
        .with_deletion_mode(deletion);
    let mut table: HashTable<u64> = match HashTable::with_config(config) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Rejected configuration: {err}");
            std::process::exit(1);
        }
    };

    println!("Actual capacity: {}", table.capacity());
    println!("Filling table with u64 values...");

    let state = std::hash::RandomState::new();
    let num_values = args.target_capacity as u64;
    for value in 0..num_values {
        let hash = state.hash_one(value);
        match table.entry(hash, |&v| v == value, |v| state.hash_one(v)) {
            Ok(Entry::Vacant(entry)) => {
                entry.insert(value);
            }
            Ok(Entry::Occupied(_)) => panic!("Value already exists in table: {value}"),
            Err(err) => panic!("Failed to grow table: {err}"),
        }
    }

    if args.churn {
        for value in (0..num_values).step_by(2) {
            let hash = state.hash_one(value);
            if let Err(err) = table.remove(hash, |&v| v == value) {
                panic!("Failed to remove {value}: {err}");
            }
        }
    }

    println!("Table holds {} values", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    println!("Tombstones: {}", table.tombstones());

    table.probe_stats().print();
}
