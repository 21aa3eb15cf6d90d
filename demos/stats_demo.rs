use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use extendible_hash::HashTable;
use extendible_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "target_len", default_value_t = 1000)]
    target_len: usize,

    /// Print the full directory dump after filling the table.
    #[arg(short = 'd', long = "dump", default_value_t = false)]
    dump: bool,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!("Filling HashTable with {} u64 values...", args.target_len);

    let mut table: HashTable<u64> = HashTable::new();
    let mut splits = 0;
    for i in 0..args.target_len {
        let value = i as u64;
        let hash = hash_u64(value);

        let buckets_before = table.bucket_count();
        match table.entry(hash, |&v| v == value, |&v| hash_u64(v)) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
        splits += table.bucket_count() - buckets_before;
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Global depth: {} ({} directory entries)",
        table.global_depth(),
        1usize << table.global_depth()
    );
    println!("Buckets: {} ({} splits)", table.bucket_count(), splits);

    table.debug_stats().print();

    if args.dump {
        println!("{:?}", table);
    }
}
