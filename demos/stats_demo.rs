use clap::Parser;
use coalesced_hash::CoalescedSet;
use coalesced_hash::Error;
use coalesced_hash::IdentityState;
use coalesced_hash::Variant;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'v', long = "variant", default_value = "LISCH")]
    variant: Variant,

    #[arg(short = 'a', long = "address_factor", default_value_t = 0.86)]
    address_factor: f64,

    /// Fraction of the table to fill.
    #[arg(short = 'l', long = "load", default_value_t = 1.0)]
    load: f64,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    println!(
        "Creating {} table with target capacity: {}",
        args.variant, args.target_capacity
    );

    let mut set = CoalescedSet::with_hasher(
        args.target_capacity,
        args.variant.config(args.address_factor),
        IdentityState,
    )?;

    println!("Actual size: {}", set.size());
    println!("Filling table with random u64 values...");

    let target = ((set.size() as f64 * args.load.clamp(0.0, 1.0)) as usize).min(set.size());
    let mut rng = SmallRng::seed_from_u64(0x00c0_a1e5);
    let mut duplicates = 0;
    while set.len() < target {
        match set.insert(rng.random::<u32>() as u64) {
            Ok(()) => {}
            Err(Error::DuplicateKey) => duplicates += 1,
            Err(err) => return Err(err),
        }
    }

    println!("Inserted {} values into table", set.len());
    println!(
        "Final load factor: {:.2}%",
        (set.len() as f64 / set.size() as f64) * 100.0
    );

    let table = set.table();
    for (probes, count) in table.probe_histogram().iter().enumerate().skip(1) {
        println!("{probes:>3} | {count}");
    }
    table.chain_stats().print();
    println!("Number of duplicate keys drawn: {duplicates}");
    Ok(())
}
