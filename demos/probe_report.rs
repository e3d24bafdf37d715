use std::error::Error as StdError;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use coalesced_hash::CoalescedSet;
use coalesced_hash::Error;
use coalesced_hash::IdentityState;
use coalesced_hash::Variant;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const PACKING_FACTORS: [f64; 7] = [0.2, 0.4, 0.6, 0.8, 0.9, 0.95, 0.99];

const RULE: &str = "------------------------------------------------------------------------------------------------------------------------";

/// Mean number of probes for successful lookups across coalesced hashing
/// variants.
#[derive(Parser, Debug)]
struct Args {
    /// File of whitespace-separated integer keys.
    #[arg(required_unless_present = "generate")]
    input: Option<PathBuf>,

    /// Generate this many random keys instead of reading a file.
    #[arg(short = 'g', long = "generate", conflicts_with = "input")]
    generate: Option<usize>,

    /// Seed for generated keys.
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,

    #[arg(short = 't', long = "table_size", default_value_t = 13093)]
    table_size: usize,

    #[arg(short = 'a', long = "address_factor", default_value_t = 0.86)]
    address_factor: f64,

    /// Report destination. Defaults to `<input>.log`, or stdout for
    /// generated keys.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only run these variants.
    #[arg(short = 'v', long = "variant")]
    variants: Vec<Variant>,
}

fn read_keys(path: &Path) -> Result<Vec<i64>, Box<dyn StdError>> {
    let text = fs::read_to_string(path)?;
    let mut keys = Vec::new();
    for token in text.split_whitespace() {
        keys.push(token.parse::<i64>()?);
    }
    Ok(keys)
}

fn log_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".log");
    PathBuf::from(name)
}

fn generate_keys(count: usize, seed: u64) -> Vec<i64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| rng.random_range(0..i32::MAX as i64))
        .collect()
}

/// Inserts keys until `count` distinct ones are stored and returns the mean
/// number of probes needed to find each of them again.
fn mean_probes(
    variant: Variant,
    args: &Args,
    keys: &[i64],
    packing_factor: f64,
) -> Result<f64, Error> {
    let mut set = CoalescedSet::with_hasher(
        args.table_size,
        variant.config(args.address_factor),
        IdentityState,
    )?;
    let count = (set.size() as f64 * packing_factor).round() as usize;

    let mut inserted = Vec::with_capacity(count);
    let mut duplicates = 0usize;
    for &key in keys {
        if inserted.len() == count {
            break;
        }
        match set.insert(key) {
            Ok(()) => inserted.push(key),
            Err(Error::DuplicateKey) => duplicates += 1,
            Err(err) => return Err(err),
        }
    }

    if duplicates > 0 {
        log::debug!("{variant}: skipped {duplicates} duplicate keys");
    }
    if inserted.len() < count {
        log::warn!(
            "{variant}: only {} distinct keys available for packing factor {packing_factor}",
            inserted.len()
        );
    }
    if inserted.is_empty() {
        return Ok(0.0);
    }

    let total: usize = inserted.iter().map(|key| set.find(key).probes()).sum();
    Ok(total as f64 / inserted.len() as f64)
}

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let keys = match (&args.input, args.generate) {
        (Some(path), _) => {
            log::info!("reading keys from {}", path.display());
            read_keys(path)?
        }
        (None, Some(count)) => generate_keys(count, args.seed),
        (None, None) => unreachable!("clap requires an input or --generate"),
    };
    log::info!("loaded {} keys", keys.len());

    let output = args
        .output
        .clone()
        .or_else(|| args.input.as_deref().map(log_path));
    let mut out: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "Table 3.1 MEAN NUMBER OF PROBES FOR SUCCESSFUL LOOKUP( TABLE SIZE = {} ) FOR",
        args.table_size
    )?;
    writeln!(out, " VARIANTS OF COALESCED HASHING")?;
    write!(out, "  &")?;
    for packing_factor in PACKING_FACTORS {
        write!(out, "\t{packing_factor}\t")?;
    }
    writeln!(out)?;
    writeln!(out, "Method")?;
    writeln!(out, "{RULE}")?;

    let variants = if args.variants.is_empty() {
        Variant::ALL.to_vec()
    } else {
        args.variants.clone()
    };

    for variant in variants {
        log::info!("running {variant}");
        write!(out, "{variant}\t")?;
        for packing_factor in PACKING_FACTORS {
            let mean = mean_probes(variant, &args, &keys, packing_factor)?;
            log::info!("{variant} packing factor {packing_factor}: {mean:.4} probes");
            write!(out, "{mean:.4}\t\t")?;
        }
        writeln!(out)?;
    }
    out.flush()?;

    if let Some(path) = output {
        log::info!("report written to {}", path.display());
    }
    Ok(())
}
