use fairround_core::{verify, SeedSet, VerificationConfig};

fn main() {
    // Example round check
    let seeds = SeedSet::new("example-server-seed", "example-client-seed", "1");
    let config = VerificationConfig::default();
    match verify(&seeds, &config) {
        Ok(r) => println!(
            "hash={} u32={} float={} multiplier={}",
            r.hash, r.raw_int, r.unit_float, r.multiplier
        ),
        Err(e) => eprintln!("cannot verify: {e}"),
    }
}
