//! Prints Zipf-distributed samples, one per line. Try
//! `zipf -v 50 -s 1.6 --num 100000 --max 1000 | hist -b 100`.
mod zipf;

use std::io::{self, BufWriter, Write};

use eyre::WrapErr;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;

use crate::zipf::Zipf;

#[derive(Debug, StructOpt)]
#[structopt(name = "zipf", about = "Sample a Zipf distribution")]
struct Opt {
    /// Exponent, must be greater than 1
    #[structopt(short, default_value = "1.1")]
    s: f64,
    /// Offset, must be at least 1
    #[structopt(short, default_value = "1024")]
    v: f64,
    /// Largest value produced
    #[structopt(long, default_value = "100")]
    max: u64,
    /// Number of samples
    #[structopt(long, default_value = "100")]
    num: usize,
    #[structopt(long, default_value = "1")]
    seed: u64,
}

fn write_samples<W: Write>(opt: &Opt, mut out: W) -> eyre::Result<()> {
    let z = Zipf::new(opt.s, opt.v, opt.max).wrap_err("creating zipf")?;
    let mut rng = StdRng::seed_from_u64(opt.seed);
    for k in z.sample_iter(&mut rng).take(opt.num) {
        writeln!(out, "{}", k)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    probe::logging::init();
    let opt = Opt::from_args();
    let stdout = io::stdout();
    write_samples(&opt, BufWriter::new(stdout.lock())).wrap_err("running")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> eyre::Result<Vec<u64>> {
        let opt = Opt::from_iter(std::iter::once("zipf").chain(args.iter().copied()));
        let mut out = Vec::new();
        write_samples(&opt, &mut out)?;
        Ok(String::from_utf8(out)?
            .lines()
            .map(|l| l.parse().unwrap())
            .collect())
    }

    #[test]
    fn prints_num_samples_deterministically() {
        let a = run(&["-v", "50", "-s", "1.6", "--num", "1000", "--max", "1000"]).unwrap();
        assert_eq!(a.len(), 1000);
        assert!(a.iter().all(|k| *k <= 1000));
        assert_eq!(a, run(&["-v", "50", "-s", "1.6", "--num", "1000", "--max", "1000"]).unwrap());
    }

    #[test]
    fn default_run() {
        let a = run(&[]).unwrap();
        assert_eq!(a.len(), 100);
        assert!(a.iter().all(|k| *k <= 100));
    }

    #[test]
    fn invalid_exponent_is_an_error() {
        let err = run(&["-s", "0.5"]).unwrap_err();
        assert!(err
            .chain()
            .any(|e| e.to_string().contains("s must be greater than 1")));
    }
}
