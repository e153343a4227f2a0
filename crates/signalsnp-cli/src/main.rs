use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::io;
use std::path::PathBuf;

use signalsnp_rs::{run_scan, LogSink, ScanConfig};

/// signalsnp: scan GEMMA results for signal SNPs and attach snpEff annotations
#[derive(Parser)]
#[command(
    name = "signalsnp",
    version,
    about = "Scan GEMMA association results for significant SNPs and join them with snpEff annotations",
    after_help = "EXAMPLES:
    # Bonferroni threshold (0.05 / total snps), report next to the GEMMA output
    signalsnp -g output/height.assoc.txt -s height.snpEff.vcf -n 350

    # Fixed -log10 threshold, custom prefix and output directory
    signalsnp -g output/height.assoc.txt -s height.snpEff.vcf -n 350 -t 6 -p height -o reports/

NOTE:
    The prefix flag is -p or --prefix (alias --pre). A single-dash -pre is read
    as -p with the value \"re\".

OUTPUT:
    <output>/<prefix>.scanning_signalsnp.txt, tab-separated:
    Chr  Pos  ID  Ref  Alt  Pve  P_wald  -log(10)  Ann"
)]
struct Cli {
    // === Input ===
    /// GEMMA association results (*.assoc.txt)
    #[arg(short = 'g', long, help_heading = "Required")]
    gemma: PathBuf,

    /// snpEff annotation file (annotated VCF)
    #[arg(short = 's', long = "snp-ann", alias = "snpAnn", help_heading = "Required")]
    snp_ann: PathBuf,

    /// Number of samples in the GEMMA model
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Required")]
    number: u32,

    // === Options ===
    /// -log10 p-value threshold (0 = 0.05 / total snps)
    #[arg(short = 't', long, default_value = "0.0", help_heading = "Optional")]
    threshold: f64,

    /// Prefix of the output (default: GEMMA file name without extension)
    #[arg(short = 'p', long, alias = "pre", help_heading = "Optional")]
    prefix: Option<String>,

    /// Output directory (default: directory of the GEMMA file)
    #[arg(short = 'o', long, help_heading = "Optional")]
    output: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> ScanConfig {
        ScanConfig {
            assoc_path: self.gemma,
            annotation_path: self.snp_ann,
            sample_count: self.number,
            threshold: self.threshold,
            prefix: self.prefix,
            output_dir: self.output,
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config();
    let stdout = io::stdout();
    let outcome = run_scan(&config, &LogSink, &mut stdout.lock())?;
    info!("The result file is {}", outcome.output_path.display());
    info!("Done");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run(Cli::parse()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
