use interdex::*;
use interdex::{algo::InterDexPass, plugin::PluginRegistry};
use tracing_subscriber::EnvFilter;

/// Re-partitions a build's classes into startup-friendly dexes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to input CSV (dex,name,cost,label[,mixed_mode[,referenced]])
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:          PathBuf,

    /// Pass configuration (JSON object)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    config:         Option<PathBuf>,

    /// Overrides linear_alloc_limit
    #[arg(short, long)]
    #[arg(value_parser = clap::value_parser!(Cost))]
    limit:          Option<Cost>,

    /// Overrides scroll_classes_file
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    scroll_classes: Option<PathBuf>,

    /// Do not seal dexes with canary classes
    #[arg(long, default_value_t = false)]
    no_canaries:    bool,

    /// Behave as if the build had no keep rules (the pass does nothing)
    #[arg(long, default_value_t = false)]
    no_rules:       bool,

    /// Print every class, not just per-dex summaries
    #[arg(short, long, default_value_t = false)]
    verbose:        bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Args::parse();
    anyhow::ensure!(cli.input.is_file(), "Invalid input path: {}", cli.input.display());

    let mut config = match cli.config {
        Some(ref path)  => PassConfig::from_path(path)?,
        None            => PassConfig::default(),
    };
    if let Some(l) = cli.limit { config.linear_alloc_limit = l; }
    if let Some(ref p) = cli.scroll_classes { config.scroll_classes_file = p.display().to_string(); }
    if cli.no_canaries { config.emit_canaries = false; }

    let store = read_from_path::<ClassCSVParser, &str>(cli.input)?;
    let mut stores = vec![store];
    let pass = InterDexPass::configure(config)?;
    let registry = PluginRegistry::new();
    let mut metrics: BTreeMap<String, u64> = BTreeMap::new();

    let total = Instant::now();
    let report = pass.run(&mut stores, &registry, &mut metrics, !cli.no_rules)?;
    if report.skipped {
        println!("Nothing to do.");
        return Ok(());
    }

    for store in &report.stores {
        println!("Store {}:", store.store);
        for dex in &store.dexen {
            let flags = [
                dex.is_mixed_mode().then_some("mixed-mode"),
                dex.is_over_budget().then_some("OVER BUDGET"),
            ].into_iter().flatten().join(", ");
            println!(
                "  dex {:>3}\t{:<10}\t{:>4} classes\t{:>10} units\t{}\t{}",
                dex.ordinal(),
                dex.kind().as_str(),
                dex.len(),
                dex.cost(),
                dex.statuses().iter().map(DexStatus::as_str).join(","),
                flags,
            );
            if cli.verbose {
                for cls in dex.classes() {
                    println!("\t\t{}\t{}\t{}", cls.name, cls.cost, cls.label);
                }
            }
        }
    }

    println!(
        "Total pass time: {} μs",
        total.elapsed().as_micros()
    );
    println!("Dexes:\t\t{}\nMixed mode:\t{}\nCanaries:\t{}\nPruned:\t\t{}\nInjected:\t{}",
        report.stats.dexes,
        report.stats.mixed_mode_dexes,
        report.stats.canaries,
        report.stats.pruned_classes,
        report.stats.injected_classes,
    );
    for (k, v) in &metrics {
        println!("{k}:\t{v}");
    }

    Ok(())
}
