use anyhow::{Context, Result};
use clap::Parser;
use code_listing::{
    print_summary, report_failures, BatchSummary, ListingConfig, ListingGenerator, ListingOptions,
};
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

/// Render annotated source files as LaTeX code listings
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Source files to render, printed in this order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Title to use instead of the one in the file header
    #[arg(short = 'c', long)]
    custom_title: Option<String>,

    /// Title each listing with its file name
    #[arg(long, conflicts_with = "custom_title")]
    appendix: bool,

    /// Disable per-region hash prefixes
    #[arg(long)]
    no_hash: bool,

    /// Omit description and complexity
    #[arg(long)]
    no_desc: bool,

    /// Render files flagged noprint as well
    #[arg(long)]
    print_all: bool,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of files rendered at once
    #[arg(short, long)]
    jobs: Option<usize>,
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

/// Returns whether every file rendered.
fn run(cli: Cli) -> Result<bool> {
    let mut config = ListingConfig::load(cli.config.as_deref())?;
    if cli.print_all {
        config.print_all = true;
        log::info!("Printing all files");
    }
    if let Some(jobs) = cli.jobs {
        anyhow::ensure!(jobs > 0, "--jobs must be at least 1");
        config.jobs = Some(jobs);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let generator = ListingGenerator::new(&config);
    let start = Instant::now();

    let results = runtime.block_on(async {
        if cli.appendix {
            let mut results = Vec::with_capacity(cli.files.len());
            for path in &cli.files {
                let options = listing_options(&cli, ListingOptions::appendix(path));
                results.push((path.clone(), generator.render_file(path, &options).await));
            }
            results
        } else {
            let options = listing_options(
                &cli,
                ListingOptions {
                    custom_title: cli.custom_title.clone(),
                    ..ListingOptions::default()
                },
            );
            generator.render_batch(&cli.files, &options).await
        }
    });

    for (_, result) in &results {
        if let Ok(listing) = result {
            if !listing.is_empty() {
                println!("{}", listing);
            }
        }
    }

    let summary = BatchSummary::from_results(&results);
    report_failures(&results);
    if results.len() > 1 {
        print_summary(&summary, start.elapsed());
    }

    Ok(summary.failed == 0)
}

fn listing_options(cli: &Cli, base: ListingOptions) -> ListingOptions {
    ListingOptions {
        show_hash: !cli.no_hash,
        show_description: !cli.no_desc,
        ..base
    }
}
