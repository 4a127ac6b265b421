//! Taxograph CLI
//!
//! Command-line interface for:
//! - Converting an NCBI taxonomy dump plus weights into active/pruned tree
//!   tables and a statement table
//! - Counting weights from a record table
//! - Inspecting a statement table (term views and raw stanzas)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use taxograph_ingest_taxdump::{
    convert, count_weights, read_weights, write_weights, ConvertOptions, PrunePolicy, TaxDump,
    Weights,
};
use taxograph_model::{write_statement, write_statement_header};
use taxograph_store::{PrefixMap, Renderer, StatementStore, TreeTable};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taxograph")]
#[command(author, version, about = "Taxograph: NCBI taxonomy to statement tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a taxonomy dump into `1_active.tsv`, `2_pruned.tsv` and `statements.tsv`.
    ///
    /// Outputs are staged and only renamed into place when the whole run
    /// succeeds.
    Convert {
        /// Directory holding the extracted `.dmp` files
        taxdump: PathBuf,
        /// Weights table (`tax_id<TAB>weight`) or record table, see `--weights-format`
        weights: PathBuf,
        /// Output directory
        outdir: PathBuf,
        #[arg(long, value_enum, default_value_t = WeightsFormat::Table)]
        weights_format: WeightsFormat,
        /// Branch policy for pole pruning (highest-sum or smallest-id)
        #[arg(long)]
        prune: Option<PrunePolicy>,
        /// Emit alternative ids from `merged.dmp`
        #[arg(long)]
        include_merged: bool,
        /// Emit PubMed cross-references from `citations.dmp`
        #[arg(long)]
        include_citations: bool,
        /// JSON options file; flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Count weights from a record table into a weights table.
    CountWeights {
        /// Tab-delimited record table with a header row
        records: PathBuf,
        /// Output weights table
        #[arg(short, long)]
        out: PathBuf,
        /// JSON options file (its `records` section names the columns)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the term view of one curie as JSON.
    Show {
        /// Statement table
        statements: PathBuf,
        /// Term curie, e.g. NCBITaxon:562
        curie: String,
        /// Tree table (`1_active.tsv` or `2_pruned.tsv`) used for hierarchy and children
        #[arg(long)]
        tree: Option<PathBuf>,
        /// Extra `prefix<TAB>base` rows for IRI expansion
        #[arg(long)]
        prefixes: Option<PathBuf>,
        /// Children shown before the rest are only counted
        #[arg(long, default_value_t = taxograph_store::DEFAULT_CHILD_CAP)]
        max_children: usize,
    },

    /// Print the raw rows filed under one stanza.
    Stanza {
        /// Statement table
        statements: PathBuf,
        /// Stanza key (a term curie)
        curie: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WeightsFormat {
    /// Two columns: tax_id, weight
    Table,
    /// Record table counted per organism column
    Records,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            taxdump,
            weights,
            outdir,
            weights_format,
            prune,
            include_merged,
            include_citations,
            config,
        } => {
            let mut options = load_options(config.as_deref())?;
            if let Some(policy) = prune {
                options.prune_policy = policy;
            }
            options.include_merged |= include_merged;
            options.include_citations |= include_citations;
            cmd_convert(&taxdump, &weights, weights_format, &outdir, &options)?;
        }
        Commands::CountWeights {
            records,
            out,
            config,
        } => {
            let options = load_options(config.as_deref())?;
            cmd_count_weights(&records, &out, &options)?;
        }
        Commands::Show {
            statements,
            curie,
            tree,
            prefixes,
            max_children,
        } => {
            cmd_show(
                &statements,
                &curie,
                tree.as_deref(),
                prefixes.as_deref(),
                max_children,
            )?;
        }
        Commands::Stanza { statements, curie } => {
            cmd_stanza(&statements, &curie)?;
        }
    }
    Ok(())
}

fn load_options(config: Option<&Path>) -> Result<ConvertOptions> {
    match config {
        Some(path) => ConvertOptions::from_json_file(path),
        None => Ok(ConvertOptions::default()),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn load_weights(path: &Path, format: WeightsFormat, options: &ConvertOptions) -> Result<Weights> {
    let name = path.display().to_string();
    let weights = match format {
        WeightsFormat::Table => read_weights(open(path)?, &name)?,
        WeightsFormat::Records => count_weights(open(path)?, &name, &options.records)?,
    };
    Ok(weights)
}

fn cmd_convert(
    taxdump: &Path,
    weights_path: &Path,
    format: WeightsFormat,
    outdir: &Path,
    options: &ConvertOptions,
) -> Result<()> {
    println!(
        "{} taxonomy dump {}",
        "Converting".green().bold(),
        taxdump.display()
    );
    debug!(?options, "effective conversion options");
    let dump = TaxDump::open(taxdump)?;
    let weights = load_weights(weights_path, format, options)?;
    let summary = convert(&dump, &weights, outdir, options)?;

    println!(
        "  {} {} dump nodes, {} weighted, {} active ({} pruning)",
        "→".cyan(),
        summary.dump_nodes,
        summary.weighted_nodes,
        summary.active_nodes,
        options.prune_policy
    );
    println!(
        "  {} {} statements for {} nodes",
        "→".cyan(),
        summary.statements,
        summary.statement_nodes
    );
    for path in &summary.outputs {
        println!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}

fn cmd_count_weights(records: &Path, out: &Path, options: &ConvertOptions) -> Result<()> {
    println!("{} {}", "Counting".green().bold(), records.display());
    let weights = load_weights(records, WeightsFormat::Records, options)?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    write_weights(&mut writer, &weights)?;
    writer.flush()?;

    let total = weights.values().fold(0u64, |sum, w| sum.saturating_add(*w));
    println!(
        "  {} {} taxa, {} records",
        "→".cyan(),
        weights.len(),
        total
    );
    println!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
    Ok(())
}

fn cmd_show(
    statements: &Path,
    curie: &str,
    tree: Option<&Path>,
    prefixes: Option<&Path>,
    max_children: usize,
) -> Result<()> {
    let store = StatementStore::load(statements)?;
    let prefixes = match prefixes {
        Some(path) => PrefixMap::load(path)?,
        None => PrefixMap::default(),
    };
    let renderer = Renderer::new(&store, &prefixes).with_child_cap(max_children);

    let view = match tree {
        Some(path) => {
            let tree = TreeTable::load(path)?;
            renderer.render_with(curie, &tree)
        }
        None => renderer.render(curie),
    };
    if view.page().is_none() {
        eprintln!("{} no stanza for {}", "info:".yellow().bold(), curie);
    }
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn cmd_stanza(statements: &Path, curie: &str) -> Result<()> {
    let store = StatementStore::load(statements)?;
    let rows = store.stanza(curie);
    if rows.is_empty() {
        eprintln!("{} no stanza for {}", "info:".yellow().bold(), curie);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_statement_header(&mut out)?;
    for (_, row) in rows {
        write_statement(&mut out, row)?;
    }
    out.flush()?;
    Ok(())
}
