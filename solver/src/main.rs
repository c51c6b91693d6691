use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use posetcover::{parse_orders, AnchorPair, Label, OrderSet, PartialOrder, PosetCover, Solver, SolverConfig};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Minimum poset covers of sets of linear orders.
///
/// Orders are written as digit strings (`2134`) or comma separated labels (`10,2,1`). When none are given on the
/// command line they are read from stdin, separated by whitespace.
#[derive(Debug, Parser)]
#[command(name = "solver", version)]
struct Cli {
    /// TOML file with `max_labels`, `time_limit_seconds` and `parallel`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find a smallest set of posets whose linear extensions are exactly the given orders.
    Solve { orders: Vec<String> },

    /// Look for a cover by exactly K posets.
    ExactK {
        #[arg(short)]
        k: usize,
        orders: Vec<String>,
    },

    /// List the linear extensions of the poset on labels 1..=N given by relations like `1<3`.
    Extensions {
        #[arg(long)]
        labels: Label,
        relations: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SolverConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SolverConfig::default(),
    };
    debug!(event = "config", ?config);
    let solver = Solver::new(config);

    match cli.command {
        Command::Solve { orders } => {
            let cover = solver.solve(&read_orders(&orders)?)?;
            print_cover(&cover, cli.format)?;
        }
        Command::ExactK { k, orders } => match solver.exact_k(&read_orders(&orders)?, k)? {
            Some(cover) => print_cover(&cover, cli.format)?,
            None if cli.format == Format::Json => println!("null"),
            None => println!("no cover by {k} posets found"),
        },
        Command::Extensions { labels, relations } => {
            let relation = parse_relation(&relations, labels)?;
            let labels = (1..=labels).collect::<Vec<_>>();
            let extensions = relation.linear_extensions(&labels);
            let cover_relation = relation.hasse_diagram(&labels).cover_relation();

            match cli.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&json!({
                    "cover_relation": cover_relation,
                    "extensions": extensions,
                }))?),
                Format::Text => {
                    println!("cover relation: {cover_relation}");
                    println!("{} linear extensions", extensions.len());
                    for order in &extensions {
                        println!("  {order}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn read_orders(args: &[String]) -> Result<OrderSet> {
    let text = if args.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("reading orders from stdin")?;
        buf
    } else {
        args.join(" ")
    };

    let orders = parse_orders(&text)?;
    if orders.is_empty() {
        bail!("no linear orders given");
    }
    Ok(orders)
}

fn parse_relation(args: &[String], labels: Label) -> Result<PartialOrder> {
    let mut relation = PartialOrder::new();
    for arg in args {
        let AnchorPair(a, b) = arg.parse()?;
        if !(1..=labels).contains(&a) || !(1..=labels).contains(&b) {
            bail!("relation {arg} mentions a label outside 1..={labels}");
        }
        relation.insert(a, b);
    }
    Ok(relation)
}

fn print_cover(cover: &PosetCover, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(cover)?),
        Format::Text => {
            println!("{} posets", cover.len());
            for (i, (leg, cover_relation)) in cover.legs().iter().zip(cover.cover_relations()).enumerate() {
                println!("poset {}: {}", i + 1, cover_relation);
                println!("  {}", leg.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["solver", "--format", "json", "exact-k", "-k", "2", "123", "132"]).unwrap();
        assert_eq!(cli.format, Format::Json);
        assert!(matches!(cli.command, Command::ExactK { k: 2, ref orders } if orders.len() == 2));
    }

    #[test]
    fn relations_stay_inside_the_labels() {
        let relation = parse_relation(&["1<3".to_string(), "2<3".to_string()], 3).unwrap();
        assert_eq!(relation.to_string(), "1<3 2<3");
        assert!(parse_relation(&["1<4".to_string()], 3).is_err());
        assert!(parse_relation(&["1-2".to_string()], 3).is_err());
    }
}
