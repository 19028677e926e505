use clap::*;
use lineage::libs::forest::Forest;
use lineage::libs::io;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("forest")
        .about("Lay out a genotype -> parent table as a tree")
        .after_help(
            r###"
Reads the edges written by `lineage nest` and prints the tree hanging from
the root genotype. Fails if an edge points to an unknown parent or if some
genotypes form a cycle.

Examples:
1. Newick:
   lineage forest tests/lineage/five.edges.tsv

2. Create an image (requires Graphviz installed):
   lineage forest tests/lineage/five.edges.tsv --format dot | dot -Tpng -o lineage.png
"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Edge table, TSV or .xlsx (sheet `edges`)"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .num_args(1)
                .default_value("genotype-0")
                .help("Label of the root genotype"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .num_args(1)
                .default_value("newick")
                .value_parser(["newick", "dot"])
                .help("Output format"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let opt_root = args.get_one::<String>("root").unwrap();
    let opt_format = args.get_one::<String>("format").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let edges = io::read_edges(infile, io::EDGES_SHEET)?;
    let forest = Forest::from_parents(opt_root, &edges)?;

    let out_string = match opt_format.as_str() {
        "dot" => forest.to_dot(),
        _ => forest.to_newick() + "\n",
    };
    writer.write_all(out_string.as_ref())?;

    Ok(())
}
