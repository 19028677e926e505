use clap::*;
use lineage::libs::io;
use lineage::libs::lineage::LineageAssigner;
use std::io::Write;

use super::args;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("check")
        .about("Nest a table and compare against expected edges")
        .after_help(
            r###"
Runs `lineage nest` on <infile> and compares the result with <edges>.
Prints `genotype<TAB>expected<TAB>observed` for every genotype that differs;
a genotype missing on one side shows `-`. Exits with an error when any differ.

Examples:
1. Regression check:
   lineage check tests/lineage/five.tsv tests/lineage/five.edges.tsv
"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Sorted genotype table"),
        )
        .arg(
            Arg::new("edges")
                .required(true)
                .num_args(1)
                .index(2)
                .help("Expected edge table, TSV or .xlsx (sheet `edges`)"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        );
    args::add_config_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let edges_file = args.get_one::<String>("edges").unwrap();
    let opt_sheet = args.get_one::<String>("sheet").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let config = args::config_from_args(args)?;
    args::init_threads(args)?;

    let table = io::read_table(infile, opt_sheet)?;
    let known = args::read_known(args)?;
    let expected = io::read_edges(edges_file, io::EDGES_SHEET)?;
    let result = LineageAssigner::new(&config).run(&table, &known)?;
    let observed = result.as_dict();

    let mut mismatches = 0;
    for genotype in expected.keys().chain(observed.keys().filter(|k| !expected.contains_key(*k))) {
        let exp = expected.get(genotype).map(|s| s.as_str()).unwrap_or("-");
        let obs = observed.get(genotype).map(|s| s.as_str()).unwrap_or("-");
        if exp != obs {
            writer.write_all(format!("{}\t{}\t{}\n", genotype, exp, obs).as_ref())?;
            mismatches += 1;
        }
    }
    writer.flush()?;

    if mismatches > 0 {
        anyhow::bail!("{} of {} genotypes differ", mismatches, observed.len());
    }
    log::info!("All {} genotypes match", observed.len());

    Ok(())
}
