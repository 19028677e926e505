use clap::*;
use lineage::libs::io;
use lineage::libs::lineage::LineageAssigner;

use super::args;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("nest")
        .about("Assign each genotype a background")
        .after_help(
            r###"
Genotypes are nested in table order. Each genotype is scored against every
earlier one, newest first, and takes the best-scoring candidate as its
background. The first row is the root, the ancestor of everything.

Input:
* TSV with a `Genotype` column and one column per timepoint,
  or an .xlsx workbook (see --sheet)
* Non-numeric columns other than the first, e.g. `members`, are ignored

Output:
* `Identity<TAB>Parent`, one line per genotype except the root
* With an .xlsx outfile, a workbook with the `edges` and `scores` sheets

Examples:
1. Nest a sorted table:
   lineage nest tests/lineage/five.tsv

2. Pin genotype-4 under genotype-3 and keep the scores:
   lineage nest tests/lineage/five.tsv --known tests/lineage/known.tsv --scores scores.tsv

3. Use the fixed preset:
   lineage nest tests/lineage/five.tsv --method matlab -o edges.xlsx
"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Sorted genotype table. [stdin] for standard input"),
        )
        .arg(
            Arg::new("scores")
                .long("scores")
                .num_args(1)
                .help("Also write every pairwise score to this file"),
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
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let opt_sheet = args.get_one::<String>("sheet").unwrap();
    let outfile = args.get_one::<String>("outfile").unwrap();

    let config = args::config_from_args(args)?;
    args::init_threads(args)?;

    //----------------------------
    // Ops
    //----------------------------
    let table = io::read_table(infile, opt_sheet)?;
    let known = args::read_known(args)?;
    let result = LineageAssigner::new(&config).run(&table, &known)?;

    //----------------------------
    // Output
    //----------------------------
    if let Some(scores) = args.get_one::<String>("scores") {
        let mut writer = intspan::writer(scores);
        io::write_scores(&mut writer, result.records())?;
    }

    if io::is_xlsx(outfile) {
        io::write_xlsx(outfile, result.as_dict(), result.records())?;
    } else {
        let mut writer = intspan::writer(outfile);
        io::write_edges(&mut writer, result.as_dict())?;
    }

    Ok(())
}
