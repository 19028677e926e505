use clap::*;
use lineage::libs::config::*;

/// Input and scoring options shared by `nest` and `check`.
pub fn add_config_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("sheet")
            .long("sheet")
            .num_args(1)
            .default_value(lineage::libs::io::SORTED_SHEET)
            .help("Sheet holding the sorted table when the input is .xlsx"),
    )
    .arg(
        Arg::new("known")
            .long("known")
            .num_args(1)
            .help("Known `genotype -> parent` edges, TSV or .xlsx (sheet `edges`)"),
    )
    .arg(
        Arg::new("method")
            .long("method")
            .num_args(1)
            .default_value("hierarchy")
            .value_parser(ClusterMethod::ACCEPTED)
            .help("Cutoff preset"),
    )
    .arg(
        Arg::new("detection")
            .long("detection")
            .num_args(1)
            .default_value("0.03")
            .value_parser(value_parser!(f64))
            .help("Frequencies at or below this are undetected"),
    )
    .arg(
        Arg::new("significant")
            .long("significant")
            .num_args(1)
            .default_value("0.15")
            .value_parser(value_parser!(f64))
            .help("Loose cutoff of the additive check"),
    )
    .arg(
        Arg::new("fixed")
            .long("fixed")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Frequencies at or above this are fixed. [1 - detection]"),
    )
    .arg(
        Arg::new("additive")
            .long("additive")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Strict cutoff of the additive check. [detection]"),
    )
    .arg(
        Arg::new("derivative")
            .long("derivative")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Minimum |r| of the derivative check. [0.5]"),
    )
    .arg(
        Arg::new("pvalue")
            .long("pvalue")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Maximum p-value of the derivative check. [0.05]"),
    )
    .arg(
        Arg::new("parallel")
            .long("parallel")
            .short('p')
            .num_args(1)
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Number of threads for parallel processing"),
    )
}

/// The preset named by `--method`, with any explicit cutoff applied on top.
pub fn config_from_args(args: &ArgMatches) -> anyhow::Result<LineageConfig> {
    let opt_method = args.get_one::<String>("method").unwrap();
    let opt_detection = *args.get_one::<f64>("detection").unwrap();
    let opt_significant = *args.get_one::<f64>("significant").unwrap();

    let mut config = LineageConfig::for_method(opt_method, opt_detection, opt_significant)?;
    if let Some(v) = args.get_one::<f64>("fixed") {
        config.fixed_limit = *v;
    }
    if let Some(v) = args.get_one::<f64>("additive") {
        config.additive_cutoff = *v;
    }
    if let Some(v) = args.get_one::<f64>("derivative") {
        config.derivative_cutoff = *v;
    }
    if let Some(v) = args.get_one::<f64>("pvalue") {
        config.pvalue = *v;
    }
    config.validate()?;

    Ok(config)
}

pub fn init_threads(args: &ArgMatches) -> anyhow::Result<()> {
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;
    Ok(())
}

pub fn read_known(args: &ArgMatches) -> anyhow::Result<indexmap::IndexMap<String, String>> {
    match args.get_one::<String>("known") {
        Some(file) => lineage::libs::io::read_edges(file, lineage::libs::io::EDGES_SHEET),
        None => Ok(indexmap::IndexMap::new()),
    }
}
