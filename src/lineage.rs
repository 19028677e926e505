extern crate clap;
use clap::*;

mod cmd_lineage;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = Command::new("lineage")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`lineage` - Nest genotypes by their frequency trajectories")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_lineage::nest::make_subcommand())
        .subcommand(cmd_lineage::forest::make_subcommand())
        .subcommand(cmd_lineage::check::make_subcommand())
        .after_help(
            r###"Subcommands:

* nest   - Assign each genotype a background from a sorted genotype table
* forest - Render a genotype -> parent table as Newick or DOT
* check  - Compare two genotype -> parent tables

Set RUST_LOG=info (or debug, trace) to follow the assignment.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("nest", sub_matches)) => cmd_lineage::nest::execute(sub_matches),
        Some(("forest", sub_matches)) => cmd_lineage::forest::execute(sub_matches),
        Some(("check", sub_matches)) => cmd_lineage::check::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
