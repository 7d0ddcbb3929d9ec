mod hgvs;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "gtars";
    pub const BIN_NAME: &str = "gtars";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Sequence comparison tools: report the differences between two sequences as canonical HGVS-style variants.")
        .subcommand_required(true)
        .subcommand(hgvs::cli::create_hgvs_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // HGVS VARIANT REPORT
        //
        Some((hgvs::cli::HGVS_CMD, matches)) => {
            hgvs::handlers::run_hgvs(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_hgvs_subcommand_parses() {
        let matches = build_parser()
            .try_get_matches_from(["gtars", "hgvs", "-vv", "--offset", "5", "ref.fa", "sample.fa"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, hgvs::cli::HGVS_CMD);
        assert_eq!(sub.get_count("verbose"), 2);
        assert_eq!(sub.get_one::<usize>("offset"), Some(&5));
        assert_eq!(sub.get_flag("pad-left"), false);
    }
}
