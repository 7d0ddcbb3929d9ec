use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const HGVS_CMD: &str = "hgvs";

pub fn create_hgvs_cli() -> Command {
    Command::new(HGVS_CMD)
        .author("Databio")
        .about("Compare a sample sequence to a reference and report HGVS-style variants.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("reference")
                .required(true)
                .help("Reference sequence file (plain text or FASTA, optionally gzipped)"),
        )
        .arg(
            Arg::new("sample")
                .required(true)
                .help("Sample sequence file (plain text or FASTA, optionally gzipped)"),
        )
        .arg(arg!(--sequence <sequence> "Sequence name used in the variant labels"))
        .arg(
            arg!(--offset <offset> "Added to every reported position")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--timeout <timeout> "Aligner time budget in milliseconds (0 = unlimited)")
                .value_parser(value_parser!(u64)),
        )
        .arg(arg!(--"pad-left" "Report alleles anchored on the preceding reference base"))
        .arg(arg!(-c --config <config> "Report settings in a TOML file"))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
}
