use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use flate2::read::MultiGzDecoder;
use log::{LevelFilter, info, warn};

use gtars_hgvs::{ReportConfig, ReportWriter, diff};

pub fn run_hgvs(matches: &ArgMatches) -> Result<()> {
    init_logging(matches.get_count("verbose"));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_hgvs_report(matches, &mut out)?;
    out.flush()?;

    Ok(())
}

/// Diff the two input files and write the variant report to `out`.
pub fn write_hgvs_report<W: Write>(matches: &ArgMatches, out: W) -> Result<()> {
    let reference_file = matches
        .get_one::<String>("reference")
        .expect("A path to a reference sequence is required.");
    let sample_file = matches
        .get_one::<String>("sample")
        .expect("A path to a sample sequence is required.");

    let config = resolve_config(matches)?;

    let reference = read_sequence(Path::new(reference_file), config.uppercase)?;
    let sample = read_sequence(Path::new(sample_file), config.uppercase)?;
    info!(
        "comparing {} ({} bp) to {} ({} bp)",
        sample_file,
        sample.len(),
        reference_file,
        reference.len()
    );

    let result = diff(&reference, &sample, &config.diff_options());
    if result.timed_out {
        warn!("alignment timed out; variants may not be minimal");
    }
    info!("found {} variants", result.variants.len());

    let mut writer = ReportWriter::new(out, config.sequence.clone())
        .with_offset(config.offset)
        .with_pad_left(config.pad_left);
    writer.write_result(&result)?;
    writer.flush()?;

    Ok(())
}

/// Start from the config file, if any, and let explicit flags win.
fn resolve_config(matches: &ArgMatches) -> Result<ReportConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ReportConfig::from_path(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => ReportConfig::default(),
    };

    if let Some(sequence) = matches.get_one::<String>("sequence") {
        config.sequence = sequence.clone();
    }
    if let Some(offset) = matches.get_one::<usize>("offset") {
        config.offset = *offset;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.timeout_ms = Some(*timeout);
    }
    if matches.get_flag("pad-left") {
        config.pad_left = true;
    }

    Ok(config)
}

///
/// Get a reader for either a gzip'd or non-gzip'd file
///
fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Read a sequence file: header lines starting with `>` are skipped and all
/// other lines are concatenated.
pub fn read_sequence(path: &Path, uppercase: bool) -> Result<Vec<u8>> {
    let reader = get_dynamic_reader(path)?;

    let mut seq = Vec::new();
    for line in reader.split(b'\n') {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        if line.first() == Some(&b'>') {
            continue;
        }
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        seq.extend_from_slice(line);
    }

    if uppercase {
        seq.make_ascii_uppercase();
    }

    Ok(seq)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hgvs::cli::create_hgvs_cli;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn run(args: &[&str]) -> String {
        let matches = create_hgvs_cli()
            .try_get_matches_from(std::iter::once("hgvs").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        write_hgvs_report(&matches, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_read_sequence_fasta() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ref.fa", ">f1\nactg\r\nACgt\n");
        let seq = read_sequence(Path::new(&path), true).unwrap();
        assert_eq!(seq, b"ACTGACGT".to_vec());

        let raw = read_sequence(Path::new(&path), false).unwrap();
        assert_eq!(raw, b"actgACgt".to_vec());
    }

    #[test]
    fn test_read_sequence_gzipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.fa.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b">f1\nACGT\nTTGA\n").unwrap();
        encoder.finish().unwrap();

        let seq = read_sequence(&path, true).unwrap();
        assert_eq!(seq, b"ACGTTTGA".to_vec());
    }

    #[test]
    fn test_report_from_fasta_files() {
        let dir = TempDir::new().unwrap();
        let f1 = write_file(&dir, "f1.fa", ">f1\nactgactCacgtacgt\nactgactgacgAAcgt\n");
        let f2 = write_file(&dir, "f2.fa", ">f2\nactgactGacgtacgt\nactgactgacgTTcgtA\n");

        let report = run(&["--sequence", "chr2", "--offset", "1000", &f1, &f2]);
        assert_eq!(
            report,
            "chr2:g.1008C>G\tchr2\t1008\tC\tG\tfalse\n\
             chr2:g.1028A>T\tchr2\t1028\tA\tT\tfalse\n\
             chr2:g.1029A>T\tchr2\t1029\tA\tT\tfalse\n\
             chr2:g.1032_1033insA\tchr2\t1033\t\tA\tfalse\n"
        );
    }

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config = write_file(&dir, "report.toml", "sequence = \"chrX\"\noffset = 10\n");
        let f1 = write_file(&dir, "a.txt", "ACGTACGT\n");
        let f2 = write_file(&dir, "b.txt", "ACTACGT\n");

        let from_config = run(&["--config", &config, &f1, &f2]);
        assert_eq!(from_config, "chrX:g.13del\tchrX\t13\tG\t\tfalse\n");

        let overridden = run(&["--config", &config, "--offset", "0", "--pad-left", &f1, &f2]);
        assert_eq!(overridden, "chrX:g.3del\tchrX\t2\tCG\tC\tfalse\n");
    }

    #[test]
    fn test_bad_config_extension() {
        let dir = TempDir::new().unwrap();
        let config = write_file(&dir, "report.json", "{}");
        let f1 = write_file(&dir, "a.txt", "ACGT\n");

        let matches = create_hgvs_cli()
            .try_get_matches_from(["hgvs", "--config", config.as_str(), f1.as_str(), f1.as_str()])
            .unwrap();
        assert!(write_hgvs_report(&matches, Vec::new()).is_err());
    }
}
