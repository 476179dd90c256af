//! Split files into erasure-coded shards and recover them.
//!
//! # Usage
//!
//! Encode a file into 10 shards, any 7 of which recover it:
//!
//! ```sh
//! tessera encode --input notes.txt --output shards/ --total 10 --minimum 7 --frame
//! ```
//!
//! Recover it from whatever shards remain:
//!
//! ```sh
//! tessera decode --input shards/ --output notes.txt --frame
//! ```
//!
//! Without `--frame` the decoded file is the full zero-padded buffer.

use clap::{value_parser, Arg, ArgAction, Command};
use std::{path::PathBuf, process::ExitCode};
use tessera_coding::Config;
use tracing::error;

mod shards;

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

const ENCODE_CMD: &str = "encode";
const DECODE_CMD: &str = "decode";
const DEMO_CMD: &str = "demo";

/// Default for `--shard-size` (matches [tessera_coding::DEFAULT_SHARD_SIZE])
const DEFAULT_SHARD_SIZE_ARG: &str = "256";

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

/// Flag for framing text payloads
const FRAME_FLAG: &str = "frame";

fn frame_arg() -> Arg {
    Arg::new(FRAME_FLAG)
        .long(FRAME_FLAG)
        .action(ArgAction::SetTrue)
        .help("Wrap (or unwrap) a text payload in random filler and delimiters")
}

fn main() -> ExitCode {
    // Define application
    let matches = Command::new("tessera")
        .version(crate_version())
        .about("Split files into erasure-coded shards and recover them.")
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new(ENCODE_CMD)
                .about("Encode a file into a directory of shards.")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .help("File to encode")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .required(true)
                        .help("Directory to write shards into")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("total")
                        .long("total")
                        .default_value("10")
                        .help("Number of shards to produce")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("minimum")
                        .long("minimum")
                        .default_value("7")
                        .help("Number of shards needed to recover the file")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("shard-size")
                        .long("shard-size")
                        .default_value(DEFAULT_SHARD_SIZE_ARG)
                        .help("Bytes per shard")
                        .value_parser(value_parser!(usize)),
                )
                .arg(frame_arg()),
        )
        .subcommand(
            Command::new(DECODE_CMD)
                .about("Recover a file from a directory of shards.")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .help("Directory holding the manifest and shards")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .required(true)
                        .help("File to write the recovered payload to")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(frame_arg()),
        )
        .subcommand(
            Command::new(DEMO_CMD).about("Frame, encode, decode, and extract a sample text."),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Parse subcommands
    let mut rng = rand::thread_rng();
    let result = match matches.subcommand() {
        Some((ENCODE_CMD, matches)) => {
            let input = matches.get_one::<PathBuf>("input").unwrap();
            let output = matches.get_one::<PathBuf>("output").unwrap();
            let config = Config::new(
                *matches.get_one::<u16>("total").unwrap(),
                *matches.get_one::<u16>("minimum").unwrap(),
            )
            .with_shard_size(*matches.get_one::<usize>("shard-size").unwrap());
            let framed = matches.get_flag(FRAME_FLAG);
            shards::encode_file(input, output, config, framed, &mut rng)
        }
        Some((DECODE_CMD, matches)) => {
            let input = matches.get_one::<PathBuf>("input").unwrap();
            let output = matches.get_one::<PathBuf>("output").unwrap();
            shards::decode_file(input, output, matches.get_flag(FRAME_FLAG))
        }
        Some((DEMO_CMD, _)) => shards::demo(&mut rng).map(|text| println!("{text}")),
        _ => unreachable!("subcommand is required"),
    };
    if let Err(e) = result {
        error!(error = %e, "command failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
