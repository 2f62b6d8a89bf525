use std::{fmt::Display, fmt::Formatter};

use clap::{ErrorKind, Parser};
use log::{info, LevelFilter};

use super::options::{BlockSearch, CompressOptions, DEFAULT_WIDTH, MAX_DOUBLINGS, MIN_BLOCK_SIZE};

/// Output file used when none is given.
pub const DEFAULT_OUTPUT: &str = "b.out";

/// Compress or decompress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Lossless byte compressor: RLE (flat or adaptive block) followed by adaptive Huffman coding",
    long_about = None)]
pub struct Args {
    /// Compress the input file (the default)
    #[clap(short = 'c', long = "compress")]
    compress: bool,

    /// Decompress the input file
    #[clap(short = 'd', long = "decompress", conflicts_with = "compress")]
    decompress: bool,

    /// Apply the diff model before RLE
    #[clap(short = 'm', long = "diff-model")]
    diff_model: bool,

    /// Use adaptive block RLE on a 2D matrix instead of flat RLE
    #[clap(short = 'a', long = "adaptive")]
    adaptive: bool,

    /// Matrix width used by adaptive block RLE
    #[clap(short = 'w', long = "width", default_value_t = DEFAULT_WIDTH)]
    width: u64,

    /// File to read
    #[clap(short = 'i', long = "input")]
    input: String,

    /// File to write
    #[clap(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: String,

    /// First block size tried by adaptive block RLE
    #[clap(long = "block-size", default_value_t = MIN_BLOCK_SIZE)]
    block_size: usize,

    /// How many times adaptive block RLE may double the block size
    #[clap(long = "max-doublings", default_value_t = MAX_DOUBLINGS)]
    max_doublings: usize,

    /// Sets verbosity. -v shows progress, -vvv is chatty
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Everything the binary needs to run, resolved from the command line.
#[derive(Debug, Clone)]
pub struct HuffOpts {
    pub mode: Mode,
    pub input: String,
    pub output: String,
    /// Compression settings (ignored when decompressing)
    pub options: CompressOptions,
    /// Log level picked by the -v count
    pub verbosity: LevelFilter,
}

impl From<Args> for HuffOpts {
    fn from(args: Args) -> Self {
        // clap rejects -c together with -d
        let mode = match (args.compress, args.decompress) {
            (false, true) => Mode::Decompress,
            _ => Mode::Compress,
        };
        let verbosity = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        HuffOpts {
            mode,
            input: args.input,
            output: args.output,
            options: CompressOptions {
                use_diff_model: args.diff_model,
                use_adaptive_rle: args.adaptive,
                matrix_width: args.width,
                block_search: BlockSearch {
                    initial_block_size: args.block_size,
                    max_doublings: args.max_doublings,
                },
            },
            verbosity,
        }
    }
}

/// Exit code for a command line the parser rejected: 1 for a missing option value, 2 for an
/// unknown option, 3 for a missing input file. Help and version requests are not failures.
pub fn usage_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        ErrorKind::UnknownArgument => 2,
        ErrorKind::MissingRequiredArgument => 3,
        _ => 1,
    }
}

/// Parse the process arguments. Help, version and usage errors come back as the clap error.
pub fn opts_init() -> Result<HuffOpts, clap::Error> {
    Args::try_parse().map(HuffOpts::from)
}

/// Report the resolved settings.
pub fn log_opts(opts: &HuffOpts) {
    info!("---- Initialization Start ----");
    info!("Verbosity set to {}", opts.verbosity);
    info!("Operational mode set to {}", opts.mode);
    info!("Reading {}, writing {}", opts.input, opts.output);
    if opts.mode == Mode::Compress {
        info!("Diff model: {}", opts.options.use_diff_model);
        if opts.options.use_adaptive_rle {
            info!(
                "Adaptive block RLE, width {}, block size {} doubled up to {} times",
                opts.options.matrix_width,
                opts.options.block_search.initial_block_size,
                opts.options.block_search.max_doublings
            );
        } else {
            info!("Flat RLE");
        }
    }
    info!("---- Initialization End ----");
}
