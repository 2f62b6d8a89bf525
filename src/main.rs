//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::{fs, io, process::ExitCode};

use log::{error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use thiserror::Error;

use huff_codec::tools::cli::{log_opts, opts_init, usage_exit_code, HuffOpts, Mode};
use huff_codec::{compress, decompress, CodecError};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Everything that can stop the binary, each with its own exit code.
#[derive(Debug, Error)]
enum AppError {
    #[error("matrix width must be greater than zero")]
    ZeroWidth,
    #[error("cannot read {path}: {source}")]
    ReadInput { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    WriteOutput { path: String, source: io::Error },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl AppError {
    fn exit_code(&self) -> u8 {
        match self {
            AppError::ZeroWidth => 4,
            AppError::ReadInput { .. } => 5,
            AppError::WriteOutput { .. } => 7,
            AppError::Codec(e) => match e {
                CodecError::InvalidDimensions(_) => 6,
                CodecError::MalformedHeader { .. } => 8,
                CodecError::CorruptBitstream { .. } => 9,
                CodecError::TruncatedBlockData { .. } => 10,
                CodecError::BlockOverrun { .. } => 11,
                CodecError::TrailingData(_) => 12,
            },
        }
    }
}

/// Read the input, run the codec, write the output.
fn run(opts: &HuffOpts) -> Result<(), AppError> {
    if opts.mode == Mode::Compress && opts.options.matrix_width == 0 {
        return Err(AppError::ZeroWidth);
    }

    let input = fs::read(&opts.input).map_err(|source| AppError::ReadInput {
        path: opts.input.clone(),
        source,
    })?;
    info!("Read {} bytes from {}", input.len(), opts.input);

    let output = match opts.mode {
        Mode::Compress => compress(&input, &opts.options)?,
        Mode::Decompress => decompress(&input)?,
    };

    fs::write(&opts.output, &output).map_err(|source| AppError::WriteOutput {
        path: opts.output.clone(),
        source,
    })?;
    info!("Wrote {} bytes to {}", output.len(), opts.output);
    Ok(())
}

fn main() -> ExitCode {
    let opts = match opts_init() {
        Ok(opts) => opts,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(e.kind()));
        }
    };

    // Available log levels are Error, Warn, Info, Debug, Trace
    if let Err(e) = TermLogger::init(
        opts.verbosity,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start logging: {}", e);
    }
    log_opts(&opts);

    match run(&opts) {
        Ok(()) => {
            info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
