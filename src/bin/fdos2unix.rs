use std::path::Path;
use std::process;

use clap::Parser;

use dos2unix_rs::dos2unix::{convert_in_place, convert_to_file};

#[derive(Parser)]
#[command(
    name = "dos2unix",
    version,
    about = "Convert CRLF line endings to LF, dropping a leading UTF-8 BOM"
)]
struct Cli {
    /// File to convert (rewritten in place unless OUTPUT is given)
    input: String,

    /// Write the converted result here instead, leaving INPUT untouched
    output: Option<String>,
}

fn main() {
    dos2unix_rs::common::reset_sigpipe();

    // Usage errors exit 1 like every other failure; --help and
    // --version keep their normal exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                e.exit()
            }
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    let result = match &cli.output {
        Some(output) => convert_to_file(Path::new(&cli.input), Path::new(output)),
        None => convert_in_place(Path::new(&cli.input)),
    };

    if let Err(e) = result {
        eprintln!("dos2unix: {}", e);
        process::exit(1);
    }
}
