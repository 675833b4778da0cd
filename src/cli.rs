use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for cardash
#[derive(Parser, Debug)]
#[command(version, about = "cardash")]
pub struct Args {
    /// Path to the raw car-listing CSV
    pub raw: PathBuf,

    /// Path to the cleaned car-listing CSV
    pub cleaned: PathBuf,

    /// Specify the delimiter to use when reading the files
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the files have no header row
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,
}

impl From<&Args> for crate::dataset::LoadOptions {
    fn from(args: &Args) -> Self {
        Self {
            delimiter: args.delimiter,
            has_header: if args.no_header { Some(false) } else { None },
        }
    }
}
