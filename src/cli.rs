//! Command-line interface for assetfs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assetfs", version)]
#[command(
    about = "Pack a directory into a ZIP archive embedded in generated Rust source",
    long_about = None
)]
pub struct Cli {
    /// Directory whose files are embedded
    #[arg(long, default_value = "public")]
    pub src: PathBuf,

    /// Directory the generated module is written to
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,

    /// Name of the generated module (file `<dest>/<module>.rs`)
    #[arg(short, long, default_value = "assets")]
    pub module: String,

    /// Extensions to include, comma separated (e.g. `html,css,*.js`)
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Stamp every entry with the unix epoch for reproducible output
    #[arg(long)]
    pub no_mtime: bool,

    /// Store entries without compression
    #[arg(short = 'Z', long)]
    pub no_compress: bool,

    /// Overwrite an existing generated module
    #[arg(short, long)]
    pub force: bool,

    /// TOML file with build options; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log more (`-v` debug, `-vv` trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
