//! Core CLI definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use umatl::driver::{ANY_GROUP, ANY_ID};
use umatl::ContentType;

#[derive(Parser)]
#[command(name = "umatl")]
#[command(about = "Extract story text from game assets, keeping existing translations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract text into translation files
    #[command(visible_alias = "e")]
    Extract(ExtractArgs),

    /// Configure default paths
    #[command(visible_alias = "c")]
    Configure {
        /// Set the game asset directory (contains the two-character bundle dirs)
        #[arg(long)]
        asset_root: Option<PathBuf>,

        /// Set the metadata index file
        #[arg(long)]
        meta: Option<PathBuf>,

        /// Set the translations directory (content type is appended)
        #[arg(long)]
        export_root: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Content type: story, home or race
    #[arg(short = 't', long = "type", default_value = "story")]
    pub content_type: ContentType,

    /// Group to extract (two characters, `_` matches any)
    #[arg(short, long, default_value = ANY_GROUP)]
    pub group: String,

    /// Id to extract (four characters, `_` matches any)
    #[arg(short, long, default_value = ANY_ID)]
    pub id: String,

    /// Limit the number of files processed
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Game asset directory
    #[arg(short, long = "src")]
    pub src: Option<PathBuf>,

    /// Extract to this directory instead of translations/<type>
    #[arg(short, long = "dst")]
    pub dst: Option<PathBuf>,

    /// Metadata index file
    #[arg(short, long, env = "UMATL_META")]
    pub meta: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short = 'O', long)]
    pub overwrite: bool,

    /// List matching assets without extracting
    #[arg(long)]
    pub list: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::parse_from(["umatl", "extract"]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.content_type, ContentType::Story);
        assert_eq!(args.group, "__");
        assert_eq!(args.id, "____");
        assert_eq!(args.limit, None);
        assert!(!args.overwrite);
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::parse_from([
            "umatl", "extract", "-t", "HOME", "-g", "01", "-i", "0010", "-l", "5", "-O",
        ]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.content_type, ContentType::Home);
        assert_eq!(args.group, "01");
        assert_eq!(args.id, "0010");
        assert_eq!(args.limit, Some(5));
        assert!(args.overwrite);
    }

    #[test]
    fn test_invalid_content_type_rejected() {
        let result = Cli::try_parse_from(["umatl", "extract", "-t", "lyrics"]);
        assert!(result.is_err());
    }
}
