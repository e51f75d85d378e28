//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Gantry - JRuby application provisioner
///
/// Stages an application directory into a runnable deployment bundle,
/// carrying runtime and dependency artifacts across builds in a cache
/// directory.
#[derive(Parser, Debug)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Application staging directory (becomes the deployable bundle)
    pub build_dir: PathBuf,

    /// Artifact cache directory (persists across builds)
    pub cache_dir: PathBuf,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Override the JRuby distribution mirror
    #[arg(long, env = "GANTRY_JRUBY_URL")]
    pub jruby_url: Option<String>,

    /// Override the JDK distribution mirror
    #[arg(long, env = "GANTRY_JDK_URL")]
    pub jdk_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_directories() {
        let cli = Cli::try_parse_from(["gantry", "/tmp/build", "/tmp/cache"]).unwrap();
        assert_eq!(cli.build_dir, PathBuf::from("/tmp/build"));
        assert_eq!(cli.cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn counts_verbosity() {
        let cli = Cli::try_parse_from(["gantry", "-vv", "b", "c"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn both_directories_are_required() {
        assert!(Cli::try_parse_from(["gantry", "/tmp/build"]).is_err());
    }
}
