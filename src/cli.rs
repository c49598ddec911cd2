use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "signstream",
    about = "SignStream - replay classifier output through the sign decision engine"
)]
pub struct CliArgs {
    /// JSON-lines file of classifier frames (reads stdin when omitted)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Engine config file (JSON)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Override the confidence threshold from the config
    #[arg(long, short)]
    pub threshold: Option<f32>,

    /// Print a session export after the last frame
    #[arg(long)]
    pub export: bool,

    /// Enable debug mode with verbose logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "signstream",
            "--input",
            "frames.jsonl",
            "--threshold",
            "0.8",
            "--export",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(args.threshold, Some(0.8));
        assert!(args.export);
        assert!(!args.debug);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["signstream"]).unwrap();
        assert!(args.input.is_none());
        assert!(args.threshold.is_none());
        assert!(!args.export);
    }

    #[test]
    fn test_rejects_non_numeric_threshold() {
        assert!(CliArgs::try_parse_from(["signstream", "--threshold", "high"]).is_err());
    }
}
