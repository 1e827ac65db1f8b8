use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR: &str = "england_data";
pub const DEFAULT_OUTPUT_DIR: &str = "processed_data";
pub const NATIONAL_NAME: &str = "England";

/// Directory flags shared by every pipeline binary. All optional: with no
/// flags the conventional `england_data` → `processed_data` layout is used.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "ABI admissions spreadsheet pipeline")]
pub struct PipelineArgs {
    /// Folder holding the source workbooks
    #[arg(long, env = "ABI_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,

    /// Folder receiving per-region tables and the combined files
    #[arg(long, env = "ABI_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Stem of the national roll-up file.
    pub national_name: String,
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            national_name: NATIONAL_NAME.to_string(),
        }
    }

    /// `processed_data/<Region>.csv`
    pub fn region_path(&self, region: &str) -> PathBuf {
        self.output_dir.join(format!("{}.csv", region))
    }

    /// `processed_data/England.csv`
    pub fn national_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.national_name))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl From<PipelineArgs> for PipelineConfig {
    fn from(args: PipelineArgs) -> Self {
        Self::new(args.input, args.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_conventional_layout() {
        let args = PipelineArgs::try_parse_from(["extract"]).unwrap();
        let config = PipelineConfig::from(args);
        if std::env::var_os("ABI_INPUT_DIR").is_none() && std::env::var_os("ABI_OUTPUT_DIR").is_none() {
            assert_eq!(config, PipelineConfig::default());
        }
        assert_eq!(
            PipelineConfig::default().national_path(),
            PathBuf::from("processed_data/England.csv")
        );
    }

    #[test]
    fn flags_override_directories() {
        let args =
            PipelineArgs::try_parse_from(["combine", "--input", "in", "--output", "out"]).unwrap();
        let config = PipelineConfig::from(args);
        assert_eq!(config.region_path("Yorkshire"), PathBuf::from("out/Yorkshire.csv"));
    }
}
