//! Command line configuration.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Input path meaning standard input.
pub const STDIN: &str = "-";

/// Output format of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML with rich components rendered in place
    Html,
    /// Placeholder HTML and component records as JSON
    Json,
}

/// Command line configuration for passport-md.
#[derive(Debug, Clone, Parser)]
#[command(name = "passport-md", version, about, long_about = None)]
pub struct Config {
    /// Markdown file, `-` reads standard input
    #[arg(default_value = STDIN)]
    pub input: PathBuf,

    /// Output file, standard output when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Wrap HTML output in a complete page with outline sidebar
    #[arg(long)]
    pub standalone: bool,

    /// Page title for standalone output
    #[arg(long)]
    pub title: Option<String>,

    /// Start the outline sidebar collapsed
    #[arg(long)]
    pub sidebar_collapsed: bool,

    /// Open the written output in the default browser
    #[arg(long)]
    pub open: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Whether input is read from standard input.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIN
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist, if `--open` is used
    /// without `--output`, or if `--standalone` is combined with JSON output.
    pub fn validate(&self) -> Result<()> {
        if !self.reads_stdin() && !self.input.is_file() {
            bail!("Input file does not exist: {}", self.input.display());
        }

        if self.open && self.output.is_none() {
            bail!("--open requires --output");
        }

        if self.standalone && self.format == OutputFormat::Json {
            bail!("--standalone only applies to HTML output");
        }

        Ok(())
    }

    /// Returns page title from configuration or the input file stem.
    ///
    /// # Errors
    ///
    /// Returns error if the input path has no usable file stem.
    pub fn page_title(&self) -> Result<String> {
        if let Some(title) = &self.title {
            return Ok(title.clone());
        }

        if self.reads_stdin() {
            return Ok("Document".to_string());
        }

        file_stem(&self.input)
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Cannot derive page title from path: {}", path.display()))
        .map(String::from)
}
