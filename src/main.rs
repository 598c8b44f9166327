use anyhow::{Context, Result};
use maud::PreEscaped;
use passport_markdown::components::layout::page_wrapper;
use passport_markdown::{Config, MarkdownRenderer, OutputFormat, Sidebar, parse, parse_document};
use std::fs;
use std::io::{self, Read, Write};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    let source = read_input(&config)?;
    let output = render(&config, &source)?;

    match &config.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", output.len(), path.display());

            if config.open {
                open::that(path)
                    .with_context(|| format!("Failed to open {} in browser", path.display()))?;
            }
        }
        None => {
            io::stdout()
                .write_all(output.as_bytes())
                .context("Failed to write to standard output")?;
        }
    }

    Ok(())
}

fn read_input(config: &Config) -> Result<String> {
    if config.reads_stdin() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        return Ok(source);
    }

    fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read markdown file: {}", config.input.display()))
}

fn render(config: &Config, source: &str) -> Result<String> {
    match config.format {
        OutputFormat::Json => {
            let parsed = parse(source);
            log::debug!("Registered {} components", parsed.components.len());
            serde_json::to_string_pretty(&parsed).context("Failed to serialize parse result")
        }
        OutputFormat::Html if config.standalone => {
            let document = parse_document(source);
            let fragment = MarkdownRenderer::new().render_document(&document);
            let sidebar = Sidebar::new(!config.sidebar_collapsed);
            let title = config.page_title()?;

            let outline = document.headings();
            Ok(page_wrapper(&title, &outline, &sidebar, PreEscaped(fragment)).into_string())
        }
        OutputFormat::Html => Ok(MarkdownRenderer::new().render(source)),
    }
}
