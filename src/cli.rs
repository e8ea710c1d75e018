use crate::config::load_config;
use crate::display::{ScriptDisplayResolver, SourceContext};
use crate::dump::{diagram_to_json, write_diagram_json};
use crate::ir::ScriptNode;
use crate::layout::compute_diagram;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "storyflow",
    version,
    about = "Diagram layout for branching narrative scripts"
)]
pub struct Args {
    /// Parsed script tree (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Raw script source; enables line-based node summaries
    #[arg(short = 's', long = "script")]
    pub script: Option<PathBuf>,

    /// Output diagram JSON. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON5 file (theme and geometry overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme, overriding the config file's choice
    #[arg(long, value_enum)]
    pub theme: Option<ThemeChoice>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ThemeChoice {
    Light,
    Dark,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(choice) = args.theme {
        config.theme = match choice {
            ThemeChoice::Light => Theme::editor_light(),
            ThemeChoice::Dark => Theme::editor_dark(),
        };
    }

    let input = read_input(args.input.as_deref())?;
    let root: ScriptNode =
        serde_json::from_str(&input).context("script tree is not valid JSON")?;
    let source = match args.script.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            Some(SourceContext::new(&text))
        }
        None => None,
    };

    let diagram = compute_diagram(
        &root,
        &ScriptDisplayResolver,
        source.as_ref(),
        &config.theme,
        &config.layout,
    );
    for diagnostic in &diagram.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    match args.output.as_deref() {
        Some(path) => write_diagram_json(path, &diagram)?,
        None => println!("{}", diagram_to_json(&diagram)?),
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading input {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}
