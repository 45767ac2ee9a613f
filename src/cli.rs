use crate::config::load_config;
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_family;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ftlayout", version, about = "Genealogy tree layout engine in Rust")]
pub struct Args {
    /// Input family document (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output layout dump path. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file (card metrics and spacing overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Collapse these primary ids before running layout (repeatable)
    #[arg(long = "collapse")]
    pub collapse: Vec<String>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;

    let parsed = parse_family(&input)?;
    let mut forest = parsed.forest;
    for warning in &parsed.warnings {
        eprintln!("warning: {warning}");
    }
    for id in &args.collapse {
        if let Err(err) = forest.set_collapsed(id, true) {
            eprintln!("warning: {err}");
        }
    }

    let result = compute_layout(&mut forest, &config)?;
    match args.output.as_deref() {
        Some(path) => write_layout_dump(path, &result, &forest)?,
        None => {
            let dump = LayoutDump::from_result(&result, &forest);
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
