use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use token_snippets::cli::{CliArgs, Command};
use token_snippets::config::SnippetConfig;
use token_snippets::editable::{EditorSurface, RopeSurface};
use token_snippets::model::SnippetModel;
use token_snippets::template;
use token_snippets::update::update;
use token_snippets::SnippetMsg;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    token_snippets::tracing::init();

    let config = match &args.config {
        Some(path) => SnippetConfig::load_from(path),
        None => SnippetConfig::load(),
    };

    let output = match args.command {
        Command::Parse { body } => {
            let parsed = template::parse(&body);
            serde_json::to_value(&parsed).context("Failed to serialize template")?
        }
        Command::Expand {
            snippets,
            vars,
            text,
        } => expand(config, snippets, vars, &text)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn expand(
    mut config: SnippetConfig,
    snippets: Vec<std::path::PathBuf>,
    vars: Vec<(String, String)>,
    text: &str,
) -> Result<serde_json::Value> {
    for path in &snippets {
        anyhow::ensure!(path.exists(), "Snippet file not found: {}", path.display());
    }
    config.snippet_files.extend(snippets);

    let mut model = SnippetModel::load(config);
    for (name, value) in vars {
        model.set_variable(name, value);
    }
    tracing::debug!(prefixes = model.index.len(), "snippet index ready");

    let mut surface = RopeSurface::from_text(text);
    update(&mut model, &mut surface, SnippetMsg::Expand);

    let selection = surface.selection();
    let stops: Vec<serde_json::Value> = model
        .controller
        .stack()
        .top()
        .map(|entry| entry.stops())
        .unwrap_or_default()
        .iter()
        .map(|stop| {
            json!({
                "index": stop.index,
                "start": stop.start,
                "end": stop.end,
                "choices": stop.choices,
                "reference": stop.is_reference(),
            })
        })
        .collect();

    Ok(json!({
        "expanded": surface.revision() > 0,
        "text": surface.text(),
        "selection": { "anchor": selection.anchor, "head": selection.head },
        "stops": stops,
    }))
}
