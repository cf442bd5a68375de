use std::path::{Path, PathBuf};

use plugin_order::{PluginNode, ResolveContext};

use super::{Format, ResolveArgs};

/// Build the resolution context from CLI flags.
fn build_context(args: &ResolveArgs) -> std::io::Result<ResolveContext> {
    let cwd = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let base = match &args.base {
        Some(dir) => dir.clone(),
        None => config_dir(&args.config, &cwd),
    };

    let mut ctx = ResolveContext::new(cwd, base);
    if let Some(env) = &args.env {
        ctx = ctx.with_env(env);
    }
    if args.agent {
        ctx = ctx.as_agent(args.agent_role.clone());
    }
    if let Some(framework) = &args.framework {
        ctx = ctx.with_framework(framework);
    }
    Ok(ctx)
}

/// Directory of the config file, falling back to `cwd` for a bare file name.
fn config_dir(config: &Path, cwd: &Path) -> PathBuf {
    match config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}

fn print_text(nodes: &[PluginNode]) {
    let width = nodes.iter().map(|n| n.name.len()).max().unwrap_or(0);
    for node in nodes {
        println!(
            "{:>3}  {:<width$}  {}",
            node.depth,
            node.name,
            node.directory.display()
        );
    }
}

pub(crate) fn run(args: ResolveArgs) {
    let ctx = match build_context(&args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("plugin-order resolve: cannot determine working directory: {e}");
            std::process::exit(1);
        }
    };

    let nodes = match plugin_order::load_plugin_config(&args.config)
        .and_then(|config| plugin_order::analyze_plugins(&config, &ctx))
    {
        Ok(nodes) => nodes,
        Err(e) => {
            eprintln!("plugin-order resolve: {e}");
            std::process::exit(1);
        }
    };

    match args.format {
        Format::Text => {
            if nodes.is_empty() {
                eprintln!("No plugins to activate.");
            }
            print_text(&nodes);
        }
        Format::Json => match serde_json::to_string_pretty(&nodes) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("plugin-order resolve: {e}");
                std::process::exit(1);
            }
        },
    }
}
