use super::{find_post_ids, open_session};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use folio_compiler_html::RenderMode;
use folio_editor::{EditSession, FileStore};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Only render this post
    pub post: Option<String>,

    /// Render mode (public, trusted); overrides config
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Also write the public snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let posts_dir = config.get_posts_dir(cwd);

    if !posts_dir.exists() {
        return Err(anyhow!("Posts directory does not exist: {:?}", posts_dir));
    }

    let mode = match args.mode.as_deref() {
        None => config.mode,
        Some("public") => RenderMode::Public,
        Some("trusted") => RenderMode::Trusted,
        Some(other) => {
            return Err(anyhow!("Invalid mode: {}. Use: public or trusted", other));
        }
    };

    let out_dir = match &args.out_dir {
        Some(dir) => Path::new(cwd).join(dir),
        None => config.get_out_dir(cwd),
    };

    let store = FileStore::new(&posts_dir);
    let post_ids = match &args.post {
        Some(id) => vec![id.clone()],
        None => find_post_ids(&posts_dir)?,
    };

    if post_ids.is_empty() {
        println!("{}", "⚠️  No posts found".yellow());
        return Ok(());
    }

    if !args.stdout {
        println!("{}", "🖨  Rendering posts...".bright_blue().bold());
    }

    let mut rendered = 0;
    let mut errors = 0;

    for post_id in &post_ids {
        let result = open_session(&store, post_id, &config)
            .and_then(|session| render_post(&session, mode, &args, &out_dir));

        match result {
            Ok(Some(output_path)) => {
                rendered += 1;
                println!("  {} {} → {}", "✓".green(), post_id, output_path);
            }
            Ok(None) => rendered += 1,
            Err(e) => {
                errors += 1;
                eprintln!("  {} {} - {}", "✗".red(), post_id, e.to_string().red());
            }
        }
    }

    if !args.stdout {
        println!();
        if errors == 0 {
            println!("{} Rendered {} posts", "✅".green(), rendered);
        } else {
            println!("{} Rendered {} posts, {} errors", "⚠️".yellow(), rendered, errors);
        }
    }

    Ok(())
}

/// Output path written, or `None` when printed to stdout
fn render_post(
    session: &EditSession,
    mode: RenderMode,
    args: &RenderArgs,
    out_dir: &Path,
) -> Result<Option<String>> {
    let html = match mode {
        RenderMode::Public => session.snapshot().to_html(),
        RenderMode::Trusted => session.preview_html(),
    };

    if args.stdout {
        println!("{}", html);
        return Ok(None);
    }

    fs::create_dir_all(out_dir)?;
    let output_path = out_dir.join(format!("{}.html", session.post_id));
    fs::write(&output_path, html)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if args.json {
        let snapshot_path = out_dir.join(format!("{}.snapshot.json", session.post_id));
        fs::write(&snapshot_path, serde_json::to_string_pretty(&session.snapshot())?)?;
    }

    Ok(Some(output_path.display().to_string()))
}
