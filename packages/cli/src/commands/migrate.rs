use super::{find_post_ids, open_session};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_document::DocumentSource;
use folio_editor::FileStore;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Only migrate this post
    pub post: Option<String>,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn migrate(args: MigrateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let posts_dir = config.get_posts_dir(cwd);

    if !posts_dir.exists() {
        return Err(anyhow!("Posts directory does not exist: {:?}", posts_dir));
    }

    println!("{}", "🔁 Migrating posts...".bright_blue().bold());

    let store = FileStore::new(&posts_dir);
    let post_ids = match args.post {
        Some(id) => vec![id],
        None => find_post_ids(&posts_dir)?,
    };

    let mut migrated = 0;
    let mut errors = 0;

    for post_id in &post_ids {
        let result = open_session(&store, post_id, &config).and_then(|mut session| {
            let source = session.source;
            if source != DocumentSource::EditorJson && !args.dry_run {
                session.save(&store)?;
            }
            Ok(source)
        });

        match result {
            Ok(DocumentSource::EditorJson) => {
                println!("  {} {} (up to date)", "·".dimmed(), post_id);
            }
            Ok(source) => {
                migrated += 1;
                let label = match source {
                    DocumentSource::Legacy => "legacy content",
                    _ => "empty",
                };
                println!("  {} {} ← {}", "✓".green(), post_id, label);
            }
            Err(e) => {
                errors += 1;
                eprintln!("  {} {} - {}", "✗".red(), post_id, e.to_string().red());
            }
        }
    }

    println!();
    let verb = if args.dry_run { "Would migrate" } else { "Migrated" };
    if errors == 0 {
        println!("{} {} {} of {} posts", "✅".green(), verb, migrated, post_ids.len());
    } else {
        println!(
            "{} {} {} of {} posts, {} errors",
            "⚠️".yellow(),
            verb,
            migrated,
            post_ids.len(),
            errors
        );
    }

    Ok(())
}
