use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_document::PersistedPost;
use folio_editor::FileStore;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Posts directory
    #[arg(short, long, default_value = "posts")]
    pub posts_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Folio project...".bright_blue().bold());

    let config = Config {
        posts_dir: args.posts_dir.clone(),
        ..Config::default()
    };

    let posts_dir = config.get_posts_dir(cwd);
    if !posts_dir.exists() {
        fs::create_dir_all(&posts_dir)?;
        println!("  {} Created {}/", "✓".green(), args.posts_dir);
    }

    // Example post in the legacy single-tree format
    let store = FileStore::new(&posts_dir);
    if !posts_dir.join("welcome.json").exists() {
        store.put(
            "welcome",
            &PersistedPost {
                content: Some(json!({
                    "type": "doc",
                    "content": [
                        { "type": "heading", "attrs": { "level": 1 },
                          "content": [{ "type": "text", "text": "Welcome to Folio" }] },
                        { "type": "paragraph", "content": [
                            { "type": "text", "text": "Write in the flow, " },
                            { "type": "text", "text": "float", "marks": [{ "type": "bold" }] },
                            { "type": "text", "text": " images anywhere." }
                        ]}
                    ]
                })),
                editor_json: None,
            },
        )?;
        println!("  {} Created welcome.json", "✓".green());
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Add posts to {}/", args.posts_dir);
    println!("  2. Run: folio migrate");
    println!("  3. Run: folio render");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_editor::DocumentStore;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_config_and_example() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().display().to_string();

        init(
            InitArgs {
                posts_dir: "posts".to_string(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.posts_dir, "posts");

        let store = FileStore::new(temp.path().join("posts"));
        let post = store.get("welcome").unwrap();
        assert!(post.content.is_some());
        assert!(post.editor_json.is_none());
    }
}
