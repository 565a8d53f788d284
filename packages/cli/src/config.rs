use folio_compiler_html::RenderMode;
use folio_document::{DocumentMeta, DEFAULT_CANVAS_PADDING, DEFAULT_CANVAS_WIDTH};
use folio_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one `<post_id>.json` per post
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,

    /// Directory rendered HTML is written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default)]
    pub mode: RenderMode,

    #[serde(default)]
    pub editor: EditorConfig,

    /// Canvas for posts that have no editor snapshot yet
    #[serde(default)]
    pub canvas: CanvasConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    #[serde(default = "default_canvas_padding")]
    pub canvas_padding: f64,
}

fn default_posts_dir() -> String {
    "posts".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_canvas_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_padding() -> f64 {
    DEFAULT_CANVAS_PADDING
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_padding: DEFAULT_CANVAS_PADDING,
        }
    }
}

impl CanvasConfig {
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta::new(self.canvas_width, self.canvas_padding)
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_posts_dir(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.posts_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        Path::new(cwd).join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            out_dir: default_out_dir(),
            mode: RenderMode::Public,
            editor: EditorConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}
