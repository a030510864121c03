use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Focused-window snapshot taken alongside each screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub struct Capture {
    pub screenshot_path: PathBuf,
    pub window: WindowInfo,
}

#[async_trait]
pub trait Capturer {
    async fn capture(&self) -> Result<Capture>;
}

/// Captures the focused window on sway/i3-compatible compositors:
/// `swaymsg -t get_tree` for window metadata, `grim -g` for the screenshot.
pub struct WaylandCapture {
    screenshot_dir: PathBuf,
}

impl WaylandCapture {
    pub fn new(screenshot_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&screenshot_dir)
            .with_context(|| format!("Failed to create {}", screenshot_dir.display()))?;
        Ok(Self { screenshot_dir })
    }

    async fn focused_window(&self) -> Result<WindowInfo> {
        let output = Command::new("swaymsg")
            .args(["-t", "get_tree"])
            .output()
            .await
            .context("Failed to run swaymsg")?;

        if !output.status.success() {
            bail!("swaymsg exited with {}", output.status);
        }

        let tree: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("Invalid window tree JSON")?;

        let focused = find_focused(&tree).context("No focused window in tree")?;
        Ok(window_from_node(focused))
    }
}

#[async_trait]
impl Capturer for WaylandCapture {
    async fn capture(&self) -> Result<Capture> {
        let window = self.focused_window().await?;
        let rect = window.rect;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%6f");
        let screenshot_path = self.screenshot_dir.join(format!("screenshot_{timestamp}.png"));

        let geometry = format!("{},{} {}x{}", rect.x, rect.y, rect.width, rect.height);
        let status = Command::new("grim")
            .args(["-g", &geometry])
            .arg(&screenshot_path)
            .status()
            .await
            .context("Failed to run grim")?;

        if !status.success() {
            bail!("grim exited with {}", status);
        }

        shrink_screenshot(&screenshot_path)?;

        Ok(Capture {
            screenshot_path,
            window,
        })
    }
}

/// Depth-first search for the focused node; sway nests windows under both
/// `nodes` and `floating_nodes`.
fn find_focused(node: &serde_json::Value) -> Option<&serde_json::Value> {
    if node["focused"].as_bool() == Some(true) {
        return Some(node);
    }
    for key in ["nodes", "floating_nodes"] {
        if let Some(children) = node[key].as_array() {
            for child in children {
                if let Some(found) = find_focused(child) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn window_from_node(node: &serde_json::Value) -> WindowInfo {
    let title = node["name"].as_str().unwrap_or("Unknown").to_string();

    // Native wayland clients carry app_id; XWayland ones a window class.
    let class = node["app_id"]
        .as_str()
        .or_else(|| node["window_properties"]["class"].as_str())
        .unwrap_or("Unknown")
        .to_string();

    let rect = Rect {
        x: node["rect"]["x"].as_i64().unwrap_or(0),
        y: node["rect"]["y"].as_i64().unwrap_or(0),
        width: node["rect"]["width"].as_i64().unwrap_or(0),
        height: node["rect"]["height"].as_i64().unwrap_or(0),
    };

    WindowInfo { title, class, rect }
}

/// Keep screenshots storage-friendly: anything wider than 1920px gets
/// thumbnailed down before it lands on disk.
fn shrink_screenshot(path: &Path) -> Result<()> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open screenshot {}", path.display()))?;
    if img.width() > 1920 {
        img.thumbnail(1920, 1080)
            .save(path)
            .with_context(|| format!("Failed to save resized screenshot {}", path.display()))?;
    }
    Ok(())
}
