use crate::color::{Color, HexColor};
use crate::touch::{EdgeOffset, GestureConfig};
use crate::widget::controls::IconRef;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Widget settings as written by the user. Every field is optional; see [`WidgetConfig::build`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WidgetConfig {
    pub widget_width: Option<f64>,
    pub widget_height: Option<f64>,

    /// Button colour while playing.
    pub dark_color: Option<HexColor>,
    /// Button colour while paused or stopped.
    pub light_color: Option<HexColor>,
    pub progress_color: Option<HexColor>,
    pub expand_widget_color: Option<HexColor>,
    pub cross_color: Option<HexColor>,
    pub cross_overlapped_color: Option<HexColor>,
    pub shadow_color: Option<HexColor>,

    pub button_padding: Option<f64>,
    pub prev_next_extra_padding: Option<f64>,
    pub widget_padding: Option<f64>,
    pub cross_stroke_width: Option<f64>,
    pub progress_stroke_width: Option<f64>,
    pub shadow_radius: Option<f64>,
    pub shadow_dx: Option<f64>,
    pub shadow_dy: Option<f64>,
    pub bubbles_min_size: Option<f64>,
    pub bubbles_max_size: Option<f64>,

    pub edge_offset_x_collapsed: Option<f64>,
    pub edge_offset_y_collapsed: Option<f64>,
    pub edge_offset_x_expanded: Option<f64>,
    pub edge_offset_y_expanded: Option<f64>,

    pub play_icon: Option<IconRef>,
    pub pause_icon: Option<IconRef>,
    pub prev_icon: Option<IconRef>,
    pub next_icon: Option<IconRef>,
    pub playlist_icon: Option<IconRef>,
    pub album_icon: Option<IconRef>,

    pub touch_slop: Option<f64>,
    pub long_press_timeout_ms: Option<u64>,
    pub min_fling_velocity: Option<f64>,

    /// Seed for particle layouts; random when unset.
    pub random_seed: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub radius: f64,
    pub dx: f64,
    pub dy: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Icons {
    pub play: IconRef,
    pub pause: IconRef,
    pub prev: IconRef,
    pub next: IconRef,
    pub playlist: IconRef,
    pub album: IconRef,
}

/// Validated widget configuration with every default resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub widget_width: f64,
    pub widget_height: f64,
    pub playing_color: Color,
    pub paused_color: Color,
    pub progress_color: Color,
    pub expanded_color: Color,
    pub cross_color: Color,
    pub cross_overlapped_color: Color,
    pub button_padding: f64,
    pub prev_next_extra_padding: f64,
    pub widget_padding: f64,
    pub cross_stroke_width: f64,
    pub progress_stroke_width: f64,
    pub shadow: Shadow,
    pub bubbles_min_size: f64,
    pub bubbles_max_size: f64,
    pub edge_offset_collapsed: EdgeOffset,
    pub edge_offset_expanded: EdgeOffset,
    pub icons: Icons,
    pub gesture: GestureConfig,
    pub random_seed: Option<u64>,
    pub poll_interval: Duration,
}

impl Configuration {
    /// Radius of the collapsed button and of the strip's rounded ends.
    pub fn radius(&self) -> f64 {
        self.widget_height / 2.0
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn non_negative(value: Option<f64>, name: &str, default: f64) -> Result<f64, ConfigError> {
    match value {
        Some(v) if v < 0.0 || v.is_nan() => Err(ConfigError::Invalid(format!(
            "{} must be equal to or greater than zero, got {}",
            name, v
        ))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

fn positive(value: Option<f64>, name: &str, default: f64) -> Result<f64, ConfigError> {
    match value {
        Some(v) if v <= 0.0 || v.is_nan() => Err(ConfigError::Invalid(format!(
            "{} must be greater than zero, got {}",
            name, v
        ))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

fn color(value: Option<HexColor>, default: &str) -> Result<Color, ConfigError> {
    match value {
        Some(c) => Ok(c.to_color()),
        None => default
            .parse::<HexColor>()
            .map(HexColor::to_color)
            .map_err(|e| ConfigError::Invalid(format!("default colour {}: {}", default, e))),
    }
}

fn icon(value: Option<IconRef>, default: &str) -> IconRef {
    value.unwrap_or_else(|| IconRef::new(default))
}

impl WidgetConfig {
    /// Resolves defaults and validates. Negative sizes and an inverted bubble range are refused.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let widget_width = positive(self.widget_width, "Widget width", 600.0)?;
        let widget_height = positive(self.widget_height, "Widget height", 120.0)?;
        if widget_width < widget_height {
            return Err(ConfigError::Invalid(format!(
                "Widget width ({}) must not be less than widget height ({})",
                widget_width, widget_height
            )));
        }

        let bubbles_min_size = non_negative(self.bubbles_min_size, "Bubbles min size", 10.0)?;
        let bubbles_max_size = non_negative(self.bubbles_max_size, "Bubbles max size", 30.0)?;
        if bubbles_max_size < bubbles_min_size {
            return Err(ConfigError::Invalid(format!(
                "Bubbles max size ({}) must not be less than bubbles min size ({})",
                bubbles_max_size, bubbles_min_size
            )));
        }

        let defaults = GestureConfig::default();
        let gesture = GestureConfig {
            touch_slop: non_negative(self.touch_slop, "Touch slop", defaults.touch_slop)?,
            long_press_timeout: self
                .long_press_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.long_press_timeout),
            min_fling_velocity: non_negative(
                self.min_fling_velocity,
                "Min fling velocity",
                defaults.min_fling_velocity,
            )?,
        };

        Ok(Configuration {
            widget_width,
            widget_height,
            playing_color: color(self.dark_color, "#4a3f8c")?,
            paused_color: color(self.light_color, "#f2f0fb")?,
            progress_color: color(self.progress_color, "#ff6f61")?,
            expanded_color: color(self.expand_widget_color, "#ffffff")?,
            cross_color: color(self.cross_color, "#ffffff")?,
            cross_overlapped_color: color(self.cross_overlapped_color, "#ff4b3a")?,
            button_padding: non_negative(self.button_padding, "Button padding", 24.0)?,
            prev_next_extra_padding: non_negative(
                self.prev_next_extra_padding,
                "Prev/next extra padding",
                8.0,
            )?,
            widget_padding: non_negative(self.widget_padding, "Widget padding", 12.0)?,
            cross_stroke_width: non_negative(self.cross_stroke_width, "Cross stroke width", 6.0)?,
            progress_stroke_width: non_negative(
                self.progress_stroke_width,
                "Progress stroke width",
                6.0,
            )?,
            shadow: Shadow {
                radius: non_negative(self.shadow_radius, "Shadow radius", 8.0)?,
                dx: non_negative(self.shadow_dx, "Shadow dx", 0.0)?,
                dy: non_negative(self.shadow_dy, "Shadow dy", 4.0)?,
                color: color(self.shadow_color, "#1e1e1e")?,
            },
            bubbles_min_size,
            bubbles_max_size,
            edge_offset_collapsed: EdgeOffset::new(
                self.edge_offset_x_collapsed.unwrap_or(24.0),
                self.edge_offset_y_collapsed.unwrap_or(24.0),
            ),
            edge_offset_expanded: EdgeOffset::new(
                self.edge_offset_x_expanded.unwrap_or(32.0),
                self.edge_offset_y_expanded.unwrap_or(32.0),
            ),
            icons: Icons {
                play: icon(self.play_icon, "aw_ic_play"),
                pause: icon(self.pause_icon, "aw_ic_pause"),
                prev: icon(self.prev_icon, "aw_ic_prev"),
                next: icon(self.next_icon, "aw_ic_next"),
                playlist: icon(self.playlist_icon, "aw_ic_playlist"),
                album: icon(self.album_icon, "aw_ic_default_album"),
            },
            gesture,
            random_seed: self.random_seed,
            poll_interval: Duration::from_millis(self.poll_interval_ms.unwrap_or(1000).max(1)),
        })
    }
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "floatplay", "floatplay")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<WidgetConfig, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("FLOATPLAY"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> WidgetConfig {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        return WidgetConfig::default();
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default configuration: {}", e);
            WidgetConfig::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use std::path::{Path, PathBuf};

type WatchEvents = Receiver<notify::Result<notify::Event>>;

// The watcher must outlive the receiver's use; dropping it stops the events.
fn watch_config_dir() -> Result<(PathBuf, RecommendedWatcher, WatchEvents), ConfigError> {
    let config_path = get_config_path()?;
    let config_dir = config_path
        .parent()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .to_path_buf();
    fs_err::create_dir_all(&config_dir)?;

    let (events_tx, events_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = events_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
    Ok((config_path, watcher, events_rx))
}

fn touches_config(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Sends [`AppEvent::ConfigReload`] whenever the config file changes on disk.
///
/// Editors write in bursts; whatever is already queued behind a change is folded into the
/// same reload.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let (config_path, _watcher, events) = match watch_config_dir() {
        Ok(watch) => watch,
        Err(e) => {
            log::error!("Config watcher disabled: {}", e);
            return;
        }
    };
    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = events.recv().await {
        let changed = match res {
            Ok(event) => touches_config(&event, &config_path),
            Err(e) => {
                log::warn!("Config watch error: {}", e);
                false
            }
        };
        if !changed {
            continue;
        }
        while events.try_recv().is_ok() {}
        log::info!("Configuration changed, reloading");
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}
