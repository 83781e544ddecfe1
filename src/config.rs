use std::path::{Path, PathBuf};

use anyhow::Context;
use image::imageops::FilterType;
use once_cell::sync::OnceCell;
use serde::Deserialize;

static CONFIG: OnceCell<RuntimeConfig> = OnceCell::new();

/// The global runtime config.
///
/// Panics if `init` has not been called yet.
pub fn config() -> &'static RuntimeConfig {
    CONFIG.get().expect("config init")
}

/// Loads the runtime config from the given file, or falls back to the
/// defaults when no file is given.
///
/// Errors if the config has already been initialised.
pub fn init(config_file: Option<&Path>) -> anyhow::Result<()> {
    let cfg = match config_file {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };

    if CONFIG.set(cfg).is_err() {
        anyhow::bail!("runtime config has already been initialised");
    }

    Ok(())
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    /// The image engine used to perform the actual resizing.
    ///
    /// Defaults to the ImageMagick `convert` binary.
    pub engine: EngineConfig,

    #[serde(default)]
    /// The directory the per-invocation scratch space is created in.
    ///
    /// Defaults to the system temp directory.
    pub scratch_dir: Option<PathBuf>,

    #[serde(default)]
    /// How requested dimensions are checked before reaching the engine.
    pub dimensions: DimensionsConfig,

    #[serde(default)]
    /// The maximum number of engine invocations allowed to run at once.
    ///
    /// No limit is applied if this is `None`.
    pub max_concurrency: Option<usize>,
}

impl RuntimeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;

        Self::from_yaml(&data)
            .with_context(|| format!("failed to parse config file {:?}", path))
    }

    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineConfig {
    /// Resize by running an ImageMagick process against staged files.
    Magick {
        #[serde(default = "default_magick_binary")]
        /// The binary to execute.
        ///
        /// ImageMagick 7 installs can use `magick` here with `convert`
        /// as the first arg.
        binary: PathBuf,

        #[serde(default)]
        /// Arguments placed before the source path.
        args: Vec<String>,
    },

    /// Resize in-process using the `image` crate.
    Native {
        #[serde(default)]
        filter: ResizingFilter,

        #[serde(default = "default_quality")]
        /// The JPEG quality from 1 to 100 inclusive.
        quality: u8,
    },
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::Magick {
            binary: default_magick_binary(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizingFilter {
    /// Nearest Neighbor
    Nearest,

    /// Linear Filter
    Triangle,

    /// Cubic Filter
    CatmullRom,

    /// Gaussian Filter
    Gaussian,

    /// Lanczos with window 3
    Lanczos3,
}

impl Default for ResizingFilter {
    fn default() -> Self {
        Self::Lanczos3
    }
}

impl From<ResizingFilter> for FilterType {
    fn from(filter: ResizingFilter) -> FilterType {
        match filter {
            ResizingFilter::Nearest => FilterType::Nearest,
            ResizingFilter::Triangle => FilterType::Triangle,
            ResizingFilter::CatmullRom => FilterType::CatmullRom,
            ResizingFilter::Gaussian => FilterType::Gaussian,
            ResizingFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionPolicy {
    /// Every requested size is handed to the engine untouched and
    /// the engine decides what it accepts.
    Defer,

    /// Non-positive or oversized dimensions are rejected before
    /// anything is staged.
    Strict,
}

impl Default for DimensionPolicy {
    fn default() -> Self {
        Self::Defer
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
pub struct DimensionsConfig {
    #[serde(default)]
    pub policy: DimensionPolicy,

    #[serde(default = "default_max_dimension")]
    /// The largest width or height accepted under the `strict` policy.
    pub max_dimension: u32,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            policy: DimensionPolicy::default(),
            max_dimension: default_max_dimension(),
        }
    }
}

fn default_magick_binary() -> PathBuf {
    PathBuf::from("convert")
}

const fn default_quality() -> u8 {
    85
}

const fn default_max_dimension() -> u32 {
    8192
}
