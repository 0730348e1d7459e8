use std::path::Path;
use std::sync::Arc;

use crate::GemmError;

/// Static mutex holding the global configuration, initialized as `None`.
static CUBEBLAS_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

const CONFIG_FILE_NAMES: [&str; 2] = ["cubeblas.toml", "CubeBLAS.toml"];

// A square GEMM cube must stay within 1024 units.
const MAX_CUBE_DIM: u32 = 32;

/// Configuration shared by the library and the demo programs.
#[derive(Default, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Logging settings used by the demo programs.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Kernel launch settings.
    #[serde(default)]
    pub launch: LaunchConfig,
}

#[derive(Default, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub level: LogLevel,
}

/// Verbosity of the `log` backend installed by the programs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let level = match value.to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => LogLevel::Off,
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" | "1" | "true" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => return None,
        };
        Some(level)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Side of the square cube used by the GEMM kernel, one unit per output element.
    #[serde(default = "default_cube_dim")]
    pub cube_dim: u32,

    /// Number of units per cube for device-side copies.
    #[serde(default = "default_copy_cube_dim")]
    pub copy_cube_dim: u32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            cube_dim: default_cube_dim(),
            copy_cube_dim: default_copy_cube_dim(),
        }
    }
}

fn default_cube_dim() -> u32 {
    16
}

fn default_copy_cube_dim() -> u32 {
    256
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it if not set.
    ///
    /// A configuration that fails to load is reported and replaced by the default one. Use
    /// [GlobalConfig::init] to handle the error instead.
    pub fn get() -> Arc<Self> {
        let mut state = CUBEBLAS_GLOBAL_CONFIG.lock();

        if let Some(config) = state.as_ref() {
            return config.clone();
        }

        let config = Self::load().unwrap_or_else(|err| {
            log::warn!("Falling back to the default configuration: {err}");
            Self::default()
        });
        let config = Arc::new(config);
        *state = Some(config.clone());

        config
    }

    /// Loads the configuration from the file system and the environment, then installs it.
    pub fn init() -> Result<Arc<Self>, GemmError> {
        let config = Self::load()?;
        Self::set(config)?;
        Ok(Self::get())
    }

    /// Sets the global configuration to the provided value.
    ///
    /// Must be called before the configuration is first read.
    pub fn set(config: Self) -> Result<(), GemmError> {
        config.validate()?;

        let mut state = CUBEBLAS_GLOBAL_CONFIG.lock();
        if state.is_some() {
            return Err(GemmError::Config(
                "the global configuration is already set".into(),
            ));
        }
        *state = Some(Arc::new(config));

        Ok(())
    }

    /// Reads `cubeblas.toml` from the current directory or its parents, then applies the
    /// environment overrides.
    pub fn load() -> Result<Self, GemmError> {
        let config = Self::from_current_dir()?.override_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, GemmError> {
        toml::from_str(content).map_err(|err| GemmError::Config(err.to_string()))
    }

    /// Overrides fields from `CUBEBLAS_LOG` and `CUBEBLAS_CUBE_DIM`.
    pub fn override_from_env(self) -> Result<Self, GemmError> {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Overrides fields using `lookup` to resolve variables.
    pub fn override_from<F>(mut self, lookup: F) -> Result<Self, GemmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CUBEBLAS_LOG") {
            self.logger.level = LogLevel::parse(&val).ok_or_else(|| {
                GemmError::Config(format!("CUBEBLAS_LOG has an unknown level `{val}`"))
            })?;
        }

        if let Some(val) = lookup("CUBEBLAS_CUBE_DIM") {
            self.launch.cube_dim = val.parse().map_err(|_| {
                GemmError::Config(format!("CUBEBLAS_CUBE_DIM is not an integer: `{val}`"))
            })?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), GemmError> {
        if self.launch.cube_dim == 0 || self.launch.cube_dim > MAX_CUBE_DIM {
            return Err(GemmError::Config(format!(
                "launch.cube_dim must be between 1 and {MAX_CUBE_DIM}, got {}",
                self.launch.cube_dim
            )));
        }
        if self.launch.copy_cube_dim == 0 {
            return Err(GemmError::Config(
                "launch.copy_cube_dim must be positive".into(),
            ));
        }
        Ok(())
    }

    fn from_current_dir() -> Result<Self, GemmError> {
        let mut dir = std::env::current_dir().map_err(|err| GemmError::Config(err.to_string()))?;

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    return Self::from_file_path(&path);
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(Self::default())
    }

    fn from_file_path(path: &Path) -> Result<Self, GemmError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| GemmError::Config(format!("{}: {err}", path.display())))?;
        log::debug!("Loading configuration from {}", path.display());
        Self::from_toml(&content)
    }
}
