//! Configuration loading: `brook.toml` color overrides, abbreviations,
//! pager bounds, and history file location, plus the lazy `fish_color_*`
//! environment-variable resolver described in §6.
//!
//! Breadth-first posture carried over from the teacher: unknown TOML keys
//! are ignored rather than treated as a parse failure, and a missing or
//! unparseable config file falls back to built-in defaults instead of
//! aborting startup.

use anyhow::Result;
use core_color::{ParsedColor, parse_color_tokens};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs, path::PathBuf as Pb};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagerConfig {
    #[serde(default = "PagerConfig::default_max_rows")]
    pub max_rows: usize,
}

impl PagerConfig {
    const fn default_max_rows() -> usize {
        10
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub pager_colors: HashMap<String, String>,
    #[serde(default)]
    pub abbreviations: HashMap<String, String>,
    #[serde(default)]
    pub pager: PagerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData).
pub fn discover() -> Pb {
    let local = Pb::from("brook.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("brook").join("brook.toml");
    }
    Pb::from("brook.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config { file }),
            Err(e) => {
                tracing::debug!(target: "config", error = %e, path = %path.display(), "config parse failed, using defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    pub fn abbreviation(&self, name: &str) -> Option<&str> {
        self.file.abbreviations.get(name).map(String::as_str)
    }

    pub fn history_path_override(&self) -> Option<&Path> {
        self.file.history.file.as_deref()
    }

    pub fn pager_max_rows(&self) -> usize {
        self.file.pager.max_rows
    }
}

/// Any source of `fish_color_*`-style variables: the config file, the
/// process environment, or (in tests) a fixed map.
pub trait ColorEnvironment {
    fn get(&self, variable: &str) -> Option<String>;
}

impl ColorEnvironment for Config {
    fn get(&self, variable: &str) -> Option<String> {
        let key = variable
            .strip_prefix("fish_pager_color_")
            .map(|rest| format!("pager_{rest}"))
            .or_else(|| variable.strip_prefix("fish_color_").map(str::to_string))?;
        self.file
            .colors
            .get(&key)
            .or_else(|| self.file.pager_colors.get(&key))
            .cloned()
    }
}

/// Reads `fish_color_*` variables straight from the process environment,
/// for installations that prefer shell-exported variables over the config
/// file (the config file's `[colors]` table takes precedence when both are
/// consulted through [`LayeredColorSource`]).
pub struct ProcessEnvColorSource;

impl ColorEnvironment for ProcessEnvColorSource {
    fn get(&self, variable: &str) -> Option<String> {
        std::env::var(variable).ok()
    }
}

/// Consults `primary` first, falling back to `secondary`.
pub struct LayeredColorSource<'a> {
    pub primary: &'a dyn ColorEnvironment,
    pub secondary: &'a dyn ColorEnvironment,
}

impl ColorEnvironment for LayeredColorSource<'_> {
    fn get(&self, variable: &str) -> Option<String> {
        self.primary.get(variable).or_else(|| self.secondary.get(variable))
    }
}

/// Returns the env/config variable name for a role, e.g. `fish_color_error`
/// or `fish_pager_color_selected_background`.
pub fn role_variable_name(role: core_color::HighlightRole) -> String {
    let rendered = role.to_string();
    match rendered.strip_prefix("pager_") {
        Some(rest) => format!("fish_pager_color_{rest}"),
        None => format!("fish_color_{rendered}"),
    }
}

/// Caches resolved colors by a caller-supplied "environment version":
/// reading is lazy and values stay cached until the caller observes (and
/// reports, via [`ColorCache::resolve`]'s `version` argument) that the
/// environment changed.
#[derive(Debug, Default)]
pub struct ColorCache {
    version: u64,
    cache: HashMap<String, ParsedColor>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `role` against `source`, using the cache if `version` matches
    /// the version last seen; otherwise the whole cache is invalidated
    /// before the lookup (a config reload or `fish_color_*` mutation bumps
    /// the caller's version counter).
    pub fn resolve(
        &mut self,
        role: core_color::HighlightRole,
        source: &dyn ColorEnvironment,
        version: u64,
    ) -> ParsedColor {
        if version != self.version {
            self.cache.clear();
            self.version = version;
        }
        let variable = role_variable_name(role);
        if let Some(cached) = self.cache.get(&variable) {
            return *cached;
        }
        let parsed = source
            .get(&variable)
            .map(|value| parse_color_tokens(&value))
            .unwrap_or_default();
        self.cache.insert(variable, parsed);
        parsed
    }
}
