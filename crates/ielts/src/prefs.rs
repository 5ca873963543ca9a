use std::path::{Path, PathBuf};

use colored::Colorize;
use ielts_core::prefs::Preferences;

use crate::prelude::{println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "prefs")]
#[command(about = "Show or change persisted preferences")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Dark mode for rendered pages
    #[clap(name = "dark-mode")]
    DarkMode {
        /// New value; prints the current one when omitted
        #[arg(value_enum)]
        action: Option<Switch>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

/// JSON file holding the [`Preferences`] document.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/ielts/preferences.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs_next::config_dir().ok_or_eyre("Could not determine the config directory")?;
        Ok(dir.join("ielts").join("preferences.json"))
    }

    /// Store at `path`, or at [`PreferenceStore::default_path`].
    pub fn resolve(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Ok(Self::new(Self::default_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields the defaults.
    pub fn load(&self) -> Preferences {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                log::warn!("Failed to read {}: {e}", self.path.display());
                return Preferences::default();
            }
        };

        Preferences::from_json(&contents).unwrap_or_else(|e| {
            log::warn!("Ignoring corrupt preferences in {}: {e}", self.path.display());
            Preferences::default()
        })
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| f!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, prefs.to_json()?)
            .wrap_err_with(|| f!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

pub fn apply(prefs: &mut Preferences, action: Switch) {
    match action {
        Switch::On => prefs.dark_mode = true,
        Switch::Off => prefs.dark_mode = false,
        Switch::Toggle => {
            prefs.toggle_dark_mode();
        }
    }
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let store = PreferenceStore::resolve(global.prefs)?;

    if global.verbose {
        println!("Preferences file: {}", store.path().display());
    }

    match app.command {
        Commands::DarkMode { action } => {
            let mut prefs = store.load();
            if let Some(action) = action {
                apply(&mut prefs, action);
                store.save(&prefs)?;
            }

            let state = if prefs.dark_mode { "on".yellow() } else { "off".cyan() };
            println!("dark mode: {}", state.bold());
            Ok(())
        }
    }
}
