//! Loader for RON content files at startup.

use ron::Options;
use std::fs;
use std::path::Path;

use super::data::*;
use super::registry::ContentRegistry;

/// Copies of assets/data/*.ron compiled into the binary.
pub const EMBEDDED_UPGRADES: &str = include_str!("../../assets/data/upgrades.ron");
pub const EMBEDDED_SYNERGIES: &str = include_str!("../../assets/data/synergies.ron");
pub const EMBEDDED_BALANCE: &str = include_str!("../../assets/data/balance.ron");

/// Error type for content loading failures.
#[derive(Debug)]
pub struct ContentLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

impl std::error::Error for ContentLoadError {}

/// Raw RON text for each content file, keyed by the file it came from.
pub struct ContentSources<'a> {
    pub upgrades: &'a str,
    pub synergies: &'a str,
    pub balance: &'a str,
}

impl ContentSources<'static> {
    pub fn embedded() -> Self {
        Self {
            upgrades: EMBEDDED_UPGRADES,
            synergies: EMBEDDED_SYNERGIES,
            balance: EMBEDDED_BALANCE,
        }
    }
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

fn read_file(path: &Path) -> Result<String, ContentLoadError> {
    fs::read_to_string(path).map_err(|e| ContentLoadError {
        file: path.display().to_string(),
        message: format!("IO error: {}", e),
    })
}

/// Parse RON text containing a DataFile<T> wrapper.
fn parse_data_file<T>(file_name: &str, contents: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> = ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file_name.to_string(),
            message: format!("Parse error: {}", e),
        })?;

    Ok(data.items)
}

/// Parse a single RON struct (not wrapped in DataFile).
fn parse_single_file<T>(file_name: &str, contents: &str) -> Result<T, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file_name.to_string(),
            message: format!("Parse error: {}", e),
        })
}

/// Parse all content into a ContentRegistry.
/// Returns every parse error, not just the first one.
pub fn parse_content(sources: &ContentSources<'_>) -> Result<ContentRegistry, Vec<ContentLoadError>> {
    let mut errors = Vec::new();

    // Balance tables are required: nothing else can be interpreted without them
    let balance = match parse_single_file::<BalanceConfig>("balance.ron", sources.balance) {
        Ok(balance) => balance,
        Err(e) => {
            errors.push(e);
            return Err(errors);
        }
    };

    let mut registry = ContentRegistry::new(balance);

    // Helper macro to reduce boilerplate
    macro_rules! parse_into {
        ($registry_field:expr, $file:expr, $source:expr, $type:ty) => {
            match parse_data_file::<$type>($file, $source) {
                Ok(items) => {
                    for item in items {
                        if $registry_field.contains_key(&item.id) {
                            errors.push(ContentLoadError {
                                file: $file.to_string(),
                                message: format!("Duplicate id '{}'", item.id),
                            });
                            continue;
                        }
                        $registry_field.insert(item.id.clone(), item);
                    }
                }
                Err(e) => errors.push(e),
            }
        };
    }

    parse_into!(registry.upgrades, "upgrades.ron", sources.upgrades, UpgradeDef);
    parse_into!(registry.synergies, "synergies.ron", sources.synergies, SynergyDef);

    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors)
    }
}

/// Load all content from assets/data/*.ron into a ContentRegistry.
/// Returns errors for any files that fail to load.
pub fn load_all_content(base_path: &Path) -> Result<ContentRegistry, Vec<ContentLoadError>> {
    let mut errors = Vec::new();
    let mut read = |file: &str| match read_file(&base_path.join(file)) {
        Ok(contents) => Some(contents),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let upgrades = read("upgrades.ron");
    let synergies = read("synergies.ron");
    let balance = read("balance.ron");

    match (upgrades, synergies, balance) {
        (Some(upgrades), Some(synergies), Some(balance)) => parse_content(&ContentSources {
            upgrades: &upgrades,
            synergies: &synergies,
            balance: &balance,
        }),
        _ => Err(errors),
    }
}

impl ContentRegistry {
    /// Registry built from the RON files compiled into the binary.
    pub fn embedded() -> Result<Self, Vec<ContentLoadError>> {
        parse_content(&ContentSources::embedded())
    }
}
