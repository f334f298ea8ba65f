//! Scheme lookup and per-vehicle number assignment
//!
//! [`SchemeRegistry`] holds the schemes found in skin folders, keyed by livery
//! and skin name. Schemes shipped as defaults live in the same map but can be
//! switched off as a group. [`NumberAssigner`] decides which number a vehicle
//! carries and turns it into shader parameters.
//!
//! ## Directory Layout
//!
//! ```text
//! skins/<livery>/<skin>/numbering.toml    skin schemes
//! defaults/<livery>/numbering.toml        default schemes
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::settings::NumberingSettings;
use crate::layout::{GlyphLayoutEngine, NumberLayout, ShaderParams};
use crate::scheme::{NumberingScheme, SCHEME_FILE_NAME};
use crate::sequencer::SequenceCache;

/// Skin name default schemes are registered under
pub const DEFAULT_SKIN: &str = "default";

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A scheme root could not be listed
    #[error("failed to read directory {path:?}: {source}")]
    ReadDir {
        /// Directory
        path: PathBuf,
        /// IO error
        source: std::io::Error,
    },
}

type SchemeKey = (String, String);

/// Loaded numbering schemes
#[derive(Debug)]
pub struct SchemeRegistry {
    schemes: HashMap<SchemeKey, Arc<NumberingScheme>>,
    parked_defaults: Vec<Arc<NumberingScheme>>,
    defaults_enabled: bool,
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeRegistry {
    /// Empty registry with defaults enabled
    pub fn new() -> Self {
        Self {
            schemes: HashMap::new(),
            parked_defaults: Vec::new(),
            defaults_enabled: true,
        }
    }

    /// Register a scheme, replacing any previous one for the same skin
    pub fn insert(&mut self, livery_id: &str, skin_name: &str, scheme: NumberingScheme) -> Arc<NumberingScheme> {
        let scheme = Arc::new(scheme.with_owner(livery_id, skin_name));
        if scheme.is_default && !self.defaults_enabled {
            self.parked_defaults.push(Arc::clone(&scheme));
        } else {
            self.schemes
                .insert((livery_id.to_string(), skin_name.to_string()), Arc::clone(&scheme));
        }
        scheme
    }

    /// Scheme for a livery and skin
    pub fn scheme(&self, livery_id: &str, skin_name: &str) -> Option<Arc<NumberingScheme>> {
        self.schemes
            .get(&(livery_id.to_string(), skin_name.to_string()))
            .cloned()
    }

    /// Load every `<livery>/<skin>/numbering.toml` below `root`
    ///
    /// A scheme that fails to load is logged and skipped; a previously loaded
    /// scheme for the same skin is dropped. Returns the number of schemes loaded.
    pub fn load_directory(&mut self, root: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let root = root.as_ref();
        let mut loaded = 0;

        for livery_dir in sorted_subdirs(root)? {
            let livery_id = dir_name(&livery_dir);
            for skin_dir in sorted_subdirs(&livery_dir)? {
                let skin_name = dir_name(&skin_dir);
                let path = skin_dir.join(SCHEME_FILE_NAME);
                if !path.is_file() {
                    continue;
                }

                match NumberingScheme::load(&path) {
                    Ok(scheme) => {
                        self.insert(&livery_id, &skin_name, scheme);
                        loaded += 1;
                    }
                    Err(e) => {
                        log::warn!("Error loading numbering config in {:?}: {}", path, e);
                        self.schemes.remove(&(livery_id.clone(), skin_name));
                    }
                }
            }
        }

        log::info!("Loaded {} numbering schemes from {:?}", loaded, root);
        Ok(loaded)
    }

    /// Load every `<livery>/numbering.toml` below `root` as a default scheme
    ///
    /// Defaults are registered under [`DEFAULT_SKIN`]. While defaults are
    /// disabled they are kept aside and do not resolve.
    pub fn load_defaults(&mut self, root: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let root = root.as_ref();
        let mut loaded = 0;

        for livery_dir in sorted_subdirs(root)? {
            let path = livery_dir.join(SCHEME_FILE_NAME);
            if !path.is_file() {
                continue;
            }

            match NumberingScheme::load(&path) {
                Ok(mut scheme) => {
                    scheme.is_default = true;
                    self.insert(&dir_name(&livery_dir), DEFAULT_SKIN, scheme);
                    loaded += 1;
                }
                Err(e) => log::warn!("Error loading default numbering config in {:?}: {}", path, e),
            }
        }

        log::info!("Loaded {} default numbering schemes from {:?}", loaded, root);
        Ok(loaded)
    }

    /// Enable or disable all default schemes
    pub fn set_defaults_enabled(&mut self, enabled: bool) {
        if enabled == self.defaults_enabled {
            return;
        }
        self.defaults_enabled = enabled;

        if enabled {
            for scheme in self.parked_defaults.drain(..) {
                let key = (
                    scheme.livery_id.clone().unwrap_or_default(),
                    scheme.skin_name.clone().unwrap_or_default(),
                );
                self.schemes.insert(key, scheme);
            }
        } else {
            let parked = &mut self.parked_defaults;
            self.schemes.retain(|_, scheme| {
                if scheme.is_default {
                    parked.push(Arc::clone(scheme));
                    false
                } else {
                    true
                }
            });
        }
        log::debug!("Default numbering schemes enabled: {}", enabled);
    }

    /// Follow the `enable_default_numbers` setting
    pub fn apply_settings(&mut self, settings: &NumberingSettings) {
        self.set_defaults_enabled(settings.enable_default_numbers);
    }

    /// Whether default schemes resolve
    pub const fn defaults_enabled(&self) -> bool {
        self.defaults_enabled
    }

    /// Number of active schemes
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    /// Whether no scheme is active
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Drop every scheme
    pub fn clear(&mut self) {
        self.schemes.clear();
        self.parked_defaults.clear();
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// What a vehicle is, as far as numbering cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VehicleKind {
    /// Steam locomotive; its number is handed to the next tender
    SteamLocomotive,
    /// Tender; takes the preceding steam locomotive's number
    Tender,
    /// Anything else
    #[default]
    Other,
}

/// A numbered vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    /// Display identifier, usually ending in three digits
    pub id: String,
    /// Persistent unique identifier
    pub guid: String,
    /// Livery the vehicle uses
    pub livery_id: String,
    /// Skin currently applied
    pub skin_name: String,
    /// Vehicle kind
    pub kind: VehicleKind,
}

/// Result of [`NumberAssigner::apply`]
#[derive(Debug, Clone)]
pub struct AppliedNumber {
    /// Scheme that produced the layout
    pub scheme: Arc<NumberingScheme>,
    /// Number that was applied
    pub number: i32,
    /// Per-digit rectangles
    pub layout: NumberLayout,
    /// Uniform block for the renderer
    pub params: ShaderParams,
}

/// Chooses and remembers vehicle numbers
#[derive(Debug)]
pub struct NumberAssigner<'a> {
    settings: NumberingSettings,
    sequences: &'a SequenceCache,
    saved: HashMap<String, i32>,
    last_steamer_number: Option<i32>,
}

impl NumberAssigner<'static> {
    /// Assigner drawing from the process-wide sequence cache
    pub fn new(settings: NumberingSettings) -> Self {
        Self::with_sequences(settings, SequenceCache::global())
    }
}

impl<'a> NumberAssigner<'a> {
    /// Assigner drawing from a specific sequence cache
    pub fn with_sequences(settings: NumberingSettings, sequences: &'a SequenceCache) -> Self {
        Self {
            settings,
            sequences,
            saved: HashMap::new(),
            last_steamer_number: None,
        }
    }

    /// Current settings
    pub const fn settings(&self) -> &NumberingSettings {
        &self.settings
    }

    /// Replace the settings
    pub fn set_settings(&mut self, settings: NumberingSettings) {
        self.settings = settings;
    }

    /// Number encoded in the last three characters of a vehicle id
    pub fn id_number(id: &str) -> Option<i32> {
        let (start, _) = id.char_indices().rev().nth(2)?;
        id[start..].parse().ok()
    }

    /// Pick a number for a vehicle that does not have one yet
    pub fn new_number(&self, registry: &SchemeRegistry, vehicle: &Vehicle) -> i32 {
        if vehicle.kind == VehicleKind::Tender {
            if let Some(number) = self.last_steamer_number {
                return number;
            }
        }

        let scheme = registry.scheme(&vehicle.livery_id, &vehicle.skin_name);
        let force_random = scheme.as_ref().is_some_and(|s| s.force_random);

        if self.settings.prefer_car_id && !force_random {
            if let Some(number) = Self::id_number(&vehicle.id) {
                let offset = match &scheme {
                    Some(scheme) if self.settings.allow_car_id_offset => scheme.offset,
                    _ => 0,
                };
                return number.saturating_add(offset);
            }
            log::warn!("Vehicle id '{}' does not end in a number, using a random one", vehicle.id);
        }

        let Some(scheme) = scheme else {
            return 0;
        };
        self.sequences
            .draw(
                scheme.min_number,
                scheme.max_number,
                self.settings.allow_car_id_offset,
                scheme.offset,
            )
            .unwrap_or_else(|e| {
                log::warn!("Cannot draw a number for '{}': {}", vehicle.id, e);
                scheme.min_number
            })
    }

    /// Remembered number, or a fresh one
    pub fn current_number(&self, registry: &SchemeRegistry, vehicle: &Vehicle) -> i32 {
        self.saved_number(&vehicle.guid)
            .unwrap_or_else(|| self.new_number(registry, vehicle))
    }

    /// Remembered number of a vehicle
    pub fn saved_number(&self, guid: &str) -> Option<i32> {
        self.saved.get(guid).copied()
    }

    /// Remember a vehicle's number
    pub fn set_number(&mut self, guid: impl Into<String>, number: i32) {
        self.saved.insert(guid.into(), number);
    }

    /// Number of the most recently numbered steam locomotive
    pub const fn last_steamer_number(&self) -> Option<i32> {
        self.last_steamer_number
    }

    /// Apply a number to a vehicle's surface
    ///
    /// Returns `None` when the vehicle's skin has no scheme; nothing is
    /// remembered in that case.
    pub fn apply(
        &mut self,
        registry: &SchemeRegistry,
        vehicle: &Vehicle,
        number: i32,
        surface_width: u32,
        surface_height: u32,
    ) -> Option<AppliedNumber> {
        let Some(scheme) = registry.scheme(&vehicle.livery_id, &vehicle.skin_name) else {
            log::debug!("No numbering scheme for {}/{}", vehicle.livery_id, vehicle.skin_name);
            return None;
        };

        log::info!("Applying number {} to {}", number, vehicle.id);
        self.set_number(vehicle.guid.clone(), number);
        self.last_steamer_number = (vehicle.kind == VehicleKind::SteamLocomotive).then_some(number);

        let layout = GlyphLayoutEngine::layout(&scheme, number, surface_width, surface_height);
        let params = ShaderParams::from_layout(&scheme, &layout);
        Some(AppliedNumber {
            scheme,
            number,
            layout,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::tests::{sample_scheme, SAMPLE};

    fn vehicle(id: &str, kind: VehicleKind) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            guid: format!("guid-{id}"),
            livery_id: "loco".to_string(),
            skin_name: "red".to_string(),
            kind,
        }
    }

    fn registry() -> SchemeRegistry {
        let mut registry = SchemeRegistry::new();
        registry.insert("loco", "red", sample_scheme());
        registry
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("skin_numbering_{name}_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_id_number() {
        assert_eq!(NumberAssigner::id_number("L-042"), Some(42));
        assert_eq!(NumberAssigner::id_number("123"), Some(123));
        assert_eq!(NumberAssigner::id_number("AB"), None);
        assert_eq!(NumberAssigner::id_number("L-0x2"), None);
    }

    #[test]
    fn test_prefers_vehicle_id() {
        let cache = SequenceCache::with_seed(1);
        let registry = registry();
        let mut assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);

        // Sample scheme offset is 3
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), 45);

        assigner.set_settings(NumberingSettings {
            allow_car_id_offset: false,
            ..NumberingSettings::default()
        });
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), 42);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_large_offset_saturates() {
        let cache = SequenceCache::with_seed(1);
        let mut registry = SchemeRegistry::new();
        let mut scheme = sample_scheme();
        scheme.offset = i32::MAX;
        registry.insert("loco", "red", scheme);

        let assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), i32::MAX);

        let settings = NumberingSettings {
            prefer_car_id: false,
            ..NumberingSettings::default()
        };
        let assigner = NumberAssigner::with_sequences(settings, &cache);
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), i32::MAX);
    }

    #[test]
    fn test_random_numbers_stay_in_range() {
        let cache = SequenceCache::with_seed(2);
        let mut registry = SchemeRegistry::new();
        let mut scheme = sample_scheme();
        scheme.force_random = true;
        registry.insert("loco", "red", scheme);

        let assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);
        for _ in 0..50 {
            let n = assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other));
            assert!((103..=202).contains(&n), "{n}");
        }
    }

    #[test]
    fn test_without_scheme() {
        let cache = SequenceCache::with_seed(3);
        let registry = SchemeRegistry::new();
        let settings = NumberingSettings {
            prefer_car_id: false,
            ..NumberingSettings::default()
        };
        let assigner = NumberAssigner::with_sequences(settings, &cache);
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), 0);

        let assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);
        assert_eq!(assigner.new_number(&registry, &vehicle("L-042", VehicleKind::Other)), 42);
    }

    #[test]
    fn test_tender_follows_steam_locomotive() {
        let cache = SequenceCache::with_seed(4);
        let registry = registry();
        let mut assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);

        let loco = vehicle("S-101", VehicleKind::SteamLocomotive);
        assert!(assigner.apply(&registry, &loco, 777, 512, 128).is_some());
        assert_eq!(assigner.last_steamer_number(), Some(777));
        assert_eq!(assigner.new_number(&registry, &vehicle("T-555", VehicleKind::Tender)), 777);

        // Any other vehicle breaks the chain
        assigner.apply(&registry, &vehicle("B-200", VehicleKind::Other), 5, 512, 128);
        assert_eq!(assigner.last_steamer_number(), None);
        assert_eq!(assigner.new_number(&registry, &vehicle("T-555", VehicleKind::Tender)), 558);
    }

    #[test]
    fn test_apply_and_current_number() {
        let cache = SequenceCache::with_seed(5);
        let registry = registry();
        let mut assigner = NumberAssigner::with_sequences(NumberingSettings::default(), &cache);
        let car = vehicle("C-010", VehicleKind::Other);

        assert_eq!(assigner.current_number(&registry, &car), 13);
        let applied = assigner.apply(&registry, &car, 1234, 512, 128).unwrap();
        assert_eq!(applied.layout.digit_count(), 4);
        assert_eq!(applied.params.digit_count, 4);
        assert_eq!(applied.scheme.livery_id.as_deref(), Some("loco"));
        assert_eq!(assigner.current_number(&registry, &car), 1234);

        // Unknown skin: nothing applied, nothing remembered
        let mut other = vehicle("C-011", VehicleKind::Other);
        other.skin_name = "blue".to_string();
        assert!(assigner.apply(&registry, &other, 99, 512, 128).is_none());
        assert_eq!(assigner.saved_number(&other.guid), None);
    }

    #[test]
    fn test_load_directory_skips_broken_schemes() {
        let root = temp_dir("skins");
        let good = root.join("loco").join("red");
        let bad = root.join("loco").join("broken");
        std::fs::create_dir_all(&good).unwrap();
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::create_dir_all(root.join("loco").join("plain")).unwrap();
        std::fs::write(good.join(SCHEME_FILE_NAME), SAMPLE).unwrap();
        std::fs::write(bad.join(SCHEME_FILE_NAME), "target_texture = [").unwrap();

        let mut registry = SchemeRegistry::new();
        assert_eq!(registry.load_directory(&root).unwrap(), 1);
        assert_eq!(registry.len(), 1);

        let scheme = registry.scheme("loco", "red").unwrap();
        assert_eq!(scheme.skin_name.as_deref(), Some("red"));
        assert!(!scheme.is_default);
        assert!(registry.scheme("loco", "broken").is_none());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_defaults_can_be_toggled() {
        let root = temp_dir("defaults");
        std::fs::create_dir_all(root.join("loco")).unwrap();
        std::fs::write(root.join("loco").join(SCHEME_FILE_NAME), SAMPLE).unwrap();

        let mut registry = SchemeRegistry::new();
        registry.insert("loco", "red", sample_scheme());
        assert_eq!(registry.load_defaults(&root).unwrap(), 1);
        assert!(registry.scheme("loco", DEFAULT_SKIN).unwrap().is_default);

        registry.apply_settings(&NumberingSettings {
            enable_default_numbers: false,
            ..NumberingSettings::default()
        });
        assert!(!registry.defaults_enabled());
        assert!(registry.scheme("loco", DEFAULT_SKIN).is_none());
        assert!(registry.scheme("loco", "red").is_some());

        registry.set_defaults_enabled(true);
        assert!(registry.scheme("loco", DEFAULT_SKIN).is_some());
        assert_eq!(registry.len(), 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let mut registry = SchemeRegistry::new();
        assert!(matches!(
            registry.load_directory("/nonexistent/skins"),
            Err(RegistryError::ReadDir { .. })
        ));
    }
}
