/// Clip library
///
/// Resolves clip names to encoded audio data using the fixed folder
/// convention `<root>/Audio/Sound/<name>` and `<root>/Audio/Music/<name>`.
/// The library is scanned once at load time; file contents are read lazily
/// on first use and kept in memory afterwards.
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::audio_system::AudioCategory;
use crate::error::AudioError;
use crate::slug;

/// Encoded audio clip ready to be handed to an output backend
#[derive(Debug, Clone)]
pub struct Clip {
    name: String,
    category: AudioCategory,
    data: Arc<[u8]>,
    path: Option<PathBuf>,
}

impl Clip {
    pub fn new(name: impl Into<String>, category: AudioCategory, data: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            category,
            data,
            path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> AudioCategory {
        self.category
    }

    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Looks up clips by name
pub trait ClipResolver {
    /// Resolve a clip, returning `None` when no such clip exists
    fn resolve(&mut self, name: &str, category: AudioCategory) -> Option<Clip>;

    /// All clip names of a category, sorted
    fn names(&self, category: AudioCategory) -> Vec<String>;
}

#[derive(Debug)]
struct ClipEntry {
    path: PathBuf,
    data: Option<Arc<[u8]>>,
}

/// Filesystem-backed clip library
#[derive(Debug)]
pub struct ClipLibrary {
    root: PathBuf,
    entries: HashMap<AudioCategory, BTreeMap<String, ClipEntry>>,
}

impl ClipLibrary {
    /// Scan the resource root for clips of every category
    pub fn scan(root: impl Into<PathBuf>) -> Self {
        let mut library = Self {
            root: root.into(),
            entries: HashMap::new(),
        };
        library.rescan();
        library
    }

    /// Rebuild the name index from disk, dropping cached clip data
    pub fn rescan(&mut self) {
        self.entries.clear();
        for category in AudioCategory::ALL {
            let folder = self.root.join(category.folder());
            let found = scan_folder(&folder);
            tracing::info!(
                "Indexed {} {} clip(s) under {}",
                found.len(),
                category,
                folder.display()
            );
            self.entries.insert(category, found);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed clips in a category
    pub fn len(&self, category: AudioCategory) -> usize {
        self.entries.get(&category).map_or(0, BTreeMap::len)
    }

    /// Stable identifiers for every clip of a category, paired with the clip name
    pub fn identifiers(&self, category: AudioCategory) -> Vec<(String, String)> {
        self.names(category)
            .into_iter()
            .map(|name| (slug::identifier(&name), name))
            .collect()
    }

    fn find_key(&self, name: &str, category: AudioCategory) -> Option<String> {
        let entries = self.entries.get(&category)?;
        if entries.contains_key(name) {
            return Some(name.to_string());
        }
        entries
            .keys()
            .find(|key| slug::same_identifier(key, name))
            .cloned()
    }
}

impl ClipResolver for ClipLibrary {
    fn resolve(&mut self, name: &str, category: AudioCategory) -> Option<Clip> {
        let key = self.find_key(name, category)?;
        let entry = self.entries.get_mut(&category)?.get_mut(&key)?;

        let data = match &entry.data {
            Some(data) => Arc::clone(data),
            None => match std::fs::read(&entry.path) {
                Ok(bytes) => {
                    tracing::debug!(
                        "Loaded clip {}: {} ({} bytes)",
                        key,
                        entry.path.display(),
                        bytes.len()
                    );
                    let data: Arc<[u8]> = Arc::from(bytes);
                    entry.data = Some(Arc::clone(&data));
                    data
                }
                Err(source) => {
                    let err = AudioError::LoadFailed {
                        path: entry.path.display().to_string(),
                        source,
                    };
                    tracing::error!(error = ?err, "{}", err);
                    return None;
                }
            },
        };

        Some(Clip::new(key, category, data).with_path(entry.path.clone()))
    }

    fn names(&self, category: AudioCategory) -> Vec<String> {
        self.entries
            .get(&category)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Clip name for a file: the part of the file name before the first dot
fn clip_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.starts_with('.') {
        return None;
    }
    if path.extension().and_then(|e| e.to_str()) == Some("meta") {
        return None;
    }
    file_name
        .split('.')
        .next()
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

fn scan_folder(folder: &Path) -> BTreeMap<String, ClipEntry> {
    let mut found = BTreeMap::new();
    if !folder.is_dir() {
        tracing::warn!("Clip folder not found: {}", folder.display());
        return found;
    }

    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = clip_name(path) else {
            continue;
        };
        if let Some(existing) = found.get(&name) {
            tracing::warn!(
                "Duplicate clip name {}: keeping {}, ignoring {}",
                name,
                existing.path.display(),
                path.display()
            );
            continue;
        }
        found.insert(
            name,
            ClipEntry {
                path: path.to_path_buf(),
                data: None,
            },
        );
    }

    found
}

/// In-memory clip library, for embedding clips or testing
#[derive(Debug, Default)]
pub struct MemoryClipLibrary {
    clips: HashMap<AudioCategory, BTreeMap<String, Arc<[u8]>>>,
}

impl MemoryClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: AudioCategory, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.clips
            .entry(category)
            .or_default()
            .insert(name.into(), data.into());
    }

    pub fn with_clip(mut self, category: AudioCategory, name: &str) -> Self {
        self.insert(category, name, name.as_bytes().to_vec());
        self
    }
}

impl ClipResolver for MemoryClipLibrary {
    fn resolve(&mut self, name: &str, category: AudioCategory) -> Option<Clip> {
        let clips = self.clips.get(&category)?;
        clips
            .get_key_value(name)
            .or_else(|| {
                clips
                    .iter()
                    .find(|(key, _)| slug::same_identifier(key, name))
            })
            .map(|(key, data)| Clip::new(key.clone(), category, Arc::clone(data)))
    }

    fn names(&self, category: AudioCategory) -> Vec<String> {
        self.clips
            .get(&category)
            .map(|clips| clips.keys().cloned().collect())
            .unwrap_or_default()
    }
}
