//! Changed-file classification
//!
//! Decides which paths are resource assets (binary, media, archives, build
//! output, engine-generated data) whose diffs are noise to a text reviewer, and
//! which language category a source file belongs to. Everything here is a pure
//! function of the path and the immutable [`ResourceRules`] tables.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::config::ResourcesConfig;

/// Extensions (lower case, no dot) that mark a resource file
pub const RESOURCE_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp", "ico", "svg",
    // audio
    "mp3", "wav", "ogg", "m4a", "aac", "wma", "flac", "aiff", "mid", "midi",
    "unity3d", "bank", "fsb", "vag", "xma", "xwb",
    // video
    "mp4", "avi", "mov", "wmv", "flv", "webm",
    // unity serialized data
    "unity", "prefab", "asset", "mat", "anim", "controller", "mask", "meta",
    // 3d and design sources
    "fbx", "obj", "blend", "tga", "psd", "ai", "pdf",
    // archives
    "zip", "rar", "7z", "tar", "gz",
    // binaries
    "exe", "dll", "so", "dylib", "bin",
];

/// Path prefixes of asset and generated directories.
///
/// Matched as plain string prefixes, so `Library` also covers `LibraryX/foo`.
/// That looseness is long-standing behavior and kept deliberately.
pub const RESOURCE_DIRECTORIES: &[&str] = &[
    "Assets/Resources",
    "Assets/StreamingAssets",
    "Assets/Textures",
    "Assets/Models",
    "Assets/Animations",
    "Assets/Audio",
    "Assets/Scenes",
    "Assets/Prefabs",
    "Assets/Materials",
    "Assets/Sprites",
    "Library",
    "Temp",
    "Logs",
];

/// Extension to source category label
pub const SOURCE_CATEGORIES: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("html", "html"),
    ("css", "css"),
    ("ts", "typescript"),
    ("jsx", "react"),
    ("tsx", "react"),
    ("java", "java"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("go", "go"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("php", "php"),
    ("sql", "sql"),
    ("shader", "unity-shader"),
    ("anim", "unity-animation"),
    ("prefab", "unity-prefab"),
    ("mat", "unity-material"),
    ("asset", "unity-asset"),
    ("unity", "unity-scene"),
];

/// Substrings that tie a path to a Unity project
const UNITY_MARKERS: &[&str] = &[
    "Assets/",
    ".cs",
    ".shader",
    ".anim",
    ".prefab",
    ".mat",
    ".unity",
    "ProjectSettings/",
    "Packages/",
    "Assembly-CSharp",
    "ScriptableObject",
];

/// Classification of a single changed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub path: String,
    /// Excluded from review
    pub is_resource: bool,
    /// Language label, if the extension is known
    pub source_category: Option<&'static str>,
    /// Path looks like part of a Unity project
    pub unity_related: bool,
}

/// Immutable resource and category tables, built once at startup
#[derive(Debug, Clone)]
pub struct ResourceRules {
    extensions: HashSet<String>,
    directories: Vec<String>,
    categories: HashMap<&'static str, &'static str>,
}

impl Default for ResourceRules {
    fn default() -> Self {
        Self {
            extensions: RESOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            directories: RESOURCE_DIRECTORIES.iter().map(|d| d.to_string()).collect(),
            categories: SOURCE_CATEGORIES.iter().copied().collect(),
        }
    }
}

impl ResourceRules {
    /// Built-in tables extended with the configured additions
    pub fn from_config(config: &ResourcesConfig) -> Self {
        let mut rules = Self::default();
        rules.extensions.extend(
            config
                .extra_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase()),
        );
        rules.directories.extend(
            config
                .extra_directories
                .iter()
                .filter(|d| !d.is_empty())
                .cloned(),
        );
        rules
    }

    /// Classify one path
    pub fn classify(&self, path: &str) -> FileClassification {
        FileClassification {
            path: path.to_string(),
            is_resource: self.is_resource(path),
            source_category: self.source_category(path),
            unity_related: is_unity_related(path),
        }
    }

    /// Whether diffs of `path` should be left out of the review
    pub fn is_resource(&self, path: &str) -> bool {
        if let Some(ext) = extension(path) {
            if self.extensions.contains(&ext) {
                return true;
            }
        }

        self.directories.iter().any(|dir| path.starts_with(dir.as_str()))
    }

    /// Language label for `path`, if its extension is known
    pub fn source_category(&self, path: &str) -> Option<&'static str> {
        let ext = extension(path)?;
        self.categories.get(ext.as_str()).copied()
    }
}

/// Lower-cased extension of the final path segment.
///
/// Dot-files such as `.gitignore` have none.
fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

fn is_unity_related(path: &str) -> bool {
    UNITY_MARKERS.iter().any(|marker| path.contains(marker))
}
