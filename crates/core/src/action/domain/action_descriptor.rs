use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// What to do when an expression fires, with its target media.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Open a (YouTube) URL in the default browser.
    PlayYoutube { url: String },
    /// Play a local audio file.
    PlayLocal { path: PathBuf },
    /// Loop a local audio file while the expression is held, pausing when
    /// it is released and resuming where it left off.
    HoldLocal { path: PathBuf },
}

impl ActionKind {
    pub const NAMES: &[&str] = &["play_youtube", "play_local", "hold_local"];

    /// Builds a kind from its configuration name and media target.
    /// Returns `None` for unrecognized action names.
    pub fn from_config(action: &str, media: &str) -> Option<Self> {
        match action {
            "play_youtube" => Some(ActionKind::PlayYoutube {
                url: media.to_string(),
            }),
            "play_local" => Some(ActionKind::PlayLocal {
                path: PathBuf::from(media),
            }),
            "hold_local" => Some(ActionKind::HoldLocal {
                path: PathBuf::from(media),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::PlayYoutube { .. } => "play_youtube",
            ActionKind::PlayLocal { .. } => "play_local",
            ActionKind::HoldLocal { .. } => "hold_local",
        }
    }

    /// The local media file this action plays, if any.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            ActionKind::PlayYoutube { .. } => None,
            ActionKind::PlayLocal { path } | ActionKind::HoldLocal { path } => Some(path),
        }
    }

    /// Whether the action follows the expression's held state instead of
    /// its fire events.
    pub fn is_held(&self) -> bool {
        matches!(self, ActionKind::HoldLocal { .. })
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::PlayYoutube { url } => write!(f, "open {url}"),
            ActionKind::PlayLocal { path } => write!(f, "play {}", path.display()),
            ActionKind::HoldLocal { path } => write!(f, "loop {} while held", path.display()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub expression: String,
    pub kind: ActionKind,
    pub description: String,
}

/// Expression name → action, fixed after startup.
///
/// Expressions without an entry are inert: they are still classified and
/// debounced, but firing them does nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionTable {
    descriptors: BTreeMap<String, ActionDescriptor>,
}

impl ActionTable {
    pub fn new(descriptors: impl IntoIterator<Item = ActionDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| (d.expression.clone(), d))
                .collect(),
        }
    }

    pub fn get(&self, expression: &str) -> Option<&ActionDescriptor> {
        self.descriptors.get(expression)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.descriptors.values()
    }

    /// Expressions bound to a held action.
    pub fn held_expressions(&self) -> BTreeSet<String> {
        self.iter()
            .filter(|d| d.kind.is_held())
            .map(|d| d.expression.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
