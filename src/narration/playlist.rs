//! Playlist builder: page content + mode flags + assets -> ordered narration queue

use std::path::PathBuf;

use futures::future::{self, BoxFuture};

use crate::error::NarratorError;
use crate::model::{AssetMap, Page, PageNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Text,
    Image,
    Input,
}

impl ItemKind {
    fn of(node: &PageNode) -> Self {
        if node.is_image() {
            ItemKind::Image
        } else if node.is_input() {
            ItemKind::Input
        } else {
            ItemKind::Text
        }
    }
}

/// One narratable unit of the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    /// Identifier of the presentation node (what gets highlighted)
    pub id: String,
    pub kind: ItemKind,
    /// Asset key the audio was resolved from
    pub asset_key: String,
    pub audio_ref: Option<PathBuf>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, kind: ItemKind, audio_ref: Option<PathBuf>) -> Self {
        let id = id.into();
        Self {
            asset_key: id.clone(),
            id,
            kind,
            audio_ref,
        }
    }
}

/// Mode flags that change which items and which assets are used
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub easy_read: bool,
    pub describe_images: bool,
}

/// A queue together with the flags it was built under
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    pub items: Vec<ContentItem>,
    pub describe_images: bool,
}

/// Where the engine pulls its queue from. The engine caches the result until
/// it is explicitly invalidated.
pub trait PlaylistSource: Send + Sync {
    fn playlist(&self) -> BoxFuture<'_, Result<Playlist, NarratorError>>;
}

impl PlaylistSource for Playlist {
    fn playlist(&self) -> BoxFuture<'_, Result<Playlist, NarratorError>> {
        Box::pin(future::ready(Ok(self.clone())))
    }
}

#[derive(Clone, Copy, Default)]
struct Scope {
    easy_read_excluded: bool,
}

/// Build the narration queue for a page.
///
/// Pure function of its inputs. Fails only when the page has no content root.
pub fn build_playlist(page: &Page, flags: ModeFlags, assets: &AssetMap) -> Result<Playlist, NarratorError> {
    let root = page.root()?;
    let mut items = Vec::new();
    collect(root, Scope::default(), flags, assets, &mut items);

    tracing::trace!(
        items = items.len(),
        easy_read = flags.easy_read,
        describe_images = flags.describe_images,
        lang = assets.lang(),
        "Playlist built"
    );

    Ok(Playlist {
        items,
        describe_images: flags.describe_images,
    })
}

fn collect(node: &PageNode, scope: Scope, flags: ModeFlags, assets: &AssetMap, out: &mut Vec<ContentItem>) {
    if node.is_navigation() || node.is_explain_simply() {
        return;
    }

    if let Some(id) = node.id.as_deref() {
        match resolve_asset_key(node, id, scope, flags, assets) {
            Some(asset_key) => out.push(ContentItem {
                id: id.to_string(),
                kind: ItemKind::of(node),
                audio_ref: assets.audio(&asset_key).map(|p| p.to_path_buf()),
                asset_key,
            }),
            None => tracing::trace!(id, "No audio asset, item left out of the queue"),
        }
    }

    let child_scope = Scope {
        easy_read_excluded: scope.easy_read_excluded || node.is_easy_read_excluded_container(),
    };
    for child in &node.children {
        collect(child, child_scope, flags, assets, out);
    }
}

fn resolve_asset_key(node: &PageNode, id: &str, scope: Scope, flags: ModeFlags, assets: &AssetMap) -> Option<String> {
    let alternate = if node.is_input() {
        node.placeholder_id.as_deref()
    } else if node.is_image() {
        node.aria_id.as_deref()
    } else {
        None
    };

    let baseline = alternate
        .filter(|alt| assets.has_audio(alt))
        .unwrap_or(id);

    let keeps_baseline = node.is_heading() || scope.easy_read_excluded || node.is_easy_read_excluded_container();
    if flags.easy_read && !keeps_baseline {
        let variant = AssetMap::easy_read_key(baseline);
        if assets.has_audio(&variant) {
            return Some(variant);
        }
    }

    assets.has_audio(baseline).then(|| baseline.to_string())
}
