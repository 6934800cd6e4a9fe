/// Decoded avatar thumbnail as raw RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Avatar {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for Avatar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Avatar")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Asks GitHub's avatar CDN for a thumbnail of the given edge length.
pub fn sized_url(url: &str, size: u32) -> String {
    if url.contains('?') {
        format!("{url}&s={size}")
    } else {
        format!("{url}?s={size}")
    }
}

/// Decodes image bytes and scales them to exactly `size`×`size`.
///
/// The CDN often ignores the size hint for cached avatars, so the thumbnail
/// is always resized here to keep memory use bounded.
pub fn decode(bytes: &[u8], size: u32) -> Option<Avatar> {
    let image = image::load_from_memory(bytes).ok()?;
    let rgba = image.thumbnail_exact(size, size).to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(Avatar {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}
