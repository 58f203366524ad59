//! Static platform catalog and per-platform instruction templates.
//!
//! New platforms are added here, as a catalog entry plus a template entry.
//! Nothing else in the crate branches on a platform id.

use common::Platform;

/// Content-style instruction keyed by platform id.
const PLATFORM_INSTRUCTIONS: &[(&str, &str)] = &[
    ("tiktok", "Create a short, engaging TikTok caption with trending hashtags."),
    ("pinterest", "Write a Pinterest description that's SEO-friendly and inspiring."),
    ("facebook", "Write an engaging Facebook post that encourages discussion."),
    ("youtube", "Create an engaging YouTube video description with proper tags."),
    ("instagram", "Write an Instagram caption with relevant hashtags."),
];

/// Instruction template for a platform id, if one exists.
pub fn instruction_for(platform_id: &str) -> Option<&'static str> {
    PLATFORM_INSTRUCTIONS
        .iter()
        .find(|(id, _)| *id == platform_id)
        .map(|(_, instruction)| *instruction)
}

/// Immutable set of platforms the service can generate for.
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    platforms: Vec<Platform>,
}

impl PlatformCatalog {
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    pub fn get(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn all(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self::new(vec![
            Platform::new("tiktok", "TikTok", "📱", Some(150)),
            Platform::new("pinterest", "Pinterest", "📌", Some(500)),
            Platform::new("facebook", "Facebook", "👥", Some(63206)),
            Platform::new("youtube", "YouTube", "🎥", Some(5000)),
            Platform::new("instagram", "Instagram", "📸", Some(2200)),
        ])
    }
}
