use std::collections::HashSet;

use crc32fast::Hasher;

use crate::document::EditorDocument;

/// Generate a stable seed for a post identifier using CRC32
pub fn get_post_seed(post_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"post:");
    hasher.update(post_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for floating items within a post
#[derive(Debug, Clone)]
pub struct IDGenerator {
    seed: String, // Post seed (CRC32)
    count: u64,   // Sequential counter
    taken: HashSet<u64>,
}

impl IDGenerator {
    pub fn new(post_id: &str) -> Self {
        Self {
            seed: get_post_seed(post_id),
            count: 0,
            taken: HashSet::new(),
        }
    }

    /// Generator that continues after every id already in the document
    pub fn resume(post_id: &str, doc: &EditorDocument) -> Self {
        let mut gen = Self::new(post_id);
        let taken: HashSet<u64> = doc
            .floating
            .iter()
            .filter_map(|item| gen.counter_of(&item.id))
            .collect();
        gen.count = taken.iter().copied().max().unwrap_or(0);
        gen.taken = taken;
        gen
    }

    /// Generate next sequential ID
    ///
    /// Past `u64::MAX` the counter wraps to 1 and skips counters in use.
    pub fn new_id(&mut self) -> String {
        loop {
            self.count = self.count.checked_add(1).unwrap_or(1);
            if self.taken.insert(self.count) {
                break;
            }
        }
        format!("{}-{}", self.seed, self.count)
    }

    /// Get post seed
    pub fn seed(&self) -> &str {
        &self.seed
    }

    fn counter_of(&self, id: &str) -> Option<u64> {
        id.strip_prefix(self.seed.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floating::{FloatingItem, Rect};

    #[test]
    fn test_post_seed_generation() {
        let id1 = get_post_seed("post-42");
        let id2 = get_post_seed("post-42");

        // Same post always generates same seed
        assert_eq!(id1, id2);

        // Different posts generate different seeds
        let id3 = get_post_seed("post-43");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IDGenerator::new("post-1");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
    }

    #[test]
    fn test_resume_skips_existing_ids() {
        let mut first = IDGenerator::new("post-1");
        let mut doc = EditorDocument::new();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        for _ in 0..3 {
            doc.floating.push(FloatingItem::image(first.new_id(), "s", rect, 1));
        }
        doc.floating.push(FloatingItem::image("uploaded-elsewhere", "s", rect, 1));

        let mut resumed = IDGenerator::resume("post-1", &doc);
        assert!(resumed.new_id().ends_with("-4"));
    }

    #[test]
    fn test_resume_past_u32_counter() {
        let seed = get_post_seed("post-1");
        let mut doc = EditorDocument::new();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        doc.floating.push(FloatingItem::image(
            format!("{}-{}", seed, u32::MAX),
            "s",
            rect,
            1,
        ));

        let mut resumed = IDGenerator::resume("post-1", &doc);
        assert_eq!(resumed.new_id(), format!("{}-{}", seed, u32::MAX as u64 + 1));
    }

    #[test]
    fn test_counter_wraps_to_free_ids() {
        let seed = get_post_seed("post-1");
        let mut doc = EditorDocument::new();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        for counter in [1, 2, u64::MAX] {
            doc.floating.push(FloatingItem::image(
                format!("{}-{}", seed, counter),
                "s",
                rect,
                1,
            ));
        }

        let mut resumed = IDGenerator::resume("post-1", &doc);
        assert_eq!(resumed.new_id(), format!("{}-3", seed));
        assert_eq!(resumed.new_id(), format!("{}-4", seed));
    }
}
