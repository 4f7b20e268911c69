use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case- and accent-insensitive substring search over window titles.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    folded: String,
}

impl TitleFilter {
    pub fn new(pattern: &str) -> Self {
        Self {
            folded: fold(pattern),
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        self.folded.is_empty() || fold(title).contains(&self.folded)
    }
}

fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
