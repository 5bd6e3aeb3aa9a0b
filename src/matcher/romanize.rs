//! Phonetic romanization used as a secondary search key.

/// Turns text into a lowercase, tone-free romanized form.
pub trait Romanizer: Send + Sync {
    /// Romanize `text`. Characters without a reading are kept, lowercased.
    /// Returns `None` when romanization is unavailable.
    fn romanize(&self, text: &str) -> Option<String>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Used when transliteration is disabled or not compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRomanizer;

impl Romanizer for NoRomanizer {
    fn romanize(&self, _text: &str) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Hanyu Pinyin without tone marks, e.g. "张伟" -> "zhangwei".
#[cfg(feature = "pinyin")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PinyinRomanizer;

#[cfg(feature = "pinyin")]
impl Romanizer for PinyinRomanizer {
    fn romanize(&self, text: &str) -> Option<String> {
        use pinyin::ToPinyin;

        let mut out = String::with_capacity(text.len() * 2);
        for c in text.chars() {
            match c.to_pinyin() {
                Some(p) => out.push_str(p.plain()),
                None => out.extend(c.to_lowercase()),
            }
        }
        Some(out)
    }
}

/// Pick the romanizer for this build. `enabled = false` forces it off.
pub fn default_romanizer(enabled: bool) -> Box<dyn Romanizer> {
    if !enabled {
        return Box::new(NoRomanizer);
    }
    #[cfg(feature = "pinyin")]
    {
        Box::new(PinyinRomanizer)
    }
    #[cfg(not(feature = "pinyin"))]
    {
        tracing::warn!("[Search] Built without pinyin support; transliteration matching is off");
        Box::new(NoRomanizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_romanizer_is_unavailable() {
        let r = default_romanizer(false);
        assert!(!r.is_available());
        assert_eq!(r.romanize("张伟"), None);
    }

    #[cfg(feature = "pinyin")]
    #[test]
    fn test_pinyin_is_plain_lowercase() {
        let r = PinyinRomanizer;
        assert_eq!(r.romanize("张伟").as_deref(), Some("zhangwei"));
        assert_eq!(r.romanize("张Wei").as_deref(), Some("zhangwei"));
        assert!(default_romanizer(true).is_available());
    }
}
