use serde::{Deserialize, Serialize};
use std::fmt;

/// UI language for prompts and user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
}

impl Language {
    pub fn is_spanish(self) -> bool {
        matches!(self, Language::Es)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Es => write!(f, "es"),
            Language::En => write!(f, "en"),
        }
    }
}

/// Classification of a creative's target aspect ratio. Meta placements are
/// split into square-like surfaces (feed, marketplace) and vertical ones
/// (stories, reels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatGroup {
    SquareLike,
    Vertical,
}

impl fmt::Display for FormatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatGroup::SquareLike => write!(f, "SQUARE_LIKE"),
            FormatGroup::Vertical => write!(f, "VERTICAL"),
        }
    }
}

/// Aspect classification derived from pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeFormat {
    Square,
    Vertical,
}

impl CreativeFormat {
    /// A ratio above 0.9 counts as square-like; everything narrower is
    /// treated as vertical.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return CreativeFormat::Square;
        }
        let aspect = width as f64 / height as f64;
        if aspect > 0.9 {
            CreativeFormat::Square
        } else {
            CreativeFormat::Vertical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_classification() {
        assert_eq!(
            CreativeFormat::from_dimensions(1080, 1080),
            CreativeFormat::Square
        );
        // 4:5 is 0.8, vertical
        assert_eq!(
            CreativeFormat::from_dimensions(1080, 1350),
            CreativeFormat::Vertical
        );
        // 9:16 story
        assert_eq!(
            CreativeFormat::from_dimensions(1080, 1920),
            CreativeFormat::Vertical
        );
    }

    #[test]
    fn test_zero_height_defaults_square() {
        assert_eq!(CreativeFormat::from_dimensions(100, 0), CreativeFormat::Square);
    }

    #[test]
    fn test_format_group_serde_names() {
        assert_eq!(
            serde_json::to_string(&FormatGroup::SquareLike).unwrap(),
            "\"SQUARE_LIKE\""
        );
        assert_eq!(serde_json::to_string(&Language::Es).unwrap(), "\"es\"");
    }
}
