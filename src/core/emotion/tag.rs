use std::fmt;

/// The closed set of emotions a user can attach to text.
///
/// The set is fixed by the authoring UI and never extended at runtime;
/// provider profiles map each member to a provider-native name (or omit it
/// when the provider has no equivalent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTag {
    Laughter,
    Angry,
    Excited,
    Sad,
    Scared,
}

impl EmotionTag {
    /// All recognized emotions, in a stable order.
    pub const ALL: [EmotionTag; 5] = [
        EmotionTag::Laughter,
        EmotionTag::Angry,
        EmotionTag::Excited,
        EmotionTag::Sad,
        EmotionTag::Scared,
    ];

    /// Parse a tag name as authored inside `<tag>...</tag>`, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "laughter" => Some(EmotionTag::Laughter),
            "angry" => Some(EmotionTag::Angry),
            "excited" => Some(EmotionTag::Excited),
            "sad" => Some(EmotionTag::Sad),
            "scared" => Some(EmotionTag::Scared),
            _ => None,
        }
    }

    /// Canonical lowercase name, as used in the authoring markup.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionTag::Laughter => "laughter",
            EmotionTag::Angry => "angry",
            EmotionTag::Excited => "excited",
            EmotionTag::Sad => "sad",
            EmotionTag::Scared => "scared",
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
