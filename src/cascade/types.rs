//! Core types for the cascade routing state machine.

use std::fmt;

use crate::lexicon::ScriptFamily;

/// Identity of one cascade stage; doubles as the artifact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Family,
    Indic,
    JaZh,
    PersoArabic,
    Cyrillic,
    SouthernCyrillic,
    EasternCyrillic,
    Turkic,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        StageKind::Family,
        StageKind::Indic,
        StageKind::JaZh,
        StageKind::PersoArabic,
        StageKind::Cyrillic,
        StageKind::SouthernCyrillic,
        StageKind::EasternCyrillic,
        StageKind::Turkic,
    ];

    /// The stage's key in artifact file names.
    pub fn key(&self) -> &'static str {
        match self {
            StageKind::Family => "family",
            StageKind::Indic => "indic",
            StageKind::JaZh => "ja_zh",
            StageKind::PersoArabic => "perso_arabic",
            StageKind::Cyrillic => "cyrillic",
            StageKind::SouthernCyrillic => "southern_cyrillic",
            StageKind::EasternCyrillic => "eastern_cyrillic",
            StageKind::Turkic => "turkic",
        }
    }

    /// The tell lexicon this stage extracts extended features with.
    ///
    /// The family and cyrillic stages classify on base lexical features
    /// only; the cyrillic sub-stages map onto the slavic lexicon families.
    pub fn lexicon_family(&self) -> Option<ScriptFamily> {
        match self {
            StageKind::Family | StageKind::Cyrillic => None,
            StageKind::Indic => Some(ScriptFamily::Indic),
            StageKind::JaZh => Some(ScriptFamily::JaZh),
            StageKind::PersoArabic => Some(ScriptFamily::PersoArabic),
            StageKind::SouthernCyrillic => Some(ScriptFamily::SouthernSlavic),
            StageKind::EasternCyrillic => Some(ScriptFamily::EasternSlavic),
            StageKind::Turkic => Some(ScriptFamily::Turkic),
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Output of the family stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyLabel {
    /// Greek; terminal.
    El,
    /// Korean; terminal.
    Ko,
    Indic,
    JaZh,
    PersoArabic,
    Cyrillic,
}

impl FamilyLabel {
    /// Parse a family-stage label. `None` for anything outside the
    /// stage's declared output set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "el" => Some(FamilyLabel::El),
            "ko" => Some(FamilyLabel::Ko),
            "indic" => Some(FamilyLabel::Indic),
            "ja_zh" => Some(FamilyLabel::JaZh),
            "perso-arabic" => Some(FamilyLabel::PersoArabic),
            "cyrillic" => Some(FamilyLabel::Cyrillic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyLabel::El => "el",
            FamilyLabel::Ko => "ko",
            FamilyLabel::Indic => "indic",
            FamilyLabel::JaZh => "ja_zh",
            FamilyLabel::PersoArabic => "perso-arabic",
            FamilyLabel::Cyrillic => "cyrillic",
        }
    }
}

impl fmt::Display for FamilyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the cyrillic stage. The label itself is never returned to
/// the caller; it only picks the terminal sub-stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyrillicBranch {
    Southern,
    Eastern,
    /// Catch-all bucket for the turkic-family languages.
    Turkic,
}

impl CyrillicBranch {
    pub fn from_label(label: &str) -> Self {
        match label {
            "southern_cyrillic" => CyrillicBranch::Southern,
            "eastern_cyrillic" => CyrillicBranch::Eastern,
            _ => CyrillicBranch::Turkic,
        }
    }

    /// The terminal stage this branch routes to.
    pub fn stage(&self) -> StageKind {
        match self {
            CyrillicBranch::Southern => StageKind::SouthernCyrillic,
            CyrillicBranch::Eastern => StageKind::EasternCyrillic,
            CyrillicBranch::Turkic => StageKind::Turkic,
        }
    }
}
