//! Character sets and collations.

use std::fmt;

use crate::errors::{PlanError, Result};

/// A character set known to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterSet {
    name: &'static str,
    default_collation: &'static str,
    binary_collation: &'static str,
    description: &'static str,
    /// Maximum number of bytes per character.
    max_len: u8,
}

impl CharacterSet {
    // Generated from the MySQL 8.0 character set catalogue.
    pub const ARMSCII8: CharacterSet = CharacterSet {
        name: "armscii8",
        default_collation: "armscii8_general_ci",
        binary_collation: "armscii8_bin",
        description: "ARMSCII-8 Armenian",
        max_len: 1,
    };
    pub const ASCII: CharacterSet = CharacterSet {
        name: "ascii",
        default_collation: "ascii_general_ci",
        binary_collation: "ascii_bin",
        description: "US ASCII",
        max_len: 1,
    };
    pub const BIG5: CharacterSet = CharacterSet {
        name: "big5",
        default_collation: "big5_chinese_ci",
        binary_collation: "big5_bin",
        description: "Big5 Traditional Chinese",
        max_len: 2,
    };
    pub const BINARY: CharacterSet = CharacterSet {
        name: "binary",
        default_collation: "binary",
        binary_collation: "binary",
        description: "Binary pseudo charset",
        max_len: 1,
    };
    pub const CP1250: CharacterSet = CharacterSet {
        name: "cp1250",
        default_collation: "cp1250_general_ci",
        binary_collation: "cp1250_bin",
        description: "Windows Central European",
        max_len: 1,
    };
    pub const CP1251: CharacterSet = CharacterSet {
        name: "cp1251",
        default_collation: "cp1251_general_ci",
        binary_collation: "cp1251_bin",
        description: "Windows Cyrillic",
        max_len: 1,
    };
    pub const CP1256: CharacterSet = CharacterSet {
        name: "cp1256",
        default_collation: "cp1256_general_ci",
        binary_collation: "cp1256_bin",
        description: "Windows Arabic",
        max_len: 1,
    };
    pub const CP1257: CharacterSet = CharacterSet {
        name: "cp1257",
        default_collation: "cp1257_general_ci",
        binary_collation: "cp1257_bin",
        description: "Windows Baltic",
        max_len: 1,
    };
    pub const CP850: CharacterSet = CharacterSet {
        name: "cp850",
        default_collation: "cp850_general_ci",
        binary_collation: "cp850_bin",
        description: "DOS West European",
        max_len: 1,
    };
    pub const CP852: CharacterSet = CharacterSet {
        name: "cp852",
        default_collation: "cp852_general_ci",
        binary_collation: "cp852_bin",
        description: "DOS Central European",
        max_len: 1,
    };
    pub const CP866: CharacterSet = CharacterSet {
        name: "cp866",
        default_collation: "cp866_general_ci",
        binary_collation: "cp866_bin",
        description: "DOS Russian",
        max_len: 1,
    };
    pub const CP932: CharacterSet = CharacterSet {
        name: "cp932",
        default_collation: "cp932_japanese_ci",
        binary_collation: "cp932_bin",
        description: "SJIS for Windows Japanese",
        max_len: 2,
    };
    pub const DEC8: CharacterSet = CharacterSet {
        name: "dec8",
        default_collation: "dec8_swedish_ci",
        binary_collation: "dec8_bin",
        description: "DEC West European",
        max_len: 1,
    };
    pub const EUCJPMS: CharacterSet = CharacterSet {
        name: "eucjpms",
        default_collation: "eucjpms_japanese_ci",
        binary_collation: "eucjpms_bin",
        description: "UJIS for Windows Japanese",
        max_len: 3,
    };
    pub const EUCKR: CharacterSet = CharacterSet {
        name: "euckr",
        default_collation: "euckr_korean_ci",
        binary_collation: "euckr_bin",
        description: "EUC-KR Korean",
        max_len: 2,
    };
    pub const GB18030: CharacterSet = CharacterSet {
        name: "gb18030",
        default_collation: "gb18030_chinese_ci",
        binary_collation: "gb18030_bin",
        description: "China National Standard GB18030",
        max_len: 4,
    };
    pub const GB2312: CharacterSet = CharacterSet {
        name: "gb2312",
        default_collation: "gb2312_chinese_ci",
        binary_collation: "gb2312_bin",
        description: "GB2312 Simplified Chinese",
        max_len: 2,
    };
    pub const GBK: CharacterSet = CharacterSet {
        name: "gbk",
        default_collation: "gbk_chinese_ci",
        binary_collation: "gbk_bin",
        description: "GBK Simplified Chinese",
        max_len: 2,
    };
    pub const GEOSTD8: CharacterSet = CharacterSet {
        name: "geostd8",
        default_collation: "geostd8_general_ci",
        binary_collation: "geostd8_bin",
        description: "GEOSTD8 Georgian",
        max_len: 1,
    };
    pub const GREEK: CharacterSet = CharacterSet {
        name: "greek",
        default_collation: "greek_general_ci",
        binary_collation: "greek_bin",
        description: "ISO 8859-7 Greek",
        max_len: 1,
    };
    pub const HEBREW: CharacterSet = CharacterSet {
        name: "hebrew",
        default_collation: "hebrew_general_ci",
        binary_collation: "hebrew_bin",
        description: "ISO 8859-8 Hebrew",
        max_len: 1,
    };
    pub const HP8: CharacterSet = CharacterSet {
        name: "hp8",
        default_collation: "hp8_english_ci",
        binary_collation: "hp8_bin",
        description: "HP West European",
        max_len: 1,
    };
    pub const KEYBCS2: CharacterSet = CharacterSet {
        name: "keybcs2",
        default_collation: "keybcs2_general_ci",
        binary_collation: "keybcs2_bin",
        description: "DOS Kamenicky Czech-Slovak",
        max_len: 1,
    };
    pub const KOI8R: CharacterSet = CharacterSet {
        name: "koi8r",
        default_collation: "koi8r_general_ci",
        binary_collation: "koi8r_bin",
        description: "KOI8-R Relcom Russian",
        max_len: 1,
    };
    pub const KOI8U: CharacterSet = CharacterSet {
        name: "koi8u",
        default_collation: "koi8u_general_ci",
        binary_collation: "koi8u_bin",
        description: "KOI8-U Ukrainian",
        max_len: 1,
    };
    pub const LATIN1: CharacterSet = CharacterSet {
        name: "latin1",
        default_collation: "latin1_swedish_ci",
        binary_collation: "latin1_bin",
        description: "cp1252 West European",
        max_len: 1,
    };
    pub const LATIN2: CharacterSet = CharacterSet {
        name: "latin2",
        default_collation: "latin2_general_ci",
        binary_collation: "latin2_bin",
        description: "ISO 8859-2 Central European",
        max_len: 1,
    };
    pub const LATIN5: CharacterSet = CharacterSet {
        name: "latin5",
        default_collation: "latin5_turkish_ci",
        binary_collation: "latin5_bin",
        description: "ISO 8859-9 Turkish",
        max_len: 1,
    };
    pub const LATIN7: CharacterSet = CharacterSet {
        name: "latin7",
        default_collation: "latin7_general_ci",
        binary_collation: "latin7_bin",
        description: "ISO 8859-13 Baltic",
        max_len: 1,
    };
    pub const MACCE: CharacterSet = CharacterSet {
        name: "macce",
        default_collation: "macce_general_ci",
        binary_collation: "macce_bin",
        description: "Mac Central European",
        max_len: 1,
    };
    pub const MACROMAN: CharacterSet = CharacterSet {
        name: "macroman",
        default_collation: "macroman_general_ci",
        binary_collation: "macroman_bin",
        description: "Mac West European",
        max_len: 1,
    };
    pub const SJIS: CharacterSet = CharacterSet {
        name: "sjis",
        default_collation: "sjis_japanese_ci",
        binary_collation: "sjis_bin",
        description: "Shift-JIS Japanese",
        max_len: 2,
    };
    pub const SWE7: CharacterSet = CharacterSet {
        name: "swe7",
        default_collation: "swe7_swedish_ci",
        binary_collation: "swe7_bin",
        description: "7bit Swedish",
        max_len: 1,
    };
    pub const TIS620: CharacterSet = CharacterSet {
        name: "tis620",
        default_collation: "tis620_thai_ci",
        binary_collation: "tis620_bin",
        description: "TIS620 Thai",
        max_len: 1,
    };
    pub const UCS2: CharacterSet = CharacterSet {
        name: "ucs2",
        default_collation: "ucs2_general_ci",
        binary_collation: "ucs2_bin",
        description: "UCS-2 Unicode",
        max_len: 2,
    };
    pub const UJIS: CharacterSet = CharacterSet {
        name: "ujis",
        default_collation: "ujis_japanese_ci",
        binary_collation: "ujis_bin",
        description: "EUC-JP Japanese",
        max_len: 3,
    };
    pub const UTF16: CharacterSet = CharacterSet {
        name: "utf16",
        default_collation: "utf16_general_ci",
        binary_collation: "utf16_bin",
        description: "UTF-16 Unicode",
        max_len: 4,
    };
    pub const UTF16LE: CharacterSet = CharacterSet {
        name: "utf16le",
        default_collation: "utf16le_general_ci",
        binary_collation: "utf16le_bin",
        description: "UTF-16LE Unicode",
        max_len: 4,
    };
    pub const UTF32: CharacterSet = CharacterSet {
        name: "utf32",
        default_collation: "utf32_general_ci",
        binary_collation: "utf32_bin",
        description: "UTF-32 Unicode",
        max_len: 4,
    };
    pub const UTF8MB3: CharacterSet = CharacterSet {
        name: "utf8mb3",
        default_collation: "utf8mb3_general_ci",
        binary_collation: "utf8mb3_bin",
        description: "UTF-8 Unicode",
        max_len: 3,
    };
    pub const UTF8MB4: CharacterSet = CharacterSet {
        name: "utf8mb4",
        default_collation: "utf8mb4_0900_ai_ci",
        binary_collation: "utf8mb4_bin",
        description: "UTF-8 Unicode",
        max_len: 4,
    };

    /// Look up a character set by name. `utf8` is an alias of `utf8mb3`.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let lookup = if lower == "utf8" { "utf8mb3" } else { lower.as_str() };
        CHARACTER_SETS
            .iter()
            .find(|cs| cs.name == lookup)
            .copied()
            .ok_or_else(|| PlanError::invalid_value(format!("Unknown character set: {name}")))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn max_len(&self) -> u8 {
        self.max_len
    }

    pub fn default_collation(&self) -> Collation {
        Collation::new(self.default_collation, *self)
    }

    pub fn binary_collation(&self) -> Collation {
        Collation::new(self.binary_collation, *self)
    }

    pub fn is_binary(&self) -> bool {
        self.name == "binary"
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A collation and the character set it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collation {
    name: &'static str,
    charset: CharacterSet,
}

impl Collation {
    /// Collation used when nothing else is specified.
    pub const DEFAULT: Collation = Collation::new("utf8mb4_0900_bin", CharacterSet::UTF8MB4);
    pub const BINARY: Collation = Collation::new("binary", CharacterSet::BINARY);

    const fn new(name: &'static str, charset: CharacterSet) -> Self {
        Collation { name, charset }
    }

    /// Look up a collation by name.
    ///
    /// Names using the deprecated `utf8_` prefix resolve to their `utf8mb3_`
    /// equivalent.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let lookup = match lower.strip_prefix("utf8_") {
            Some(rest) => format!("utf8mb3_{rest}"),
            None => lower,
        };
        COLLATIONS
            .iter()
            .find(|c| c.name == lookup)
            .copied()
            .ok_or_else(|| PlanError::invalid_value(format!("Unknown collation: {name}")))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn character_set(&self) -> CharacterSet {
        self.charset
    }

    pub fn works_with(&self, charset: &CharacterSet) -> bool {
        self.charset == *charset
    }

    /// Iterate over every known collation.
    pub fn all() -> impl Iterator<Item = Collation> {
        COLLATIONS.iter().copied()
    }
}

impl Default for Collation {
    fn default() -> Self {
        Collation::DEFAULT
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Resolve an optional character set and collation pair, plus the `BINARY`
/// column attribute, into a single collation.
///
/// With neither given the default collation is returned.
pub fn parse_collation(
    charset: Option<&str>,
    collation: Option<&str>,
    binary_attribute: bool,
) -> Result<Collation> {
    let charset = charset.filter(|s| !s.is_empty());
    let collation = collation.filter(|s| !s.is_empty());

    match (charset, collation) {
        (None, None) => {
            if binary_attribute {
                Ok(Collation::DEFAULT.character_set().binary_collation())
            } else {
                Ok(Collation::DEFAULT)
            }
        }
        (None, Some(collation)) => {
            let collation = Collation::from_name(collation)?;
            if binary_attribute {
                Ok(collation.character_set().binary_collation())
            } else {
                Ok(collation)
            }
        }
        (Some(charset), None) => {
            let charset = CharacterSet::from_name(charset)?;
            if binary_attribute {
                Ok(charset.binary_collation())
            } else {
                Ok(charset.default_collation())
            }
        }
        (Some(charset), Some(collation)) => {
            let charset = CharacterSet::from_name(charset)?;
            let collation = Collation::from_name(collation)?;
            if !collation.works_with(&charset) {
                return Err(PlanError::invalid_value(format!(
                    "COLLATION '{collation}' is not valid for CHARACTER SET '{charset}'"
                )));
            }
            Ok(collation)
        }
    }
}

static CHARACTER_SETS: &[CharacterSet] = &[
    CharacterSet::ARMSCII8,
    CharacterSet::ASCII,
    CharacterSet::BIG5,
    CharacterSet::BINARY,
    CharacterSet::CP1250,
    CharacterSet::CP1251,
    CharacterSet::CP1256,
    CharacterSet::CP1257,
    CharacterSet::CP850,
    CharacterSet::CP852,
    CharacterSet::CP866,
    CharacterSet::CP932,
    CharacterSet::DEC8,
    CharacterSet::EUCJPMS,
    CharacterSet::EUCKR,
    CharacterSet::GB18030,
    CharacterSet::GB2312,
    CharacterSet::GBK,
    CharacterSet::GEOSTD8,
    CharacterSet::GREEK,
    CharacterSet::HEBREW,
    CharacterSet::HP8,
    CharacterSet::KEYBCS2,
    CharacterSet::KOI8R,
    CharacterSet::KOI8U,
    CharacterSet::LATIN1,
    CharacterSet::LATIN2,
    CharacterSet::LATIN5,
    CharacterSet::LATIN7,
    CharacterSet::MACCE,
    CharacterSet::MACROMAN,
    CharacterSet::SJIS,
    CharacterSet::SWE7,
    CharacterSet::TIS620,
    CharacterSet::UCS2,
    CharacterSet::UJIS,
    CharacterSet::UTF16,
    CharacterSet::UTF16LE,
    CharacterSet::UTF32,
    CharacterSet::UTF8MB3,
    CharacterSet::UTF8MB4,
];

static COLLATIONS: &[Collation] = &[
    Collation::new("big5_chinese_ci", CharacterSet::BIG5),
    Collation::new("latin2_czech_cs", CharacterSet::LATIN2),
    Collation::new("dec8_swedish_ci", CharacterSet::DEC8),
    Collation::new("cp850_general_ci", CharacterSet::CP850),
    Collation::new("latin1_german1_ci", CharacterSet::LATIN1),
    Collation::new("hp8_english_ci", CharacterSet::HP8),
    Collation::new("koi8r_general_ci", CharacterSet::KOI8R),
    Collation::new("latin1_swedish_ci", CharacterSet::LATIN1),
    Collation::new("latin2_general_ci", CharacterSet::LATIN2),
    Collation::new("swe7_swedish_ci", CharacterSet::SWE7),
    Collation::new("ascii_general_ci", CharacterSet::ASCII),
    Collation::new("ujis_japanese_ci", CharacterSet::UJIS),
    Collation::new("sjis_japanese_ci", CharacterSet::SJIS),
    Collation::new("cp1251_bulgarian_ci", CharacterSet::CP1251),
    Collation::new("latin1_danish_ci", CharacterSet::LATIN1),
    Collation::new("hebrew_general_ci", CharacterSet::HEBREW),
    Collation::new("tis620_thai_ci", CharacterSet::TIS620),
    Collation::new("euckr_korean_ci", CharacterSet::EUCKR),
    Collation::new("latin7_estonian_cs", CharacterSet::LATIN7),
    Collation::new("latin2_hungarian_ci", CharacterSet::LATIN2),
    Collation::new("koi8u_general_ci", CharacterSet::KOI8U),
    Collation::new("cp1251_ukrainian_ci", CharacterSet::CP1251),
    Collation::new("gb2312_chinese_ci", CharacterSet::GB2312),
    Collation::new("greek_general_ci", CharacterSet::GREEK),
    Collation::new("cp1250_general_ci", CharacterSet::CP1250),
    Collation::new("latin2_croatian_ci", CharacterSet::LATIN2),
    Collation::new("gbk_chinese_ci", CharacterSet::GBK),
    Collation::new("cp1257_lithuanian_ci", CharacterSet::CP1257),
    Collation::new("latin5_turkish_ci", CharacterSet::LATIN5),
    Collation::new("latin1_german2_ci", CharacterSet::LATIN1),
    Collation::new("armscii8_general_ci", CharacterSet::ARMSCII8),
    Collation::new("utf8mb3_general_ci", CharacterSet::UTF8MB3),
    Collation::new("cp1250_czech_cs", CharacterSet::CP1250),
    Collation::new("ucs2_general_ci", CharacterSet::UCS2),
    Collation::new("cp866_general_ci", CharacterSet::CP866),
    Collation::new("keybcs2_general_ci", CharacterSet::KEYBCS2),
    Collation::new("macce_general_ci", CharacterSet::MACCE),
    Collation::new("macroman_general_ci", CharacterSet::MACROMAN),
    Collation::new("cp852_general_ci", CharacterSet::CP852),
    Collation::new("latin7_general_ci", CharacterSet::LATIN7),
    Collation::new("latin7_general_cs", CharacterSet::LATIN7),
    Collation::new("macce_bin", CharacterSet::MACCE),
    Collation::new("cp1250_croatian_ci", CharacterSet::CP1250),
    Collation::new("utf8mb4_general_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_bin", CharacterSet::UTF8MB4),
    Collation::new("latin1_bin", CharacterSet::LATIN1),
    Collation::new("latin1_general_ci", CharacterSet::LATIN1),
    Collation::new("latin1_general_cs", CharacterSet::LATIN1),
    Collation::new("cp1251_bin", CharacterSet::CP1251),
    Collation::new("cp1251_general_ci", CharacterSet::CP1251),
    Collation::new("cp1251_general_cs", CharacterSet::CP1251),
    Collation::new("macroman_bin", CharacterSet::MACROMAN),
    Collation::new("utf16_general_ci", CharacterSet::UTF16),
    Collation::new("utf16_bin", CharacterSet::UTF16),
    Collation::new("utf16le_general_ci", CharacterSet::UTF16LE),
    Collation::new("cp1256_general_ci", CharacterSet::CP1256),
    Collation::new("cp1257_bin", CharacterSet::CP1257),
    Collation::new("cp1257_general_ci", CharacterSet::CP1257),
    Collation::new("utf32_general_ci", CharacterSet::UTF32),
    Collation::new("utf32_bin", CharacterSet::UTF32),
    Collation::new("utf16le_bin", CharacterSet::UTF16LE),
    Collation::new("binary", CharacterSet::BINARY),
    Collation::new("armscii8_bin", CharacterSet::ARMSCII8),
    Collation::new("ascii_bin", CharacterSet::ASCII),
    Collation::new("cp1250_bin", CharacterSet::CP1250),
    Collation::new("cp1256_bin", CharacterSet::CP1256),
    Collation::new("cp866_bin", CharacterSet::CP866),
    Collation::new("dec8_bin", CharacterSet::DEC8),
    Collation::new("greek_bin", CharacterSet::GREEK),
    Collation::new("hebrew_bin", CharacterSet::HEBREW),
    Collation::new("hp8_bin", CharacterSet::HP8),
    Collation::new("keybcs2_bin", CharacterSet::KEYBCS2),
    Collation::new("koi8r_bin", CharacterSet::KOI8R),
    Collation::new("koi8u_bin", CharacterSet::KOI8U),
    Collation::new("utf8mb3_tolower_ci", CharacterSet::UTF8MB3),
    Collation::new("latin2_bin", CharacterSet::LATIN2),
    Collation::new("latin5_bin", CharacterSet::LATIN5),
    Collation::new("latin7_bin", CharacterSet::LATIN7),
    Collation::new("cp850_bin", CharacterSet::CP850),
    Collation::new("cp852_bin", CharacterSet::CP852),
    Collation::new("swe7_bin", CharacterSet::SWE7),
    Collation::new("utf8mb3_bin", CharacterSet::UTF8MB3),
    Collation::new("big5_bin", CharacterSet::BIG5),
    Collation::new("euckr_bin", CharacterSet::EUCKR),
    Collation::new("gb2312_bin", CharacterSet::GB2312),
    Collation::new("gbk_bin", CharacterSet::GBK),
    Collation::new("sjis_bin", CharacterSet::SJIS),
    Collation::new("tis620_bin", CharacterSet::TIS620),
    Collation::new("ucs2_bin", CharacterSet::UCS2),
    Collation::new("ujis_bin", CharacterSet::UJIS),
    Collation::new("geostd8_general_ci", CharacterSet::GEOSTD8),
    Collation::new("geostd8_bin", CharacterSet::GEOSTD8),
    Collation::new("latin1_spanish_ci", CharacterSet::LATIN1),
    Collation::new("cp932_japanese_ci", CharacterSet::CP932),
    Collation::new("cp932_bin", CharacterSet::CP932),
    Collation::new("eucjpms_japanese_ci", CharacterSet::EUCJPMS),
    Collation::new("eucjpms_bin", CharacterSet::EUCJPMS),
    Collation::new("cp1250_polish_ci", CharacterSet::CP1250),
    Collation::new("utf16_unicode_ci", CharacterSet::UTF16),
    Collation::new("utf16_icelandic_ci", CharacterSet::UTF16),
    Collation::new("utf16_latvian_ci", CharacterSet::UTF16),
    Collation::new("utf16_romanian_ci", CharacterSet::UTF16),
    Collation::new("utf16_slovenian_ci", CharacterSet::UTF16),
    Collation::new("utf16_polish_ci", CharacterSet::UTF16),
    Collation::new("utf16_estonian_ci", CharacterSet::UTF16),
    Collation::new("utf16_spanish_ci", CharacterSet::UTF16),
    Collation::new("utf16_swedish_ci", CharacterSet::UTF16),
    Collation::new("utf16_turkish_ci", CharacterSet::UTF16),
    Collation::new("utf16_czech_ci", CharacterSet::UTF16),
    Collation::new("utf16_danish_ci", CharacterSet::UTF16),
    Collation::new("utf16_lithuanian_ci", CharacterSet::UTF16),
    Collation::new("utf16_slovak_ci", CharacterSet::UTF16),
    Collation::new("utf16_spanish2_ci", CharacterSet::UTF16),
    Collation::new("utf16_roman_ci", CharacterSet::UTF16),
    Collation::new("utf16_persian_ci", CharacterSet::UTF16),
    Collation::new("utf16_esperanto_ci", CharacterSet::UTF16),
    Collation::new("utf16_hungarian_ci", CharacterSet::UTF16),
    Collation::new("utf16_sinhala_ci", CharacterSet::UTF16),
    Collation::new("utf16_german2_ci", CharacterSet::UTF16),
    Collation::new("utf16_croatian_ci", CharacterSet::UTF16),
    Collation::new("utf16_unicode_520_ci", CharacterSet::UTF16),
    Collation::new("utf16_vietnamese_ci", CharacterSet::UTF16),
    Collation::new("ucs2_unicode_ci", CharacterSet::UCS2),
    Collation::new("ucs2_icelandic_ci", CharacterSet::UCS2),
    Collation::new("ucs2_latvian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_romanian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_slovenian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_polish_ci", CharacterSet::UCS2),
    Collation::new("ucs2_estonian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_spanish_ci", CharacterSet::UCS2),
    Collation::new("ucs2_swedish_ci", CharacterSet::UCS2),
    Collation::new("ucs2_turkish_ci", CharacterSet::UCS2),
    Collation::new("ucs2_czech_ci", CharacterSet::UCS2),
    Collation::new("ucs2_danish_ci", CharacterSet::UCS2),
    Collation::new("ucs2_lithuanian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_slovak_ci", CharacterSet::UCS2),
    Collation::new("ucs2_spanish2_ci", CharacterSet::UCS2),
    Collation::new("ucs2_roman_ci", CharacterSet::UCS2),
    Collation::new("ucs2_persian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_esperanto_ci", CharacterSet::UCS2),
    Collation::new("ucs2_hungarian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_sinhala_ci", CharacterSet::UCS2),
    Collation::new("ucs2_german2_ci", CharacterSet::UCS2),
    Collation::new("ucs2_croatian_ci", CharacterSet::UCS2),
    Collation::new("ucs2_unicode_520_ci", CharacterSet::UCS2),
    Collation::new("ucs2_vietnamese_ci", CharacterSet::UCS2),
    Collation::new("ucs2_general_mysql500_ci", CharacterSet::UCS2),
    Collation::new("utf32_unicode_ci", CharacterSet::UTF32),
    Collation::new("utf32_icelandic_ci", CharacterSet::UTF32),
    Collation::new("utf32_latvian_ci", CharacterSet::UTF32),
    Collation::new("utf32_romanian_ci", CharacterSet::UTF32),
    Collation::new("utf32_slovenian_ci", CharacterSet::UTF32),
    Collation::new("utf32_polish_ci", CharacterSet::UTF32),
    Collation::new("utf32_estonian_ci", CharacterSet::UTF32),
    Collation::new("utf32_spanish_ci", CharacterSet::UTF32),
    Collation::new("utf32_swedish_ci", CharacterSet::UTF32),
    Collation::new("utf32_turkish_ci", CharacterSet::UTF32),
    Collation::new("utf32_czech_ci", CharacterSet::UTF32),
    Collation::new("utf32_danish_ci", CharacterSet::UTF32),
    Collation::new("utf32_lithuanian_ci", CharacterSet::UTF32),
    Collation::new("utf32_slovak_ci", CharacterSet::UTF32),
    Collation::new("utf32_spanish2_ci", CharacterSet::UTF32),
    Collation::new("utf32_roman_ci", CharacterSet::UTF32),
    Collation::new("utf32_persian_ci", CharacterSet::UTF32),
    Collation::new("utf32_esperanto_ci", CharacterSet::UTF32),
    Collation::new("utf32_hungarian_ci", CharacterSet::UTF32),
    Collation::new("utf32_sinhala_ci", CharacterSet::UTF32),
    Collation::new("utf32_german2_ci", CharacterSet::UTF32),
    Collation::new("utf32_croatian_ci", CharacterSet::UTF32),
    Collation::new("utf32_unicode_520_ci", CharacterSet::UTF32),
    Collation::new("utf32_vietnamese_ci", CharacterSet::UTF32),
    Collation::new("utf8mb3_unicode_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_icelandic_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_latvian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_romanian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_slovenian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_polish_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_estonian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_spanish_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_swedish_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_turkish_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_czech_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_danish_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_lithuanian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_slovak_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_spanish2_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_roman_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_persian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_esperanto_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_hungarian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_sinhala_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_german2_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_croatian_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_unicode_520_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_vietnamese_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb3_general_mysql500_ci", CharacterSet::UTF8MB3),
    Collation::new("utf8mb4_unicode_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_icelandic_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_latvian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_romanian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_slovenian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_polish_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_estonian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_spanish_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_swedish_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_turkish_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_czech_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_danish_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_lithuanian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_slovak_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_spanish2_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_roman_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_persian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_esperanto_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_hungarian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sinhala_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_german2_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_croatian_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_unicode_520_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_vietnamese_ci", CharacterSet::UTF8MB4),
    Collation::new("gb18030_chinese_ci", CharacterSet::GB18030),
    Collation::new("gb18030_bin", CharacterSet::GB18030),
    Collation::new("gb18030_unicode_520_ci", CharacterSet::GB18030),
    Collation::new("utf8mb4_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_de_pb_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_is_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_lv_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ro_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sl_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_pl_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_et_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_es_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sv_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_tr_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_cs_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_da_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_lt_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sk_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_es_trad_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_la_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_eo_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_hu_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_hr_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_vi_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_de_pb_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_is_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_lv_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ro_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sl_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_pl_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_et_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_es_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sv_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_tr_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_cs_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_da_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_lt_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_sk_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_es_trad_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_la_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_eo_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_hu_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_hr_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_vi_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ja_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ja_0900_as_cs_ks", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_0900_as_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ru_0900_ai_ci", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_ru_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_zh_0900_as_cs", CharacterSet::UTF8MB4),
    Collation::new("utf8mb4_0900_bin", CharacterSet::UTF8MB4),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_defaults_resolve() {
        for cs in CHARACTER_SETS {
            assert!(Collation::from_name(cs.default_collation).is_ok(), "{}", cs.name);
            assert!(Collation::from_name(cs.binary_collation).is_ok(), "{}", cs.name);
        }
    }

    #[test]
    fn utf8_aliases() {
        assert_eq!("utf8mb3", CharacterSet::from_name("UTF8").unwrap().name());
        assert_eq!(
            "utf8mb3_general_ci",
            Collation::from_name("utf8_general_ci").unwrap().name()
        );
    }

    #[test]
    fn parse_collation_precedence() {
        assert_eq!(Collation::DEFAULT, parse_collation(None, None, false).unwrap());
        assert_eq!(
            "utf8mb4_bin",
            parse_collation(None, None, true).unwrap().name()
        );
        assert_eq!(
            "utf8mb4_0900_ai_ci",
            parse_collation(Some("utf8mb4"), None, false).unwrap().name()
        );
        assert_eq!(
            "latin1_bin",
            parse_collation(Some("latin1"), None, true).unwrap().name()
        );
        assert_eq!(
            "cp1257_lithuanian_ci",
            parse_collation(None, Some("cp1257_lithuanian_ci"), false)
                .unwrap()
                .name()
        );
    }

    #[test]
    fn parse_collation_errors() {
        assert_eq!(
            PlanError::InvalidValue("Unknown character set: nope".to_string()),
            parse_collation(Some("nope"), None, false).unwrap_err()
        );
        assert_eq!(
            PlanError::InvalidValue("Unknown collation: nope_ci".to_string()),
            parse_collation(None, Some("nope_ci"), false).unwrap_err()
        );
        assert!(parse_collation(Some("latin1"), Some("utf8mb4_bin"), false).is_err());
    }
}
