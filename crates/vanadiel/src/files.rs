//! File ids of the resources extracted from a standard installation.
//!
//! Localized files come in groups ordered English, Japanese, German, French.

/// Field mapping of a string table: field index to record key.
pub type Fields = &'static [(usize, &'static str)];

/// Language order of every localized file group.
pub const LANGUAGES: [&str; 4] = ["en", "ja", "de", "fr"];

/// Item files per language. Files at the same position hold the same items.
pub const ITEMS: [[u32; 9]; 4] = [
    [0x0049, 0x004A, 0x004D, 0x004C, 0x004B, 0x005B, 0xD973, 0xD974, 0xD977],
    [0x0004, 0x0005, 0x0008, 0x0007, 0x0006, 0x0009, 0xD8FB, 0xD8FC, 0xD8FF],
    [0xDA07, 0xDA08, 0xDA0B, 0xDA0A, 0xDA09, 0xD9EB, 0xD9EC, 0xD9EF, 0xDA0C],
    [0xDBAB, 0xDBAC, 0xDBAF, 0xDBAE, 0xDBAD, 0xDB8F, 0xDB90, 0xDB93, 0xDBB0],
];

/// Container holding the spell and ability tables.
pub const SPELL_ABILITY_DATA: u32 = 0x0051;

/// A localized string table: one file per language and its field mapping.
#[derive(Debug, Clone, Copy)]
pub struct StringTable {
    /// Collection the strings belong to.
    pub collection: &'static str,
    pub files: [(u32, Fields); 4],
}

impl StringTable {
    pub fn file_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.files.iter().map(|(id, _)| *id)
    }
}

pub const SPELL_NAMES: StringTable = StringTable {
    collection: "spells",
    files: [
        (0xD996, &[(0, "en")]),
        (0xD91E, &[(0, "ja")]),
        (0xDA0E, &[(0, "de")]),
        (0xDBB2, &[(0, "fr")]),
    ],
};

pub const ABILITY_NAMES: StringTable = StringTable {
    collection: "abilities",
    files: [
        (0xD995, &[(0, "en")]),
        (0xD91D, &[(0, "ja")]),
        (0xDA0D, &[(0, "de")]),
        (0xDBB1, &[(0, "fr")]),
    ],
};

pub const ZONES: StringTable = StringTable {
    collection: "zones",
    files: [
        (0xD8A9, &[(0, "en")]),
        (0xD8EF, &[(0, "ja")]),
        (0xD9DF, &[(0, "de")]),
        (0xDB83, &[(0, "fr")]),
    ],
};

pub const BUFFS: StringTable = StringTable {
    collection: "buffs",
    files: [
        (0xD9AD, &[(0, "en"), (1, "enl")]),
        (0xD935, &[(0, "ja")]),
        (0xDA2C, &[(0, "de")]),
        (0xDBD0, &[(0, "fr")]),
    ],
};

/// Collections produced by a full extraction.
pub const COLLECTIONS: [&str; 8] = [
    "items",
    "monstrosity",
    "spells",
    "job_abilities",
    "weapon_skills",
    "ability_recasts",
    "zones",
    "buffs",
];
