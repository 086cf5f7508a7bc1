//! Enumerations stored in ability and spell records.

/// Ability category, stored in the type byte of an ability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityType {
    Misc,
    JobAbility,
    PetCommand,
    WeaponSkill,
    JobTrait,
    BloodPactRage,
    CorsairRoll,
    CorsairShot,
    BloodPactWard,
    Samba,
    Waltz,
    Step,
    Flourish1,
    Scholar,
    Jig,
    Flourish2,
    Monster,
    Flourish3,
    MonsterSkill,
    Rune,
    Ward,
    Effusion,
    Unknown(u8),
}

impl AbilityType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Misc,
            1 => Self::JobAbility,
            2 => Self::PetCommand,
            3 => Self::WeaponSkill,
            4 => Self::JobTrait,
            6 => Self::BloodPactRage,
            8 => Self::CorsairRoll,
            9 => Self::CorsairShot,
            10 => Self::BloodPactWard,
            11 => Self::Samba,
            12 => Self::Waltz,
            13 => Self::Step,
            14 => Self::Flourish1,
            15 => Self::Scholar,
            16 => Self::Jig,
            17 => Self::Flourish2,
            18 => Self::Monster,
            19 => Self::Flourish3,
            20 => Self::MonsterSkill,
            21 => Self::Rune,
            22 => Self::Ward,
            23 => Self::Effusion,
            other => Self::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Misc => "Misc",
            Self::JobAbility => "JobAbility",
            Self::PetCommand => "PetCommand",
            Self::WeaponSkill => "WeaponSkill",
            Self::JobTrait => "JobTrait",
            Self::BloodPactRage => "BloodPactRage",
            Self::CorsairRoll => "CorsairRoll",
            Self::CorsairShot => "CorsairShot",
            Self::BloodPactWard => "BloodPactWard",
            Self::Samba => "Samba",
            Self::Waltz => "Waltz",
            Self::Step => "Step",
            Self::Flourish1 => "Flourish1",
            Self::Scholar => "Scholar",
            Self::Jig => "Jig",
            Self::Flourish2 => "Flourish2",
            Self::Monster => "Monster",
            Self::Flourish3 => "Flourish3",
            Self::MonsterSkill => "MonsterSkill",
            Self::Rune => "Rune",
            Self::Ward => "Ward",
            Self::Effusion => "Effusion",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Chat command used to invoke an ability of this type.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Misc | Self::JobTrait => "/echo",
            Self::JobAbility
            | Self::CorsairRoll
            | Self::CorsairShot
            | Self::Samba
            | Self::Waltz
            | Self::Step
            | Self::Jig
            | Self::Flourish1
            | Self::Flourish2
            | Self::Flourish3
            | Self::Scholar
            | Self::Rune
            | Self::Ward
            | Self::Effusion => "/jobability",
            Self::WeaponSkill => "/weaponskill",
            Self::MonsterSkill => "/monsterskill",
            Self::PetCommand | Self::BloodPactWard | Self::BloodPactRage | Self::Monster => "/pet",
            Self::Unknown(_) => "/unknown",
        }
    }
}

/// Spell school, stored in the type field of a spell record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagicType {
    None,
    WhiteMagic,
    BlackMagic,
    SummonerPact,
    Ninjutsu,
    BardSong,
    BlueMagic,
    Geomancy,
    Trust,
    Unknown(u16),
}

impl MagicType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::WhiteMagic,
            2 => Self::BlackMagic,
            3 => Self::SummonerPact,
            4 => Self::Ninjutsu,
            5 => Self::BardSong,
            6 => Self::BlueMagic,
            7 => Self::Geomancy,
            8 => Self::Trust,
            other => Self::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::WhiteMagic => "WhiteMagic",
            Self::BlackMagic => "BlackMagic",
            Self::SummonerPact => "SummonerPact",
            Self::Ninjutsu => "Ninjutsu",
            Self::BardSong => "BardSong",
            Self::BlueMagic => "BlueMagic",
            Self::Geomancy => "Geomancy",
            Self::Trust => "Trust",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Chat command used to cast a spell of this type.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::WhiteMagic
            | Self::BlackMagic
            | Self::SummonerPact
            | Self::BlueMagic
            | Self::Geomancy
            | Self::Trust => "/magic",
            Self::BardSong => "/song",
            Self::Ninjutsu => "/ninjutsu",
            Self::None | Self::Unknown(_) => "/unknown",
        }
    }
}

/// Number of job slots in a spell's level table.
pub const JOB_COUNT: usize = 24;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_prefixes() {
        assert_eq!(AbilityType::from_raw(1).prefix(), "/jobability");
        assert_eq!(AbilityType::from_raw(3).prefix(), "/weaponskill");
        assert_eq!(AbilityType::from_raw(10).prefix(), "/pet");
        assert_eq!(AbilityType::from_raw(4).prefix(), "/echo");
        assert_eq!(AbilityType::from_raw(20).prefix(), "/monsterskill");
        assert_eq!(AbilityType::from_raw(5), AbilityType::Unknown(5));
        assert_eq!(AbilityType::from_raw(5).prefix(), "/unknown");
    }

    #[test]
    fn test_magic_names() {
        assert_eq!(MagicType::from_raw(5).name(), "BardSong");
        assert_eq!(MagicType::from_raw(5).prefix(), "/song");
        assert_eq!(MagicType::from_raw(4).prefix(), "/ninjutsu");
        assert_eq!(MagicType::from_raw(8).prefix(), "/magic");
        assert_eq!(MagicType::from_raw(0).prefix(), "/unknown");
        assert_eq!(MagicType::from_raw(99).name(), "Unknown");
    }
}
