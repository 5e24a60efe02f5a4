use serde::{
    de::{self, Visitor},
    Deserialize,
};
use std::sync::LazyLock;
use thiserror::Error;

use super::{Endianness, HeaderLayout};

static INBUILT_PLATFORMS: LazyLock<PlatformMap> = LazyLock::new(|| {
    PlatformMap::parse(include_str!("platforms.toml")).expect("Failed to parse inbuilt platform map")
});

#[derive(Error, Debug)]
pub enum PlatformMapError {
    #[error("Failed to parse platform map")]
    Parse(#[from] toml::de::Error),
    #[error("Platform {name} has data offset {data_offset:#x}, which leaves no room for the header fields")]
    InvalidDataOffset { name: String, data_offset: usize },
    #[error("Platform {0} is defined more than once")]
    Duplicate(String),
}

/// Named header layouts for the releases of the game.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformMap {
    #[serde(rename = "platform")]
    pub platforms: Vec<PlatformDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformDefinition {
    pub name: String,
    pub description: Option<String>,

    endianness: Endianness,
    data_offset: usize,
}

impl PlatformDefinition {
    pub fn layout(&self) -> HeaderLayout {
        // checked in PlatformMap::parse
        HeaderLayout {
            endianness: self.endianness,
            data_offset: self.data_offset,
        }
    }
}

impl PlatformMap {
    pub fn parse(map: &str) -> Result<PlatformMap, PlatformMapError> {
        let map: PlatformMap = toml::de::from_str(map)?;

        for (index, platform) in map.platforms.iter().enumerate() {
            if HeaderLayout::new(platform.endianness, platform.data_offset).is_none() {
                return Err(PlatformMapError::InvalidDataOffset {
                    name: platform.name.clone(),
                    data_offset: platform.data_offset,
                });
            }

            if map.platforms[..index]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&platform.name))
            {
                return Err(PlatformMapError::Duplicate(platform.name.clone()));
            }
        }

        Ok(map)
    }

    pub fn inbuilt() -> &'static PlatformMap {
        &INBUILT_PLATFORMS
    }

    pub fn get(&self, name: &str) -> Option<&PlatformDefinition> {
        self.platforms
            .iter()
            .find(|platform| platform.name.eq_ignore_ascii_case(name))
    }

    /// Look the platform up in `additional_maps` first, then in the inbuilt map.
    pub fn find_platform<'map>(
        name: &str,
        additional_maps: &'map [PlatformMap],
    ) -> Option<&'map PlatformDefinition> {
        additional_maps
            .iter()
            .chain(std::iter::once(Self::inbuilt()))
            .find_map(|map| map.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|platform| platform.name.as_str())
    }
}

impl<'de> Deserialize<'de> for Endianness {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(EndiannessVisitor)
    }
}

struct EndiannessVisitor;

impl<'de> Visitor<'de> for EndiannessVisitor {
    type Value = Endianness;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("\"big\", \"little\", \"be\" or \"le\"")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value.to_ascii_lowercase().as_str() {
            "big" | "be" => Ok(Endianness::Big),
            "little" | "le" => Ok(Endianness::Little),
            _ => Err(de::Error::invalid_value(de::Unexpected::Str(value), &self)),
        }
    }
}
