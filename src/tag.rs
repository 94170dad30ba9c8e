use serde::{Serialize, Serializer};

use serde_repr::{Deserialize_repr, Serialize_repr};

use std::{fmt, num::ParseIntError, str::FromStr};

use thiserror::Error;

/// Kind of property a tag describes.
#[derive(Debug, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr, Clone, Copy)]
#[repr(u8)]
pub enum Category {
    General = 0,
    Artist = 1,
    Copyright = 3,
    Character = 4,
    Species = 5,
    Invalid = 6,
    Meta = 7,
    Lore = 8,
}

impl Category {
    /// Every category, in the order the site displays them.
    pub const ALL: [Category; 8] = [
        Category::Artist,
        Category::Copyright,
        Category::Character,
        Category::Species,
        Category::General,
        Category::Meta,
        Category::Lore,
        Category::Invalid,
    ];

    /// The key used for this category in post tag maps.
    pub fn name(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Artist => "artist",
            Category::Copyright => "copyright",
            Category::Character => "character",
            Category::Species => "species",
            Category::Invalid => "invalid",
            Category::Meta => "meta",
            Category::Lore => "lore",
        }
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = Category::ALL.iter().find(|c| c.name() == s) {
            return Ok(*c);
        }

        let num: u8 = s.parse()?;
        let result = match num {
            0 => Self::General,
            1 => Self::Artist,
            3 => Self::Copyright,
            4 => Self::Character,
            5 => Self::Species,
            6 => Self::Invalid,
            7 => Self::Meta,
            8 => Self::Lore,
            _ => return Err(ParseCategoryError::Unknown(num)),
        };

        Ok(result)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ParseCategoryError {
    #[error("category string is neither a name nor a u8")]
    ParseInt(#[from] ParseIntError),

    #[error("unknown category {0}")]
    Unknown(u8),
}

/// Tag search criteria.
///
/// Built either from a single string, which is split on whitespace, or from a sequence of tokens.
/// Sent to the API as the space separated list.
///
/// ```
/// # use e6api::tag::Tags;
/// assert_eq!(Tags::from("fox  rating:s"), Tags::from(&["fox", "rating:s"][..]));
/// assert_eq!(Tags::from(vec![String::from("fox")]).to_string(), "fox");
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends a token.
    pub fn push(&mut self, tag: impl Into<String>) {
        self.0.push(tag.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&str> for Tags {
    fn from(s: &str) -> Self {
        Tags(s.split_whitespace().map(String::from).collect())
    }
}

impl From<String> for Tags {
    fn from(s: String) -> Self {
        Tags::from(s.as_str())
    }
}

impl From<&String> for Tags {
    fn from(s: &String) -> Self {
        Tags::from(s.as_str())
    }
}

impl From<&[&str]> for Tags {
    fn from(q: &[&str]) -> Self {
        q.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Tags {
    fn from(q: [&str; N]) -> Self {
        q.into_iter().collect()
    }
}

impl From<Vec<&str>> for Tags {
    fn from(q: Vec<&str>) -> Self {
        q.into_iter().collect()
    }
}

impl From<Vec<String>> for Tags {
    fn from(q: Vec<String>) -> Self {
        q.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        // A token may itself hold several tags.
        Tags(
            iter.into_iter()
                .flat_map(|t| {
                    t.as_ref()
                        .split_whitespace()
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .collect(),
        )
    }
}
