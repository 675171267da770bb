//! Front-matter extraction for Hugo posts

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::error::MigrateError;

/// Read a scalar or a list of scalars as text.
///
/// Hugo sites are loose about value types (`author = ["Name"]`,
/// `tags = [2024]`), so numbers and booleans are rendered as text and
/// nested tables are skipped rather than failing the whole post.
fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct TextList;

    impl<'de> Visitor<'de> for TextList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a scalar or a list of scalars")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<serde_yaml::Value>()? {
                items.extend(scalar_text(&item));
            }
            Ok(items)
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: de::MapAccess<'de>,
        {
            while map
                .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
                .is_some()
            {}
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(TextList)
}

/// A single text value; list entries are joined with `", "`
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = text_list(deserializer)?;
    Ok(if items.is_empty() {
        None
    } else {
        Some(items.join(", "))
    })
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Front-matter fields of a Hugo post that the migration understands
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceMeta {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date: Option<String>,
    /// Kept raw: only a boolean `true` marks a draft
    pub draft: Option<serde_yaml::Value>,
    #[serde(deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "text_list")]
    pub author: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub series: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub featured: Option<String>,
    #[serde(deserialize_with = "text")]
    pub featuredpath: Option<String>,
    #[serde(deserialize_with = "text")]
    pub featuredalt: Option<String>,
    #[serde(deserialize_with = "text_list")]
    pub images: Vec<String>,

    /// Fields with no counterpart in the destination schema
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl SourceMeta {
    /// Whether the post is explicitly marked as a draft
    pub fn is_draft(&self) -> bool {
        self.draft_flag() == Some(true)
    }

    /// The draft flag when it is an actual boolean
    pub fn draft_flag(&self) -> Option<bool> {
        self.draft.as_ref().and_then(serde_yaml::Value::as_bool)
    }
}

/// Front-matter delimiter convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatterFormat {
    /// `+++` delimited TOML
    Toml,
    /// `---` delimited YAML
    Yaml,
}

impl MatterFormat {
    fn marker(self) -> &'static str {
        match self {
            MatterFormat::Toml => "+++",
            MatterFormat::Yaml => "---",
        }
    }

    fn name(self) -> &'static str {
        match self {
            MatterFormat::Toml => "TOML",
            MatterFormat::Yaml => "YAML",
        }
    }
}

impl fmt::Display for MatterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of splitting a source file into metadata and body
#[derive(Debug)]
pub struct ParsedMatter<'a> {
    pub meta: SourceMeta,
    /// Body with surrounding whitespace trimmed
    pub body: &'a str,
    /// Detected convention, `None` when the file has no front-matter
    pub format: Option<MatterFormat>,
    /// The primary parser failed and the other one succeeded
    pub used_fallback: bool,
}

/// Split `content` into front-matter and body.
///
/// A file without a recognized (and terminated) front-matter block is all
/// body with empty metadata.
pub fn parse(content: &str) -> Result<ParsedMatter<'_>, MigrateError> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    for format in [MatterFormat::Toml, MatterFormat::Yaml] {
        if let Some((block, body)) = split_block(content, format.marker()) {
            let (meta, used_fallback) = parse_block(block, format)?;
            return Ok(ParsedMatter {
                meta,
                body: body.trim(),
                format: Some(format),
                used_fallback,
            });
        }
    }

    Ok(ParsedMatter {
        meta: SourceMeta::default(),
        body: content.trim(),
        format: None,
        used_fallback: false,
    })
}

/// Find a block opened and closed by `marker` lines
fn split_block<'a>(content: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let rest = content.strip_prefix(marker)?;

    // The opening marker must be alone on its line
    let rest = match rest.find('\n') {
        Some(i) if rest[..i].trim().is_empty() => &rest[i + 1..],
        _ => return None,
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == marker {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

type BlockParser = fn(&str) -> Result<SourceMeta, String>;

fn parse_block(block: &str, format: MatterFormat) -> Result<(SourceMeta, bool), MigrateError> {
    let is_blank = block.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    });
    if is_blank {
        return Ok((SourceMeta::default(), false));
    }

    let (primary, fallback): (BlockParser, BlockParser) = match format {
        MatterFormat::Toml => (parse_toml, parse_yaml),
        MatterFormat::Yaml => (parse_yaml, parse_toml),
    };

    match primary(block) {
        Ok(meta) => Ok((meta, false)),
        Err(primary_err) => {
            tracing::debug!(
                "{} front-matter parse failed, trying fallback: {}",
                format,
                primary_err
            );
            match fallback(block) {
                Ok(meta) => Ok((meta, true)),
                Err(fallback_err) => Err(MigrateError::Metadata {
                    format: format.name(),
                    primary: primary_err,
                    fallback: fallback_err,
                }),
            }
        }
    }
}

fn parse_yaml(block: &str) -> Result<SourceMeta, String> {
    serde_yaml::from_str::<SourceMeta>(block).map_err(|e| e.to_string())
}

fn parse_toml(block: &str) -> Result<SourceMeta, String> {
    let table: toml::Table = toml::from_str(block).map_err(|e| e.to_string().trim().to_string())?;
    let value = toml_to_yaml(toml::Value::Table(table));
    serde_yaml::from_value::<SourceMeta>(value).map_err(|e| e.to_string())
}

/// Convert a TOML value into the YAML value model, rendering datetimes as text
fn toml_to_yaml(value: toml::Value) -> serde_yaml::Value {
    use serde_yaml::Value;

    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}
