//! Key-name conversion between the database's snake_case columns and the
//! API's camelCase fields.
//!
//! The two algorithmic conversions are pure string functions. Irregular names
//! (acronyms, legacy column names) go through a [`FieldMappings`] override
//! table owned by a [`NameMapper`].

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("valid snake_case pattern"));
static CAMEL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*([A-Z][a-z0-9]*)*$").expect("valid camelCase pattern"));

/// Convert a snake_case name to camelCase.
///
/// Every `_` immediately followed by a lowercase ASCII letter is dropped and
/// the letter uppercased. Anything else is copied as-is, so malformed input
/// (`__a`, `_`, `a_1`) degrades to a partial conversion instead of failing.
pub fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

/// Convert a camelCase name to snake_case.
///
/// Every uppercase ASCII letter becomes `_` plus its lowercase form. Runs of
/// capitals are not treated as acronyms: `"userID"` becomes `"user_i_d"`.
pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);

    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// True when `s` is a well-formed snake_case identifier.
pub fn is_snake_case(s: &str) -> bool {
    SNAKE_CASE.is_match(s)
}

/// True when `s` is a well-formed camelCase identifier.
pub fn is_camel_case(s: &str) -> bool {
    CAMEL_CASE.is_match(s)
}

/// Which way a conversion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// snake_case (database) to camelCase (application)
    ToCamel,
    /// camelCase (application) to snake_case (database)
    ToSnake,
}

impl Direction {
    pub fn is_to_camel(self) -> bool {
        matches!(self, Direction::ToCamel)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToCamel => write!(f, "to-camel"),
            Direction::ToSnake => write!(f, "to-snake"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to-camel" | "camel" | "snake-to-camel" => Ok(Direction::ToCamel),
            "to-snake" | "snake" | "camel-to-snake" => Ok(Direction::ToSnake),
            other => Err(MappingError::InvalidDirection(other.to_string())),
        }
    }
}

/// Error type for override table construction
#[derive(Debug)]
pub enum MappingError {
    EmptyKey,
    DuplicateSnakeKey(String),
    InvalidDirection(String),
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::EmptyKey => write!(f, "Override table contains an empty field name"),
            MappingError::DuplicateSnakeKey(key) => {
                write!(f, "Override table maps '{}' more than once", key)
            }
            MappingError::InvalidDirection(value) => {
                write!(f, "Unknown conversion direction '{}' (expected to-camel or to-snake)", value)
            }
            MappingError::Io(e) => write!(f, "IO error: {}", e),
            MappingError::Yaml(e) => write!(f, "YAML error: {}", e),
        }
    }
}

impl std::error::Error for MappingError {}

impl From<std::io::Error> for MappingError {
    fn from(err: std::io::Error) -> Self {
        MappingError::Io(err)
    }
}

impl From<serde_yaml::Error> for MappingError {
    fn from(err: serde_yaml::Error) -> Self {
        MappingError::Yaml(err)
    }
}

/// Field names that do not follow the algorithmic conversion.
///
/// Pairs of `(snake, camel)`. Keyed by the snake name; the camel side is
/// found by scanning values, so one table serves both directions.
const STOREFRONT_OVERRIDES: &[(&str, &str)] = &[
    ("image_url", "imageURL"),
    ("thumbnail_url", "thumbnailURL"),
    ("preview_url", "previewURL"),
    ("sku", "SKU"),
    ("jwt_id", "jwtID"),
    ("last_login_ip", "lastLoginIP"),
    ("api_key_id", "apiKeyID"),
    ("doc_html", "docHTML"),
    ("printify_product_id", "productId"),
    ("printify_order_id", "printifyOrderID"),
    ("printify_shop_id", "shopId"),
    ("stripe_payment_intent_id", "paymentIntentId"),
    ("stripe_customer_id", "customerId"),
    ("two_fa_enabled", "twoFactorEnabled"),
    ("is_admin", "admin"),
];

/// Immutable bidirectional override table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMappings {
    entries: IndexMap<String, String>,
}

impl FieldMappings {
    /// Build a table from `(snake, camel)` pairs.
    pub fn from_pairs<I, S, C>(pairs: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        let mut entries = IndexMap::new();

        for (snake, camel) in pairs {
            let snake = snake.into();
            let camel = camel.into();
            if snake.is_empty() || camel.is_empty() {
                return Err(MappingError::EmptyKey);
            }
            if entries.contains_key(&snake) {
                return Err(MappingError::DuplicateSnakeKey(snake));
            }
            entries.insert(snake, camel);
        }

        Ok(Self { entries })
    }

    /// The override table used by the storefront API.
    pub fn storefront() -> Self {
        Self {
            entries: STOREFRONT_OVERRIDES
                .iter()
                .map(|(snake, camel)| (snake.to_string(), camel.to_string()))
                .collect(),
        }
    }

    /// Parse a YAML mapping of `snake_name: camelName`.
    ///
    /// ```yaml
    /// image_url: imageURL
    /// stripe_customer_id: customerId
    /// ```
    pub fn from_yaml_str(contents: &str) -> Result<Self, MappingError> {
        let raw: IndexMap<String, String> = serde_yaml::from_str(contents)?;
        Self::from_pairs(raw)
    }

    /// Load a YAML override table from disk.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Camel name for a snake key.
    pub fn camel_for(&self, snake: &str) -> Option<&str> {
        self.entries.get(snake).map(String::as_str)
    }

    /// Snake key for a camel name. Linear in the table size.
    pub fn snake_for(&self, camel: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| c.as_str() == camel)
            .map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name converter that consults an injected override table first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMapper {
    mappings: FieldMappings,
}

impl NameMapper {
    pub fn new(mappings: FieldMappings) -> Self {
        Self { mappings }
    }

    /// Mapper with no overrides: pure algorithmic conversion.
    pub fn algorithmic() -> Self {
        Self::new(FieldMappings::default())
    }

    pub fn mappings(&self) -> &FieldMappings {
        &self.mappings
    }

    /// Convert a single field name.
    ///
    /// With `to_camel` the name is looked up as a snake key, otherwise as a
    /// camel value. Names absent from the table fall back to
    /// [`snake_to_camel`] / [`camel_to_snake`].
    pub fn map_field(&self, name: &str, to_camel: bool) -> String {
        if to_camel {
            match self.mappings.camel_for(name) {
                Some(camel) => camel.to_string(),
                None => snake_to_camel(name),
            }
        } else {
            match self.mappings.snake_for(name) {
                Some(snake) => snake.to_string(),
                None => camel_to_snake(name),
            }
        }
    }

    /// [`map_field`](Self::map_field) with an explicit [`Direction`].
    pub fn convert(&self, name: &str, direction: Direction) -> String {
        self.map_field(name, direction.is_to_camel())
    }

    /// Override entries the plain algorithm does not reproduce.
    ///
    /// Returns `(snake, camel, algorithmic)` for every entry where either
    /// direction disagrees with the table: `algorithmic` is
    /// `camel_to_snake(camel)` when that differs from `snake`, otherwise
    /// `snake_to_camel(snake)`. Deep object traversal skips the table, so
    /// these are exactly the keys it renders differently from
    /// [`map_field`](Self::map_field).
    pub fn lossy_round_trips(&self) -> Vec<(String, String, String)> {
        self.mappings
            .iter()
            .filter_map(|(snake, camel)| {
                let back = camel_to_snake(camel);
                if back != snake {
                    return Some((snake.to_string(), camel.to_string(), back));
                }
                let forward = snake_to_camel(snake);
                if forward != camel {
                    return Some((snake.to_string(), camel.to_string(), forward));
                }
                None
            })
            .collect()
    }
}

impl Default for NameMapper {
    fn default() -> Self {
        Self::new(FieldMappings::storefront())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel("first_name"), "firstName");
        assert_eq!(snake_to_camel("created_at"), "createdAt");
        assert_eq!(snake_to_camel("id"), "id");
        assert_eq!(snake_to_camel(""), "");
    }

    #[test]
    fn test_snake_to_camel_malformed_input() {
        assert_eq!(snake_to_camel("_private"), "Private");
        assert_eq!(snake_to_camel("double__under"), "double_Under");
        assert_eq!(snake_to_camel("trailing_"), "trailing_");
        assert_eq!(snake_to_camel("address_line_1"), "addressLine_1");
        assert_eq!(snake_to_camel("already_Camel"), "already_Camel");
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("firstName"), "first_name");
        assert_eq!(camel_to_snake("userId"), "user_id");
        assert_eq!(camel_to_snake("plain"), "plain");
    }

    #[test]
    fn test_camel_to_snake_uppercase_runs() {
        assert_eq!(camel_to_snake("ID"), "_i_d");
        assert_eq!(camel_to_snake("userID"), "user_i_d");
        assert_eq!(camel_to_snake("Name"), "_name");
        assert_eq!(snake_to_camel(&camel_to_snake("userID")), "userID");
    }

    #[test]
    fn test_round_trips() {
        for s in ["first_name", "a_b_c", "order_item_total", "x"] {
            assert_eq!(camel_to_snake(&snake_to_camel(s)), s);
        }
        for s in ["firstName", "aBcD", "orderItemTotal", "x"] {
            assert_eq!(snake_to_camel(&camel_to_snake(s)), s);
        }
    }

    #[test]
    fn test_map_field_prefers_overrides() {
        let mapper = NameMapper::default();

        assert_eq!(mapper.map_field("image_url", true), "imageURL");
        assert_eq!(mapper.map_field("imageURL", false), "image_url");
        assert_eq!(mapper.map_field("stripe_customer_id", true), "customerId");
        assert_eq!(mapper.map_field("customerId", false), "stripe_customer_id");
        assert_eq!(mapper.map_field("first_name", true), "firstName");
        assert_eq!(mapper.map_field("firstName", false), "first_name");
    }

    #[test]
    fn test_map_field_with_injected_table() {
        let mappings = FieldMappings::from_pairs([("zip", "postalCode")]).unwrap();
        let mapper = NameMapper::new(mappings);

        assert_eq!(mapper.convert("zip", Direction::ToCamel), "postalCode");
        assert_eq!(mapper.convert("postalCode", Direction::ToSnake), "zip");
        assert_eq!(mapper.convert("image_url", Direction::ToCamel), "imageUrl");
    }

    #[test]
    fn test_algorithmic_mapper_ignores_storefront_table() {
        let mapper = NameMapper::algorithmic();
        assert_eq!(mapper.map_field("sku", true), "sku");
        assert_eq!(mapper.map_field("SKU", false), "_s_k_u");
    }

    #[test]
    fn test_from_pairs_rejects_duplicates_and_empty() {
        let dup = FieldMappings::from_pairs([("a_b", "aB"), ("a_b", "ab")]);
        assert!(matches!(dup, Err(MappingError::DuplicateSnakeKey(k)) if k == "a_b"));

        let empty = FieldMappings::from_pairs([("", "x")]);
        assert!(matches!(empty, Err(MappingError::EmptyKey)));
    }

    #[test]
    fn test_from_yaml_str() {
        let mappings = FieldMappings::from_yaml_str("image_url: imageURL\nsku: SKU\n").unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings.camel_for("sku"), Some("SKU"));
        assert_eq!(mappings.snake_for("imageURL"), Some("image_url"));
    }

    #[test]
    fn test_from_yaml_str_rejects_non_strings() {
        assert!(FieldMappings::from_yaml_str("- a\n- b\n").is_err());
    }

    #[test]
    fn test_lossy_round_trips() {
        let mapper = NameMapper::new(
            FieldMappings::from_pairs([("first_name", "firstName"), ("sku", "SKU")]).unwrap(),
        );
        let lossy = mapper.lossy_round_trips();
        assert_eq!(lossy, vec![("sku".to_string(), "SKU".to_string(), "_s_k_u".to_string())]);
    }

    #[test]
    fn test_lossy_round_trips_checks_both_directions() {
        // camel_to_snake("a_b") is "a_b", but snake_to_camel("a_b") is "aB"
        let mapper = NameMapper::new(
            FieldMappings::from_pairs([("a_b", "a_b"), ("order_id", "orderId")]).unwrap(),
        );
        let lossy = mapper.lossy_round_trips();
        assert_eq!(lossy, vec![("a_b".to_string(), "a_b".to_string(), "aB".to_string())]);
    }

    #[test]
    fn test_naming_checks() {
        assert!(is_snake_case("order_item_2"));
        assert!(!is_snake_case("orderItem"));
        assert!(!is_snake_case("double__under"));
        assert!(is_camel_case("orderItem2"));
        assert!(!is_camel_case("order_item"));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("to-camel".parse::<Direction>().unwrap(), Direction::ToCamel);
        assert_eq!("snake".parse::<Direction>().unwrap(), Direction::ToSnake);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
