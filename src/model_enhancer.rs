//! Standard persistence settings for storefront models.
//!
//! Every model table uses snake_case columns, including the timestamp
//! columns. [`enhance_model`] records a model's standardized definition in a
//! [`ModelRegistry`]; the camelCase projection is available on any [`Model`]
//! through the blanket [`CamelCaseModel`] impl.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transformer::{to_camel_case, Serializable, TransformError};

pub const CREATED_AT_COLUMN: &str = "created_at";
pub const UPDATED_AT_COLUMN: &str = "updated_at";
pub const DELETED_AT_COLUMN: &str = "deleted_at";

/// Persistence options for a model table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// `None` means timestamps are on, which is the persistence default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,

    /// Soft deletes: rows get a deletion timestamp instead of being removed.
    #[serde(default)]
    pub paranoid: bool,

    #[serde(default)]
    pub underscored: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl ModelOptions {
    pub fn timestamps_enabled(&self) -> bool {
        self.timestamps != Some(false)
    }

    /// Load model options from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&contents).map_err(|e| ModelError::InvalidOptions(e.to_string()))
    }
}

/// Column definition for one model attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub column_type: String,

    #[serde(default = "default_true")]
    pub nullable: bool,

    #[serde(default)]
    pub primary_key: bool,
}

fn default_true() -> bool {
    true
}

impl AttributeDef {
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            column_type: column_type.into(),
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Attribute definitions keyed by column name, in declaration order.
pub type Attributes = IndexMap<String, AttributeDef>;

/// Force the snake_case column convention onto a model's options.
///
/// `underscored` is always set. Unless timestamps are explicitly disabled,
/// the created/updated columns are named `created_at`/`updated_at`, and
/// `deleted_at` is added when the model is paranoid.
pub fn enhance_model_options(options: ModelOptions) -> ModelOptions {
    let mut enhanced = ModelOptions {
        underscored: true,
        ..options
    };

    if enhanced.timestamps_enabled() {
        enhanced.created_at = Some(CREATED_AT_COLUMN.to_string());
        enhanced.updated_at = Some(UPDATED_AT_COLUMN.to_string());

        if enhanced.paranoid {
            enhanced.deleted_at = Some(DELETED_AT_COLUMN.to_string());
        }
    }

    enhanced
}

/// Attribute definitions are expected to already use the database's
/// snake_case column names, so they are passed through as-is.
pub fn standardize_attributes(attributes: Attributes) -> Attributes {
    attributes
}

/// A storefront model backed by a database table.
pub trait Model: Serializable {
    const NAME: &'static str;

    fn options() -> ModelOptions {
        ModelOptions::default()
    }

    fn attributes() -> Attributes {
        Attributes::new()
    }
}

/// camelCase projection of a model, for API responses.
pub trait CamelCaseModel {
    fn to_camel_case(&self) -> Result<Value, TransformError>;

    fn convert_to_camel_case(record: &Self) -> Result<Value, TransformError>
    where
        Self: Sized,
    {
        record.to_camel_case()
    }
}

impl<M: Model> CamelCaseModel for M {
    fn to_camel_case(&self) -> Result<Value, TransformError> {
        to_camel_case(self)
    }
}

/// Error type for model setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    AlreadyRegistered(String),
    EmptyTableName(String),
    ParanoidWithoutTimestamps(String),
    InvalidOptions(String),
    Io(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::AlreadyRegistered(name) => write!(f, "Model '{}' is already registered", name),
            ModelError::EmptyTableName(name) => write!(f, "Model '{}' has an empty table name", name),
            ModelError::ParanoidWithoutTimestamps(name) => {
                write!(f, "Model '{}' is paranoid but has timestamps disabled", name)
            }
            ModelError::InvalidOptions(msg) => write!(f, "Invalid model options: {}", msg),
            ModelError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Standardized definition of a registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDefinition {
    pub name: String,
    pub options: ModelOptions,
    pub attributes: Attributes,
}

impl ModelDefinition {
    /// Build the standardized definition for a model.
    pub fn build(
        name: &str,
        options: ModelOptions,
        attributes: Attributes,
    ) -> Result<Self, ModelError> {
        let mut options = enhance_model_options(options);

        if options.paranoid && !options.timestamps_enabled() {
            return Err(ModelError::ParanoidWithoutTimestamps(name.to_string()));
        }

        let table_name = options
            .table_name
            .take()
            .unwrap_or_else(|| name.to_case(Case::Snake));
        if table_name.trim().is_empty() {
            return Err(ModelError::EmptyTableName(name.to_string()));
        }
        options.table_name = Some(table_name);

        Ok(Self {
            name: name.to_string(),
            options,
            attributes: standardize_attributes(attributes),
        })
    }

    pub fn table_name(&self) -> &str {
        self.options.table_name.as_deref().unwrap_or_default()
    }

    /// Every column the table has, timestamps included.
    pub fn column_names(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        for column in [&self.options.created_at, &self.options.updated_at, &self.options.deleted_at]
            .into_iter()
            .flatten()
        {
            if !columns.contains(&column.as_str()) {
                columns.push(column.as_str());
            }
        }
        columns
    }
}

/// Definitions of every enhanced model, by model name.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDefinition>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition.
    pub fn register(&mut self, definition: ModelDefinition) -> Result<(), ModelError> {
        if self.models.contains_key(&definition.name) {
            return Err(ModelError::AlreadyRegistered(definition.name));
        }
        self.models.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name)
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.models.len()
    }

    /// Registered model names, sorted.
    pub fn list_models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Register `M`'s standardized definition.
///
/// Setup problems are logged and reported as `false`; they never abort
/// startup, since persistence works without the enhancement.
pub fn enhance_model<M: Model>(registry: &mut ModelRegistry) -> bool {
    let result = ModelDefinition::build(M::NAME, M::options(), M::attributes())
        .and_then(|definition| registry.register(definition));

    match result {
        Ok(()) => {
            tracing::debug!(model = M::NAME, "Model enhanced");
            true
        }
        Err(e) => {
            tracing::warn!(model = M::NAME, error = %e, "Model enhancement skipped");
            false
        }
    }
}
