//! # ilytat-casing: snake_case/camelCase bridge for the ILYTAT storefront
//!
//! The storefront database names its columns in snake_case; its JSON API
//! speaks camelCase. This crate converts between the two.
//!
//! ## Layers
//!
//! - **Name mapper**: single-name conversion with an injectable override
//!   table for acronyms and legacy names ([`NameMapper`], [`FieldMappings`])
//! - **Transformer**: recursive key renaming over JSON values, plus the
//!   fail-open payload transforms used at the HTTP boundary
//! - **Middleware**: axum request/response integration points
//! - **Model enhancer**: standard snake_case persistence options and the
//!   camelCase projection capability for models
//!
//! ## Example
//!
//! ```
//! use ilytat_casing::object_snake_to_camel;
//! use serde_json::json;
//!
//! let row = json!({ "user_id": "u1", "profile": { "first_name": "A" } });
//! assert_eq!(
//!     object_snake_to_camel(&row),
//!     json!({ "userId": "u1", "profile": { "firstName": "A" } })
//! );
//! ```

pub mod config;
pub mod middleware;
pub mod model_enhancer;
pub mod name_mapper;
pub mod transformer;

// Re-export key types
pub use config::{ConfigError, ServerConfig};
pub use middleware::{camelize_response, snakify_request, with_key_casing, TransformConfig};
pub use model_enhancer::{
    enhance_model, enhance_model_options, standardize_attributes, AttributeDef, Attributes,
    CamelCaseModel, Model, ModelDefinition, ModelError, ModelOptions, ModelRegistry,
};
pub use name_mapper::{
    camel_to_snake, snake_to_camel, Direction, FieldMappings, MappingError, NameMapper,
};
pub use transformer::{
    camelize_outbound, object_camel_to_snake, object_snake_to_camel, to_camel_case, to_snake_case,
    transform_inbound, transform_outbound, Serializable, TransformError, Transformed,
};
