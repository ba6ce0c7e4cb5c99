//! YAML schema documents.
//!
//! Example:
//! ```yaml
//! config: { max_depth: 4 }
//! rowtypes:
//!   - name: customer
//!     key:   [ {name: cid, type: Int64} ]
//!     value: [ {name: name, type: Utf8, nullable: true} ]
//!   - name: order
//!     parent: [customer]          # list: one level below customer
//!     key:   [ {name: oid, type: Int64} ]
//!   - name: order_view
//!     sibling_of: order           # same path as order
//!   - name: order_copy
//!     parent: order               # bare name: same as sibling_of
//!   - name: item
//!     path: [customer, order, item]   # explicit, stored verbatim
//! rows:
//!   - { type: customer, values: [1, "Acme"] }
//!   - { type: order,    values: [10] }
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use rowtree_core::prelude::{
    DataType, Field, ParentPath, Registry, RegistryConfig, Row, RowType, RowTypeDef, RowTypeId,
    Scalar,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DslError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Registry(#[from] rowtree_core::Error),

    #[error("{context}: unknown row type '{name}'")]
    UnknownName { context: String, name: String },

    #[error("{context}: unknown data type '{data_type}'")]
    UnknownDataType { context: String, data_type: String },

    #[error("row {index} ({rowtype}): {message}")]
    Value {
        index: usize,
        rowtype: String,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDoc {
    #[serde(default)]
    pub config: SchemaConfig,
    pub rowtypes: Vec<RowTypeSpec>,
    #[serde(default)]
    pub rows: Vec<RowSpec>,
}

/// Registry settings a document may override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub max_depth: Option<usize>,
    pub validate_paths: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowTypeSpec {
    pub name: String,
    #[serde(default)]
    pub key: Vec<FieldDef>,
    #[serde(default)]
    pub value: Vec<FieldDef>,
    #[serde(default)]
    pub parent: Option<ParentDef>,
    #[serde(default)]
    pub sibling_of: Option<String>,
    #[serde(default)]
    pub path: Option<Vec<String>>,
}

/// `parent: order` (or `sibling_of: order`) aliases `order`'s path;
/// `parent: [customer, order]` nests one level below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentDef {
    RowType(String),
    Path(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowSpec {
    #[serde(rename = "type")]
    pub rowtype: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug)]
pub struct ParsedSchema {
    pub registry: Registry,
    pub rows: Vec<Row>,
}

/// Parse a document without building anything.
pub fn parse_document(yaml_src: &str) -> Result<SchemaDoc, DslError> {
    Ok(serde_yaml::from_str(yaml_src)?)
}

/// Parse and build with default settings overlaid by the document's `config`.
pub fn parse_schema(yaml_src: &str) -> Result<ParsedSchema, DslError> {
    let doc = parse_document(yaml_src)?;
    let mut config = RegistryConfig::default();
    doc.config.apply(&mut config);
    doc.build(config)
}

impl SchemaConfig {
    pub fn apply(&self, cfg: &mut RegistryConfig) {
        if let Some(max) = self.max_depth {
            cfg.max_depth = Some(max);
        }
        if let Some(validate) = self.validate_paths {
            cfg.validate_paths = validate;
        }
    }
}

impl SchemaDoc {
    /// Define every row type in document order, then type-check the rows.
    /// `config` is used as given; the document's own `config` block is not
    /// consulted here.
    pub fn build(self, config: RegistryConfig) -> Result<ParsedSchema, DslError> {
        let mut registry = Registry::with_config(config)?;

        for spec in self.rowtypes {
            let def = to_def(&registry, spec)?;
            registry.define(def)?;
        }

        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, spec)| to_row(&registry, index, spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParsedSchema { registry, rows })
    }
}

fn to_def(registry: &Registry, spec: RowTypeSpec) -> Result<RowTypeDef, DslError> {
    let mut def = RowTypeDef::new(spec.name.clone(), to_fields(&spec.name, &spec.value)?)
        .key(to_fields(&spec.name, &spec.key)?);

    def.parent_path = match (&spec.parent, &spec.sibling_of) {
        (Some(_), Some(_)) => {
            return Err(rowtree_core::Error::ConflictingArguments { name: spec.name }.into())
        }
        (None, None) => None,
        (Some(ParentDef::RowType(other)), None) | (None, Some(other)) => {
            Some(ParentPath::RowType(resolve(registry, &spec.name, other)?))
        }
        (Some(ParentDef::Path(names)), None) => Some(ParentPath::Path(resolve_all(
            registry, &spec.name, names,
        )?)),
    };

    if let Some(names) = &spec.path {
        // An explicit path may mention the type being defined.
        let own = registry.next_id();
        let path = names
            .iter()
            .map(|n| {
                if *n == spec.name {
                    Ok(own)
                } else {
                    resolve(registry, &spec.name, n)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        def = def.path(path);
    }

    Ok(def)
}

fn resolve(registry: &Registry, context: &str, name: &str) -> Result<RowTypeId, DslError> {
    registry.lookup(name).ok_or_else(|| DslError::UnknownName {
        context: context.to_string(),
        name: name.to_string(),
    })
}

fn resolve_all(
    registry: &Registry,
    context: &str,
    names: &[String],
) -> Result<Vec<RowTypeId>, DslError> {
    names.iter().map(|n| resolve(registry, context, n)).collect()
}

fn parse_dtype(context: &str, s: &str) -> Result<DataType, DslError> {
    Ok(match s {
        "Boolean" | "bool" => DataType::Boolean,
        "Int32" | "i32" => DataType::Int32,
        "Int64" | "i64" => DataType::Int64,
        "Float32" | "f32" => DataType::Float32,
        "Float64" | "f64" => DataType::Float64,
        "Utf8" | "str" | "string" => DataType::Utf8,
        "Binary" | "bytes" => DataType::Binary,
        _ => {
            return Err(DslError::UnknownDataType {
                context: context.to_string(),
                data_type: s.to_string(),
            })
        }
    })
}

fn to_fields(context: &str, defs: &[FieldDef]) -> Result<Vec<Field>, DslError> {
    defs.iter()
        .map(|f| {
            Ok(Field::new(
                f.name.clone(),
                parse_dtype(context, &f.data_type)?,
                f.nullable,
            ))
        })
        .collect()
}

fn to_row(registry: &Registry, index: usize, spec: RowSpec) -> Result<Row, DslError> {
    let rowtype = registry
        .by_name(&spec.rowtype)
        .ok_or_else(|| DslError::UnknownName {
            context: format!("row {}", index),
            name: spec.rowtype.clone(),
        })?;

    let fail = |message: String| DslError::Value {
        index,
        rowtype: spec.rowtype.clone(),
        message,
    };

    let fields = row_fields(rowtype);
    if fields.len() != spec.values.len() {
        return Err(fail(format!(
            "expected {} values, got {}",
            fields.len(),
            spec.values.len()
        )));
    }

    let values = fields
        .iter()
        .zip(&spec.values)
        .map(|(field, v)| to_scalar(field, v).map_err(&fail))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row::new(rowtype.id(), values))
}

/// Key fields first, then value fields; the layout of `Row::values`.
pub fn row_fields(rowtype: &RowType) -> Vec<&Field> {
    rowtype.key().iter().chain(rowtype.value()).collect()
}

fn to_scalar(field: &Field, v: &Value) -> Result<Scalar, String> {
    let mismatch = || format!("field '{}': {:?} is not a {:?}", field.name, v, field.data_type);

    if v.is_null() {
        return if field.nullable {
            Ok(Scalar::Null)
        } else {
            Err(format!("field '{}' is not nullable", field.name))
        };
    }

    Ok(match field.data_type {
        DataType::Boolean => Scalar::Bool(v.as_bool().ok_or_else(mismatch)?),
        DataType::Int32 => {
            let i = v.as_i64().ok_or_else(mismatch)?;
            Scalar::I32(i32::try_from(i).map_err(|_| mismatch())?)
        }
        DataType::Int64 => Scalar::I64(v.as_i64().ok_or_else(mismatch)?),
        DataType::Float32 => Scalar::F32(v.as_f64().ok_or_else(mismatch)? as f32),
        DataType::Float64 => Scalar::F64(v.as_f64().ok_or_else(mismatch)?),
        DataType::Utf8 => Scalar::Str(v.as_str().ok_or_else(mismatch)?.to_string()),
        DataType::Binary => Scalar::Bin(v.as_str().ok_or_else(mismatch)?.as_bytes().to_vec()),
    })
}
