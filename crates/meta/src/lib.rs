//! Shared object/list/type metadata and the standard REST option types.
//!
//! Capabilities are explicit traits per concern ([`Object`], [`List`],
//! [`TypeAccessor`], `scheme::ObjectKind`); concrete entities embed the meta
//! structs and pick up whichever capability sets they need.

#![forbid(unsafe_code)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plinth_scheme::{from_api_version_and_kind, GroupVersionKind, ObjectKind};
use plinth_validation::field::{Error, ErrorList, Path};
use plinth_validation::{is_qualified_name, Validate};

/// Free-form extension data carried alongside an object, round-tripped
/// through a serialized shadow column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extend(pub serde_json::Map<String, serde_json::Value>);

impl Extend {
    /// Merge keys from a serialized shadow; existing keys win.
    pub fn merge(&mut self, shadow: &str) {
        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(shadow).unwrap_or_default();

        for (k, v) in parsed {
            self.0.entry(k).or_insert(v);
        }
    }
}

impl fmt::Display for Extend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string());
        f.write_str(&s)
    }
}

/// Stored type identity of an object: `kind` plus `apiVersion` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(rename = "apiVersion", default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

/// Accessor capability over the raw kind/apiVersion strings.
pub trait TypeAccessor {
    fn version(&self) -> &str;
    fn set_version(&mut self, version: String);
    fn kind(&self) -> &str;
    fn set_kind(&mut self, kind: String);
}

impl TypeAccessor for TypeMeta {
    fn version(&self) -> &str {
        &self.api_version
    }

    fn set_version(&mut self, version: String) {
        self.api_version = version;
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn set_kind(&mut self, kind: String) {
        self.kind = kind;
    }
}

impl ObjectKind for TypeMeta {
    fn set_group_version_kind(&mut self, gvk: &GroupVersionKind) {
        let (api_version, kind) = gvk.to_api_version_and_kind();
        self.api_version = api_version;
        self.kind = kind;
    }

    /// Parses the stored strings on demand.
    fn group_version_kind(&self) -> Option<GroupVersionKind> {
        Some(from_api_version_and_kind(&self.api_version, &self.kind))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(rename = "totalCount", default, skip_serializing_if = "is_zero")]
    pub total_count: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Capability of reporting and updating a list's total item count.
pub trait List {
    fn total_count(&self) -> i64;
    fn set_total_count(&mut self, count: i64);
}

impl List for ListMeta {
    fn total_count(&self) -> i64 {
        self.total_count
    }

    fn set_total_count(&mut self, count: i64) {
        self.total_count = count;
    }
}

/// Persistent identity and bookkeeping fields shared by stored objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub id: u64,
    #[serde(rename = "instanceID", default, skip_serializing_if = "String::is_empty")]
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "extend_is_empty")]
    pub extend: Extend,
    #[serde(skip)]
    pub ext_shadow: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn extend_is_empty(ext: &Extend) -> bool {
    ext.0.is_empty()
}

impl ObjectMeta {
    /// Serialize the extension map into the shadow string before persisting.
    pub fn sync_shadow(&mut self) {
        self.ext_shadow = self.extend.to_string();
    }

    /// Fold shadow keys back into the extension map after loading.
    pub fn merge_shadow(&mut self) {
        let shadow = std::mem::take(&mut self.ext_shadow);
        self.extend.merge(&shadow);
        self.ext_shadow = shadow;
    }
}

/// Accessor capability over stored-object identity fields.
pub trait Object {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

impl Object for ObjectMeta {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl Validate for ObjectMeta {
    fn validate(&self) -> ErrorList {
        let mut errs = ErrorList::new();
        let path = Path::new("metadata", &["name"]);

        for msg in is_qualified_name(&self.name) {
            errs.push(Error::invalid(&path, self.name.as_str(), &msg));
        }

        errs
    }
}

/// Standard query options for list calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(rename = "labelSelector", default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,
    #[serde(rename = "fieldSelector", default, skip_serializing_if = "String::is_empty")]
    pub field_selector: String,
    #[serde(rename = "timeoutSeconds", default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Options stripping or keeping cluster-specific fields on export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub export: bool,
    pub exact: bool,
}

/// Standard query options for single-object get calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub unscoped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// When present, modifications are not persisted. "All" processes every
    /// dry-run stage.
    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
}

/// Superset of [`UpdateOptions`]; `force` re-acquires fields owned by other
/// managers and must stay unset for non-apply patches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(rename = "dryRun", default, skip_serializing_if = "Vec::is_empty")]
    pub dry_run: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizeOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(skip)]
    pub no_headers: bool,
}
