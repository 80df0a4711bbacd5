//! Object discovery filters
//!
//! A filter runs a cascade of SHOW statements against the account metadata
//! and narrows the output with staged regex include/exclude filtering:
//!
//! ```text
//! database -> ignore_dbs -> schema -> ignore_schemas -> object type -> object name
//! ```
//!
//! Patterns are regular expressions with substring-search semantics; `".*"`
//! selects everything at a stage. An empty ignore list ignores nothing.
//! SHOW statements that fail with a permission error (edition-gated object
//! types) are logged and treated as empty rather than failing the cascade.

use regex::Regex;

use snowpick_core::{AccountObjectType, IntegrationKind, SchemaObjectType, Table};
use snowpick_session::SessionRef;

use crate::account_object::AccountObject;
use crate::error::ObjectError;
use crate::schema_object::SchemaObject;

/// Databases ignored by default: the sample share and the system database
pub const DEFAULT_IGNORE_DBS: &[&str] = &["SNOWFLAKE_SAMPLE_DATA", "SNOWFLAKE"];

/// Schemas ignored by default
pub const DEFAULT_IGNORE_SCHEMAS: &[&str] = &["INFORMATION_SCHEMA"];

fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

/// Join patterns into one alternation regex; `None` when the list is empty
fn alternation(patterns: &[String]) -> Result<Option<Regex>, ObjectError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let joined = patterns.join("|");
    Regex::new(&joined)
        .map(Some)
        .map_err(|source| ObjectError::Pattern {
            pattern: joined,
            source,
        })
}

/// Alternation of literal names, regex-escaped
///
/// Allow-lists are built from names the account returned, which may contain
/// regex metacharacters; they match literally.
fn name_alternation(names: &[String]) -> Result<Option<Regex>, ObjectError> {
    let escaped: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
    alternation(&escaped)
}

/// Keep rows matching the pattern; a missing pattern keeps everything
fn retain(table: Table, column: &str, pattern: Option<&Regex>) -> Result<Table, ObjectError> {
    match pattern {
        Some(re) => Ok(table.retain_matching(column, re)?),
        None => Ok(table),
    }
}

/// Drop rows matching the pattern; a missing pattern drops nothing
fn discard(table: Table, column: &str, pattern: Option<&Regex>) -> Result<Table, ObjectError> {
    match pattern {
        Some(re) => Ok(table.discard_matching(column, re)?),
        None => Ok(table),
    }
}

/// Non-null values of a column, deduplicated in order
fn distinct_values(table: &Table, column: &str) -> Result<Vec<String>, ObjectError> {
    let mut out: Vec<String> = Vec::new();
    for value in table.column_values(column)?.into_iter().flatten() {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    Ok(out)
}

/// Run one SHOW statement, tolerating permission errors
///
/// Edition-gated object types answer SHOW with a privilege error on standard
/// accounts; that becomes an empty table so the rest of the cascade runs.
async fn show_tolerant(session: &SessionRef, sql: &str) -> Result<Table, ObjectError> {
    match session.query(sql).await {
        Ok(table) => Ok(table),
        Err(e) if e.is_permission_denied() => {
            tracing::warn!(
                sql,
                error = %e,
                "SHOW failed with a permission error; some object types require an Enterprise or Business Critical edition"
            );
            Ok(Table::empty())
        }
        Err(e) => Err(e.into()),
    }
}

/// Discovers schema-level objects across the account
///
/// ```rust,ignore
/// // All procedures anywhere:
/// SchemaObjectFilter::new(session, &[".*"], &[".*"], &[".*"], &["procedure"]);
///
/// // Tables and views in one database:
/// SchemaObjectFilter::new(session, &["TEST_DB"], &[".*"], &[".*"], &["table", "view"]);
///
/// // Specific tables:
/// SchemaObjectFilter::new(session, &["ANALYTICS"], &["PUBLIC"], &["customer", "transactions"], &["table"]);
/// ```
#[derive(Clone)]
pub struct SchemaObjectFilter {
    session: SessionRef,
    databases: Vec<String>,
    schemas: Vec<String>,
    object_names: Vec<String>,
    object_types: Vec<String>,
    ignore_dbs: Vec<String>,
    ignore_schemas: Vec<String>,
}

impl SchemaObjectFilter {
    pub fn new(
        session: SessionRef,
        databases: &[&str],
        schemas: &[&str],
        object_names: &[&str],
        object_types: &[&str],
    ) -> Self {
        Self {
            session,
            databases: to_strings(databases),
            schemas: to_strings(schemas),
            object_names: to_strings(object_names),
            object_types: to_strings(object_types),
            ignore_dbs: to_strings(DEFAULT_IGNORE_DBS),
            ignore_schemas: to_strings(DEFAULT_IGNORE_SCHEMAS),
        }
    }

    /// Replace the default ignored databases
    pub fn with_ignore_dbs(mut self, ignore_dbs: &[&str]) -> Self {
        self.ignore_dbs = to_strings(ignore_dbs);
        self
    }

    /// Replace the default ignored schemas
    pub fn with_ignore_schemas(mut self, ignore_schemas: &[&str]) -> Self {
        self.ignore_schemas = to_strings(ignore_schemas);
        self
    }

    /// The object types the type patterns select
    fn selected_types(&self) -> Result<Vec<SchemaObjectType>, ObjectError> {
        let upper: Vec<String> = self.object_types.iter().map(|p| p.to_uppercase()).collect();
        match alternation(&upper)? {
            Some(re) => Ok(SchemaObjectType::matching(&re)),
            None => Ok(SchemaObjectType::ALL.to_vec()),
        }
    }

    /// Databases surviving the select/ignore stages
    async fn filtered_databases(&self) -> Result<Vec<String>, ObjectError> {
        let db_select = alternation(&self.databases)?;
        let db_ignore = alternation(&self.ignore_dbs)?;

        let dbs = self.session.query("SHOW DATABASES IN ACCOUNT").await?;
        let dbs = retain(dbs, "name", db_select.as_ref())?;
        let dbs = discard(dbs, "name", db_ignore.as_ref())?;

        let names = distinct_values(&dbs, "name")?;
        tracing::debug!(databases = ?names, "databases after filtering");
        Ok(names)
    }

    /// Schemas surviving the select/ignore stages, within the allowed databases
    async fn filtered_schemas(&self, allowed_dbs: &[String]) -> Result<Vec<String>, ObjectError> {
        let db_allow = name_alternation(allowed_dbs)?;
        let db_ignore = alternation(&self.ignore_dbs)?;
        let schema_select = alternation(&self.schemas)?;
        let schema_ignore = alternation(&self.ignore_schemas)?;

        let schemas = self.session.query("SHOW SCHEMAS IN ACCOUNT").await?;
        let schemas = retain(schemas, "database_name", db_allow.as_ref())?;
        let schemas = retain(schemas, "name", schema_select.as_ref())?;
        // The allow-list is substring-matched, so an ignored database can
        // still sneak in when an allowed name is a substring of it.
        let schemas = discard(schemas, "database_name", db_ignore.as_ref())?;
        let schemas = discard(schemas, "name", schema_ignore.as_ref())?;

        let names = distinct_values(&schemas, "name")?;
        tracing::debug!(schemas = ?names, "schemas after filtering");
        Ok(names)
    }

    /// SHOW one object type and normalize it to
    /// (database_name, schema_name, name)
    ///
    /// Functions and procedures answer SHOW with catalog_name/arguments
    /// instead; arguments carry the signature plus a " RETURN <type>" tail
    /// that is not part of the name.
    async fn show_objects(&self, ty: SchemaObjectType) -> Result<Table, ObjectError> {
        let sql = format!("SHOW {} IN ACCOUNT", ty.plural());
        let shown = show_tolerant(&self.session, &sql).await?;
        if shown.is_empty() {
            tracing::warn!(object_type = %ty, "no objects found");
            return Ok(Table::empty());
        }

        let shaped = if ty.is_callable() {
            shown
                .select(&["catalog_name", "schema_name", "arguments"])?
                .rename("catalog_name", "database_name")?
                .rename("arguments", "name")?
                .map_column("name", |v| {
                    v.split(" RETURN ").next().unwrap_or(v).to_string()
                })?
        } else {
            shown.select(&["database_name", "schema_name", "name"])?
        };
        Ok(shaped)
    }

    /// Run the cascade and return the matching objects
    ///
    /// No matches is an empty Vec, not an error.
    pub async fn find(&self) -> Result<Vec<SchemaObject>, ObjectError> {
        let selected_types = self.selected_types()?;
        let name_select = alternation(&self.object_names)?;

        let allowed_dbs = self.filtered_databases().await?;
        if allowed_dbs.is_empty() {
            tracing::warn!(
                databases = ?self.databases,
                ignore_dbs = ?self.ignore_dbs,
                "no databases matched the filter"
            );
            return Ok(Vec::new());
        }

        let allowed_schemas = self.filtered_schemas(&allowed_dbs).await?;
        if allowed_schemas.is_empty() {
            tracing::warn!(
                schemas = ?self.schemas,
                ignore_schemas = ?self.ignore_schemas,
                "no schemas matched the filter"
            );
            return Ok(Vec::new());
        }

        let db_allow = name_alternation(&allowed_dbs)?;
        let schema_allow = name_alternation(&allowed_schemas)?;

        let mut per_type = Vec::new();
        for ty in selected_types {
            let shaped = self.show_objects(ty).await?;
            if shaped.is_empty() {
                continue;
            }

            let filtered = retain(shaped, "database_name", db_allow.as_ref())?;
            let filtered = retain(filtered, "schema_name", schema_allow.as_ref())?;
            let filtered = retain(filtered, "name", name_select.as_ref())?;
            if filtered.is_empty() {
                continue;
            }

            per_type.push(filtered.with_column("object_type", ty.singular()));
        }

        let all = Table::concat(per_type);
        tracing::debug!(matches = all.num_rows(), "objects after filtering");
        if all.is_empty() {
            tracing::warn!(
                databases = ?self.databases,
                schemas = ?self.schemas,
                object_types = ?self.object_types,
                object_names = ?self.object_names,
                "no objects matched the filter"
            );
            return Ok(Vec::new());
        }

        self.materialize(&all)
    }

    /// Turn the concatenated match table into object handles
    fn materialize(&self, all: &Table) -> Result<Vec<SchemaObject>, ObjectError> {
        let databases = all.column_values("database_name")?;
        let schemas = all.column_values("schema_name")?;
        let names = all.column_values("name")?;
        let types = all.column_values("object_type")?;

        let mut objects = Vec::with_capacity(all.num_rows());
        for i in 0..all.num_rows() {
            let (Some(database), Some(schema), Some(name), Some(ty)) =
                (databases[i], schemas[i], names[i], types[i])
            else {
                tracing::warn!(row = i, "skipping match with missing metadata");
                continue;
            };
            let object_type: SchemaObjectType = ty
                .parse()
                .map_err(|_| ObjectError::EmptyResult(format!("unknown object type {ty}")))?;
            objects.push(SchemaObject::new(
                SessionRef::clone(&self.session),
                database,
                schema,
                name,
                object_type,
            ));
        }
        Ok(objects)
    }
}

/// Discovers account-level objects
///
/// Filters are applied by: object_types -> object_names -> ignore_names.
#[derive(Clone)]
pub struct AccountObjectFilter {
    session: SessionRef,
    object_names: Vec<String>,
    object_types: Vec<String>,
    ignore_names: Vec<String>,
}

impl AccountObjectFilter {
    pub fn new(session: SessionRef, object_names: &[&str], object_types: &[&str]) -> Self {
        Self {
            session,
            object_names: to_strings(object_names),
            object_types: to_strings(object_types),
            ignore_names: Vec::new(),
        }
    }

    /// Names to exclude from the results
    pub fn with_ignore_names(mut self, ignore_names: &[&str]) -> Self {
        self.ignore_names = to_strings(ignore_names);
        self
    }

    fn selected_types(&self) -> Result<Vec<AccountObjectType>, ObjectError> {
        let upper: Vec<String> = self.object_types.iter().map(|p| p.to_uppercase()).collect();
        match alternation(&upper)? {
            Some(re) => Ok(AccountObjectType::matching(&re)),
            None => Ok(AccountObjectType::ALL.to_vec()),
        }
    }

    /// SHOW one account object type, tolerating permission errors
    ///
    /// Integrations have no single SHOW: each kind is shown separately and
    /// the output unioned.
    async fn show_objects(&self, ty: AccountObjectType) -> Result<Table, ObjectError> {
        if ty == AccountObjectType::Integration {
            let mut per_kind = Vec::new();
            for kind in IntegrationKind::ALL {
                let sql = format!("SHOW {}", kind.show_keyword());
                per_kind.push(show_tolerant(&self.session, &sql).await?);
            }
            return Ok(Table::concat(per_kind));
        }

        let sql = format!("SHOW {} IN ACCOUNT", ty.plural());
        show_tolerant(&self.session, &sql).await
    }

    /// Run the cascade and return the matching objects
    pub async fn find(&self) -> Result<Vec<AccountObject>, ObjectError> {
        let selected_types = self.selected_types()?;
        tracing::debug!(types = ?selected_types, "account object types selected");

        let name_select = alternation(&self.object_names)?;
        let name_ignore = alternation(&self.ignore_names)?;

        let mut objects = Vec::new();
        for ty in selected_types {
            let shown = self.show_objects(ty).await?;
            if shown.is_empty() {
                tracing::warn!(object_type = %ty, "no objects found");
                continue;
            }

            let filtered = retain(shown, "name", name_select.as_ref())?;
            let filtered = discard(filtered, "name", name_ignore.as_ref())?;
            tracing::debug!(object_type = %ty, matches = filtered.num_rows(), "after name filtering");

            for name in filtered.column_values("name")?.into_iter().flatten() {
                objects.push(AccountObject::new(
                    SessionRef::clone(&self.session),
                    name,
                    ty,
                ));
            }
        }
        Ok(objects)
    }
}
