//! Schema-level objects
//!
//! A [`SchemaObject`] is the coordinate of one object inside a schema plus a
//! session handle. Its methods format the matching administrative statement,
//! submit it, and hand back the tabular output (or the one-cell status
//! string Snowflake returns for DDL-ish statements).

use std::fmt;
use std::path::{Path, PathBuf};

use snowpick_core::{Privilege, PrivilegeTarget, SchemaObjectType, Table};
use snowpick_session::SessionRef;

use crate::error::ObjectError;

/// How [`SchemaObject::create`] builds its statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreateMethod {
    /// `CREATE <type> IF NOT EXISTS <name>` with no trailing clause
    #[default]
    Bare,

    /// `CREATE <type> IF NOT EXISTS <name> <extension>`; the extension is
    /// the type-specific tail (column list, AS SELECT, ...)
    WithExtension(String),

    /// Run a caller-provided DDL statement verbatim, e.g. one captured
    /// earlier via [`SchemaObject::ddl`]
    Ddl(String),
}

/// One schema-level object in a Snowflake account
#[derive(Clone)]
pub struct SchemaObject {
    session: SessionRef,
    pub database: String,
    pub schema: String,
    pub name: String,
    pub object_type: SchemaObjectType,
}

impl fmt::Debug for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaObject")
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("object_type", &self.object_type)
            .finish()
    }
}

impl PartialEq for SchemaObject {
    fn eq(&self, other: &Self) -> bool {
        self.database == other.database
            && self.schema == other.schema
            && self.name == other.name
            && self.object_type == other.object_type
    }
}

impl SchemaObject {
    pub fn new(
        session: SessionRef,
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
        object_type: SchemaObjectType,
    ) -> Self {
        Self {
            session,
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
            object_type,
        }
    }

    /// `"DB"."SCHEMA"."NAME"`, each part double-quoted
    pub fn fully_qualified(&self) -> String {
        format!(
            "\"{}\".\"{}\".\"{}\"",
            self.database, self.schema, self.name
        )
    }

    /// Dotted name without quoting, as GET_DDL wants it
    fn dotted(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.name)
    }

    fn privilege_target(&self) -> PrivilegeTarget {
        PrivilegeTarget::SchemaObject {
            object_type: self.object_type,
            qualified_name: self.fully_qualified(),
        }
    }

    /// Fetch the object's DDL via GET_DDL
    pub async fn ddl(&self) -> Result<String, ObjectError> {
        let sql = format!(
            "SELECT GET_DDL('{}', '{}')",
            self.object_type.ddl_keyword(),
            self.dotted()
        );
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// Fetch the DDL and write it under
    /// `<root>/<database>/<schema>/<object type>/<db>.<schema>.<name>.sql`
    ///
    /// Directories are created as needed; returns the written path.
    pub async fn save_ddl(&self, root: &Path) -> Result<PathBuf, ObjectError> {
        let ddl = self.ddl().await?;

        let dir = root
            .join(&self.database)
            .join(&self.schema)
            .join(self.object_type.singular());
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.sql", self.dotted()));
        std::fs::write(&path, ddl)?;
        Ok(path)
    }

    /// `DESCRIBE <type> <name>`
    pub async fn describe(&self) -> Result<Table, ObjectError> {
        let sql = format!(
            "DESCRIBE {} {}",
            self.object_type.singular(),
            self.fully_qualified()
        );
        Ok(self.session.query(&sql).await?)
    }

    /// `SHOW GRANTS ON <type> <name>`
    pub async fn grants_on(&self) -> Result<Table, ObjectError> {
        let sql = format!(
            "SHOW GRANTS ON {} {}",
            self.object_type.singular(),
            self.fully_qualified()
        );
        Ok(self.session.query(&sql).await?)
    }

    /// Grant privileges on this object to a role
    ///
    /// Privilege names are validated against the object type's allowed set
    /// before any SQL is sent. Returns the status string.
    pub async fn grant(&self, privileges: &[&str], role: &str) -> Result<String, ObjectError> {
        let target = self.privilege_target();
        let validated = privileges
            .iter()
            .map(|p| Privilege::new(target.clone(), p))
            .collect::<Result<Vec<_>, _>>()?;

        let names: Vec<&str> = validated.iter().map(|p| p.name()).collect();
        let sql = format!(
            "GRANT {} ON {} {} TO ROLE {}",
            names.join(", "),
            self.object_type.singular(),
            self.fully_qualified(),
            role
        );
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// Create the object; returns the status string
    pub async fn create(&self, method: CreateMethod) -> Result<String, ObjectError> {
        let sql = match method {
            CreateMethod::Bare => format!(
                "CREATE {} IF NOT EXISTS {}",
                self.object_type.singular(),
                self.fully_qualified()
            ),
            CreateMethod::WithExtension(ext) => format!(
                "CREATE {} IF NOT EXISTS {} {}",
                self.object_type.singular(),
                self.fully_qualified(),
                ext
            ),
            CreateMethod::Ddl(ddl) => ddl,
        };
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// `DROP <type> IF EXISTS <name>`; returns the status string
    pub async fn drop(&self) -> Result<String, ObjectError> {
        let sql = format!(
            "DROP {} IF EXISTS {}",
            self.object_type.singular(),
            self.fully_qualified()
        );
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }
}
