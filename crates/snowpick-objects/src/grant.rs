//! Standalone grants
//!
//! [`Grant`] pairs one validated [`Privilege`] with a grantee role, renders
//! the GRANT/REVOKE statements, and executes them. The object methods cover
//! the common case; this type exists for grant-management code that builds
//! grants independently of the object handles.

use std::fmt;

use snowpick_core::Privilege;
use snowpick_session::SessionRef;

use crate::error::ObjectError;

/// A privilege granted to a role
#[derive(Clone)]
pub struct Grant {
    session: SessionRef,
    privilege: Privilege,
    role: String,
    grant_option: bool,
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grant")
            .field("privilege", &self.privilege)
            .field("role", &self.role)
            .field("grant_option", &self.grant_option)
            .finish()
    }
}

impl Grant {
    pub fn new(session: SessionRef, privilege: Privilege, role: impl Into<String>) -> Self {
        Self {
            session,
            privilege,
            role: role.into(),
            grant_option: false,
        }
    }

    /// Add `WITH GRANT OPTION`
    pub fn with_grant_option(mut self) -> Self {
        self.grant_option = true;
        self
    }

    pub fn privilege(&self) -> &Privilege {
        &self.privilege
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// The GRANT statement this grant renders to
    pub fn sql(&self) -> String {
        let mut sql = format!(
            "GRANT {} ON {} TO ROLE {}",
            self.privilege.name(),
            self.privilege.target().sql(),
            self.role
        );
        if self.grant_option {
            sql.push_str(" WITH GRANT OPTION");
        }
        sql
    }

    /// The matching REVOKE statement
    pub fn revoke_sql(&self) -> String {
        format!(
            "REVOKE {} ON {} FROM ROLE {}",
            self.privilege.name(),
            self.privilege.target().sql(),
            self.role
        )
    }

    /// Execute the grant; returns the status string
    pub async fn execute(&self) -> Result<String, ObjectError> {
        let sql = self.sql();
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// Revoke the grant; returns the status string
    pub async fn revoke(&self) -> Result<String, ObjectError> {
        let sql = self.revoke_sql();
        let table = self.session.query(&sql).await?;
        table
            .first_value()
            .map(str::to_string)
            .ok_or(ObjectError::EmptyResult(sql))
    }

    /// True if an identical privilege/grantee pair already shows up in
    /// `SHOW GRANTS ON <target>`
    pub async fn exists(&self) -> Result<bool, ObjectError> {
        let sql = format!("SHOW GRANTS ON {}", self.privilege.target().sql());
        let grants = self.session.query(&sql).await?;

        let (Some(priv_idx), Some(grantee_idx)) = (
            grants.column_index("privilege"),
            grants.column_index("grantee_name"),
        ) else {
            return Ok(false);
        };

        Ok(grants.rows().iter().any(|row| {
            row[priv_idx].as_deref() == Some(self.privilege.name())
                && row[grantee_idx].as_deref() == Some(self.role.as_str())
        }))
    }
}
