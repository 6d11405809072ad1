//! # Dynamic Query Builder
//!
//! Assembles the two client statements whose shape is only known at call
//! time: the partial update and the multi-predicate search.
//!
//! ## How Assembly Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Fold over a fixed field order                         │
//! │                                                                         │
//! │  ClientChanges { last_name: Some("Roe"), email: Some("r@x.io") }       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [(FirstName, None), (LastName, "Roe"), (Email, "r@x.io")]             │
//! │       │   declaration order, never caller order                         │
//! │       ▼                                                                 │
//! │  keep supplied entries only                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE clients SET last_name = $1, email = $2 WHERE id = $3           │
//! │  params: ["Roe", "r@x.io", 7]                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column names come from [`ClientField`], a closed enum, so no identifier in
//! the generated SQL ever originates from caller input. Values travel only as
//! bound parameters (`$1`, `$2`, ... in PostgreSQL syntax).

use serde::{Deserialize, Serialize};

// =============================================================================
// Statement
// =============================================================================

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

/// SQL text plus the parameters to bind, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

// =============================================================================
// Allowed Fields
// =============================================================================

/// The closed set of client columns a caller may update or filter on.
///
/// Variants are declared in canonical order; that order decides the order of
/// SET assignments and WHERE predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
}

impl ClientField {
    /// Column name in its own table.
    pub const fn column(self) -> &'static str {
        match self {
            ClientField::FirstName => "first_name",
            ClientField::LastName => "last_name",
            ClientField::Email => "email",
            ClientField::PhoneNumber => "phone_number",
        }
    }

    /// Alias of the owning table inside the search query.
    const fn table_alias(self) -> &'static str {
        match self {
            ClientField::PhoneNumber => "p",
            _ => "c",
        }
    }
}

/// A value counts as supplied when present and not blank.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Partial Update
// =============================================================================

/// New values for a client; `None` (or blank) leaves a column untouched.
///
/// ## Example
/// ```rust
/// use clerk_core::query::{build_client_update, ClientChanges};
///
/// let changes = ClientChanges::new().email("new@example.com");
/// let statement = build_client_update(7, &changes).unwrap();
///
/// assert_eq!(statement.sql, "UPDATE clients SET email = $1 WHERE id = $2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ClientChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Supplied fields in canonical order.
    pub fn supplied(&self) -> Vec<(ClientField, &str)> {
        [
            (ClientField::FirstName, supplied(&self.first_name)),
            (ClientField::LastName, supplied(&self.last_name)),
            (ClientField::Email, supplied(&self.email)),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }

    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self.supplied().is_empty()
    }
}

/// Builds `UPDATE clients SET <supplied fields> WHERE id = $n`.
///
/// ## Returns
/// * `Some(Statement)` - At least one field was supplied
/// * `None` - Nothing to update; no statement should be issued
pub fn build_client_update(client_id: i32, changes: &ClientChanges) -> Option<Statement> {
    let fields = changes.supplied();
    if fields.is_empty() {
        return None;
    }

    let mut params = Vec::with_capacity(fields.len() + 1);
    let assignments: Vec<String> = fields
        .into_iter()
        .map(|(field, value)| {
            params.push(SqlParam::from(value));
            format!("{} = ${}", field.column(), params.len())
        })
        .collect();

    params.push(SqlParam::Int(client_id));
    let sql = format!(
        "UPDATE clients SET {} WHERE id = ${}",
        assignments.join(", "),
        params.len()
    );

    Some(Statement { sql, params })
}

// =============================================================================
// Multi-Predicate Search
// =============================================================================

const CLIENT_SEARCH_BASE: &str = "SELECT c.id, c.first_name, c.last_name, c.email, p.phone_number \
     FROM clients c LEFT JOIN phones p ON p.client_id = c.id";

const CLIENT_SEARCH_ORDER: &str = " ORDER BY c.id, p.id";

/// Equality filters for a client search. Unset (or blank) filters are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl ClientFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn phone_number(mut self, value: impl Into<String>) -> Self {
        self.phone_number = Some(value.into());
        self
    }

    /// Supplied filters in canonical order.
    pub fn supplied(&self) -> Vec<(ClientField, &str)> {
        [
            (ClientField::FirstName, supplied(&self.first_name)),
            (ClientField::LastName, supplied(&self.last_name)),
            (ClientField::Email, supplied(&self.email)),
            (ClientField::PhoneNumber, supplied(&self.phone_number)),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// Builds the client search: clients left-joined to their phones, narrowed
/// by the AND of one equality predicate per supplied filter.
///
/// With no filters every client is returned, one row per phone, and clients
/// without phones once with a NULL phone number.
pub fn build_client_search(filter: &ClientFilter) -> Statement {
    let mut params = Vec::new();
    let predicates: Vec<String> = filter
        .supplied()
        .into_iter()
        .map(|(field, value)| {
            params.push(SqlParam::from(value));
            format!("{}.{} = ${}", field.table_alias(), field.column(), params.len())
        })
        .collect();

    let mut sql = String::from(CLIENT_SEARCH_BASE);
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql.push_str(CLIENT_SEARCH_ORDER);

    Statement { sql, params }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> SqlParam {
        SqlParam::Text(value.to_string())
    }

    #[test]
    fn test_update_without_fields_is_none() {
        assert!(build_client_update(1, &ClientChanges::new()).is_none());

        // Blank values do not count as supplied.
        let blank = ClientChanges::new().first_name("").email("   ");
        assert!(blank.is_empty());
        assert!(build_client_update(1, &blank).is_none());
    }

    #[test]
    fn test_update_uses_declaration_order() {
        // Set in reverse order on purpose.
        let changes = ClientChanges::new()
            .email("jane@example.com")
            .last_name("Roe")
            .first_name("Jane");

        let statement = build_client_update(42, &changes).unwrap();

        assert_eq!(
            statement.sql,
            "UPDATE clients SET first_name = $1, last_name = $2, email = $3 WHERE id = $4"
        );
        assert_eq!(
            statement.params,
            vec![
                text("Jane"),
                text("Roe"),
                text("jane@example.com"),
                SqlParam::Int(42)
            ]
        );
    }

    #[test]
    fn test_update_subset() {
        let changes = ClientChanges::new().last_name("Roe");
        let statement = build_client_update(3, &changes).unwrap();

        assert_eq!(statement.sql, "UPDATE clients SET last_name = $1 WHERE id = $2");
        assert_eq!(statement.params, vec![text("Roe"), SqlParam::Int(3)]);
    }

    #[test]
    fn test_update_keeps_hostile_values_out_of_sql() {
        let changes = ClientChanges::new().first_name("x'; DROP TABLE clients; --");
        let statement = build_client_update(1, &changes).unwrap();

        assert!(!statement.sql.contains("DROP"));
        assert_eq!(statement.params[0], text("x'; DROP TABLE clients; --"));
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let statement = build_client_search(&ClientFilter::new());

        assert_eq!(
            statement.sql,
            "SELECT c.id, c.first_name, c.last_name, c.email, p.phone_number \
             FROM clients c LEFT JOIN phones p ON p.client_id = c.id ORDER BY c.id, p.id"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_search_every_subset_is_ordered_conjunction() {
        let values = ["Jane", "Doe", "jane@example.com", "555-0100"];
        let columns = ["c.first_name", "c.last_name", "c.email", "p.phone_number"];

        for mask in 0u8..16 {
            let mut filter = ClientFilter::new();
            if mask & 1 != 0 {
                filter = filter.first_name(values[0]);
            }
            if mask & 2 != 0 {
                filter = filter.last_name(values[1]);
            }
            if mask & 4 != 0 {
                filter = filter.email(values[2]);
            }
            if mask & 8 != 0 {
                filter = filter.phone_number(values[3]);
            }

            let statement = build_client_search(&filter);

            let expected: Vec<String> = (0..4)
                .filter(|i| mask & (1 << i) != 0)
                .enumerate()
                .map(|(n, i)| format!("{} = ${}", columns[i], n + 1))
                .collect();
            let expected_params: Vec<SqlParam> = (0..4)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| text(values[i]))
                .collect();

            if expected.is_empty() {
                assert!(!statement.sql.contains("WHERE"), "mask {mask}");
            } else {
                let where_clause = format!(" WHERE {} ORDER BY", expected.join(" AND "));
                assert!(statement.sql.contains(&where_clause), "mask {mask}: {}", statement.sql);
            }
            assert_eq!(statement.params, expected_params, "mask {mask}");
        }
    }

    #[test]
    fn test_search_ignores_blank_filters() {
        let filter = ClientFilter::new().first_name("").email("jane@example.com");
        let statement = build_client_search(&filter);

        assert!(statement.sql.contains("WHERE c.email = $1 ORDER BY"));
        assert_eq!(statement.params, vec![text("jane@example.com")]);
    }
}
