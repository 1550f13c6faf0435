//! Data models for pwkeep
//!
//! A [`Record`] is one stored credential entry. The five text fields are
//! grouped in [`RecordFields`] so that creation and update always supply
//! all of them together.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque record identifier
///
/// New ids are random UUIDs, but any text is accepted so that rows written
/// by other tools into the `id TEXT` column stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

/// A stored credential record
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, generated by the store
    pub id: RecordId,
    /// Display name of the record ("Mail", "Bank", ...)
    pub name: String,
    /// Login or user name
    pub login: String,
    /// Plaintext password
    pub password: String,
    /// Free-form description
    pub description: String,
    /// Site address
    pub url: String,
}

impl Record {
    /// Build a record from an id and its field values
    pub fn from_fields(id: RecordId, fields: RecordFields) -> Self {
        Self {
            id,
            name: fields.name,
            login: fields.login,
            password: fields.password,
            description: fields.description,
            url: fields.url,
        }
    }

    /// Get the plaintext value of a field
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Login => &self.login,
            Field::Password => &self.password,
            Field::Description => &self.description,
            Field::Url => &self.url,
        }
    }

    /// Get the value of a field as it should be shown in listings
    ///
    /// Maskable fields are replaced by [`mask`].
    pub fn display_value(&self, field: Field) -> String {
        let value = self.value(field);
        if field.policy().maskable {
            mask(value)
        } else {
            value.to_string()
        }
    }

    /// Copy the field values out of this record
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            name: self.name.clone(),
            login: self.login.clone(),
            password: self.password.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
        }
    }

    /// First 8 characters of the id
    pub fn short_id(&self) -> String {
        self.id.as_str().chars().take(8).collect()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("login", &self.login)
            .field("password", &mask(&self.password))
            .field("description", &self.description)
            .field("url", &self.url)
            .finish()
    }
}

/// The five user-supplied values of a record
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub login: String,
    pub password: String,
    pub description: String,
    pub url: String,
}

impl RecordFields {
    pub fn new(
        name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            login: login.into(),
            password: password.into(),
            description: description.into(),
            url: url.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Login => &self.login,
            Field::Password => &self.password,
            Field::Description => &self.description,
            Field::Url => &self.url,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Login => self.login = value,
            Field::Password => self.password = value,
            Field::Description => self.description = value,
            Field::Url => self.url = value,
        }
    }

    /// Check that every field is filled in
    ///
    /// Returns the first empty field in display order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match Field::ALL.iter().find(|f| self.get(**f).is_empty()) {
            Some(field) => Err(ValidationError::EmptyField(*field)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RecordFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordFields")
            .field("name", &self.name)
            .field("login", &self.login)
            .field("password", &mask(&self.password))
            .field("description", &self.description)
            .field("url", &self.url)
            .finish()
    }
}

/// Rejected field values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty. All fields must be filled in.")]
    EmptyField(Field),
}

impl ValidationError {
    /// The offending field
    pub fn field(&self) -> Field {
        match self {
            ValidationError::EmptyField(field) => *field,
        }
    }
}

/// A record field, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Login,
    Password,
    Description,
    Url,
}

/// Where a copied value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySource {
    /// The value shown in the listed row is the real value
    Listing,
    /// The listing only holds a mask; fetch plaintext from the store by id
    Store,
}

/// Per-field display and copy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    /// Listings show a mask instead of the value
    pub maskable: bool,
    /// Where the clipboard value comes from
    pub source: CopySource,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Login,
        Field::Password,
        Field::Description,
        Field::Url,
    ];

    pub fn policy(self) -> FieldPolicy {
        match self {
            Field::Password => FieldPolicy {
                maskable: true,
                source: CopySource::Store,
            },
            Field::Name | Field::Login | Field::Description | Field::Url => FieldPolicy {
                maskable: false,
                source: CopySource::Listing,
            },
        }
    }

    /// SQL column name
    pub fn column(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Login => "login",
            Field::Password => "password",
            Field::Description => "description",
            Field::Url => "url",
        }
    }

    /// Column header
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Login => "Login",
            Field::Password => "Password",
            Field::Description => "Description",
            Field::Url => "URL",
        }
    }

    /// Notification shown after the field was copied
    pub fn copied_message(self) -> String {
        format!("{} copied", self.label())
    }

    /// Position in [`Field::ALL`]
    pub fn index(self) -> usize {
        match self {
            Field::Name => 0,
            Field::Login => 1,
            Field::Password => 2,
            Field::Description => 3,
            Field::Url => 4,
        }
    }

    /// Next field, wrapping
    pub fn next(self) -> Self {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    /// Previous field, wrapping
    pub fn prev(self) -> Self {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" | "title" => Ok(Field::Name),
            "login" | "user" | "username" => Ok(Field::Login),
            "password" | "pass" => Ok(Field::Password),
            "description" | "desc" => Ok(Field::Description),
            "url" => Ok(Field::Url),
            other => Err(format!(
                "unknown field '{}'; expected one of: name, login, password, description, url",
                other
            )),
        }
    }
}

/// Mask a secret with one `*` per character
pub fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}
