use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab::{ColumnType, DataPrivacy, OwnerArea, Periodicity, TableStatus};

/// Annotation used when no column qualifies as a unique identifier.
pub const NO_UNIQUE_IDENTIFIER: &str = "No tiene";

/// Format a 1-based table index as a table identifier ("T001").
pub fn table_id(index: usize) -> String {
    format!("T{:03}", index)
}

/// Format a 1-based attribute index as an attribute identifier ("a001").
pub fn attribute_id(index: usize) -> String {
    format!("a{:03}", index)
}

/// Parse the numeric part of a "T001"/"a001" style identifier.
pub fn id_index(id: &str, prefix: char) -> Option<usize> {
    id.strip_prefix(prefix)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No field with this name exists on the record.
    Unknown(String),
    /// The field is assigned at creation and cannot be edited.
    ReadOnly(&'static str),
    /// Value is not one of the field's vocabulary labels.
    NotInVocabulary { field: &'static str, value: String },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown field '{name}'"),
            Self::ReadOnly(name) => write!(f, "field '{name}' is read-only"),
            Self::NotInVocabulary { field, value } => {
                write!(f, "'{value}' is not a valid value for '{field}'")
            }
        }
    }
}

impl std::error::Error for FieldError {}

fn parse_vocab<T>(
    field: &'static str,
    value: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, FieldError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).ok_or_else(|| FieldError::NotInVocabulary {
        field,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Table metadata
// ---------------------------------------------------------------------------

/// Columns of the metadata sheet, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableField {
    TableId,
    TableName,
    FileName,
    TableDescription,
    Format,
    DateModified,
    DateRegister,
    DataPrivacy,
    StewardOperativo,
    StewardEjecutivo,
    Domain,
    DataOwnerArea,
    LocationPath,
    Periodicity,
    TableStatus,
    UniqueIdentifier,
}

impl TableField {
    pub const ALL: &'static [TableField] = &[
        Self::TableId,
        Self::TableName,
        Self::FileName,
        Self::TableDescription,
        Self::Format,
        Self::DateModified,
        Self::DateRegister,
        Self::DataPrivacy,
        Self::StewardOperativo,
        Self::StewardEjecutivo,
        Self::Domain,
        Self::DataOwnerArea,
        Self::LocationPath,
        Self::Periodicity,
        Self::TableStatus,
        Self::UniqueIdentifier,
    ];

    /// Fields that count towards completeness.
    pub const REQUIRED: [TableField; 14] = [
        Self::TableId,
        Self::TableName,
        Self::TableDescription,
        Self::Format,
        Self::DateModified,
        Self::DateRegister,
        Self::DataPrivacy,
        Self::StewardOperativo,
        Self::StewardEjecutivo,
        Self::Domain,
        Self::DataOwnerArea,
        Self::LocationPath,
        Self::Periodicity,
        Self::TableStatus,
    ];

    pub const STEWARDS: [TableField; 2] = [Self::StewardOperativo, Self::StewardEjecutivo];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TableId => "table_id",
            Self::TableName => "table_name",
            Self::FileName => "file_name",
            Self::TableDescription => "table_description",
            Self::Format => "format",
            Self::DateModified => "date_modified",
            Self::DateRegister => "date_register",
            Self::DataPrivacy => "data_privacy",
            Self::StewardOperativo => "data_steward_operativo_contact",
            Self::StewardEjecutivo => "data_steward_ejecutivo_contact",
            Self::Domain => "domain",
            Self::DataOwnerArea => "data_owner_area",
            Self::LocationPath => "location_path",
            Self::Periodicity => "periodicity",
            Self::TableStatus => "table_status",
            Self::UniqueIdentifier => "unique_identifier",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Assigned once when the table is cataloged.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::TableId | Self::UniqueIdentifier)
    }
}

/// One cataloged table (a CSV file or a workbook sheet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub table_id: String,
    pub table_name: String,
    pub file_name: String,
    pub table_description: String,
    pub format: String,
    pub date_modified: String,
    pub date_register: String,
    pub data_privacy: Option<DataPrivacy>,
    pub data_steward_operativo_contact: String,
    pub data_steward_ejecutivo_contact: String,
    pub domain: String,
    pub data_owner_area: Option<OwnerArea>,
    pub location_path: String,
    pub periodicity: Option<Periodicity>,
    pub table_status: Option<TableStatus>,
    pub unique_identifier: String,
}

impl TableRecord {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            unique_identifier: NO_UNIQUE_IDENTIFIER.to_string(),
            ..Default::default()
        }
    }

    /// String rendering of a field, blank when unset.
    pub fn get(&self, field: TableField) -> String {
        fn opt(label: Option<&'static str>) -> String {
            label.unwrap_or_default().to_string()
        }
        match field {
            TableField::TableId => self.table_id.clone(),
            TableField::TableName => self.table_name.clone(),
            TableField::FileName => self.file_name.clone(),
            TableField::TableDescription => self.table_description.clone(),
            TableField::Format => self.format.clone(),
            TableField::DateModified => self.date_modified.clone(),
            TableField::DateRegister => self.date_register.clone(),
            TableField::DataPrivacy => opt(self.data_privacy.map(|v| v.label())),
            TableField::StewardOperativo => self.data_steward_operativo_contact.clone(),
            TableField::StewardEjecutivo => self.data_steward_ejecutivo_contact.clone(),
            TableField::Domain => self.domain.clone(),
            TableField::DataOwnerArea => opt(self.data_owner_area.map(|v| v.label())),
            TableField::LocationPath => self.location_path.clone(),
            TableField::Periodicity => opt(self.periodicity.map(|v| v.label())),
            TableField::TableStatus => opt(self.table_status.map(|v| v.label())),
            TableField::UniqueIdentifier => self.unique_identifier.clone(),
        }
    }

    /// Set an editable field from its string form.
    pub fn set(&mut self, field: TableField, value: &str) -> Result<(), FieldError> {
        if field.is_read_only() {
            return Err(FieldError::ReadOnly(field.name()));
        }
        self.assign(field, value)
    }

    /// Set any field, including the read-only ones. Used when rebuilding
    /// records from an exported workbook.
    pub fn assign(&mut self, field: TableField, value: &str) -> Result<(), FieldError> {
        let name = field.name();
        match field {
            TableField::TableId => self.table_id = value.trim().to_string(),
            TableField::TableName => self.table_name = value.to_string(),
            TableField::FileName => self.file_name = value.to_string(),
            TableField::TableDescription => self.table_description = value.to_string(),
            TableField::Format => self.format = value.to_string(),
            TableField::DateModified => self.date_modified = value.to_string(),
            TableField::DateRegister => self.date_register = value.to_string(),
            TableField::DataPrivacy => self.data_privacy = parse_vocab(name, value, DataPrivacy::parse)?,
            TableField::StewardOperativo => self.data_steward_operativo_contact = value.trim().to_string(),
            TableField::StewardEjecutivo => self.data_steward_ejecutivo_contact = value.trim().to_string(),
            TableField::Domain => self.domain = value.to_string(),
            TableField::DataOwnerArea => self.data_owner_area = parse_vocab(name, value, OwnerArea::parse)?,
            TableField::LocationPath => self.location_path = value.to_string(),
            TableField::Periodicity => self.periodicity = parse_vocab(name, value, Periodicity::parse)?,
            TableField::TableStatus => self.table_status = parse_vocab(name, value, TableStatus::parse)?,
            TableField::UniqueIdentifier => self.unique_identifier = value.to_string(),
        }
        Ok(())
    }

    /// Set a field by column name.
    pub fn set_by_name(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        let field = TableField::from_name(name).ok_or_else(|| FieldError::Unknown(name.to_string()))?;
        self.set(field, value)
    }

    pub fn steward_mut(&mut self, field: TableField) -> Option<&mut String> {
        match field {
            TableField::StewardOperativo => Some(&mut self.data_steward_operativo_contact),
            TableField::StewardEjecutivo => Some(&mut self.data_steward_ejecutivo_contact),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Data dictionary
// ---------------------------------------------------------------------------

/// Columns of the dictionary sheet, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnField {
    TableId,
    AttributeId,
    Name,
    Description,
    DataType,
    NewName,
    Reason,
}

impl ColumnField {
    pub const ALL: &'static [ColumnField] = &[
        Self::TableId,
        Self::AttributeId,
        Self::Name,
        Self::Description,
        Self::DataType,
        Self::NewName,
        Self::Reason,
    ];

    /// Header used in the dictionary sheet.
    pub fn header(&self) -> &'static str {
        match self {
            Self::TableId => "table_id",
            Self::AttributeId => "id_atributo",
            Self::Name => "Atributo",
            Self::Description => "Descripción",
            Self::DataType => "Tipo de dato",
            Self::NewName => "Nuevo nombre",
            Self::Reason => "Razón",
        }
    }

    /// Accepts both the sheet header and the snake_case field name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let by_key = match name {
            "attribute_id" => Some(Self::AttributeId),
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "data_type" | "type" => Some(Self::DataType),
            "new_name" => Some(Self::NewName),
            "reason" => Some(Self::Reason),
            _ => None,
        };
        by_key.or_else(|| Self::ALL.iter().copied().find(|f| f.header() == name))
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::TableId | Self::AttributeId)
    }
}

/// One attribute of a cataloged table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub table_id: String,
    pub attribute_id: String,
    pub name: String,
    pub description: String,
    pub data_type: Option<ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ColumnRecord {
    pub fn new(table_id: impl Into<String>, attribute_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            attribute_id: attribute_id.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, field: ColumnField) -> String {
        match field {
            ColumnField::TableId => self.table_id.clone(),
            ColumnField::AttributeId => self.attribute_id.clone(),
            ColumnField::Name => self.name.clone(),
            ColumnField::Description => self.description.clone(),
            ColumnField::DataType => self.data_type.map(|t| t.label().to_string()).unwrap_or_default(),
            ColumnField::NewName => self.new_name.clone().unwrap_or_default(),
            ColumnField::Reason => self.reason.clone().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: ColumnField, value: &str) -> Result<(), FieldError> {
        if field.is_read_only() {
            return Err(FieldError::ReadOnly(field.header()));
        }
        self.assign(field, value)
    }

    pub fn assign(&mut self, field: ColumnField, value: &str) -> Result<(), FieldError> {
        fn optional(value: &str) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        match field {
            ColumnField::TableId => self.table_id = value.trim().to_string(),
            ColumnField::AttributeId => self.attribute_id = value.trim().to_string(),
            ColumnField::Name => self.name = value.to_string(),
            ColumnField::Description => self.description = value.to_string(),
            ColumnField::DataType => {
                self.data_type = parse_vocab("Tipo de dato", value, ColumnType::parse)?;
            }
            ColumnField::NewName => self.new_name = optional(value),
            ColumnField::Reason => self.reason = optional(value),
        }
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        let field = ColumnField::from_name(name).ok_or_else(|| FieldError::Unknown(name.to_string()))?;
        self.set(field, value)
    }
}
