//! Closed governance vocabularies.
//!
//! Every enum here round-trips through its Spanish label: that label is what
//! the editor shows, what the edits file carries and what lands in the
//! exported workbook. Parsing is case-insensitive and ignores surrounding
//! whitespace.

use serde::{Deserialize, Serialize};

fn find_label<T: Copy>(all: &[T], label: fn(&T) -> &'static str, input: &str) -> Option<T> {
    let needle = input.trim();
    all.iter().copied().find(|v| label(v).eq_ignore_ascii_case(needle))
}

// ---------------------------------------------------------------------------
// Privacy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataPrivacy {
    Abierto,
    Personales,
    Cerrado,
}

impl DataPrivacy {
    pub const ALL: &'static [DataPrivacy] = &[Self::Abierto, Self::Personales, Self::Cerrado];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Abierto => "Abierto",
            Self::Personales => "Personales",
            Self::Cerrado => "Cerrado",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        find_label(Self::ALL, Self::label, input)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableStatus {
    Activa,
    Desactivada,
}

impl TableStatus {
    pub const ALL: &'static [TableStatus] = &[Self::Activa, Self::Desactivada];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Activa => "Activa",
            Self::Desactivada => "Desactivada",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        find_label(Self::ALL, Self::label, input)
    }
}

// ---------------------------------------------------------------------------
// Update frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    #[serde(rename = "Tiempo real")]
    TiempoReal,
    Diaria,
    Semanal,
    Mensual,
    Trimestral,
    Semestral,
    Anual,
    #[serde(rename = "Ad hoc (sin frecuencia fija)")]
    AdHoc,
    #[serde(rename = "Sin necesidad de actualizar")]
    SinActualizacion,
}

impl Periodicity {
    pub const ALL: &'static [Periodicity] = &[
        Self::TiempoReal,
        Self::Diaria,
        Self::Semanal,
        Self::Mensual,
        Self::Trimestral,
        Self::Semestral,
        Self::Anual,
        Self::AdHoc,
        Self::SinActualizacion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TiempoReal => "Tiempo real",
            Self::Diaria => "Diaria",
            Self::Semanal => "Semanal",
            Self::Mensual => "Mensual",
            Self::Trimestral => "Trimestral",
            Self::Semestral => "Semestral",
            Self::Anual => "Anual",
            Self::AdHoc => "Ad hoc (sin frecuencia fija)",
            Self::SinActualizacion => "Sin necesidad de actualizar",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        find_label(Self::ALL, Self::label, input)
    }
}

// ---------------------------------------------------------------------------
// Owning area
// ---------------------------------------------------------------------------

/// Organizational unit that owns a table's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerArea {
    #[serde(rename = "Comercial")]
    Comercial,
    #[serde(rename = "Coordinación Institucional")]
    CoordinacionInstitucional,
    #[serde(rename = "Coordinación Parlamentaria")]
    CoordinacionParlamentaria,
    #[serde(rename = "Cumplimiento y Ética")]
    CumplimientoEtica,
    #[serde(rename = "Evaluación, Analítica y Sostenibilidad")]
    EvaluacionAnalitica,
    #[serde(rename = "Gestión Humana")]
    GestionHumana,
    #[serde(rename = "Imagen Institucional y Comunicaciones")]
    ImagenInstitucional,
    #[serde(rename = "Seguridad Estratégica")]
    SeguridadEstrategica,
    #[serde(rename = "SRC")]
    Src,
    #[serde(rename = "GAF - Contabilidad")]
    GafContabilidad,
    #[serde(rename = "GAF - Logística")]
    GafLogistica,
    #[serde(rename = "GAF - Planificación Estratégica")]
    GafPlanificacion,
    #[serde(rename = "GTO - Centro de Experiencia")]
    GtoCentroExperiencia,
    #[serde(rename = "GTO - Soluciones de Seguridad Física")]
    GtoSeguridadFisica,
    #[serde(rename = "GTO - Soluciones Digitales")]
    GtoSolucionesDigitales,
    #[serde(rename = "GTO - Soluciones Tecnológicas")]
    GtoSolucionesTecnologicas,
    #[serde(rename = "GTO - TI")]
    GtoTi,
    #[serde(rename = "GAF")]
    Gaf,
    #[serde(rename = "GTO")]
    Gto,
}

impl OwnerArea {
    pub const ALL: &'static [OwnerArea] = &[
        Self::Comercial,
        Self::CoordinacionInstitucional,
        Self::CoordinacionParlamentaria,
        Self::CumplimientoEtica,
        Self::EvaluacionAnalitica,
        Self::GestionHumana,
        Self::ImagenInstitucional,
        Self::SeguridadEstrategica,
        Self::Src,
        Self::GafContabilidad,
        Self::GafLogistica,
        Self::GafPlanificacion,
        Self::GtoCentroExperiencia,
        Self::GtoSeguridadFisica,
        Self::GtoSolucionesDigitales,
        Self::GtoSolucionesTecnologicas,
        Self::GtoTi,
        Self::Gaf,
        Self::Gto,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Comercial => "Comercial",
            Self::CoordinacionInstitucional => "Coordinación Institucional",
            Self::CoordinacionParlamentaria => "Coordinación Parlamentaria",
            Self::CumplimientoEtica => "Cumplimiento y Ética",
            Self::EvaluacionAnalitica => "Evaluación, Analítica y Sostenibilidad",
            Self::GestionHumana => "Gestión Humana",
            Self::ImagenInstitucional => "Imagen Institucional y Comunicaciones",
            Self::SeguridadEstrategica => "Seguridad Estratégica",
            Self::Src => "SRC",
            Self::GafContabilidad => "GAF - Contabilidad",
            Self::GafLogistica => "GAF - Logística",
            Self::GafPlanificacion => "GAF - Planificación Estratégica",
            Self::GtoCentroExperiencia => "GTO - Centro de Experiencia",
            Self::GtoSeguridadFisica => "GTO - Soluciones de Seguridad Física",
            Self::GtoSolucionesDigitales => "GTO - Soluciones Digitales",
            Self::GtoSolucionesTecnologicas => "GTO - Soluciones Tecnológicas",
            Self::GtoTi => "GTO - TI",
            Self::Gaf => "GAF",
            Self::Gto => "GTO",
        }
    }

    /// Accented labels are compared case-insensitively on ASCII only, so
    /// "gaf - logística" matches but "GAF - LOGÍSTICA" does not.
    pub fn parse(input: &str) -> Option<Self> {
        find_label(Self::ALL, Self::label, input)
    }
}

// ---------------------------------------------------------------------------
// Column type
// ---------------------------------------------------------------------------

/// Declared type of a dictionary attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Texto,
    Numero,
    Fecha,
}

impl ColumnType {
    pub const ALL: &'static [ColumnType] = &[Self::Texto, Self::Numero, Self::Fecha];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Texto => "texto",
            Self::Numero => "numero",
            Self::Fecha => "fecha",
        }
    }

    /// Accepts the Spanish labels, their English counterparts, the accented
    /// "número", and values carrying a `tipo_dato.` enum prefix.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix("tipo_dato.").unwrap_or(trimmed);
        match bare.to_lowercase().as_str() {
            "texto" | "text" | "string" => Some(Self::Texto),
            "numero" | "número" | "number" => Some(Self::Numero),
            "fecha" | "date" => Some(Self::Fecha),
            _ => None,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Labels of a vocabulary, in declaration order.
pub fn labels<T>(all: &[T], label: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(label).collect()
}
