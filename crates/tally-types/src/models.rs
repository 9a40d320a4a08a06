use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version stamped into every freshly created snapshot.
pub const SCHEMA_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nombre: String,
    /// Public code used in shareable links. Never changes once assigned.
    pub codigo_usuario: String,
    pub puntos: u64,
    pub fecha_registro: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

/// Direction of a point adjustment. Doubles as the kind of the recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Suma,
    Resta,
}

impl Operation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "suma" => Some(Self::Suma),
            "resta" => Some(Self::Resta),
            _ => None,
        }
    }
}

/// Append-only record of one adjustment applied to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointEvent {
    pub id: String,
    pub usuario_id: String,
    pub codigo_usuario: String,
    pub tipo: Operation,
    pub fecha: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub version: String,
    pub creado: DateTime<Utc>,
    pub ultima_actualizacion: DateTime<Utc>,
}

/// Everything the store persists, loaded and written back as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub usuarios: Vec<User>,
    pub ordenes: Vec<PointEvent>,
    pub configuracion: StoreMeta,
}

impl Snapshot {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            usuarios: Vec::new(),
            ordenes: Vec::new(),
            configuracion: StoreMeta {
                version: SCHEMA_VERSION.to_string(),
                creado: now,
                ultima_actualizacion: now,
            },
        }
    }
}

/// Per-user summary. The day/week/month counters mirror the lifetime total
/// until period filtering exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub nombre: String,
    pub puntos: u64,
    pub ordenes_hoy: u64,
    pub ordenes_semana: u64,
    pub ordenes_mes: u64,
    pub ordenes_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Dia,
    Semana,
    Mes,
    #[default]
    Total,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dia" => Some(Self::Dia),
            "semana" => Some(Self::Semana),
            "mes" => Some(Self::Mes),
            "total" => Some(Self::Total),
            _ => None,
        }
    }
}
