use crate::role::Role;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a back-office resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Activo,
    Inactivo,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Activo => "activo",
            ResourceStatus::Inactivo => "inactivo",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ResourceStatus::Activo)
    }
}

/// A prospective buyer or tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    #[serde(default)]
    pub email: String,
    pub status: ResourceStatus,
}

/// Fields for creating a client. `email` may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewClient {
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    #[serde(default)]
    pub email: String,
}

/// Partial update for a client; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientChanges {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
}

/// A listed property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    /// Asking price in whole currency units.
    pub precio: u64,
    pub ubicacion: String,
    /// Attached media file references (photos, plans).
    #[serde(default)]
    pub archivos: Vec<String>,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProperty {
    pub nombre: String,
    pub descripcion: String,
    pub precio: u64,
    pub ubicacion: String,
    #[serde(default)]
    pub archivos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyChanges {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<u64>,
    pub ubicacion: Option<String>,
}

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: String,
    pub nombre: String,
    pub telefono: String,
    pub rol: Role,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaffUser {
    pub nombre: String,
    pub telefono: String,
    pub rol: Role,
}
