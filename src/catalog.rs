//! Service-center catalog: the built-in GOHUBS dataset and JSON loading.
//!
//! A [`Catalog`] is read-only once built. Identifiers are unique, every
//! coordinate is validated, and entry order is preserved (it is the
//! tie-break order for ranking).

use crate::geo::{Coordinate, GeoError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate center id '{0}'")]
    DuplicateId(String),
    #[error("Center '{id}' has invalid coordinates: {source}")]
    InvalidCoordinate { id: String, source: GeoError },
}

/// A physical GOHUBS center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCenter {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub location: Coordinate,
    pub phone: String,
    pub services: Vec<String>,
}

impl ServiceCenter {
    /// `tel:` URI for the call action. Keeps digits and a leading '+'.
    pub fn tel_uri(&self) -> String {
        tel_uri(&self.phone)
    }
}

pub fn tel_uri(phone: &str) -> String {
    let mut out = String::from("tel:");
    for (i, ch) in phone.trim().chars().enumerate() {
        if ch.is_ascii_digit() || (i == 0 && ch == '+') {
            out.push(ch);
        }
    }
    out
}

/// Ordered, immutable set of centers. Cloning shares the underlying slice.
#[derive(Debug, Clone)]
pub struct Catalog {
    centers: Arc<[ServiceCenter]>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(centers: Vec<ServiceCenter>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(centers.len());
        for center in &centers {
            if !seen.insert(center.id.as_str()) {
                return Err(CatalogError::DuplicateId(center.id.clone()));
            }
        }
        Ok(Self { centers: centers.into() })
    }

    /// The GOHUBS centers around Visakhapatnam.
    pub fn builtin() -> Self {
        let centers = BUILTIN_CENTERS.iter().map(builtin_to_center).collect::<Vec<_>>();
        // Built-in ids are distinct literals.
        Self { centers: centers.into() }
    }

    /// Load a catalog from a JSON array of centers.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawCenter> = serde_json::from_str(data)?;
        let centers = raw
            .into_iter()
            .map(RawCenter::into_center)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(centers)
    }

    pub fn centers(&self) -> &[ServiceCenter] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ServiceCenter> {
        self.centers.iter().find(|c| c.id == id)
    }
}

// Catalog files use the same field names as `ServiceCenter` but coordinates
// are checked here so the error can name the offending center.
#[derive(Deserialize)]
struct RawCenter {
    id: String,
    name: String,
    #[serde(default)]
    address: String,
    lat: f64,
    #[serde(alias = "lng")]
    lon: f64,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    services: Vec<String>,
}

impl RawCenter {
    fn into_center(self) -> Result<ServiceCenter, CatalogError> {
        let location = Coordinate::new(self.lat, self.lon).map_err(|source| {
            CatalogError::InvalidCoordinate { id: self.id.clone(), source }
        })?;
        Ok(ServiceCenter {
            id: self.id,
            name: self.name,
            address: self.address,
            location,
            phone: self.phone,
            services: self.services,
        })
    }
}

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinCenter {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    lat: f64,
    lon: f64,
    phone: &'static str,
    services: &'static [&'static str],
}

const BUILTIN_CENTERS: &[BuiltinCenter] = &[
    BuiltinCenter {
        id: "1",
        name: "GOHUBS Visakhapatnam Central",
        address: "MVP Colony, Visakhapatnam, Andhra Pradesh 530017",
        lat: 17.7231, lon: 83.3077,
        phone: "+91 91828 48430",
        services: &["Emergency Care", "General Consultation", "Maternal Care"],
    },
    BuiltinCenter {
        id: "2",
        name: "GOHUBS Anakapalle",
        address: "Main Road, Anakapalle, Visakhapatnam District",
        lat: 17.6911, lon: 83.0034,
        phone: "+91 91828 48431",
        services: &["Rural Healthcare", "Telemedicine", "Health Camps"],
    },
    BuiltinCenter {
        id: "3",
        name: "GOHUBS Narsipatnam",
        address: "Town Center, Narsipatnam, Visakhapatnam District",
        lat: 17.6675, lon: 82.6113,
        phone: "+91 91828 48432",
        services: &["Primary Care", "Vaccination", "Health Awareness"],
    },
    BuiltinCenter {
        id: "4",
        name: "GOHUBS Yelamanchili",
        address: "Village Square, Yelamanchili, Visakhapatnam District",
        lat: 17.8428, lon: 82.8664,
        phone: "+91 91828 48433",
        services: &["Mobile Clinic", "Emergency Response", "Community Health"],
    },
];

fn builtin_to_center(c: &BuiltinCenter) -> ServiceCenter {
    ServiceCenter {
        id: c.id.to_string(),
        name: c.name.to_string(),
        address: c.address.to_string(),
        location: Coordinate::new(c.lat, c.lon)
            .unwrap_or_else(|e| panic!("built-in center {} is malformed: {}", c.id, e)),
        phone: c.phone.to_string(),
        services: c.services.iter().map(|s| s.to_string()).collect(),
    }
}
