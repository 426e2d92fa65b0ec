use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub i64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CatalogId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(CatalogId)
    }
}

/// The lens components an image can be attached to.
///
/// Wire names follow the catalog's French labels; the English names are
/// accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "Design")]
    Design,
    #[serde(rename = "Traitement", alias = "Treatment")]
    Treatment,
    #[serde(rename = "Matière", alias = "Material")]
    Material,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Design,
        ComponentKind::Treatment,
        ComponentKind::Material,
    ];
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Design => f.write_str("design"),
            ComponentKind::Treatment => f.write_str("treatment"),
            ComponentKind::Material => f.write_str("material"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: CatalogId,
    pub name: String,
    pub url: String,
    pub category: Option<String>,
    pub resolution: Option<String>,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub name: String,
    pub url: String,
    pub category: Option<String>,
    pub resolution: Option<String>,
}

/// A design, treatment or material. All three share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub id: CatalogId,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_id: Option<CatalogId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComponent {
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_id: Option<CatalogId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lens {
    pub id: CatalogId,
    pub name: String,
    pub description: Option<String>,
    pub edi_code: Option<String>,
    pub design_id: Option<CatalogId>,
    pub material_id: Option<CatalogId>,
    pub treatment_id: Option<CatalogId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLens {
    pub name: String,
    pub description: Option<String>,
    pub edi_code: Option<String>,
    pub design_id: Option<CatalogId>,
    pub material_id: Option<CatalogId>,
    pub treatment_id: Option<CatalogId>,
}

impl NewLens {
    pub fn component_refs(&self) -> [(ComponentKind, Option<CatalogId>); 3] {
        [
            (ComponentKind::Design, self.design_id),
            (ComponentKind::Material, self.material_id),
            (ComponentKind::Treatment, self.treatment_id),
        ]
    }
}
