//! Sector catalog.

use crate::error::{PipelineError, Result};
use sectorlens_data::SectorDescriptor;
use std::collections::HashSet;
use std::path::Path;

/// Sectors of the source site, in the order the site lists them.
const BUILTIN_SECTORS: [(u32, &str); 29] = [
    (1, "НЕФТЕГАЗ"),
    (2, "БАНКИ"),
    (14, "ФИНАНСЫ"),
    (3, "МЕТАЛЛУРГИЯ черн."),
    (21, "МЕТАЛЛУРГИЯ цвет."),
    (22, "МЕТАЛЛУРГИЯ разное"),
    (23, "ДРАГ.МЕТАЛЛЫ"),
    (18, "ГОРНОДОБЫВАЮЩИЕ"),
    (17, "ХИМИЯ удобрения"),
    (24, "ХИМИЯ разное"),
    (4, "Э/ГЕНЕРАЦИЯ"),
    (19, "ЭЛЕКТРОСЕТИ"),
    (20, "ЭНЕРГОСБЫТ"),
    (5, "РИТЕЙЛ"),
    (13, "ПОТРЕБ"),
    (26, "Агропром и Пищепром"),
    (27, "Промышленность разное"),
    (6, "ТЕЛЕКОМ"),
    (25, "ИНТЕРНЕТ"),
    (15, "HIGH TECH"),
    (28, "Производство Софта"),
    (29, "Фармацевтика"),
    (16, "МЕДИА"),
    (7, "ТРАНСПОРТ"),
    (8, "СТРОИТЕЛИ"),
    (9, "МАШИНОСТРОЕНИЕ"),
    (10, "ТРЕТИЙ ЭШЕЛОН"),
    (11, "НЕПУБЛИЧНЫЕ"),
    (12, "ДРУГОЕ"),
];

/// Ordered, immutable list of sectors to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorCatalog {
    sectors: Vec<SectorDescriptor>,
}

impl SectorCatalog {
    /// The sectors of the source site.
    pub fn builtin() -> Self {
        Self {
            sectors: BUILTIN_SECTORS
                .iter()
                .map(|(id, name)| SectorDescriptor::new(*id, *name))
                .collect(),
        }
    }

    /// Build a catalog from descriptors.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidCatalog` if the list is empty or an id
    /// appears twice.
    pub fn new(sectors: Vec<SectorDescriptor>) -> Result<Self> {
        if sectors.is_empty() {
            return Err(PipelineError::InvalidCatalog("no sectors".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = sectors.iter().find(|s| !seen.insert(s.id)) {
            return Err(PipelineError::InvalidCatalog(format!(
                "duplicate sector id {}",
                dup.id
            )));
        }
        Ok(Self { sectors })
    }

    /// Parse a JSON array of `{ "id": .., "display_name": ".." }` objects.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidCatalog` on malformed JSON or an
    /// invalid list.
    pub fn from_json(json: &str) -> Result<Self> {
        let sectors: Vec<SectorDescriptor> = serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidCatalog(e.to_string()))?;
        Self::new(sectors)
    }

    /// Load a JSON catalog file.
    ///
    /// # Errors
    /// Returns `PipelineError::Catalog` if the file cannot be read, or
    /// `PipelineError::InvalidCatalog` if its content is invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PipelineError::Catalog {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Sectors in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &SectorDescriptor> {
        self.sectors.iter()
    }

    /// Sector with the given source id.
    pub fn get(&self, id: u32) -> Option<&SectorDescriptor> {
        self.sectors.iter().find(|s| s.id == id)
    }

    /// Number of sectors.
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// Whether the catalog is empty. Never true for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl Default for SectorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a SectorCatalog {
    type Item = &'a SectorDescriptor;
    type IntoIter = std::slice::Iter<'a, SectorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sectors.iter()
    }
}
