use crate::errors::{CatalogError, CatalogResult};
use schema::{MoveData, SpeciesData};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// On-disk layout of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    moves: Vec<MoveData>,
    #[serde(default)]
    species: Vec<SpeciesData>,
}

/// Read-only content lookups, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    moves: HashMap<String, Arc<MoveData>>,
    species: HashMap<String, Arc<SpeciesData>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ron_str(source: &str) -> CatalogResult<Self> {
        let file: CatalogFile = ron::from_str(source)?;
        let mut catalog = Self::new();
        for move_data in file.moves {
            catalog.insert_move(move_data)?;
        }
        for species in file.species {
            catalog.insert_species(species)?;
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_ron_str(&source)?;
        info!(
            path = %path.display(),
            moves = catalog.moves.len(),
            species = catalog.species.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn insert_move(&mut self, move_data: MoveData) -> CatalogResult<Arc<MoveData>> {
        if self.moves.contains_key(&move_data.name) {
            return Err(CatalogError::Duplicate(move_data.name));
        }
        let move_data = Arc::new(move_data);
        self.moves
            .insert(move_data.name.clone(), Arc::clone(&move_data));
        Ok(move_data)
    }

    pub fn insert_species(&mut self, species: SpeciesData) -> CatalogResult<Arc<SpeciesData>> {
        if self.species.contains_key(&species.name) {
            return Err(CatalogError::Duplicate(species.name));
        }
        let species = Arc::new(species);
        self.species
            .insert(species.name.clone(), Arc::clone(&species));
        Ok(species)
    }

    pub fn get_move(&self, name: &str) -> CatalogResult<Arc<MoveData>> {
        self.moves
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownMove(name.to_string()))
    }

    pub fn get_species(&self, name: &str) -> CatalogResult<Arc<SpeciesData>> {
        self.species
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownSpecies(name.to_string()))
    }

    /// Look up several moves at once, failing on the first unknown name.
    pub fn moves<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> CatalogResult<Vec<Arc<MoveData>>> {
        names.into_iter().map(|name| self.get_move(name)).collect()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }
}
