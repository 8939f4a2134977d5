use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::Result;
use super::loader::{LoadOptions, load_workbook};
use super::model::{DatasetKey, LabeledTable};

// ---------------------------------------------------------------------------
// Dataset specifications
// ---------------------------------------------------------------------------

/// Everything needed to locate, load and label one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    pub key: DatasetKey,
    pub file_name: &'static str,
    pub strip_label: &'static str,
    pub drop_total: bool,
    pub title: &'static str,
    pub unit_label: &'static str,
    pub description: &'static str,
}

pub const DATASETS: [DatasetSpec; 4] = [
    DatasetSpec {
        key: DatasetKey::EstablishmentsByState,
        file_name: "estabelecimentos_estados.xlsx",
        strip_label: "UF",
        drop_total: true,
        title: "Estabelecimentos por Estado",
        unit_label: "Nº de Estabelecimentos",
        description: "Quantidade de estabelecimentos do setor de microeletrônica por unidade federativa.",
    },
    DatasetSpec {
        key: DatasetKey::EstablishmentsBySpMunicipality,
        file_name: "estabelecimentos_municipios_sp.xlsx",
        strip_label: "Município-São Paulo",
        drop_total: false,
        title: "Estabelecimentos por Município de SP",
        unit_label: "Nº de Estabelecimentos",
        description: "Quantidade de estabelecimentos nos municípios paulistas.",
    },
    DatasetSpec {
        key: DatasetKey::EmployeesByState,
        file_name: "empregados_estados.xlsx",
        strip_label: "UF",
        drop_total: true,
        title: "Empregados por Estado",
        unit_label: "Nº de Empregados",
        description: "Quantidade de empregados no setor de microeletrônica por unidade federativa.",
    },
    DatasetSpec {
        key: DatasetKey::EmployeesBySpMunicipality,
        file_name: "empregados_municipios_sp.xlsx",
        strip_label: "Município-São Paulo",
        drop_total: false,
        title: "Empregados por Município de SP",
        unit_label: "Nº de Empregados",
        description: "Quantidade de empregados nos municípios paulistas.",
    },
];

impl DatasetKey {
    pub fn spec(self) -> &'static DatasetSpec {
        match self {
            DatasetKey::EstablishmentsByState => &DATASETS[0],
            DatasetKey::EstablishmentsBySpMunicipality => &DATASETS[1],
            DatasetKey::EmployeesByState => &DATASETS[2],
            DatasetKey::EmployeesBySpMunicipality => &DATASETS[3],
        }
    }
}

// ---------------------------------------------------------------------------
// Registry – datasets rooted at a data directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Registry {
    data_dir: PathBuf,
}

impl Registry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Registry {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: DatasetKey) -> PathBuf {
        self.data_dir.join(key.spec().file_name)
    }

    /// Load a single dataset. A missing file is an error here.
    pub fn load_one(&self, key: DatasetKey) -> Result<LabeledTable> {
        let spec = key.spec();
        let options = LoadOptions {
            strip_label: spec.strip_label,
            drop_total: spec.drop_total,
        };
        let table = load_workbook(&self.path_for(key), &options)?;
        Ok(LabeledTable {
            key,
            title: spec.title,
            unit_label: spec.unit_label,
            description: spec.description,
            table,
        })
    }

    /// Load every dataset whose file exists; absent files are skipped.
    pub fn load_all(&self) -> Result<BTreeMap<DatasetKey, LabeledTable>> {
        let mut loaded = BTreeMap::new();
        for key in DatasetKey::ALL {
            match self.load_one(key) {
                Ok(table) => {
                    loaded.insert(key, table);
                }
                Err(e) if e.is_missing_file() => {
                    log::info!("skipping {key}: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "loaded {}/{} datasets from {}",
            loaded.len(),
            DatasetKey::ALL.len(),
            self.data_dir.display()
        );
        Ok(loaded)
    }

    /// Whether each dataset's backing file currently exists. Never fails.
    pub fn check_availability(&self) -> BTreeMap<DatasetKey, bool> {
        DatasetKey::ALL
            .into_iter()
            .map(|key| (key, self.path_for(key).exists()))
            .collect()
    }
}
