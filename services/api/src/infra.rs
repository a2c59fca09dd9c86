use metrics_exporter_prometheus::PrometheusHandle;
use observation_report::config::{RoleDirectory, SourceConfig};
use observation_report::error::AppError;
use observation_report::observations::ObservationDataset;
use observation_report::sources::{CachedSource, CsvDirectorySource, SourceError, Table};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) sources: Arc<CachedSource<CsvDirectorySource>>,
    pub(crate) source_config: Arc<SourceConfig>,
    pub(crate) roles: Arc<RoleDirectory>,
}

impl AppState {
    pub(crate) fn new(
        metrics: PrometheusHandle,
        source_config: SourceConfig,
        roles: RoleDirectory,
    ) -> Self {
        let sources = CachedSource::new(
            CsvDirectorySource::new(&source_config.data_dir),
            source_config.cache_ttl,
        );
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            sources: Arc::new(sources),
            source_config: Arc::new(source_config),
            roles: Arc::new(roles),
        }
    }

    /// Posted CSV wins over the configured sources.
    pub(crate) fn dataset(
        &self,
        inline: Option<InlineSources>,
    ) -> Result<ObservationDataset, AppError> {
        match inline {
            Some(inline) => inline.into_dataset(),
            None => Ok(ObservationDataset::load(
                self.sources.as_ref(),
                &self.source_config,
            )?),
        }
    }
}

/// CSV exports posted with a request instead of read from the data directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InlineSources {
    pub(crate) observations_csv: String,
    #[serde(default)]
    pub(crate) cutoffs_csv: Option<String>,
    #[serde(default)]
    pub(crate) catalog_csv: Option<String>,
}

impl InlineSources {
    pub(crate) fn into_dataset(self) -> Result<ObservationDataset, AppError> {
        let observations = inline_table("observations", &self.observations_csv)?;
        let cutoffs = match self.cutoffs_csv.as_deref() {
            Some(csv) => inline_table("cutoffs", csv)?,
            None => Table::default(),
        };
        let catalog = self
            .catalog_csv
            .as_deref()
            .map(|csv| inline_table("catalog", csv))
            .transpose()?;

        Ok(ObservationDataset::from_tables(
            &observations,
            &cutoffs,
            catalog.as_ref(),
        )?)
    }
}

fn inline_table(name: &str, csv: &str) -> Result<Table, SourceError> {
    Table::from_reader(name, csv.as_bytes())
}

pub(crate) fn parse_role_mapping(raw: &str) -> Result<RoleDirectory, String> {
    RoleDirectory::parse(raw).map_err(|err| err.to_string())
}
