//! The traffic modeler aggregate: records derived from one measurement table.

use std::path::PathBuf;
use tracing::info;

use crate::curves::group_curves;
use crate::curves::types::{CurveBundle, CurveGroup};
use crate::error::Result;
use crate::model::ModelType;
use crate::network::{EdgeSource, SumoNetwork};
use crate::parser::{DateFilter, MeasurementRow, read_measurements};
use crate::record::TrafficRecord;
use crate::time_slot::TimeSlot;

/// Inputs needed to build a [`TrafficModeler`] from files.
#[derive(Debug, Clone)]
pub struct ModelerConfig {
    pub data_file: PathBuf,
    pub network_file: PathBuf,
    pub date: Option<DateFilter>,
    pub time_slot: TimeSlot,
    pub model_type: ModelType,
}

impl ModelerConfig {
    pub fn new(data_file: impl Into<PathBuf>, network_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            network_file: network_file.into(),
            date: None,
            time_slot: TimeSlot::default(),
            model_type: ModelType::default(),
        }
    }

    pub fn with_date(mut self, date: DateFilter) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_time_slot(mut self, time_slot: TimeSlot) -> Self {
        self.time_slot = time_slot;
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }
}

/// Traffic records for every measured edge, all derived with one model.
///
/// The model is fixed at construction; comparing models means building a
/// second modeler over the same inputs.
#[derive(Debug)]
pub struct TrafficModeler<N = SumoNetwork> {
    records: Vec<TrafficRecord>,
    network: N,
    model_type: ModelType,
    time_slot: TimeSlot,
}

impl TrafficModeler<SumoNetwork> {
    /// Reads both input files and derives the records.
    #[tracing::instrument(
        skip_all,
        fields(
            data_file = %config.data_file.display(),
            network_file = %config.network_file.display(),
            model = %config.model_type,
            time_slot = %config.time_slot,
        )
    )]
    pub fn from_config(config: &ModelerConfig) -> Result<Self> {
        let rows = read_measurements(&config.data_file, config.date.as_ref())?;
        let network = SumoNetwork::load(&config.network_file)?;
        Self::build(&rows, network, config.time_slot, config.model_type)
    }
}

impl<N: EdgeSource> TrafficModeler<N> {
    /// Derives one record per row. The first failing row aborts the build.
    pub fn build(
        rows: &[MeasurementRow],
        network: N,
        time_slot: TimeSlot,
        model_type: ModelType,
    ) -> Result<Self> {
        let records = rows
            .iter()
            .map(|row| {
                let edge = network.edge(&row.edge_id)?;
                TrafficRecord::derive(row, edge, time_slot, model_type)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            records = records.len(),
            model = %model_type,
            time_slot = %time_slot,
            "Traffic model built"
        );

        Ok(Self {
            records,
            network,
            model_type,
            time_slot,
        })
    }

    pub fn records(&self) -> &[TrafficRecord] {
        &self.records
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn time_slot(&self) -> TimeSlot {
        self.time_slot
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Curves of this modeler's model for every speed limit in the records,
    /// computed afresh on each call.
    pub fn curves(&self, samples: usize) -> Vec<CurveGroup> {
        group_curves(&self.records, self.model_type, samples)
    }

    /// The curves as a self-describing bundle for an external renderer.
    pub fn curve_bundle(&self, samples: usize) -> CurveBundle {
        CurveBundle::from_groups(self.model_type, self.time_slot.to_string(), &self.curves(samples))
    }
}
