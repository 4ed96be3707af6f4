pub mod curves;
pub mod error;
pub mod model;
pub mod modeler;
pub mod network;
pub mod output;
pub mod parser;
pub mod record;
pub mod time_slot;

pub use error::{ModelError, Result};
pub use model::ModelType;
pub use modeler::{ModelerConfig, TrafficModeler};
pub use record::TrafficRecord;
