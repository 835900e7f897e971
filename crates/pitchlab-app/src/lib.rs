// Library root: the collaborators around the engine (config, sheet ingestion,
// output files), exposed so integration tests can drive a full run.

pub mod config;
pub mod ingest;
pub mod output;
