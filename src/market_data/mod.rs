// =============================================================================
// Market Data — external collaborators feeding the pipeline
// =============================================================================
//
// The pipeline itself performs no I/O; this module is the collaborator that
// supplies it with a deduplicated, chronologically sorted bar series and the
// latest auxiliary volatility reading.

pub mod yahoo;

pub use yahoo::YahooClient;
