// Adapters layer: file formats and lookups around the pooling core.

pub mod labware;
pub mod mapping;
pub mod sample_file;
pub mod worklist;
