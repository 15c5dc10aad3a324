pub mod classify;
pub mod hierarchy;
pub mod merge;
pub mod migrate;
pub mod provenance;
pub mod render;
pub mod section;
