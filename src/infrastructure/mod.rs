//! Infrastructure layer: owns scarce resources and only exposes capabilities

pub mod scratch_file;

pub use scratch_file::ScratchFile;
