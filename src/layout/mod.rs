//! Layout of demultiplexed output trees.
//!
//! bcl2fastq 1.x writes `Project_*/Sample_*/` directories, bcl2fastq 2.x
//! writes `<project>/<file>` or `<project>/<sample>/<file>`, and
//! instrument-side demultiplexing leaves everything flat. The mapper
//! normalizes all three into a [`ProjectMapping`](crate::core::project::ProjectMapping).

pub mod mapper;
