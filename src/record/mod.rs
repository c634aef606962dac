//! Recording: the sample store and the per-tick frame sampler.

pub mod sampler;
pub mod store;

pub use sampler::{FrameSampler, PreSampleObserver, PropertySource};
pub use store::{AudioEntry, SampleStore};
