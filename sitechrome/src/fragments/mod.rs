//! Fragment acquisition: cache, remote source and the fail-open acquirer.
//!
//! The pieces compose left to right: a [`FragmentCache`] wraps the shared
//! Redis pool, a [`FragmentSource`] produces raw fragments (consulting the
//! cache when it has one), and the [`FragmentAcquirer`] drives both and
//! post-processes the result into the per-request [`FragmentBundle`].

pub mod acquirer;
pub mod bundle;
pub mod cache;
pub mod source;

pub use acquirer::{AcquisitionContext, FragmentAcquirer};
pub use bundle::FragmentBundle;
pub use cache::FragmentCache;
pub use source::{FetchError, FragmentSource, HttpFragmentSource, RawFragments};
