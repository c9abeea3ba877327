//! Harfnegar: Persian/Arabic text shaping toolkit
//!
//! A library and CLI for preparing Persian/Arabic text for environments
//! without complex text layout, built on two cores:
//!
//! - a **path codec** that flattens tree-shaped documents (PO, JSON,
//!   YAML, XML) into an editable flat record list and rebuilds the tree
//!   from it, and
//! - a **selective span transformer** that finds pattern matches in text,
//!   consults exception rules, and runs a pluggable shaper over only the
//!   matched spans while reassembling everything else verbatim.
//!
//! # Architecture
//!
//! Transformation always flows through one primitive:
//! [`reassemble::apply_spans`], a verified codepoint-span stitch.
//! Intelligence lives in span acquisition ([`matcher`]) and gating
//! ([`exceptions`]), not in the application step. Document editing flows
//! through [`codec::flatten`] / [`codec::unflatten`] with the format
//! adapters ([`formats`]) on the outside.
//!
//! # Safety
//!
//! - Ill-formed span sets are rejected before any transform runs
//! - Shaper failures are contained: the input text comes back unchanged
//! - Pattern compilation is size-bounded and matching is linear-time
//! - Document and store writes are atomic (tempfile + fsync + rename)
//!
//! # Example
//!
//! ```
//! use harfnegar::{transform_text, ArabicShaper};
//!
//! let patterns = vec!["[\u{0600}-\u{06FF}]+".to_string()];
//! let outcome = transform_text("id: سلام", Some(patterns.as_slice()), &[], &ArabicShaper)?;
//! assert!(outcome.output.starts_with("id: "));
//! # Ok::<(), harfnegar::OverlapError>(())
//! ```

pub mod cache;
pub mod codec;
pub mod exceptions;
pub mod formats;
pub mod matcher;
pub mod node;
pub mod path;
pub mod pipeline;
pub mod reassemble;
pub mod shape;
pub mod span;
pub mod store;

mod fsio;

// Re-exports
pub use codec::{flatten, unflatten, CodecError, Record, MAX_DEPTH};
pub use exceptions::{is_exempt, ExceptionRule};
pub use formats::{Document, Format, FormatError, LeafMeta, PoEntry, PoFile};
pub use matcher::{find_matches, Match, MatchSet, PatternError, PatternFailure};
pub use node::{Key, Node};
pub use path::{PathError, PathKey, Segment};
pub use pipeline::{transform_records, transform_text, BatchSummary, TransformOutcome};
pub use reassemble::{apply_spans, OverlapError};
pub use shape::{shape_failsoft, unshape, ArabicShaper, Shaper};
pub use span::Span;
pub use store::{ExceptionStore, StoreError};
