//! Structural shape and delegate synthesis.
//!
//! Anonymous shapes (`new { a = 1, b = "x" }`) are identified by their ordered
//! field names. Every shape with the same names shares one generic template,
//! instantiated with the concrete field types at each use. Call sites whose
//! function-pointer signature has no canonical delegate get a synthesized
//! generic delegate the same way.
//!
//! # Pipeline
//!
//! 1. [`DescriptorBuilder`] validates one construction site's initializers.
//! 2. [`Generation::construct_shape`] and [`Generation::delegate_template`]
//!    populate the concurrent caches from any number of binding workers.
//! 3. [`Generation::finalize`] runs once: it assigns deterministic names,
//!    seals the caches, and hands the templates to an [`EmitHook`].
//! 4. [`Generation::derive`] starts the next generation on top of a finalized
//!    one; an [`EmittedShapeMap`] carries names across process boundaries.
//!
//! # Tracing
//!
//! Call [`init_tracing`] once at startup and set
//! `RUST_LOG=synth_types=debug` (or `trace`) to see naming and cache activity.

mod cache;
mod config;
mod delegate;
mod descriptor;
mod emit;
mod error;
mod finalize;
mod generation;
mod naming;
mod persist;
mod shape;
mod shape_key;

use std::sync::Once;

pub use cache::CacheStats;
pub use config::{EmitMode, GenerationConfig};
pub use delegate::{DelegateKey, DelegateTemplate, ParamPassing, MAX_CANONICAL_PARAMS};
pub use descriptor::{
    Binding, DescriptorBuilder, ExprBinder, FieldDescriptor, FieldName, ShapeContext,
    ShapeDescriptors, Typeless,
};
pub use emit::{EmitHook, EmittedKind, EmittedType, SynthesizedMember};
pub use error::{PersistError, SynthError};
pub use finalize::{FinalizeInput, FinalizeOutput, NumberingState};
pub use generation::{Generation, GenerationId};
pub use naming::{shape_type_name, NameAndIndex};
pub use persist::EmittedShapeMap;
pub use shape::{instantiate, ConstructedType, ShapeTemplate};
pub use shape_key::{ShapeKey, ShapeKeyError};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
