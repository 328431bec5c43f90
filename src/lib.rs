//! DGS Variants - scenery object variant generator
//!
//! Turns one docking guidance sign template into a family of height and
//! rotation variants, plus the AGP placement descriptors that reference them.
//!
//! # Ground rules
//! 1. Templates are read once and never modified
//! 2. Transforms are line based, no OBJ parsing
//! 3. Same recipe, same bytes
//! 4. The library check advises, it never blocks

pub mod template;
pub mod variant;
pub mod agp;
pub mod manifest;
pub mod indent;
pub mod recipe;
pub mod hashing;
pub mod pipeline;

pub use template::{Template, TemplateCache, TemplateError};
pub use variant::{VariantParams, VariantStyle, SectionRules, PlaceholderRules, GeneratedLines};
pub use agp::AgpRotation;
pub use manifest::{ManifestCheck, ManifestError};
pub use recipe::{Recipe, VariantFamily, RecipeError};
pub use hashing::{sha256_hex, compute_build_hash};
pub use pipeline::{BuildPipeline, BuildReport, BuildError, GeneratedFile, FileKind};

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_RECIPE_VERSION: &str = "1.0.0";
