pub mod boldigger;
pub mod naming;
pub mod traits;

pub use boldigger::Boldigger3;
pub use naming::{ArtifactKind, NamingScheme, NamingVariant};
pub use traits::Classifier;
