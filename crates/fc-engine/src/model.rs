//! The model collaborator seam.

use std::io;
use std::path::Path;

/// Name of the serialized model inside a run's output directory.
pub const MODEL_FILE_NAME: &str = "model.in";

/// A building-energy model as the engine sees it: something it can clone,
/// serialize next to a run, and cheapen for estimation-tier runs. The engine
/// never looks inside.
pub trait SimModel: Clone {
    /// Serialize the model to `path`.
    fn save(&self, path: &Path) -> io::Result<()>;

    /// A cheaper, lower-fidelity variant of this model.
    ///
    /// Used for estimation-tier runs only; the result trades accuracy for
    /// runtime and must stay structurally equivalent to the original.
    fn simplified(&self) -> Self;
}
