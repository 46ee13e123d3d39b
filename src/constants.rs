/// Scores at or below this value count as "no improvement".
pub const GAIN_TOLERANCE: f64 = 1e-12;
/// Default minimum number of observations a node needs before a split is attempted.
pub const MIN_SAMPLES_SPLIT: usize = 2;
/// Record tag of a leaf node in the text model format.
pub const LEAF_TAG: &str = "L";
/// Record tag of an internal node in the text model format.
pub const INTERNAL_TAG: &str = "N";
/// Name of the column appended to prediction output.
pub const PREDICTED_LABEL_COLUMN: &str = "predicted_label";
/// Deepest level a node can sit at. Trees are grown, loaded and dropped
/// recursively, so this bounds their stack use.
pub const MAX_TREE_DEPTH: usize = 2048;
