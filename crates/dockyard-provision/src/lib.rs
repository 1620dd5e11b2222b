mod labels;

pub use labels::{LABEL_PREFIX, LabelSet, ServiceLabels, keys};
