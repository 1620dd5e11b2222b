use dockyard_provision::{LABEL_PREFIX, LabelSet};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub trait MetaLabelsExt {
    fn label_set(&self) -> LabelSet;

    fn add_labels(&mut self, labels: &LabelSet);
}

impl MetaLabelsExt for ObjectMeta {
    fn label_set(&self) -> LabelSet {
        LabelSet::from_parts(
            LABEL_PREFIX,
            self.labels.clone().unwrap_or_default(),
            self.annotations.clone().unwrap_or_default(),
        )
    }

    fn add_labels(&mut self, labels: &LabelSet) {
        self.labels
            .get_or_insert_with(Default::default)
            .extend(labels.to_labels());
    }
}
