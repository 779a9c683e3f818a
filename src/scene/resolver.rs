//! Scene-slot resolution over parsed node records
//!
//! The container stores its scene graph as flat node chunks: transform nodes
//! point at a child node, and shape nodes point at a model. The renderer only
//! needs one thing from that graph: which model occupies which ordered slot,
//! where the slot number is encoded as the transform node's `_name`. Records
//! are accumulated during the chunk walk and resolved once at the end of a
//! load; nothing here survives past the finished pack.

use std::collections::HashMap;

use log::warn;

/// One transform node as parsed from the file.
#[derive(Clone, Debug)]
pub struct TransformRecord {
    /// Value of the node's `_name` attribute, empty when absent.
    pub name: String,
    pub id: i32,
    /// Node id of the single child this transform points at.
    pub child: i32,
}

/// Accumulates node records during parsing and resolves slot ordering.
#[derive(Default)]
pub struct SceneGraphResolver {
    transforms: Vec<TransformRecord>,
    /// shape node id -> model id
    shapes: HashMap<i32, i32>,
}

impl SceneGraphResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transform node in parse order.
    pub fn record_transform(&mut self, record: TransformRecord) {
        self.transforms.push(record);
    }

    /// Record a shape node's model reference.
    pub fn record_shape(&mut self, node_id: i32, model_id: i32) {
        self.shapes.insert(node_id, model_id);
    }

    /// Resolve records into a slot -> model-index mapping.
    ///
    /// Transforms whose child is not a shape node (groups), whose name is
    /// empty or non-numeric, or whose model id is out of range contribute
    /// nothing. Duplicate slots resolve last-in-parse-order.
    pub fn resolve(&self, num_models: usize) -> Vec<Option<usize>> {
        let mut ordered: Vec<Option<usize>> = Vec::new();

        for record in &self.transforms {
            let Some(&model_id) = self.shapes.get(&record.child) else {
                continue;
            };
            if model_id < 0 || model_id as usize >= num_models {
                warn!(
                    "transform node {} references model {} outside 0..{}, skipping",
                    record.id, model_id, num_models
                );
                continue;
            }
            if record.name.is_empty() {
                continue;
            }
            let Ok(slot) = record.name.parse::<usize>() else {
                warn!(
                    "transform node {} name {:?} is not a slot number, skipping",
                    record.id, record.name
                );
                continue;
            };
            if slot >= ordered.len() {
                ordered.resize(slot + 1, None);
            }
            ordered[slot] = Some(model_id as usize);
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(name: &str, id: i32, child: i32) -> TransformRecord {
        TransformRecord {
            name: name.to_string(),
            id,
            child,
        }
    }

    #[test]
    fn test_transform_through_shape() {
        let mut resolver = SceneGraphResolver::new();
        resolver.record_transform(transform("2", 3, 5));
        resolver.record_shape(5, 1);
        let ordered = resolver.resolve(2);
        assert_eq!(ordered, vec![None, None, Some(1)]);
    }

    #[test]
    fn test_group_child_skipped() {
        let mut resolver = SceneGraphResolver::new();
        // child 9 is never recorded as a shape node
        resolver.record_transform(transform("0", 1, 9));
        assert!(resolver.resolve(4).is_empty());
    }

    #[test]
    fn test_model_id_out_of_range_skipped() {
        let mut resolver = SceneGraphResolver::new();
        resolver.record_transform(transform("0", 1, 5));
        resolver.record_shape(5, 3);
        assert!(resolver.resolve(2).is_empty());
    }

    #[test]
    fn test_non_numeric_and_empty_names_skipped() {
        let mut resolver = SceneGraphResolver::new();
        resolver.record_transform(transform("", 1, 5));
        resolver.record_transform(transform("torch", 2, 6));
        resolver.record_shape(5, 0);
        resolver.record_shape(6, 1);
        assert!(resolver.resolve(2).is_empty());
    }

    #[test]
    fn test_model_index_zero_is_valid() {
        let mut resolver = SceneGraphResolver::new();
        resolver.record_transform(transform("0", 1, 5));
        resolver.record_shape(5, 0);
        assert_eq!(resolver.resolve(1), vec![Some(0)]);
    }

    #[test]
    fn test_duplicate_slot_last_wins() {
        let mut resolver = SceneGraphResolver::new();
        resolver.record_transform(transform("1", 1, 5));
        resolver.record_transform(transform("1", 2, 6));
        resolver.record_shape(5, 0);
        resolver.record_shape(6, 1);
        assert_eq!(resolver.resolve(2), vec![None, Some(1)]);
    }
}
