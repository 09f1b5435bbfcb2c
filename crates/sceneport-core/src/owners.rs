//! Data block to owning object lookup
//!
//! Built once per export so each camera, light and mesh data block resolves
//! to its object without rescanning the whole object list.

use crate::snapshot::{ObjectKind, SceneObject, SceneSnapshot};
use std::collections::HashMap;

/// Result of resolving a data block to the object that uses it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Owner<'a> {
    /// No object references the data block
    Missing,
    /// Exactly one object references it
    Unique(&'a SceneObject),
    /// Several objects share it; the first in host order is used
    Shared { first: &'a SceneObject, count: usize },
}

impl<'a> Owner<'a> {
    /// The object to export for this data block, if any
    pub fn object(self) -> Option<&'a SceneObject> {
        match self {
            Self::Missing => None,
            Self::Unique(object) | Self::Shared { first: object, .. } => Some(object),
        }
    }
}

/// Maps kind and data name to the objects using that data, in host order
#[derive(Debug, Default)]
pub struct OwnerIndex<'a> {
    owners: HashMap<ObjectKind, HashMap<&'a str, Vec<&'a SceneObject>>>,
}

impl<'a> OwnerIndex<'a> {
    pub fn build(snapshot: &'a SceneSnapshot) -> Self {
        let mut owners: HashMap<ObjectKind, HashMap<&'a str, Vec<&'a SceneObject>>> =
            HashMap::new();
        for object in &snapshot.objects {
            if let Some(data) = object.data.as_deref() {
                owners
                    .entry(object.kind)
                    .or_default()
                    .entry(data)
                    .or_default()
                    .push(object);
            }
        }
        Self { owners }
    }

    /// Resolve the owner of a data block of the given kind
    pub fn resolve(&self, kind: ObjectKind, data: &str) -> Owner<'a> {
        let found = self.owners.get(&kind).and_then(|by_name| by_name.get(data));
        match found.map(Vec::as_slice) {
            None | Some([]) => Owner::Missing,
            Some([only]) => Owner::Unique(*only),
            Some(all @ [first, ..]) => Owner::Shared {
                first: *first,
                count: all.len(),
            },
        }
    }
}
