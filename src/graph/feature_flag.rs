//! Feature flag loader

use crate::entity::{Attrs, Entity};

/// A named boolean platform switch
pub struct FeatureFlag {
    entity: Entity,
}

impl FeatureFlag {
    pub const PROPERTIES: &'static [&'static str] = &["name", "value"];

    pub fn new(attrs: Attrs) -> Self {
        Self {
            entity: Entity::single(attrs),
        }
    }

    /// The boolean lives under `enabled` upstream and is exported as `value`
    pub fn load(&self) -> Attrs {
        let mut computed = Attrs::new();
        if let Some(enabled) = self.entity.lookup("enabled") {
            computed.insert("value".to_string(), enabled);
        }
        self.entity.collect(Self::PROPERTIES, &computed)
    }
}
