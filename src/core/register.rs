use indexmap::IndexMap;

/// Ordinal slot per distinct sample name, minted in first-appearance order.
///
/// Ordinals start at 1 and are dense: `K` distinct names get `1..=K`. The
/// ordinal is the input to destination arithmetic, not a well position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRegister {
    slots: IndexMap<String, usize>,
}

impl SampleRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the register with a single forward pass.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut register = Self::new();
        for name in names {
            register.register(name);
        }
        register
    }

    /// Returns the slot for `name`, minting the next one on first sight.
    pub fn register(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.slots.len() + 1;
        self.slots.insert(name.to_string(), slot);
        slot
    }

    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names with their ordinals, in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), *slot))
    }
}
