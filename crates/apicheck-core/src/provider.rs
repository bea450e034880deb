use std::collections::HashMap;

use crate::error::LoadError;
use crate::model::TypeDescriptor;

/// Source of type descriptors, looked up by binary name (`com.example.Box$Node`).
pub trait IntrospectionProvider {
    fn load_type(&self, name: &str) -> Result<TypeDescriptor, LoadError>;
}

impl<P: IntrospectionProvider + ?Sized> IntrospectionProvider for &P {
    fn load_type(&self, name: &str) -> Result<TypeDescriptor, LoadError> {
        (**self).load_type(name)
    }
}

/// Descriptors registered up front; useful for tests and for callers that already hold
/// introspection data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    types: HashMap<String, TypeDescriptor>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeDescriptor> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut provider = Self::new();
        for descriptor in iter {
            provider.insert(descriptor);
        }
        provider
    }
}

impl IntrospectionProvider for InMemoryProvider {
    fn load_type(&self, name: &str) -> Result<TypeDescriptor, LoadError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}
