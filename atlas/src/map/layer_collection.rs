use std::ops::Index;

use crate::layer::{Layer, LayerRef};

/// Layers of a map in draw order: the first layer is drawn at the bottom, the last one on top.
///
/// The collection stores shared [`LayerRef`]s, so a tool can keep a reference to a layer it added (e.g. a highlight
/// overlay) and find, move or remove it later. Visibility is a property of the layer itself, so hiding a layer
/// through the collection is observed by everyone holding a reference to it.
///
/// ```
/// use atlas::layer::{LayerRef, VectorLayer};
/// use atlas::LayerCollection;
///
/// let mut collection = LayerCollection::default();
/// let parcels = collection.push(VectorLayer::new("parcels", vec![]));
/// collection.push(VectorLayer::new("roads", vec![]));
///
/// assert_eq!(collection.position(&parcels), Some(0));
/// assert!(collection[1].as_any().downcast_ref::<VectorLayer>().is_some());
/// ```
#[derive(Default, Debug, Clone)]
pub struct LayerCollection(Vec<LayerRef>);

impl LayerCollection {
    /// Adds the layer on top of the others and returns the reference to it.
    pub fn push(&mut self, layer: impl Layer + 'static) -> LayerRef {
        let layer = LayerRef::new(layer);
        self.0.push(layer.clone());
        layer
    }

    /// Adds an already shared layer on top of the others.
    pub fn push_ref(&mut self, layer: LayerRef) {
        self.0.push(layer)
    }

    /// Inserts a layer at position `index`, shifting all layers after it up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    pub fn insert(&mut self, index: usize, layer: LayerRef) {
        self.0.insert(index, layer);
    }

    /// Removes a layer at `index`, shifting all layers after it down and returning the
    /// removed layer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> LayerRef {
        self.0.remove(index)
    }

    /// Removes the given layer from the collection. Returns `false` if the layer was not in the collection.
    pub fn remove_ref(&mut self, layer: &LayerRef) -> bool {
        match self.position(layer) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    /// Retains only the layers specified by the predicate.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&dyn Layer) -> bool,
    {
        self.0.retain(|layer| f(layer.layer()))
    }

    /// Position of the layer in draw order.
    pub fn position(&self, layer: &LayerRef) -> Option<usize> {
        self.0.iter().position(|l| l == layer)
    }

    /// Position of the first layer with the given name.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|l| l.name() == name)
    }

    /// First layer with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&LayerRef> {
        self.0.iter().find(|l| l.name() == name)
    }

    /// Returns the count of layers in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the collection contains zero layers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a layer at `index`, or `None` if index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&LayerRef> {
        self.0.get(index)
    }

    /// Removes all layers from the collection.
    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Iterates over all layers in draw order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LayerRef> + '_ {
        self.0.iter()
    }

    /// Iterates over visible layers in draw order.
    pub fn iter_visible(&self) -> impl DoubleEndedIterator<Item = &LayerRef> + '_ {
        self.0.iter().filter(|layer| layer.is_visible())
    }

    /// Hides the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn hide(&self, index: usize) {
        self.0[index].set_visible(false);
    }

    /// Shows the layer at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn show(&self, index: usize) {
        self.0[index].set_visible(true);
    }

    /// Returns true, if the layer at `index` is visible.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn is_visible(&self, index: usize) -> bool {
        self.0[index].is_visible()
    }
}

impl Index<usize> for LayerCollection {
    type Output = dyn Layer;

    fn index(&self, index: usize) -> &Self::Output {
        self.0[index].layer()
    }
}

impl From<Vec<LayerRef>> for LayerCollection {
    fn from(value: Vec<LayerRef>) -> Self {
        Self(value)
    }
}
