//! Link batch containers.
//!
//! - [`NodePairs`] - equal-length `(src, dst)` index vectors
//! - [`LinkBatch`] - an ordered sequence of array fields (`u`, `v`, then
//!   negatives, labels or features)
//! - [`LinkData`] - one batch for a homogeneous graph, or one batch per
//!   [`EdgeType`] for a heterogeneous graph
//!
//! Fields are reference counted, so a field carried from an input batch to
//! an output batch is the same allocation, not a copy.

use crate::error::{Error, Result};
use crate::hetero::EdgeType;
use ndarray::{ArcArray, Array, Array1, ArrayView1, ArrayView2, Dimension, Ix1, Ix2, IxDyn};
use std::collections::HashMap;

/// A single field of a link batch.
pub type Field = ArcArray<i64, IxDyn>;

/// Wrap an owned array of any dimensionality as a [`Field`].
pub fn field<D: Dimension>(array: Array<i64, D>) -> Field {
    array.into_dyn().into_shared()
}

/// Source and destination node indices of a set of edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePairs {
    src: Array1<i64>,
    dst: Array1<i64>,
}

impl NodePairs {
    /// Create from index arrays. Both sides must have the same length.
    pub fn new(src: Array1<i64>, dst: Array1<i64>) -> Result<Self> {
        if src.len() != dst.len() {
            return Err(Error::shape("node pairs", src.len(), dst.len()));
        }
        Ok(Self { src, dst })
    }

    /// Create from index vectors.
    pub fn from_vecs(src: Vec<i64>, dst: Vec<i64>) -> Result<Self> {
        Self::new(Array1::from(src), Array1::from(dst))
    }

    /// Source indices.
    pub fn src(&self) -> &Array1<i64> {
        &self.src
    }

    /// Destination indices.
    pub fn dst(&self) -> &Array1<i64> {
        &self.dst
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Iterate over (src, dst) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Split into `(src, dst)`.
    pub fn into_parts(self) -> (Array1<i64>, Array1<i64>) {
        (self.src, self.dst)
    }
}

/// An ordered sequence of array fields describing a batch of links.
///
/// The first two fields are always the source and destination indices.
/// What follows depends on the [`crate::LinkedDataFormat`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkBatch {
    fields: Vec<Field>,
}

impl LinkBatch {
    /// Create from raw fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// A two-field batch holding only `(u, v)`.
    pub fn from_pairs(pairs: NodePairs) -> Self {
        let (src, dst) = pairs.into_parts();
        Self::new(vec![field(src), field(dst)])
    }

    /// Append a field.
    pub fn with_field<D: Dimension>(mut self, array: Array<i64, D>) -> Self {
        self.fields.push(field(array));
        self
    }

    /// Append a shared field without copying it.
    pub fn push_shared(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// All fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields from index `start` on (empty if `start` is past the end).
    pub fn tail(&self, start: usize) -> &[Field] {
        self.fields.get(start..).unwrap_or(&[])
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// View field `index` as a vector.
    pub fn vector(&self, index: usize) -> Result<ArrayView1<'_, i64>> {
        let field = self.require(index)?;
        if field.ndim() != 1 {
            let actual = format!("{:?}", field.shape());
            return Err(Error::shape("link batch vector field", "1-D", actual));
        }
        Ok(field.view().into_dimensionality::<Ix1>()?)
    }

    /// View field `index` as a matrix.
    pub fn matrix(&self, index: usize) -> Result<ArrayView2<'_, i64>> {
        let field = self.require(index)?;
        if field.ndim() != 2 {
            let actual = format!("{:?}", field.shape());
            return Err(Error::shape("link batch matrix field", "2-D", actual));
        }
        Ok(field.view().into_dimensionality::<Ix2>()?)
    }

    /// Check that at least `count` fields are present.
    pub(crate) fn require_len(&self, count: usize) -> Result<()> {
        if self.fields.len() < count {
            return Err(Error::shape(
                "link batch field count",
                format!("at least {count}"),
                self.fields.len(),
            ));
        }
        Ok(())
    }

    fn require(&self, index: usize) -> Result<&Field> {
        self.require_len(index + 1)?;
        Ok(&self.fields[index])
    }
}

/// Link data for either a homogeneous or a heterogeneous graph.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkData<T> {
    /// A single batch.
    Homogeneous(T),
    /// One batch per edge type.
    Heterogeneous(HashMap<EdgeType, T>),
}

impl<T> LinkData<T> {
    pub fn is_heterogeneous(&self) -> bool {
        matches!(self, Self::Heterogeneous(_))
    }

    /// Number of batches (1 for homogeneous data).
    pub fn num_batches(&self) -> usize {
        match self {
            Self::Homogeneous(_) => 1,
            Self::Heterogeneous(map) => map.len(),
        }
    }

    /// The batch of a homogeneous graph.
    pub fn as_homogeneous(&self) -> Option<&T> {
        match self {
            Self::Homogeneous(batch) => Some(batch),
            Self::Heterogeneous(_) => None,
        }
    }

    /// The per-edge-type batches of a heterogeneous graph.
    pub fn as_heterogeneous(&self) -> Option<&HashMap<EdgeType, T>> {
        match self {
            Self::Homogeneous(_) => None,
            Self::Heterogeneous(map) => Some(map),
        }
    }

    /// Batch for `edge_type` (heterogeneous data only).
    pub fn get(&self, edge_type: &EdgeType) -> Option<&T> {
        self.as_heterogeneous()?.get(edge_type)
    }

    /// Iterate over batches; the key is `None` for homogeneous data.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Option<&EdgeType>, &T)> + '_> {
        match self {
            Self::Homogeneous(batch) => Box::new(std::iter::once((None, batch))),
            Self::Heterogeneous(map) => Box::new(map.iter().map(|(k, v)| (Some(k), v))),
        }
    }

    /// Apply `f` to every batch, keeping the layout and keys.
    pub fn try_map<U, F>(&self, mut f: F) -> Result<LinkData<U>>
    where
        F: FnMut(Option<&EdgeType>, &T) -> Result<U>,
    {
        match self {
            Self::Homogeneous(batch) => Ok(LinkData::Homogeneous(f(None, batch)?)),
            Self::Heterogeneous(map) => map
                .iter()
                .map(|(etype, batch)| Ok((etype.clone(), f(Some(etype), batch)?)))
                .collect::<Result<HashMap<_, _>>>()
                .map(LinkData::Heterogeneous),
        }
    }

    /// Pair every batch of `self` with the batch of `other` under the same
    /// key and combine them with `f`.
    ///
    /// The result has exactly the keys of `self`. Fails if the layouts
    /// differ or `other` lacks one of the keys.
    pub fn try_zip_map<U, V, F>(&self, other: LinkData<U>, mut f: F) -> Result<LinkData<V>>
    where
        F: FnMut(Option<&EdgeType>, &T, U) -> Result<V>,
    {
        match (self, other) {
            (Self::Homogeneous(batch), LinkData::Homogeneous(paired)) => {
                Ok(LinkData::Homogeneous(f(None, batch, paired)?))
            }
            (Self::Heterogeneous(map), LinkData::Heterogeneous(mut paired)) => map
                .iter()
                .map(|(etype, batch)| {
                    let value = paired.remove(etype).ok_or_else(|| {
                        Error::LayoutMismatch(format!("missing batch for edge type {etype}"))
                    })?;
                    Ok((etype.clone(), f(Some(etype), batch, value)?))
                })
                .collect::<Result<HashMap<_, _>>>()
                .map(LinkData::Heterogeneous),
            (Self::Homogeneous(_), LinkData::Heterogeneous(_)) => Err(Error::LayoutMismatch(
                "expected homogeneous data, got per-edge-type data".into(),
            )),
            (Self::Heterogeneous(_), LinkData::Homogeneous(_)) => Err(Error::LayoutMismatch(
                "expected per-edge-type data, got homogeneous data".into(),
            )),
        }
    }
}

impl<T> FromIterator<(EdgeType, T)> for LinkData<T> {
    fn from_iter<I: IntoIterator<Item = (EdgeType, T)>>(iter: I) -> Self {
        Self::Heterogeneous(iter.into_iter().collect())
    }
}
