//! Wire-format shapes.
//!
//! Every type has an inline [`TypeShape`]: its size and alignment inside
//! the enclosing message. Variable-length data (vectors and strings)
//! lives out of line; each level of it is described by an [`Allocation`]
//! carrying the payload and the element-count bound. A payload naming a
//! type that contains the vector itself is recorded as
//! [`Payload::Recursive`] instead of being expanded.
//!
//! # Example
//!
//! ```
//! use fidl_core::shape::{vector_shape, Bound, TypeShape};
//!
//! let shape = vector_shape(TypeShape::new(1, 1), Bound::Bounded(5));
//! assert_eq!((shape.size, shape.alignment), (16, 8));
//! assert_eq!(shape.allocations[0].bound, Bound::Bounded(5));
//! ```

use serde::Serialize;

use crate::syntax::ast::PrimitiveSubtype;

/// Inline size of a vector or string header: a 64-bit element count
/// followed by a 64-bit out-of-line reference.
pub const VECTOR_HEADER: TypeShape = TypeShape::new(16, 8);

/// Inline shape of handles, interface requests and interface references.
pub const HANDLE: TypeShape = TypeShape::new(4, 4);

/// Size, alignment and out-of-line allocations of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeShape {
    /// Inline size in bytes.
    pub size: u64,
    /// Inline alignment in bytes (always a power of two).
    pub alignment: u64,
    /// Out-of-line storage, in member order.
    pub allocations: Vec<Allocation>,
}

/// The element-count limit of one out-of-line allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// At most this many elements; always positive.
    Bounded(u64),
    Unbounded,
}

/// One level of out-of-line storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Allocation {
    pub payload: Payload,
    pub bound: Bound,
}

/// The element type of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Shape(TypeShape),
    /// Elements of an enclosing type, by type text. Its shape is the one
    /// recorded for that declaration.
    Recursive(String),
}

impl Payload {
    pub fn shape(&self) -> Option<&TypeShape> {
        match self {
            Payload::Shape(shape) => Some(shape),
            Payload::Recursive(_) => None,
        }
    }
}

impl From<TypeShape> for Payload {
    fn from(shape: TypeShape) -> Self {
        Payload::Shape(shape)
    }
}

impl TypeShape {
    /// Create a shape with no allocations.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two.
    pub const fn new(size: u64, alignment: u64) -> Self {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        Self {
            size,
            alignment,
            allocations: Vec::new(),
        }
    }

    pub fn with_allocations(size: u64, alignment: u64, allocations: Vec<Allocation>) -> Self {
        Self {
            allocations,
            ..Self::new(size, alignment)
        }
    }

    /// True if the type owns no out-of-line storage.
    pub fn is_inline_only(&self) -> bool {
        self.allocations.is_empty()
    }
}

impl Default for TypeShape {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// Round `offset` up to a multiple of `align`, or `None` on overflow.
pub fn align_to(offset: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    Some(offset.checked_add(align - 1)? & !(align - 1))
}

pub fn primitive_shape(subtype: PrimitiveSubtype) -> TypeShape {
    match subtype {
        PrimitiveSubtype::Bool | PrimitiveSubtype::Int8 | PrimitiveSubtype::Uint8 => {
            TypeShape::new(1, 1)
        }
        PrimitiveSubtype::Int16 | PrimitiveSubtype::Uint16 => TypeShape::new(2, 2),
        PrimitiveSubtype::Int32 | PrimitiveSubtype::Uint32 | PrimitiveSubtype::Float32 => {
            TypeShape::new(4, 4)
        }
        PrimitiveSubtype::Int64 | PrimitiveSubtype::Uint64 | PrimitiveSubtype::Float64 => {
            TypeShape::new(8, 8)
        }
    }
}

/// `count` elements laid out back to back.
///
/// The array owns no allocation itself; the element's allocations are
/// carried through once. Returns `None` if the size overflows.
pub fn array_shape(element: TypeShape, count: u64) -> Option<TypeShape> {
    let size = element.size.checked_mul(count)?;
    Some(TypeShape::with_allocations(
        size,
        element.alignment,
        element.allocations,
    ))
}

/// A vector header with one allocation of `element`s.
pub fn vector_shape(element: impl Into<Payload>, bound: Bound) -> TypeShape {
    TypeShape {
        allocations: vec![Allocation {
            payload: element.into(),
            bound,
        }],
        ..VECTOR_HEADER
    }
}

/// A string is a vector of bytes.
pub fn string_shape(bound: Bound) -> TypeShape {
    vector_shape(TypeShape::new(1, 1), bound)
}

/// Fold member shapes into a union shape.
///
/// Size is the largest member rounded up to the largest alignment. Member
/// allocations are kept as alternatives in member order. No tag is
/// accounted for. Returns `None` if the size overflows.
pub fn union_shape(members: impl IntoIterator<Item = TypeShape>) -> Option<TypeShape> {
    let mut size = 0;
    let mut alignment = 1;
    let mut allocations = Vec::new();

    for member in members {
        size = size.max(member.size);
        alignment = alignment.max(member.alignment);
        allocations.extend(member.allocations);
    }

    Some(TypeShape::with_allocations(
        align_to(size, alignment)?,
        alignment,
        allocations,
    ))
}

/// Incremental struct layout.
///
/// Each member is placed at the next offset aligned to its own alignment;
/// the final size is padded to the largest member alignment.
#[derive(Debug, Clone)]
pub struct StructLayout {
    offset: u64,
    alignment: u64,
    allocations: Vec<Allocation>,
}

impl Default for StructLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl StructLayout {
    pub fn new() -> Self {
        Self {
            offset: 0,
            alignment: 1,
            allocations: Vec::new(),
        }
    }

    /// Place a member and return its offset, or `None` on overflow.
    pub fn push(&mut self, member: TypeShape) -> Option<u64> {
        let offset = align_to(self.offset, member.alignment)?;
        self.offset = offset.checked_add(member.size)?;
        self.alignment = self.alignment.max(member.alignment);
        self.allocations.extend(member.allocations);
        Some(offset)
    }

    pub fn finish(self) -> Option<TypeShape> {
        let size = align_to(self.offset, self.alignment)?;
        Some(TypeShape::with_allocations(
            size,
            self.alignment,
            self.allocations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(shape: &TypeShape) -> (u64, u64) {
        (shape.size, shape.alignment)
    }

    #[test]
    fn test_primitive_table() {
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Int8)), (1, 1));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Bool)), (1, 1));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Uint16)), (2, 2));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Uint32)), (4, 4));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Float32)), (4, 4));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Uint64)), (8, 8));
        assert_eq!(sizes(&primitive_shape(PrimitiveSubtype::Float64)), (8, 8));
        assert_eq!(sizes(&HANDLE), (4, 4));
    }

    #[test]
    fn test_default_shape() {
        let shape = TypeShape::default();
        assert_eq!(sizes(&shape), (0, 1));
        assert!(shape.is_inline_only());
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_zero_alignment_panics() {
        let _ = TypeShape::new(4, 0);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_power_of_two_alignment_panics() {
        let _ = TypeShape::new(6, 3);
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(0, 8), Some(0));
        assert_eq!(align_to(1, 4), Some(4));
        assert_eq!(align_to(9, 8), Some(16));
        assert_eq!(align_to(u64::MAX, 2), None);
    }

    #[test]
    fn test_array_of_primitives() {
        let shape = array_shape(primitive_shape(PrimitiveSubtype::Uint32), 4).unwrap();
        assert_eq!(sizes(&shape), (16, 4));
        assert!(shape.is_inline_only());
    }

    #[test]
    fn test_array_carries_element_allocations_once() {
        let element = string_shape(Bound::Bounded(3));
        let shape = array_shape(element, 5).unwrap();

        assert_eq!(sizes(&shape), (80, 8));
        assert_eq!(shape.allocations.len(), 1);
        assert_eq!(shape.allocations[0].bound, Bound::Bounded(3));
    }

    #[test]
    fn test_array_overflow() {
        assert_eq!(array_shape(TypeShape::new(u64::MAX / 2, 1), 3), None);
    }

    #[test]
    fn test_vector_and_string() {
        let vector = vector_shape(primitive_shape(PrimitiveSubtype::Uint8), Bound::Bounded(5));
        assert_eq!(sizes(&vector), (16, 8));
        assert_eq!(
            vector.allocations,
            vec![Allocation {
                payload: Payload::Shape(TypeShape::new(1, 1)),
                bound: Bound::Bounded(5),
            }]
        );

        let string = string_shape(Bound::Unbounded);
        assert_eq!(sizes(&string), (16, 8));
        assert_eq!(string.allocations[0].bound, Bound::Unbounded);
        assert_eq!(sizes(string.allocations[0].payload.shape().unwrap()), (1, 1));
    }

    #[test]
    fn test_nested_vectors_nest_allocations() {
        let inner = vector_shape(primitive_shape(PrimitiveSubtype::Uint8), Bound::Bounded(4));
        let outer = vector_shape(inner, Bound::Unbounded);

        assert_eq!(outer.allocations.len(), 1);
        let payload = outer.allocations[0].payload.shape().unwrap();
        assert_eq!(sizes(payload), (16, 8));
        assert_eq!(payload.allocations[0].bound, Bound::Bounded(4));
    }

    #[test]
    fn test_recursive_payload() {
        let shape = vector_shape(Payload::Recursive("Node".to_string()), Bound::Unbounded);

        assert_eq!(sizes(&shape), (16, 8));
        assert_eq!(shape.allocations[0].payload.shape(), None);
        assert_eq!(
            shape.allocations[0].payload,
            Payload::Recursive("Node".to_string())
        );
    }

    #[test]
    fn test_struct_layout() {
        let mut layout = StructLayout::new();
        let offsets: Vec<_> = [
            PrimitiveSubtype::Uint8,
            PrimitiveSubtype::Uint32,
            PrimitiveSubtype::Uint16,
        ]
        .into_iter()
        .map(|subtype| layout.push(primitive_shape(subtype)).unwrap())
        .collect();
        assert_eq!(offsets, vec![0, 4, 8]);

        let shape = layout.finish().unwrap();
        assert_eq!(sizes(&shape), (12, 4));
    }

    #[test]
    fn test_struct_collects_member_allocations_in_order() {
        let mut layout = StructLayout::new();
        layout.push(string_shape(Bound::Bounded(1)));
        layout.push(primitive_shape(PrimitiveSubtype::Int8));
        layout.push(string_shape(Bound::Bounded(2)));

        let shape = layout.finish().unwrap();
        assert_eq!(sizes(&shape), (40, 8));
        let bounds: Vec<_> = shape.allocations.iter().map(|a| a.bound).collect();
        assert_eq!(bounds, vec![Bound::Bounded(1), Bound::Bounded(2)]);
    }

    #[test]
    fn test_empty_struct() {
        let shape = StructLayout::new().finish().unwrap();
        assert_eq!(sizes(&shape), (0, 1));
    }

    #[test]
    fn test_union_fold() {
        let shape = union_shape([
            primitive_shape(PrimitiveSubtype::Uint8),
            primitive_shape(PrimitiveSubtype::Uint64),
        ])
        .unwrap();
        assert_eq!(sizes(&shape), (8, 8));

        let padded = union_shape([TypeShape::new(5, 1), TypeShape::new(2, 2)]).unwrap();
        assert_eq!(sizes(&padded), (6, 2));

        let empty = union_shape(std::iter::empty()).unwrap();
        assert_eq!(sizes(&empty), (0, 1));
    }

    #[test]
    fn test_union_keeps_alternative_allocations() {
        let shape = union_shape([
            string_shape(Bound::Bounded(7)),
            vector_shape(TypeShape::new(4, 4), Bound::Unbounded),
        ])
        .unwrap();
        assert_eq!(shape.allocations.len(), 2);
        assert_eq!(shape.allocations[1].bound, Bound::Unbounded);
    }
}
