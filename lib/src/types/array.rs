// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use crate::types::{
    encoding::{EncodingError, EncodingResult},
    variant::Variant,
    variant_type_id::{EncodingMask, VariantTypeId},
};

/// An array is a vector of values with an optional number of dimensions. Every value has the
/// same type and the product of the dimensions equals the number of values. Both are checked
/// on construction so a value of this type is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    // Type of elements in the array
    value_type: VariantTypeId,

    /// Values are stored sequentially
    values: Vec<Variant>,

    /// Multi dimension array which can contain any scalar type, all the same type. Nested
    /// arrays are rejected. Higher rank dimensions are serialized first. For example an array
    /// with dimensions [2,2,2] is written in this order - [0,0,0], [0,0,1], [0,1,0], [0,1,1],
    /// [1,0,0], [1,0,1], [1,1,0], [1,1,1].
    dimensions: Vec<u32>,
}

impl Array {
    /// Creates a single dimension array
    pub fn new<V>(value_type: VariantTypeId, values: V) -> EncodingResult<Array>
    where
        V: Into<Vec<Variant>>,
    {
        let values = values.into();
        Self::validate_array_type_to_values(value_type, &values)?;
        Ok(Array {
            value_type,
            values,
            dimensions: Vec::new(),
        })
    }

    /// Creates a multi dimension array. The product of the dimensions must match the number of
    /// values.
    pub fn new_multi<V, D>(value_type: VariantTypeId, values: V, dimensions: D) -> EncodingResult<Array>
    where
        V: Into<Vec<Variant>>,
        D: Into<Vec<u32>>,
    {
        let values = values.into();
        let dimensions = dimensions.into();
        Self::validate_array_type_to_values(value_type, &values)?;
        Self::validate_dimensions(&dimensions, values.len())?;
        Ok(Array {
            value_type,
            values,
            dimensions,
        })
    }

    /// Creates a single dimension array from values the caller knows are all of the type
    pub(crate) fn from_typed_values(value_type: VariantTypeId, values: Vec<Variant>) -> Array {
        Array {
            value_type,
            values,
            dimensions: Vec::new(),
        }
    }

    /// This is a runtime check to ensure the type of the array also matches the types of the variants in the array.
    fn validate_array_type_to_values(
        value_type: VariantTypeId,
        values: &[Variant],
    ) -> EncodingResult<()> {
        if value_type == VariantTypeId::Empty {
            error!("Invalid array type supplied");
            return Err(EncodingError::type_mismatch("array element type", "Null"));
        }
        if let Some(value) = values
            .iter()
            .find(|v| v.is_array() || v.type_id() != value_type)
        {
            error!(
                "Variant array's type is expected to be {:?} but found {:?} in it",
                value_type,
                value.type_id()
            );
            Err(EncodingError::type_mismatch(
                value_type.name(),
                value.type_id().name(),
            ))
        } else {
            Ok(())
        }
    }

    /// Checks the dimensions multiply out to the number of values. The multiplication is checked
    /// so malicious dimensions cannot overflow.
    pub(crate) fn validate_dimensions(dimensions: &[u32], len: usize) -> EncodingResult<()> {
        let mismatch = || EncodingError::DimensionMismatch {
            dimensions: dimensions.to_vec(),
            len,
        };
        if dimensions.is_empty() {
            return Err(mismatch());
        }
        let mut product = 1usize;
        for d in dimensions {
            product = product.checked_mul(*d as usize).ok_or_else(|| {
                error!("Array dimension overflow!");
                mismatch()
            })?;
        }
        if product != len {
            error!(
                "Array dimensions {:?} do not match array length {}",
                dimensions, len
            );
            Err(mismatch())
        } else {
            Ok(())
        }
    }

    pub fn value_type(&self) -> VariantTypeId {
        self.value_type
    }

    pub fn values(&self) -> &[Variant] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Variant> {
        self.values
    }

    /// The dimensions of a multi dimension array, empty for a single dimension array
    pub fn dimensions(&self) -> &[u32] {
        &self.dimensions
    }

    pub fn has_dimensions(&self) -> bool {
        !self.dimensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn encoding_mask(&self) -> u8 {
        let mut encoding_mask = self.value_type.encoding_mask();
        encoding_mask |= EncodingMask::ARRAY_VALUES_BIT;
        if self.has_dimensions() {
            encoding_mask |= EncodingMask::ARRAY_DIMENSIONS_BIT;
        }
        encoding_mask
    }
}

#[test]
fn array_dimensions_must_match_values() {
    let values = vec![Variant::from(1i32), Variant::from(2i32), Variant::from(3i32)];
    assert!(Array::new_multi(VariantTypeId::Int32, values.clone(), vec![3u32]).is_ok());
    assert_eq!(
        Array::new_multi(VariantTypeId::Int32, values.clone(), vec![2u32, 2]),
        Err(EncodingError::DimensionMismatch {
            dimensions: vec![2, 2],
            len: 3
        })
    );
    assert!(matches!(
        Array::new(VariantTypeId::Double, values),
        Err(EncodingError::TypeMismatch { .. })
    ));
}
