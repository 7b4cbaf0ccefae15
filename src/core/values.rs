//! Variable storage keyed by opaque identifiers.
//!
//! Factors never hold references to variable state, only [`Key`]s; the
//! optimizer owns a [`Values`] container and passes it into every
//! evaluation call. This replaces the process-wide symbol table of
//! classic factor-graph libraries with explicit, thread-safe ownership.

use crate::error::{QuadricError, QuadricResult};
use crate::geometry::{ConstrainedDualQuadric, Vector9};
use crate::manifold::{LieGroup, SE3};
use nalgebra::{DVector, Vector6};
use std::collections::HashMap;

/// Opaque variable identifier. Allocation of key ranges (poses vs
/// landmarks, symbol schemes) is the caller's concern.
pub type Key = u64;

/// A variable value of one of the supported manifold types.
#[derive(Debug, Clone)]
pub enum VariableValue {
    /// SE(3) camera pose, 6 degrees of freedom
    Pose(SE3),
    /// Constrained dual quadric landmark, 9 degrees of freedom
    Quadric(ConstrainedDualQuadric),
}

impl VariableValue {
    /// Tangent-space dimension of this variable.
    pub fn dof(&self) -> usize {
        match self {
            VariableValue::Pose(_) => SE3::DOF,
            VariableValue::Quadric(_) => 9,
        }
    }

    /// Apply a tangent-space update and return the updated variable.
    ///
    /// # Errors
    /// [`QuadricError::DimensionMismatch`] if `delta` does not match the
    /// variable's degrees of freedom; [`QuadricError::InvalidRadii`] if a
    /// quadric update leaves the valid manifold.
    pub fn retract(&self, delta: &DVector<f64>) -> QuadricResult<VariableValue> {
        let expected = self.dof();
        if delta.len() != expected {
            return Err(QuadricError::DimensionMismatch {
                expected,
                actual: delta.len(),
            });
        }
        match self {
            VariableValue::Pose(pose) => {
                let tangent = Vector6::from_column_slice(delta.as_slice());
                Ok(VariableValue::Pose(pose.retract(&tangent)))
            }
            VariableValue::Quadric(quadric) => {
                let tangent = Vector9::from_column_slice(delta.as_slice());
                Ok(VariableValue::Quadric(quadric.retract(&tangent)?))
            }
        }
    }

    /// Tangent-space difference to another variable of the same type.
    ///
    /// # Errors
    /// [`QuadricError::DimensionMismatch`] if the variable types differ.
    pub fn local_coordinates(&self, other: &VariableValue) -> QuadricResult<DVector<f64>> {
        match (self, other) {
            (VariableValue::Pose(a), VariableValue::Pose(b)) => {
                Ok(DVector::from_column_slice(a.local_coordinates(b).as_slice()))
            }
            (VariableValue::Quadric(a), VariableValue::Quadric(b)) => {
                Ok(DVector::from_column_slice(a.local_coordinates(b).as_slice()))
            }
            _ => Err(QuadricError::DimensionMismatch {
                expected: self.dof(),
                actual: other.dof(),
            }),
        }
    }
}

/// Container mapping keys to variable values.
#[derive(Debug, Clone, Default)]
pub struct Values {
    variables: HashMap<Key, VariableValue>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pose variable.
    pub fn insert_pose(&mut self, key: Key, pose: SE3) {
        self.variables.insert(key, VariableValue::Pose(pose));
    }

    /// Insert or replace a quadric variable.
    pub fn insert_quadric(&mut self, key: Key, quadric: ConstrainedDualQuadric) {
        self.variables.insert(key, VariableValue::Quadric(quadric));
    }

    /// Look up a pose by key.
    ///
    /// # Errors
    /// [`QuadricError::UnknownVariable`] if the key is missing or bound to
    /// a different variable type.
    pub fn pose(&self, key: Key) -> QuadricResult<&SE3> {
        match self.variables.get(&key) {
            Some(VariableValue::Pose(pose)) => Ok(pose),
            _ => Err(QuadricError::UnknownVariable(key)),
        }
    }

    /// Look up a quadric by key.
    ///
    /// # Errors
    /// [`QuadricError::UnknownVariable`] if the key is missing or bound to
    /// a different variable type.
    pub fn quadric(&self, key: Key) -> QuadricResult<&ConstrainedDualQuadric> {
        match self.variables.get(&key) {
            Some(VariableValue::Quadric(quadric)) => Ok(quadric),
            _ => Err(QuadricError::UnknownVariable(key)),
        }
    }

    /// Look up any variable by key.
    pub fn get(&self, key: Key) -> Option<&VariableValue> {
        self.variables.get(&key)
    }

    /// Apply a tangent update to the variable stored under `key`.
    pub fn retract_in_place(&mut self, key: Key, delta: &DVector<f64>) -> QuadricResult<()> {
        let current = self
            .variables
            .get(&key)
            .ok_or(QuadricError::UnknownVariable(key))?;
        let updated = current.retract(delta)?;
        self.variables.insert(key, updated);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.variables.contains_key(&key)
    }

    /// Iterate over (key, variable) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &VariableValue)> {
        self.variables.iter()
    }
}
