//! Parameter grid expansion
//!
//! A [`ParameterGrid`] is a list of named axes. Expansion produces the
//! cartesian product with the first declared axis outermost and the last
//! axis varying fastest, so
//!
//! ```text
//! dsp1st_bits = [3, 4], max_factor = [80, 90]
//! ```
//!
//! yields ids `0..4` for `(3,80) (3,90) (4,80) (4,90)`. The mapping from id
//! to parameters is a pure function of the axes, which keeps raw-capture files
//! from repeated runs comparable line by line.

use crate::error::{Error, Result};
use crate::types::{ParamValue, Parameters, WorkItem};
use std::ops::Range;

/// One named parameter domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    /// Parameter name
    pub name: String,
    /// Values in traversal order
    pub values: Vec<ParamValue>,
}

/// Cartesian product of parameter domains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterGrid {
    axes: Vec<Axis>,
}

impl ParameterGrid {
    /// Grid with no axes
    pub fn new() -> Self {
        ParameterGrid { axes: Vec::new() }
    }

    /// Flat integer range over a single parameter
    pub fn range(name: impl Into<String>, range: Range<i64>) -> Self {
        ParameterGrid::new().axis(name, range)
    }

    /// Add an axis; it varies faster than every axis added before it
    pub fn axis<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.axes.push(Axis {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Declared axes
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of work items [`expand`](Self::expand) will produce
    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// Check if expansion yields nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand into work items with ids `0..len()`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if two axes share a name.
    pub fn expand(&self) -> Result<Vec<WorkItem>> {
        for (i, axis) in self.axes.iter().enumerate() {
            if self.axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(Error::configuration(format!(
                    "duplicate grid axis '{}'",
                    axis.name
                )));
            }
        }

        let total = self.len();
        let mut items = Vec::with_capacity(total);
        // Mixed-radix counter: digit i indexes into axes[i].values
        let mut digits = vec![0usize; self.axes.len()];
        for id in 0..total {
            let parameters: Parameters = self
                .axes
                .iter()
                .zip(&digits)
                .map(|(axis, &d)| (axis.name.clone(), axis.values[d].clone()))
                .collect();
            items.push(WorkItem::new(id, parameters));

            for pos in (0..digits.len()).rev() {
                digits[pos] += 1;
                if digits[pos] < self.axes[pos].values.len() {
                    break;
                }
                digits[pos] = 0;
            }
        }
        Ok(items)
    }
}
