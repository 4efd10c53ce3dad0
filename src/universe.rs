//! Universe configuration: the bounds of the element ID space.
//!
//! A [`Universe`] is a plain value handed to the manager at construction
//! ([`ZddManager::with_universe`][crate::zdd::ZddManager::with_universe]), so
//! independent managers with different bounds can coexist.
//!
//! - `elem_limit` is the hard ceiling: no element above it can ever be used.
//! - `num_elems` is the ground set `{1..num_elems}` that operations such as
//!   `flip()`, `invert()` and `hitting()` complement against. It grows on its
//!   own as larger elements are used.

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Universe {
    elem_limit: u32,
    num_elems: u32,
}

impl Universe {
    /// Default element ceiling.
    pub const DEFAULT_ELEM_LIMIT: u32 = 65_535;

    /// Creates a universe with the given ceiling and no elements in play.
    pub fn new(elem_limit: u32) -> Result<Self> {
        if elem_limit == 0 {
            return Err(Error::RangeViolation("element limit must be positive".to_string()));
        }
        Ok(Self {
            elem_limit,
            num_elems: 0,
        })
    }

    /// Sets the initial ground-set size.
    pub fn with_num_elems(mut self, num_elems: u32) -> Result<Self> {
        self.set_num_elems(num_elems, 0)?;
        Ok(self)
    }

    pub fn elem_limit(&self) -> u32 {
        self.elem_limit
    }

    pub fn num_elems(&self) -> u32 {
        self.num_elems
    }

    /// Changes the ceiling. It may not drop below `in_use`, the largest
    /// element any diagram refers to, nor below `num_elems`.
    pub(crate) fn set_elem_limit(&mut self, elem_limit: u32, in_use: u32) -> Result<()> {
        if elem_limit == 0 || elem_limit < in_use || elem_limit < self.num_elems {
            return Err(Error::RangeViolation(format!(
                "element limit {} is below the {} elements in play",
                elem_limit,
                in_use.max(self.num_elems)
            )));
        }
        self.elem_limit = elem_limit;
        Ok(())
    }

    pub(crate) fn set_num_elems(&mut self, num_elems: u32, in_use: u32) -> Result<()> {
        if num_elems > self.elem_limit {
            return Err(Error::RangeViolation(format!(
                "{} elements exceed the element limit {}",
                num_elems, self.elem_limit
            )));
        }
        if num_elems < in_use {
            return Err(Error::RangeViolation(format!(
                "cannot shrink to {} elements while element {} is in use",
                num_elems, in_use
            )));
        }
        self.num_elems = num_elems;
        Ok(())
    }

    /// Validates an element and widens `num_elems` to cover it.
    pub(crate) fn admit(&mut self, elem: u64) -> Result<u32> {
        if elem == 0 || elem > self.elem_limit as u64 {
            return Err(Error::OutOfRange {
                elem,
                limit: self.elem_limit,
            });
        }
        let elem = elem as u32;
        self.num_elems = self.num_elems.max(elem);
        Ok(elem)
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            elem_limit: Self::DEFAULT_ELEM_LIMIT,
            num_elems: 0,
        }
    }
}
