use crate::error::*;

use anyhow::anyhow;

/// Iterator extension for extracting a single item
pub trait Single {
    type Item;

    /// Extract a single item, erroring if the iterator yields none or more than one.
    fn single(&mut self) -> PfResult<Self::Item>;

    /// Extract zero or one item, erroring if the iterator yields more than one.
    fn single_or_none(&mut self) -> PfResult<Option<Self::Item>>;
}

impl<I: Iterator> Single for I {
    type Item = I::Item;

    fn single(&mut self) -> PfResult<Self::Item> {
        self.single_or_none()?
            .ok_or_else(|| anyhow!("expected a single row, got none").into())
    }

    fn single_or_none(&mut self) -> PfResult<Option<Self::Item>> {
        match (self.next(), self.next()) {
            (first, None) => Ok(first),
            (_, Some(_)) => Err(anyhow!("expected at most one row, got several").into()),
        }
    }
}
