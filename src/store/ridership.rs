//! Ridership rows grouped by census block.

use std::collections::HashMap;

use crate::models::{BlockId, RidershipRecord};

pub struct RidershipTable {
    records: Vec<RidershipRecord>,
    /// Blocks in first-seen order.
    blocks: Vec<BlockId>,
    rows_by_block: HashMap<BlockId, Vec<usize>>,
}

impl RidershipTable {
    pub fn new(records: Vec<RidershipRecord>) -> Self {
        let mut blocks = Vec::new();
        let mut rows_by_block: HashMap<BlockId, Vec<usize>> = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let rows = rows_by_block.entry(record.block.clone()).or_default();
            if rows.is_empty() {
                blocks.push(record.block.clone());
            }
            rows.push(index);
        }

        Self {
            records,
            blocks,
            rows_by_block,
        }
    }

    /// All rows recorded for `block`, in input order.
    pub fn rows_for<'a>(&'a self, block: &str) -> impl Iterator<Item = &'a RidershipRecord> + 'a {
        self.rows_by_block
            .get(block)
            .into_iter()
            .flatten()
            .map(|&index| &self.records[index])
    }

    pub fn has_block(&self, block: &str) -> bool {
        self.rows_by_block.contains_key(block)
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn records(&self) -> &[RidershipRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(block: &str, aforo: f64) -> RidershipRecord {
        RidershipRecord {
            block: BlockId::new(block),
            up_net: Some(1.0),
            down_net: Some(1.0),
            flujo: Some(2.0),
            aforo: Some(aforo),
            hora: None,
        }
    }

    #[test]
    fn test_groups_rows_by_block() {
        let table = RidershipTable::new(vec![
            row("B2", 10.0),
            row("B1", 20.0),
            row("B2", 30.0),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.blocks(), &[BlockId::new("B2"), BlockId::new("B1")]);

        let aforos: Vec<_> = table.rows_for("B2").filter_map(|r| r.aforo).collect();
        assert_eq!(aforos, vec![10.0, 30.0]);
        assert!(table.has_block("B1"));
        assert_eq!(table.rows_for("B9").count(), 0);
    }
}
