use super::ranking::{compare_standings, GroupTable};
use crate::models::{GroupSet, ThirdPlaceEntry};
use serde::{Deserialize, Serialize};

/// Every group's third-placed team, ranked across groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPlacePool {
    pub entries: Vec<ThirdPlaceEntry>,
}

impl ThirdPlacePool {
    /// Entries flagged as qualified, in pool order.
    pub fn qualifiers(&self) -> impl Iterator<Item = &ThirdPlaceEntry> {
        self.entries.iter().filter(|e| e.qualified)
    }

    pub fn qualifying_groups(&self) -> GroupSet {
        self.qualifiers().map(ThirdPlaceEntry::group).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThirdPlaceRanker {
    qualifying: usize,
}

impl Default for ThirdPlaceRanker {
    fn default() -> Self {
        Self { qualifying: 8 }
    }
}

impl ThirdPlaceRanker {
    pub fn new(qualifying: usize) -> Self {
        Self { qualifying }
    }

    /// Rank the third row of each table. Groups without a third row are
    /// skipped; the first `qualifying` entries are flagged.
    pub fn rank(&self, tables: &[GroupTable]) -> ThirdPlacePool {
        let mut thirds: Vec<_> = tables.iter().filter_map(GroupTable::third).cloned().collect();
        thirds.sort_by(compare_standings);

        let entries = thirds
            .into_iter()
            .enumerate()
            .map(|(index, standing)| ThirdPlaceEntry {
                standing,
                pool_rank: u8::try_from(index + 1).unwrap_or(u8::MAX),
                qualified: index < self.qualifying,
            })
            .collect();
        ThirdPlacePool { entries }
    }
}
