/*
Block storage.

BlockStore is the only way scoring code reaches data. Two backends:
- JsonStore: one JSON document on disk, rewritten atomically (tmp + rename)
- MemoryStore: same document kept in memory, for tests and demos

Both share the document operations implemented on Db below.
*/

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::categories::{self, WeightMap};
use crate::error::{AppError, AppResult};
use crate::models::{Block, BlockInput, Category, Db, FilledBlock, StoreStats};
use crate::slots;

pub const MAX_MEMO_CHARS: usize = 200;

pub type RangeBlocks = HashMap<NaiveDate, Vec<FilledBlock>>;

pub trait BlockStore: Send + Sync {
    fn categories(&self) -> AppResult<Vec<Category>>;

    fn weight_map(&self) -> AppResult<WeightMap> {
        Ok(WeightMap::from_categories(&self.categories()?))
    }

    /// All 80 blocks of `date`, unset slots included.
    fn day_blocks(&self, date: NaiveDate) -> AppResult<Vec<Block>>;

    /// Slot-ascending blocks of `date` that carry a category.
    fn filled_blocks(&self, date: NaiveDate) -> AppResult<Vec<FilledBlock>>;

    /// Filled blocks for every date in `start..=end` that has any.
    fn filled_blocks_for_range(&self, start: NaiveDate, end: NaiveDate)
        -> AppResult<RangeBlocks>;

    fn upsert_block(&self, update: BlockUpdate) -> AppResult<Block>;

    /// Applies all updates in one write. Returns how many were applied.
    fn bulk_upsert(&self, updates: Vec<BlockUpdate>) -> AppResult<usize>;

    fn stats(&self) -> AppResult<StoreStats>;
}

// A BlockInput that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockUpdate {
    pub date: NaiveDate,
    pub slot_index: i64,
    pub category: Option<String>,
    pub focus: Option<i64>,
    pub memo: Option<String>,
}

impl BlockUpdate {
    pub fn validate(input: BlockInput) -> AppResult<Self> {
        let date = slots::parse_date(&input.date)?;
        let slot_index = slots::validate_slot(input.slot_index)?;
        let focus = slots::validate_focus(input.focus)?;

        if let Some(memo) = &input.memo {
            let chars = memo.chars().count();
            if chars > MAX_MEMO_CHARS {
                return Err(AppError::Validation(format!(
                    "memo must be at most {MAX_MEMO_CHARS} characters: got {chars}"
                )));
            }
        }

        // blank category clears the slot
        let category = input
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            date,
            slot_index,
            category,
            focus,
            memo: input.memo,
        })
    }
}

pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    let local = chrono::Local::now();
    local.fixed_offset()
}

impl Db {
    pub fn seeded() -> Self {
        Self {
            categories: categories::default_categories(),
            blocks: Vec::new(),
        }
    }

    fn day_blocks(&self, date: NaiveDate) -> Vec<Block> {
        let existing: HashMap<i64, &Block> = self
            .blocks
            .iter()
            .filter(|b| b.date == date)
            .map(|b| (b.slot_index, b))
            .collect();

        slots::all_slots()
            .into_iter()
            .map(|(i, start_time)| match existing.get(&i) {
                Some(b) => (*b).clone(),
                None => Block {
                    date,
                    slot_index: i,
                    start_time,
                    category: None,
                    focus: None,
                    memo: None,
                    created_at: None,
                    updated_at: None,
                },
            })
            .collect()
    }

    fn filled_blocks(&self, date: NaiveDate) -> Vec<FilledBlock> {
        let mut filled: Vec<FilledBlock> = self
            .blocks
            .iter()
            .filter(|b| b.date == date)
            .filter_map(to_filled)
            .collect();
        filled.sort_by_key(|b| b.slot_index);
        filled
    }

    fn filled_blocks_for_range(&self, start: NaiveDate, end: NaiveDate) -> RangeBlocks {
        let mut by_date: RangeBlocks = HashMap::new();
        for b in self.blocks.iter().filter(|b| b.date >= start && b.date <= end) {
            if let Some(filled) = to_filled(b) {
                by_date.entry(b.date).or_default().push(filled);
            }
        }
        for blocks in by_date.values_mut() {
            blocks.sort_by_key(|b| b.slot_index);
        }
        by_date
    }

    fn upsert(&mut self, update: BlockUpdate, now: DateTime<FixedOffset>) -> AppResult<Block> {
        let start_time = slots::slot_to_time(update.slot_index)?;

        if let Some(b) = self
            .blocks
            .iter_mut()
            .find(|b| b.date == update.date && b.slot_index == update.slot_index)
        {
            b.category = update.category;
            b.focus = update.focus;
            b.memo = update.memo;
            b.updated_at = Some(now);
            return Ok(b.clone());
        }

        let block = Block {
            date: update.date,
            slot_index: update.slot_index,
            start_time,
            category: update.category,
            focus: update.focus,
            memo: update.memo,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.blocks.push(block.clone());
        Ok(block)
    }

    fn stats(&self) -> StoreStats {
        let filled: Vec<&Block> = self.blocks.iter().filter(|b| b.category.is_some()).collect();
        let total = self.blocks.len() as i64;

        StoreStats {
            total_blocks: total,
            filled_blocks: filled.len() as i64,
            fill_rate: filled.len() as f64 / total.max(1) as f64,
            first_date: filled.iter().map(|b| b.date).min(),
            last_date: filled.iter().map(|b| b.date).max(),
            total_categories: self.categories.len() as i64,
        }
    }

    // Stable on-disk ordering so diffs of the file stay readable
    fn sort_blocks(&mut self) {
        self.blocks.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.slot_index.cmp(&b.slot_index))
        });
    }
}

fn to_filled(b: &Block) -> Option<FilledBlock> {
    b.category
        .as_deref()
        .map(|c| FilledBlock::new(b.slot_index, c, b.focus))
}

// -----------------------------
// JSON file backend
// -----------------------------
pub struct JsonStore {
    path: PathBuf,
    // serializes load -> modify -> save cycles
    lock: Mutex<()>,
}

impl JsonStore {
    /// Opens the store at `path`, creating a seeded document if missing.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };

        if !store.path.exists() {
            tracing::info!(path = %store.path.display(), "creating new store with default categories");
            store.save_db(&Db::seeded())?;
        } else {
            let mut db = store.load_db()?;
            if db.categories.is_empty() {
                tracing::info!("store has no categories, seeding defaults");
                db.categories = categories::default_categories();
                store.save_db(&db)?;
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_db(&self) -> AppResult<Db> {
        let text = fs::read_to_string(&self.path)?;
        let db: Db = serde_json::from_str(&text)?;
        Ok(db)
    }

    fn save_db(&self, db: &Db) -> AppResult<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(db)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&tmp_path, text)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Db) -> AppResult<T>) -> AppResult<T> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let db = self.load_db()?;
        f(&db)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Db) -> AppResult<T>) -> AppResult<T> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut db = self.load_db()?;
        let out = f(&mut db)?;
        db.sort_blocks();
        self.save_db(&db)?;
        Ok(out)
    }
}

fn poisoned() -> AppError {
    AppError::Storage(io::Error::new(io::ErrorKind::Other, "store lock poisoned"))
}

impl BlockStore for JsonStore {
    fn categories(&self) -> AppResult<Vec<Category>> {
        self.read(|db| Ok(categories::ordered(db.categories.clone())))
    }

    fn day_blocks(&self, date: NaiveDate) -> AppResult<Vec<Block>> {
        self.read(|db| Ok(db.day_blocks(date)))
    }

    fn filled_blocks(&self, date: NaiveDate) -> AppResult<Vec<FilledBlock>> {
        self.read(|db| Ok(db.filled_blocks(date)))
    }

    fn filled_blocks_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<RangeBlocks> {
        self.read(|db| Ok(db.filled_blocks_for_range(start, end)))
    }

    fn upsert_block(&self, update: BlockUpdate) -> AppResult<Block> {
        let now = now_fixed_offset();
        self.write(|db| db.upsert(update, now))
    }

    fn bulk_upsert(&self, updates: Vec<BlockUpdate>) -> AppResult<usize> {
        let now = now_fixed_offset();
        self.write(|db| {
            let n = updates.len();
            for u in updates {
                db.upsert(u, now)?;
            }
            Ok(n)
        })
    }

    fn stats(&self) -> AppResult<StoreStats> {
        self.read(|db| Ok(db.stats()))
    }
}

// -----------------------------
// In-memory backend
// -----------------------------
pub struct MemoryStore {
    db: Mutex<Db>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_categories(categories::default_categories())
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            db: Mutex::new(Db {
                categories,
                blocks: Vec::new(),
            }),
        }
    }

    fn with_db<T>(&self, f: impl FnOnce(&mut Db) -> AppResult<T>) -> AppResult<T> {
        let mut db = self.db.lock().map_err(|_| poisoned())?;
        f(&mut db)
    }
}

impl BlockStore for MemoryStore {
    fn categories(&self) -> AppResult<Vec<Category>> {
        self.with_db(|db| Ok(categories::ordered(db.categories.clone())))
    }

    fn day_blocks(&self, date: NaiveDate) -> AppResult<Vec<Block>> {
        self.with_db(|db| Ok(db.day_blocks(date)))
    }

    fn filled_blocks(&self, date: NaiveDate) -> AppResult<Vec<FilledBlock>> {
        self.with_db(|db| Ok(db.filled_blocks(date)))
    }

    fn filled_blocks_for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<RangeBlocks> {
        self.with_db(|db| Ok(db.filled_blocks_for_range(start, end)))
    }

    fn upsert_block(&self, update: BlockUpdate) -> AppResult<Block> {
        let now = now_fixed_offset();
        self.with_db(|db| db.upsert(update, now))
    }

    fn bulk_upsert(&self, updates: Vec<BlockUpdate>) -> AppResult<usize> {
        let now = now_fixed_offset();
        self.with_db(|db| {
            let n = updates.len();
            for u in updates {
                db.upsert(u, now)?;
            }
            Ok(n)
        })
    }

    fn stats(&self) -> AppResult<StoreStats> {
        self.with_db(|db| Ok(db.stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        slots::parse_date(s).unwrap()
    }

    fn update(d: &str, slot: i64, category: Option<&str>, focus: Option<i64>) -> BlockUpdate {
        BlockUpdate {
            date: date(d),
            slot_index: slot,
            category: category.map(str::to_string),
            focus,
            memo: None,
        }
    }

    fn input(slot_index: i64, focus: Option<i64>, memo: Option<String>) -> BlockInput {
        BlockInput {
            date: "2024-05-01".into(),
            slot_index,
            category: Some("STUDY".into()),
            focus,
            memo,
        }
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert!(BlockUpdate::validate(input(0, Some(3), None)).is_ok());
        assert!(matches!(
            BlockUpdate::validate(input(80, None, None)),
            Err(AppError::OutOfRange(_))
        ));
        assert!(matches!(
            BlockUpdate::validate(input(0, Some(9), None)),
            Err(AppError::OutOfRange(_))
        ));
        assert!(matches!(
            BlockUpdate::validate(input(0, None, Some("x".repeat(201)))),
            Err(AppError::Validation(_))
        ));

        let mut bad_date = input(0, None, None);
        bad_date.date = "01-05-2024".into();
        assert!(matches!(
            BlockUpdate::validate(bad_date),
            Err(AppError::InvalidFormat(_))
        ));
    }

    #[test]
    fn blank_category_clears() {
        let mut i = input(3, None, None);
        i.category = Some("  ".into());
        assert_eq!(BlockUpdate::validate(i).unwrap().category, None);
    }

    #[test]
    fn day_always_has_80_blocks() {
        let store = MemoryStore::new();
        store.upsert_block(update("2024-05-01", 10, Some("STUDY"), Some(4))).unwrap();

        let blocks = store.day_blocks(date("2024-05-01")).unwrap();
        assert_eq!(blocks.len(), 80);
        assert_eq!(blocks[0].start_time, "04:00");
        assert_eq!(blocks[10].category.as_deref(), Some("STUDY"));
        assert!(blocks[10].created_at.is_some());
        assert!(blocks[11].category.is_none());
        assert!(blocks[11].created_at.is_none());
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let store = MemoryStore::new();
        store.upsert_block(update("2024-05-01", 2, Some("STUDY"), None)).unwrap();
        let b = store.upsert_block(update("2024-05-01", 2, Some("SNS"), Some(2))).unwrap();
        assert_eq!(b.category.as_deref(), Some("SNS"));

        let filled = store.filled_blocks(date("2024-05-01")).unwrap();
        assert_eq!(filled, vec![FilledBlock::new(2, "SNS", Some(2))]);
        assert_eq!(store.stats().unwrap().total_blocks, 1);
    }

    #[test]
    fn filled_blocks_skip_cleared_and_sort() {
        let store = MemoryStore::new();
        store
            .bulk_upsert(vec![
                update("2024-05-01", 9, Some("BLOG"), None),
                update("2024-05-01", 1, Some("STUDY"), None),
                update("2024-05-01", 4, None, None),
                update("2024-05-02", 0, Some("SNS"), None),
            ])
            .unwrap();

        let filled = store.filled_blocks(date("2024-05-01")).unwrap();
        let slots: Vec<i64> = filled.iter().map(|b| b.slot_index).collect();
        assert_eq!(slots, vec![1, 9]);
    }

    #[test]
    fn range_groups_by_date() {
        let store = MemoryStore::new();
        store
            .bulk_upsert(vec![
                update("2024-04-30", 0, Some("SNS"), None),
                update("2024-05-01", 5, Some("STUDY"), None),
                update("2024-05-01", 3, Some("STUDY"), None),
                update("2024-05-03", 0, None, None),
            ])
            .unwrap();

        let range = store
            .filled_blocks_for_range(date("2024-05-01"), date("2024-05-03"))
            .unwrap();
        assert_eq!(range.len(), 1);
        let day = &range[&date("2024-05-01")];
        assert_eq!(day[0].slot_index, 3);
        assert_eq!(day[1].slot_index, 5);
    }

    #[test]
    fn stats_report_fill_rate() {
        let store = MemoryStore::new();
        assert_eq!(store.stats().unwrap().fill_rate, 0.0);

        store
            .bulk_upsert(vec![
                update("2024-05-01", 0, Some("STUDY"), None),
                update("2024-05-03", 0, Some("STUDY"), None),
                update("2024-05-02", 0, None, None),
                update("2024-05-09", 0, None, None),
            ])
            .unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_blocks, 4);
        assert_eq!(stats.filled_blocks, 2);
        assert_eq!(stats.fill_rate, 0.5);
        assert_eq!(stats.first_date, Some(date("2024-05-01")));
        assert_eq!(stats.last_date, Some(date("2024-05-03")));
        assert_eq!(stats.total_categories, 16);
    }

    #[test]
    fn json_store_seeds_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("focus.json");

        let store = JsonStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.categories().unwrap().len(), 16);

        store
            .upsert_block(update("2024-05-01", 7, Some("AI"), Some(5)))
            .unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).unwrap();
        let filled = reopened.filled_blocks(date("2024-05-01")).unwrap();
        assert_eq!(filled, vec![FilledBlock::new(7, "AI", Some(5))]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_store_reseeds_empty_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.json");
        fs::write(&path, r#"{"categories": [], "blocks": []}"#).unwrap();

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.weight_map().unwrap().weight_of("ENGLISH"), 4);
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonStore::open(&path), Err(AppError::Serde(_))));
    }
}
