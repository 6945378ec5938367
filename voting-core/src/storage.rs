//! Persistent storage using RocksDB
//!
//! # Column Families
//!
//! - `entities` - Voter and candidate records (key: tag byte || id)
//! - `index` - Composite-key index entries (key: name 0x00 attrs 0x00)
//! - `meta` - Format marker and bookkeeping
//!
//! The store stamps a format marker into `meta` on first open and
//! refuses to open data written with an incompatible layout.

use crate::store::{BatchOp, KeyValueStore, Keyspace, WriteBatch};
use crate::{Config, Error, Result};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBCompactionStyle, Direction, IteratorMode,
    Options, DB,
};
use std::sync::Arc;

/// Meta key holding the on-disk format marker
const FORMAT_KEY: &[u8] = b"format";

/// Current on-disk format
const FORMAT_VERSION: &[u8] = b"tokenvote-1";

/// RocksDB-backed store
pub struct RocksStore {
    db: Arc<DB>,
}

impl RocksStore {
    /// Open or create the database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_target_file_size_base(config.rocksdb.target_file_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);
        db_opts.set_level_zero_file_num_compaction_trigger(
            config.rocksdb.level0_file_num_compaction_trigger,
        );

        // Universal compaction: polling windows are write-heavy
        db_opts.set_compaction_style(DBCompactionStyle::Universal);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        // Column family descriptors
        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(Keyspace::Entities.cf_name(), Self::cf_options_entities()),
            ColumnFamilyDescriptor::new(Keyspace::Index.cf_name(), Self::cf_options_index()),
            ColumnFamilyDescriptor::new(Keyspace::Meta.cf_name(), Self::cf_options_meta()),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;
        let store = Self { db: Arc::new(db) };
        store.check_format()?;

        tracing::info!(
            "Opened RocksDB at {:?} with {} column families",
            path,
            Keyspace::ALL.len()
        );

        Ok(store)
    }

    // Column family options

    fn cf_options_entities() -> Options {
        let mut opts = Options::default();
        // Records are read back on every operation, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_options_index() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        // Index lookups benefit from bloom filters
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false); // 10 bits per key
        opts.set_block_based_table_factory(&block_opts);
        opts
    }

    fn cf_options_meta() -> Options {
        Options::default()
    }

    // Helper: get column family handle

    fn cf(&self, space: Keyspace) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(space.cf_name())
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", space.cf_name())))
    }

    /// Verify the on-disk format marker, stamping it on first open
    fn check_format(&self) -> Result<()> {
        let cf = self.cf(Keyspace::Meta)?;
        match self.db.get_cf(&cf, FORMAT_KEY)? {
            None => {
                self.db.put_cf(&cf, FORMAT_KEY, FORMAT_VERSION)?;
                tracing::debug!(
                    format = %String::from_utf8_lossy(FORMAT_VERSION),
                    "Stamped data format marker"
                );
                Ok(())
            }
            Some(found) if found == FORMAT_VERSION => Ok(()),
            Some(found) => Err(Error::Config(format!(
                "incompatible data format {:?}, expected {:?}",
                String::from_utf8_lossy(&found),
                String::from_utf8_lossy(FORMAT_VERSION)
            ))),
        }
    }

    // Statistics

    /// Approximate entity and index entry counts
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            entities: self.approximate_count(Keyspace::Entities)?,
            index_entries: self.approximate_count(Keyspace::Index)?,
        })
    }

    fn approximate_count(&self, space: Keyspace) -> Result<u64> {
        let cf = self.cf(space)?;
        // RocksDB property for approximate count
        let count = self
            .db
            .property_int_value_cf(&cf, "rocksdb.estimate-num-keys")?
            .unwrap_or(0);
        Ok(count)
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl KeyValueStore for RocksStore {
    fn get(&self, space: Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(space)?;
        Ok(self.db.get_cf(&cf, key)?)
    }

    fn put(&self, space: Keyspace, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.cf(space)?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn delete(&self, space: Keyspace, key: &[u8]) -> Result<()> {
        let cf = self.cf(space)?;
        self.db.delete_cf(&cf, key)?;
        Ok(())
    }

    fn scan_prefix(&self, space: Keyspace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(space)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }

    fn scan_range(
        &self,
        space: Keyspace,
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        if start >= end {
            return Ok(Vec::new());
        }

        let cf = self.cf(space)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(start, Direction::Forward));

        let mut entries = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if key.as_ref() >= end {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }

    fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut inner = rocksdb::WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { space, key, value } => {
                    let cf = self.cf(space)?;
                    inner.put_cf(&cf, key, value);
                }
                BatchOp::Delete { space, key } => {
                    let cf = self.cf(space)?;
                    inner.delete_cf(&cf, key);
                }
            }
        }

        // Atomic commit
        self.db.write(inner)?;
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Approximate number of entity records
    pub entities: u64,

    /// Approximate number of index entries
    pub index_entries: u64,
}
