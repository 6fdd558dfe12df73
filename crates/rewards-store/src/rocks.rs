//! `RocksDB` storage implementation.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use chrono::{DateTime, Utc};
use rewards_core::{
    CoinSource, CoinTransaction, ReferralProfile, TransactionId, TransactionType, UserId, Wallet,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Collect a user's transaction ids from the index, oldest first.
    fn user_transaction_ids(&self, user_id: &UserId) -> Result<Vec<TransactionId>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_transactions_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            ids.push(keys::extract_transaction_id_from_user_key(&key));
        }

        Ok(ids)
    }

    /// Load a user's full transaction log, oldest first.
    fn scan_user_transactions(&self, user_id: &UserId) -> Result<Vec<CoinTransaction>> {
        let mut transactions = Vec::new();
        for tx_id in self.user_transaction_ids(user_id)? {
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }
        Ok(transactions)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    fn put_wallet(&self, wallet: &Wallet) -> Result<()> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(&wallet.user_id);
        let value = Self::serialize(wallet)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    fn put_profile(&self, profile: &ReferralProfile) -> Result<()> {
        let cf = self.cf(cf::PROFILES)?;
        let key = keys::profile_key(&profile.user_id);
        let value = Self::serialize(profile)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_profile(&self, user_id: &UserId) -> Result<Option<ReferralProfile>> {
        let cf = self.cf(cf::PROFILES)?;
        let key = keys::profile_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CoinTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>> {
        let mut ids = self.user_transaction_ids(user_id)?;
        ids.reverse(); // Newest first

        let mut transactions = Vec::new();
        for tx_id in ids.into_iter().skip(offset).take(limit) {
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    fn sum_earned_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        let total = self
            .scan_user_transactions(user_id)?
            .iter()
            .filter(|tx| tx.counts_toward_monthly_limit())
            .filter(|tx| start <= tx.created_at && tx.created_at < end)
            .map(|tx| tx.amount)
            .sum();

        Ok(total)
    }

    fn has_earned_from_source(&self, user_id: &UserId, source: &CoinSource) -> Result<bool> {
        let found = self.scan_user_transactions(user_id)?.iter().any(|tx| {
            tx.transaction_type == TransactionType::Earned && tx.source == *source
        });

        Ok(found)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn commit_change(&self, wallet: &Wallet, transaction: &CoinTransaction) -> Result<()> {
        let cf_wallets = self.cf(cf::WALLETS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        let wallet_key = keys::wallet_key(&wallet.user_id);
        let tx_key = keys::transaction_key(&transaction.id);
        let user_tx_key = keys::user_transaction_key(&transaction.user_id, &transaction.id);

        let wallet_value = Self::serialize(wallet)?;
        let tx_value = Self::serialize(transaction)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_wallets, &wallet_key, &wallet_value);
        batch.put_cf(&cf_tx, &tx_key, &tx_value);
        batch.put_cf(&cf_tx_by_user, &user_tx_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn commit_earn(store: &RocksStore, wallet: &mut Wallet, amount: i64, source: CoinSource) {
        wallet.balance += amount;
        wallet.lifetime_earned += amount;
        wallet.updated_at = Utc::now();
        let tx = CoinTransaction::earned(
            wallet.user_id,
            amount,
            source,
            String::new(),
            wallet.balance,
        );
        store.commit_change(wallet, &tx).unwrap();
        // ULIDs are generated at creation time; keep them distinct
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    #[test]
    fn wallet_crud() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();

        assert!(store.get_wallet(&user_id).unwrap().is_none());

        let mut wallet = Wallet::new(user_id);
        wallet.balance = 500;
        store.put_wallet(&wallet).unwrap();

        let retrieved = store.get_wallet(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.balance, 500);
    }

    #[test]
    fn profile_roundtrip() {
        let (store, _dir) = create_test_store();
        let user_id = UserId::generate();
        let referrer = UserId::generate();

        let profile = ReferralProfile::new(user_id, Some(referrer));
        store.put_profile(&profile).unwrap();

        let retrieved = store.get_profile(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.referred_by, Some(referrer));
    }

    #[test]
    fn list_transactions_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let mut wallet = Wallet::new(UserId::generate());
        store.put_wallet(&wallet).unwrap();

        let user_id = wallet.user_id;
        commit_earn(&store, &mut wallet, 10, CoinSource::Mining);
        commit_earn(&store, &mut wallet, 20, CoinSource::Quiz);
        commit_earn(&store, &mut wallet, 30, CoinSource::Task);

        let all = store.list_transactions_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].amount, 30); // Newest first
        assert_eq!(all[2].amount, 10);

        let page = store.list_transactions_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount, 20);
    }

    #[test]
    fn list_does_not_leak_across_users() {
        let (store, _dir) = create_test_store();
        let mut alice = Wallet::new(UserId::generate());
        let mut bob = Wallet::new(UserId::generate());
        store.put_wallet(&alice).unwrap();
        store.put_wallet(&bob).unwrap();

        commit_earn(&store, &mut alice, 10, CoinSource::Mining);
        commit_earn(&store, &mut bob, 99, CoinSource::Task);

        let txs = store
            .list_transactions_by_user(&alice.user_id, 10, 0)
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 10);
    }

    #[test]
    fn sum_excludes_referral_and_spends() {
        let (store, _dir) = create_test_store();
        let mut wallet = Wallet::new(UserId::generate());
        store.put_wallet(&wallet).unwrap();
        let user_id = wallet.user_id;

        commit_earn(&store, &mut wallet, 300, CoinSource::Mining);
        commit_earn(&store, &mut wallet, 100, CoinSource::Referral);

        wallet.balance -= 50;
        wallet.lifetime_spent += 50;
        let spend = CoinTransaction::spent(
            user_id,
            50,
            CoinSource::Redemption,
            String::new(),
            wallet.balance,
        );
        store.commit_change(&wallet, &spend).unwrap();

        let now = Utc::now();
        let total = store
            .sum_earned_in_range(&user_id, now - Duration::hours(1), now + Duration::hours(1))
            .unwrap();
        assert_eq!(total, 300);
    }

    #[test]
    fn sum_respects_time_range() {
        let (store, _dir) = create_test_store();
        let mut wallet = Wallet::new(UserId::generate());
        store.put_wallet(&wallet).unwrap();
        let user_id = wallet.user_id;

        commit_earn(&store, &mut wallet, 250, CoinSource::Task);

        let now = Utc::now();
        let in_window = store
            .sum_earned_in_range(&user_id, now - Duration::hours(1), now + Duration::hours(1))
            .unwrap();
        assert_eq!(in_window, 250);

        let before_window = store
            .sum_earned_in_range(&user_id, now - Duration::hours(2), now - Duration::hours(1))
            .unwrap();
        assert_eq!(before_window, 0);
    }

    #[test]
    fn has_earned_from_source_checks_the_log() {
        let (store, _dir) = create_test_store();
        let mut wallet = Wallet::new(UserId::generate());
        store.put_wallet(&wallet).unwrap();
        let user_id = wallet.user_id;

        assert!(!store
            .has_earned_from_source(&user_id, &CoinSource::Mining)
            .unwrap());

        commit_earn(&store, &mut wallet, 40, CoinSource::Quiz);
        assert!(!store
            .has_earned_from_source(&user_id, &CoinSource::Mining)
            .unwrap());

        commit_earn(&store, &mut wallet, 25, CoinSource::Mining);
        assert!(store
            .has_earned_from_source(&user_id, &CoinSource::Mining)
            .unwrap());
    }

    #[test]
    fn commit_change_is_atomic_per_write() {
        let (store, _dir) = create_test_store();
        let mut wallet = Wallet::new(UserId::generate());
        store.put_wallet(&wallet).unwrap();

        wallet.balance = 75;
        wallet.lifetime_earned = 75;
        let tx = CoinTransaction::earned(
            wallet.user_id,
            75,
            CoinSource::SpinWheel,
            "Spin win".into(),
            75,
        );
        store.commit_change(&wallet, &tx).unwrap();

        // Wallet, transaction, and index all landed together.
        assert_eq!(store.get_wallet(&wallet.user_id).unwrap().unwrap().balance, 75);
        assert_eq!(store.get_transaction(&tx.id).unwrap().unwrap().amount, 75);
        let listed = store
            .list_transactions_by_user(&wallet.user_id, 10, 0)
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, tx.id);
    }
}
