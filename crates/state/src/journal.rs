//! Checkpointable account/storage view.
//!
//! A [`Journal`] is the sole owner of in-flight state changes during a
//! transaction. Every call frame takes a [`JournalCheckpoint`] before it
//! starts mutating state; on failure the frame calls [`Journal::revert`],
//! which undoes every entry recorded since that checkpoint by replaying them
//! in reverse. On success it calls [`Journal::commit`], which simply drops
//! the bookkeeping and lets the mutations stand.

use crate::account::{Account, AccountStatus, StorageSlot};
use crate::database::{Database, DatabaseError};
use crate::AccountInfo;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use bytecode::Bytecode;
use primitives::{Address, B256, U256};

/// An opaque marker returned by [`Journal::checkpoint`]; pass it back to
/// [`Journal::commit`] or [`Journal::revert`] to close the frame it opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JournalCheckpoint {
    log_len: usize,
    journal_len: usize,
}

/// A single reversible state mutation.
///
/// Entries are pushed in the order mutations happen and undone in reverse
/// order on [`Journal::revert`], which is why every variant carries enough
/// information (the prior value) to restore the account exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    /// Account was touched for the first time this call (EIP-161 bookkeeping only).
    AccountTouched { address: Address },
    /// Account did not exist and was created by this entry (e.g. as a `CALL` target).
    AccountCreated { address: Address },
    /// Account balance changed from `old_balance`.
    BalanceChanged { address: Address, old_balance: U256 },
    /// Balance moved from `from` to `to`; undone by moving it back.
    BalanceTransfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Nonce changed from `old_nonce`.
    NonceChanged { address: Address, old_nonce: u64 },
    /// Code (and code hash) changed from the prior value.
    CodeChanged {
        address: Address,
        old_code_hash: B256,
        old_code: Option<Bytecode>,
    },
    /// Storage slot changed from `old_value`, and whether the slot itself was newly created.
    StorageChanged {
        address: Address,
        key: U256,
        old_value: U256,
    },
    /// Address was warmed (EIP-2929); reverting returns it to cold.
    AddressWarmed { address: Address },
    /// Storage slot was warmed (EIP-2929); reverting returns it to cold.
    StorageWarmed { address: Address, key: U256 },
    /// Account was marked for destruction by `SELFDESTRUCT`.
    AccountDestroyed {
        address: Address,
        had_balance: U256,
        target_was_self: bool,
    },
    /// Transient storage slot changed from `old_value` (EIP-1153).
    TransientStorageChanged {
        address: Address,
        key: U256,
        old_value: U256,
    },
}

/// Checkpointable account/storage view over a [`Database`].
pub struct Journal<DB> {
    db: DB,
    cache: BTreeMap<Address, Account>,
    log: Vec<JournalEntry>,
    /// Addresses touched anywhere in the transaction, regardless of call-frame outcome;
    /// used for EIP-161 empty-account cleanup once the outermost call returns.
    touched: Vec<Address>,
    /// SSTORE/SELFDESTRUCT refund counter, only ever read at the very end of a transaction.
    refund: i64,
    /// EIP-1153 transient storage: cleared at the end of a transaction, never
    /// persisted, but still reverted on a failed call frame.
    transient: BTreeMap<(Address, U256), U256>,
}

impl<DB: Database> Journal<DB> {
    /// Creates an empty journal over `db`.
    pub fn new(db: DB) -> Self {
        Self {
            db,
            cache: BTreeMap::new(),
            log: Vec::new(),
            touched: Vec::new(),
            refund: 0,
            transient: BTreeMap::new(),
        }
    }

    /// Borrows the underlying database.
    pub fn database(&mut self) -> &mut DB {
        &mut self.db
    }

    /// Opens a new reversible frame.
    #[inline]
    pub fn checkpoint(&mut self) -> JournalCheckpoint {
        JournalCheckpoint {
            log_len: self.log.len(),
            journal_len: self.touched.len(),
        }
    }

    /// Closes a frame successfully: its mutations stand.
    #[inline]
    pub fn commit(&mut self, _checkpoint: JournalCheckpoint) {
        // Nothing to undo; the log entries older than this checkpoint remain
        // available so an *enclosing* frame can still revert past this point.
    }

    /// Closes a frame unsuccessfully: undoes every entry recorded since `checkpoint`.
    pub fn revert(&mut self, checkpoint: JournalCheckpoint) {
        while self.log.len() > checkpoint.log_len {
            let entry = self.log.pop().expect("checked non-empty above");
            self.undo(entry);
        }
        self.touched.truncate(checkpoint.journal_len);
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountTouched { address } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.status.remove(AccountStatus::TOUCHED);
                }
            }
            JournalEntry::AccountCreated { address } => {
                self.cache.remove(&address);
            }
            JournalEntry::BalanceChanged {
                address,
                old_balance,
            } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.info.balance = old_balance;
                }
            }
            JournalEntry::BalanceTransfer { from, to, amount } => {
                if let Some(account) = self.cache.get_mut(&to) {
                    account.info.balance -= amount;
                }
                if let Some(account) = self.cache.get_mut(&from) {
                    account.info.balance += amount;
                }
            }
            JournalEntry::NonceChanged { address, old_nonce } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.info.nonce = old_nonce;
                }
            }
            JournalEntry::CodeChanged {
                address,
                old_code_hash,
                old_code,
            } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.info.code_hash = old_code_hash;
                    account.info.code = old_code;
                }
            }
            JournalEntry::StorageChanged {
                address,
                key,
                old_value,
            } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    if let Some(slot) = account.storage.get_mut(&key) {
                        slot.present_value = old_value;
                    }
                }
            }
            JournalEntry::AddressWarmed { address } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.mark_cold();
                }
            }
            JournalEntry::StorageWarmed { address, key } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    if let Some(slot) = account.storage.get_mut(&key) {
                        slot.is_warm = false;
                    }
                }
            }
            JournalEntry::AccountDestroyed {
                address,
                had_balance,
                target_was_self,
            } => {
                if let Some(account) = self.cache.get_mut(&address) {
                    account.status.remove(AccountStatus::SELFDESTRUCTED);
                    if !target_was_self {
                        account.info.balance = had_balance;
                    }
                }
            }
            JournalEntry::TransientStorageChanged {
                address,
                key,
                old_value,
            } => {
                if old_value.is_zero() {
                    self.transient.remove(&(address, key));
                } else {
                    self.transient.insert((address, key), old_value);
                }
            }
        }
    }

    /// Loads an account into the cache if it is not already there.
    ///
    /// Returns `true` if this was the account's first access this
    /// transaction (i.e. it was cold, per EIP-2929).
    pub fn load_account(&mut self, address: Address) -> Result<bool, DatabaseError> {
        if let Some(account) = self.cache.get_mut(&address) {
            return Ok(account.mark_warm());
        }
        let info = match self.db.basic(address)? {
            Some(db_account) => AccountInfo {
                balance: db_account.balance,
                nonce: db_account.nonce,
                code_hash: db_account.code_hash,
                code: None,
            },
            None => AccountInfo::default(),
        };
        self.cache.insert(address, Account::new_loaded(info));
        Ok(true)
    }

    /// Returns a reference to a cached account, loading it first if needed.
    pub fn account(&mut self, address: Address) -> Result<&Account, DatabaseError> {
        self.load_account(address)?;
        Ok(self.cache.get(&address).expect("just loaded"))
    }

    /// Current balance, loading the account first if needed.
    pub fn balance(&mut self, address: Address) -> Result<U256, DatabaseError> {
        self.load_account(address)?;
        Ok(self.cache.get(&address).expect("just loaded").info.balance)
    }

    /// Current nonce, loading the account first if needed.
    pub fn nonce(&mut self, address: Address) -> Result<u64, DatabaseError> {
        self.load_account(address)?;
        Ok(self.cache.get(&address).expect("just loaded").info.nonce)
    }

    /// Current code hash, loading the account first if needed.
    pub fn code_hash(&mut self, address: Address) -> Result<B256, DatabaseError> {
        self.load_account(address)?;
        Ok(self
            .cache
            .get(&address)
            .expect("just loaded")
            .info
            .code_hash)
    }

    /// Reads a transient storage slot (EIP-1153). Always warm, defaults to zero.
    pub fn tload(&mut self, address: Address, key: U256) -> U256 {
        self.transient
            .get(&(address, key))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Writes a transient storage slot (EIP-1153), journaling the prior value.
    pub fn tstore(&mut self, address: Address, key: U256, value: U256) {
        let old_value = self.tload(address, key);
        if old_value == value {
            return;
        }
        self.log.push(JournalEntry::TransientStorageChanged {
            address,
            key,
            old_value,
        });
        if value.is_zero() {
            self.transient.remove(&(address, key));
        } else {
            self.transient.insert((address, key), value);
        }
    }

    /// Lazily loads and returns an account's bytecode.
    pub fn code(&mut self, address: Address) -> Result<Bytecode, DatabaseError> {
        self.load_account(address)?;
        let (code_hash, has_code) = {
            let account = self.cache.get(&address).expect("just loaded");
            (account.info.code_hash, account.info.code.is_some())
        };
        if has_code {
            return Ok(self
                .cache
                .get(&address)
                .unwrap()
                .info
                .code
                .clone()
                .unwrap());
        }
        let code = if code_hash == primitives::KECCAK_EMPTY {
            Bytecode::new_legacy(primitives::Bytes::new())
        } else {
            self.db.code_by_hash(code_hash)?
        };
        self.cache.get_mut(&address).unwrap().info.code = Some(code.clone());
        Ok(code)
    }

    /// Marks an account touched, recording a journal entry on first touch.
    pub fn touch_account(&mut self, address: Address) -> Result<(), DatabaseError> {
        self.load_account(address)?;
        let account = self.cache.get_mut(&address).expect("just loaded");
        if !account.is_touched() {
            account.mark_touch();
            self.log.push(JournalEntry::AccountTouched { address });
            self.touched.push(address);
        }
        Ok(())
    }

    /// Reads a storage slot, returning whether the slot was cold.
    pub fn sload(&mut self, address: Address, key: U256) -> Result<(U256, bool), DatabaseError> {
        self.load_account(address)?;
        if let Some(slot) = self
            .cache
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .copied()
        {
            return Ok((slot.present_value, false));
        }
        let value = self.db.storage(address, key)?;
        let account = self.cache.get_mut(&address).expect("just loaded");
        account.storage.insert(key, StorageSlot::new(value));
        Ok((value, true))
    }

    /// Writes a storage slot. Returns `(original, present_before, cold)` for gas accounting.
    pub fn sstore(
        &mut self,
        address: Address,
        key: U256,
        new_value: U256,
    ) -> Result<(U256, U256, bool), DatabaseError> {
        let (_, cold) = self.sload(address, key)?;
        self.touch_account(address)?;
        let account = self.cache.get_mut(&address).expect("loaded by sload");
        let slot = account.storage.get_mut(&key).expect("loaded by sload");
        let original = slot.original_value;
        let present_before = slot.present_value;
        if present_before != new_value {
            self.log.push(JournalEntry::StorageChanged {
                address,
                key,
                old_value: present_before,
            });
            self.cache
                .get_mut(&address)
                .unwrap()
                .storage
                .get_mut(&key)
                .unwrap()
                .present_value = new_value;
        }
        Ok((original, present_before, cold))
    }

    /// Returns `(original, current, is_cold)` for a slot, where `original`
    /// is the value as of the start of the transaction — the piece
    /// `SSTORE`'s gas and refund formulas need that a bare [`Journal::sload`]
    /// does not surface.
    pub fn storage_state(
        &mut self,
        address: Address,
        key: U256,
    ) -> Result<(U256, U256, bool), DatabaseError> {
        let (current, is_cold) = self.sload(address, key)?;
        let original = self
            .cache
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .map(|slot| slot.original_value)
            .unwrap_or(current);
        Ok((original, current, is_cold))
    }

    /// EIP-2929: warms an address, returning whether it was cold.
    pub fn warm_address(&mut self, address: Address) -> Result<bool, DatabaseError> {
        let was_cold = self.load_account(address)?;
        if was_cold {
            self.log.push(JournalEntry::AddressWarmed { address });
        }
        Ok(was_cold)
    }

    /// EIP-2929: warms a storage slot, returning whether it was cold.
    pub fn warm_storage(&mut self, address: Address, key: U256) -> Result<bool, DatabaseError> {
        let (_, cold) = self.sload(address, key)?;
        if cold {
            self.log.push(JournalEntry::StorageWarmed { address, key });
        }
        Ok(cold)
    }

    /// Transfers `amount` wei from `from` to `to`, journaling the move.
    ///
    /// Callers must check the sender's balance first; this only records the
    /// journal entry and applies the transfer.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), DatabaseError> {
        self.touch_account(from)?;
        self.touch_account(to)?;
        if amount.is_zero() {
            return Ok(());
        }
        self.cache.get_mut(&from).unwrap().info.balance -= amount;
        self.cache.get_mut(&to).unwrap().info.balance += amount;
        self.log
            .push(JournalEntry::BalanceTransfer { from, to, amount });
        Ok(())
    }

    /// Increments `address`'s balance (block rewards, precompile-initiated credits).
    pub fn incr_balance(&mut self, address: Address, amount: U256) -> Result<(), DatabaseError> {
        self.touch_account(address)?;
        let account = self.cache.get_mut(&address).unwrap();
        let old_balance = account.info.balance;
        account.info.balance += amount;
        self.log
            .push(JournalEntry::BalanceChanged { address, old_balance });
        Ok(())
    }

    /// Bumps the nonce of `address` by one (post-CREATE, pre-execution of a transaction).
    pub fn bump_nonce(&mut self, address: Address) -> Result<(), DatabaseError> {
        self.touch_account(address)?;
        let account = self.cache.get_mut(&address).unwrap();
        let old_nonce = account.info.nonce;
        account.info.nonce += 1;
        self.log
            .push(JournalEntry::NonceChanged { address, old_nonce });
        Ok(())
    }

    /// Sets code on a freshly created contract account.
    pub fn set_code(
        &mut self,
        address: Address,
        code_hash: B256,
        code: Bytecode,
    ) -> Result<(), DatabaseError> {
        self.touch_account(address)?;
        let account = self.cache.get_mut(&address).unwrap();
        let old_code_hash = account.info.code_hash;
        let old_code = account.info.code.clone();
        account.info.code_hash = code_hash;
        account.info.code = Some(code);
        self.log.push(JournalEntry::CodeChanged {
            address,
            old_code_hash,
            old_code,
        });
        Ok(())
    }

    /// Marks an account as newly created (so revert can drop it entirely).
    pub fn mark_created(&mut self, address: Address) {
        self.log.push(JournalEntry::AccountCreated { address });
        if let Some(account) = self.cache.get_mut(&address) {
            account.status.insert(AccountStatus::CREATED);
        }
    }

    /// Queues `address` for destruction, crediting its balance to `target`.
    pub fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<U256, DatabaseError> {
        self.load_account(address)?;
        self.touch_account(target)?;
        let had_balance = self.cache.get(&address).map(|a| a.info.balance).unwrap_or_default();
        let target_was_self = address == target;
        if !target_was_self {
            self.cache.get_mut(&address).unwrap().info.balance = U256::ZERO;
            self.cache.get_mut(&target).unwrap().info.balance += had_balance;
        }
        let account = self.cache.get_mut(&address).unwrap();
        account.status.insert(AccountStatus::SELFDESTRUCTED);
        self.log.push(JournalEntry::AccountDestroyed {
            address,
            had_balance,
            target_was_self,
        });
        Ok(had_balance)
    }

    /// Adds to the refund counter. `delta` may be negative (SSTORE can reduce a prior refund).
    pub fn add_refund(&mut self, delta: i64) {
        self.refund += delta;
    }

    /// Current refund counter value.
    pub fn refund(&self) -> i64 {
        self.refund
    }

    /// Drops empty accounts that were touched this transaction (EIP-161).
    ///
    /// Called once, after the outermost call of a transaction returns.
    pub fn cleanup_touched_accounts(&mut self) {
        for address in core::mem::take(&mut self.touched) {
            if let Some(account) = self.cache.get(&address) {
                if account.info.is_empty() {
                    self.cache.remove(&address);
                }
            }
        }
    }

    /// Returns every account mutated this transaction, for commit to the real database.
    pub fn dirty_accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.cache.iter()
    }
}
