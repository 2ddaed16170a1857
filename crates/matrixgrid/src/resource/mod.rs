//! Matrix resource handles and their lifecycle.
//!
//! A [`MatrixResource`] is one caller's exclusive handle to a shared,
//! store-owned table. The handle walks `Open -> Closed` (absorbing); the
//! backing table lives for as long as owners reference it or an alias
//! protects it.
//!
//! ```text
//! create/open ──► Open ──close()──► Closed (repeated close is a no-op)
//! ```

mod metadata;

use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use matrixgrid_core::config::RetryConfig;
use matrixgrid_core::error::{MatrixError, Result, StoreError};
use matrixgrid_core::layout::{self, families, qualifiers, rows};
use matrixgrid_core::traits::TabularStore;
use matrixgrid_core::types::{MatrixVariant, RowUpdate, TableSchema};

use crate::alias::AliasRegistry;
use crate::allocator::NameAllocator;
use crate::refcount::ReferenceCounter;

/// Handle to one matrix resource in the store.
///
/// The handle itself is owned exclusively by the caller that created or
/// opened it; the backing table is shared and referenced by path.
/// Releasing ownership is an explicit, fallible operation: dropping the
/// handle without [`close`](MatrixResource::close) leaks one reference.
pub struct MatrixResource {
    store: Arc<dyn TabularStore>,
    path: String,
    variant: MatrixVariant,
    closed: bool,
    disable_retry: RetryConfig,
}

impl std::fmt::Debug for MatrixResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixResource")
            .field("path", &self.path)
            .field("variant", &self.variant)
            .field("closed", &self.closed)
            .field("disable_retry", &self.disable_retry)
            .finish_non_exhaustive()
    }
}

impl MatrixResource {
    /// Create a fresh matrix: allocate a collision-free path under
    /// `prefix`, define the full family schema, and record `type`,
    /// dimensions, and `reference = 1`.
    pub fn create(
        store: Arc<dyn TabularStore>,
        allocator: &NameAllocator,
        prefix: &str,
        variant: MatrixVariant,
        rows: u32,
        columns: u32,
    ) -> Result<Self> {
        let path = allocator.allocate(prefix)?;
        Self::create_at(store, &path, variant, rows, columns)
    }

    /// Create a matrix at an explicit path.
    ///
    /// Idempotent: the existence check gates the entire family-definition
    /// step, so this acts only if the table is absent and can never leave a
    /// partial schema. An existing table is opened instead, untouched.
    pub fn create_at(
        store: Arc<dyn TabularStore>,
        path: &str,
        variant: MatrixVariant,
        rows: u32,
        columns: u32,
    ) -> Result<Self> {
        if store.table_exists(path)? {
            return Self::open(store, path);
        }

        store.create_table(&TableSchema::matrix(path))?;

        // `type` is written here and nowhere else: once per table, ever.
        let update = RowUpdate::new(rows::METADATA)
            .put(families::META, qualifiers::TYPE, variant.tag())
            .put(families::META, qualifiers::ROWS, layout::encode_u32(rows))
            .put(families::META, qualifiers::COLUMNS, layout::encode_u32(columns))
            .put(families::META, qualifiers::REFERENCE, layout::encode_i32(1));
        store.commit(path, update)?;
        info!(table = %path, variant = variant.tag(), rows, columns, "created matrix");

        Ok(Self {
            store,
            path: path.to_string(),
            variant,
            closed: false,
            disable_retry: RetryConfig::default(),
        })
    }

    /// Attach to an existing matrix by path, touching neither schema nor
    /// metadata. Does not take a reference; call
    /// [`increment_reference`](MatrixResource::increment_reference) to
    /// register as an owner.
    pub fn open(store: Arc<dyn TabularStore>, path: &str) -> Result<Self> {
        if !store.table_exists(path)? {
            return Err(StoreError::MissingTable(path.to_string()).into());
        }
        let tag = store
            .get(path, rows::METADATA, families::META, qualifiers::TYPE)?
            .ok_or(MatrixError::MissingMetadata {
                field: "type",
                table: path.to_string(),
            })?;
        let variant = MatrixVariant::from_tag(&tag)?;

        Ok(Self {
            store,
            path: path.to_string(),
            variant,
            closed: false,
            disable_retry: RetryConfig::default(),
        })
    }

    /// Attach to an existing matrix by its alias.
    pub fn open_alias(store: Arc<dyn TabularStore>, alias: &str) -> Result<Self> {
        let registry = AliasRegistry::new(store.clone());
        let path = registry
            .resolve(alias)?
            .ok_or_else(|| StoreError::MissingTable(format!("alias '{alias}'")))?;
        Self::open(store, &path)
    }

    /// Replace the disable-retry policy used during deletion.
    pub fn with_disable_retry(mut self, retry: RetryConfig) -> Self {
        self.disable_retry = retry;
        self
    }

    /// Unique table path backing this resource.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Concrete variant carried on the handle since creation.
    pub fn variant(&self) -> MatrixVariant {
        self.variant
    }

    /// Whether the handle has reached its terminal state.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Store this resource lives in.
    pub(crate) fn store(&self) -> &Arc<dyn TabularStore> {
        &self.store
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(MatrixError::Closed {
                path: self.path.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn counter(&self) -> ReferenceCounter<'_> {
        ReferenceCounter::new(&*self.store, &self.path)
    }

    /// Register one more logical owner; returns the new count.
    pub fn increment_reference(&self) -> Result<i32> {
        self.ensure_open()?;
        self.counter().increment_and_get()
    }

    /// Current reference count (absent cell reads as zero).
    pub fn reference_count(&self) -> Result<i32> {
        self.ensure_open()?;
        self.counter().get()
    }

    /// Whether an alias protects this resource.
    pub fn has_alias(&self) -> Result<bool> {
        self.ensure_open()?;
        self.counter().has_alias()
    }

    /// Bind `alias` to this resource, protecting it from deletion
    /// independent of the reference count. Does not touch the count.
    ///
    /// # Errors
    /// * [`MatrixError::AliasTaken`] if the alias names another resource.
    pub fn save(&self, alias: &str) -> Result<()> {
        self.ensure_open()?;
        let registry = AliasRegistry::new(self.store.clone());
        registry.bind(alias, &self.path)?;

        let update = RowUpdate::new(rows::METADATA)
            .put(families::META, qualifiers::ALIASNAME, alias.as_bytes())
            .put(families::ATTR, qualifiers::TYPE, self.variant.tag());
        self.store.commit(&self.path, update)?;
        info!(table = %self.path, alias = %alias, "aliased matrix");
        Ok(())
    }

    /// Release this handle's reference and, if the resource ends up both
    /// unreferenced and unaliased, delete the backing table.
    ///
    /// The handle transitions to `Closed` before any store work, so `close`
    /// is absorbing: the second and every later call is a no-op, and a
    /// failed deletion still leaves the handle closed. The decrement is not
    /// rolled back when deletion fails (rolling back through the same
    /// non-atomic counter would just trade one race for another), so a
    /// deletion failure surfaces an error against an already-decremented
    /// count; the table itself remains and can be re-opened.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let counter = self.counter();
        let reference = counter.decrement_and_get()?;
        debug!(table = %self.path, reference, "closed handle");

        if reference <= 0 && !counter.has_alias()? {
            self.delete_backing_table()?;
        }
        Ok(())
    }

    /// Disable (bounded retries on transient region errors) then delete.
    fn delete_backing_table(&self) -> Result<()> {
        if self.store.is_table_enabled(&self.path)? {
            let mut attempt: u32 = 0;
            loop {
                match self.store.disable_table(&self.path) {
                    Ok(()) => break,
                    Err(e @ StoreError::TransientRegion { .. }) => {
                        attempt += 1;
                        if attempt >= self.disable_retry.max_attempts {
                            return Err(e.into());
                        }
                        let backoff = self.disable_retry.backoff_for(attempt - 1);
                        warn!(
                            table = %self.path,
                            attempt,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %e,
                            "transient failure disabling table, retrying"
                        );
                        if !backoff.is_zero() {
                            thread::sleep(backoff);
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        self.store.delete_table(&self.path)?;
        info!(table = %self.path, "deleted unreferenced matrix");
        Ok(())
    }
}
