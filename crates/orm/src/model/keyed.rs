//! Keyed Access - Composite-key lookups for models
//!
//! [`HashKeyed`] binds a model to one [`KeyShape`] and turns loosely-typed
//! inputs into keys, predicates and queries. [`KeyedAccess`] runs those
//! queries on a caller-owned connection, batching large key collections so
//! that no single statement grows without bound.

use std::collections::VecDeque;
use std::marker::PhantomData;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};

use super::core_trait::Model;
use super::hash_key::{HashKey, KeyShape, KeyValue};
use super::key_input::{KeyInput, KeySource};
use crate::backends::DatabaseConnection;
use crate::config::KeyQueryConfig;
use crate::error::{ModelError, ModelResult};
use crate::query::{Predicate, QueryBuilder};

/// A model addressable by a composite key of shape [`HashKeyed::Shape`]
///
/// Key field names double as column names of the model's table.
pub trait HashKeyed: Model + KeySource {
    type Shape: KeyShape;

    /// Shape any supported input into a key of this model's shape
    fn normalize_key(input: KeyInput<'_, Self::Shape>) -> ModelResult<HashKey<Self::Shape>> {
        match input {
            KeyInput::Key(key) => Ok(key),
            KeyInput::Fields(fields) => HashKey::from_fields(fields),
            KeyInput::Scalar(value) => Err(ModelError::InvalidKeyInput(format!(
                "expected fields, a {} or a record, got bare value {}",
                Self::Shape::NAME,
                value
            ))),
            KeyInput::Record(source) => Ok(key_from_source(source)),
        }
    }

    /// Public entry point for loosely-typed callers
    fn to_hashkey<'a>(
        input: impl Into<KeyInput<'a, Self::Shape>>,
    ) -> ModelResult<HashKey<Self::Shape>> {
        Self::normalize_key(input.into())
    }

    /// Key of this loaded instance
    fn hashkey(&self) -> HashKey<Self::Shape> {
        key_from_source(self)
    }

    /// Equality predicates for every set field of the key, in field order
    fn join_key<'a>(key: impl Into<KeyInput<'a, Self::Shape>>) -> ModelResult<Vec<Predicate>> {
        let key = Self::normalize_key(key.into())?;
        let criterion: Vec<Predicate> = key
            .set_fields()
            .map(|(field, value)| Predicate::eq(field, value.clone()))
            .collect();

        if criterion.is_empty() {
            // never build a query without a key restriction
            return Err(ModelError::EmptyKey(Self::table_name().to_string()));
        }
        Ok(criterion)
    }

    /// Lazy query for the rows matching one key; `None` in, `None` out
    fn query_key(
        key: Option<KeyInput<'_, Self::Shape>>,
    ) -> ModelResult<Option<QueryBuilder<Self>>> {
        match key {
            Some(key) => Ok(Some(Self::query().filter_all(Self::join_key(key)?))),
            None => Ok(None),
        }
    }

    /// One query matching any of the given keys
    ///
    /// Single-field shapes produce `field IN (...)`; wider shapes produce an
    /// OR over one AND group per key, in input order and without
    /// deduplication.
    fn query_keys<'a, I>(keys: I) -> ModelResult<QueryBuilder<Self>>
    where
        I: IntoIterator,
        I::Item: Into<KeyInput<'a, Self::Shape>>,
    {
        let keys: Vec<KeyInput<'a, Self::Shape>> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ModelError::EmptyKeys(Self::table_name().to_string()));
        }

        if let [field] = Self::Shape::FIELDS {
            let values = keys
                .into_iter()
                .map(|key| single_field_value::<Self::Shape>(field, key))
                .collect::<ModelResult<Vec<KeyValue>>>()?;
            tracing::trace!(
                "{}: {} keys as {} IN-list",
                Self::table_name(),
                values.len(),
                field
            );
            return Ok(Self::query().filter(Predicate::in_list(field, values)));
        }

        let groups = keys
            .into_iter()
            .map(|key| Self::join_key(key).map(Predicate::and))
            .collect::<ModelResult<Vec<Predicate>>>()?;
        Ok(Self::query().filter(Predicate::or(groups)))
    }
}

fn key_from_source<S: KeyShape>(source: &dyn KeySource) -> HashKey<S> {
    HashKey::from_shape_values(|field| source.key_field(field))
}

fn single_field_value<S: KeyShape>(field: &str, key: KeyInput<'_, S>) -> ModelResult<KeyValue> {
    let value = match key {
        KeyInput::Key(key) => key.get(field).cloned(),
        KeyInput::Record(source) => source.key_field(field),
        KeyInput::Fields(fields) => HashKey::<S>::from_fields(fields)?.get(field).cloned(),
        KeyInput::Scalar(value) => Some(value),
    };
    value.ok_or_else(|| {
        ModelError::InvalidKeyInput(format!("{} key without a value for '{}'", S::NAME, field))
    })
}

/// Runs keyed lookups for model `M` with a fixed batch configuration
pub struct KeyedAccess<M> {
    config: KeyQueryConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for KeyedAccess<M> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for KeyedAccess<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedAccess")
            .field("config", &self.config)
            .finish()
    }
}

impl<M: HashKeyed> Default for KeyedAccess<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: HashKeyed> KeyedAccess<M> {
    /// Create with the default batch size
    pub fn new() -> Self {
        Self {
            config: KeyQueryConfig::default(),
            _model: PhantomData,
        }
    }

    /// Create with a validated custom configuration
    pub fn with_config(config: KeyQueryConfig) -> ModelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            _model: PhantomData,
        })
    }

    /// Create from `KEYED_QUERY_BATCH_SIZE`, falling back to the default
    pub fn from_env() -> ModelResult<Self> {
        Self::with_config(KeyQueryConfig::from_env()?)
    }

    pub fn config(&self) -> &KeyQueryConfig {
        &self.config
    }

    /// First row matching the key; `None` key or no match gives `Ok(None)`
    pub async fn get_key<C>(
        &self,
        conn: &mut C,
        key: Option<KeyInput<'_, M::Shape>>,
    ) -> ModelResult<Option<M>>
    where
        C: DatabaseConnection + ?Sized,
    {
        match M::query_key(key)? {
            Some(query) => query.first(conn).await,
            None => Ok(None),
        }
    }

    /// Stream every row matching any of `keys`, one query per batch
    pub fn iter_keys<'c, C>(
        &self,
        conn: &'c mut C,
        keys: Vec<KeyInput<'c, M::Shape>>,
    ) -> impl Stream<Item = ModelResult<M>> + 'c
    where
        C: DatabaseConnection + ?Sized,
        M: 'c,
    {
        self.iter_keys_with(conn, keys, |query| query)
    }

    /// Like [`iter_keys`](Self::iter_keys), passing each batch query through `refine` first
    ///
    /// A batch is only queried once the stream is polled past the previous
    /// one. The stream ends after yielding the first error.
    pub fn iter_keys_with<'c, C, F>(
        &self,
        conn: &'c mut C,
        keys: Vec<KeyInput<'c, M::Shape>>,
        refine: F,
    ) -> impl Stream<Item = ModelResult<M>> + 'c
    where
        C: DatabaseConnection + ?Sized,
        F: Fn(QueryBuilder<M>) -> QueryBuilder<M> + 'c,
        M: 'c,
    {
        let state = BatchState {
            conn,
            batches: split_batches(keys, self.config.batch_size),
            refine,
            index: 0,
        };

        stream::try_unfold(state, |state| next_batch(state))
            .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<M, ModelError>)))
            .try_flatten()
            .fuse()
    }

    /// Collect [`iter_keys_with`](Self::iter_keys_with) into a vector
    pub async fn get_keys<'c, C, F>(
        &self,
        conn: &'c mut C,
        keys: Vec<KeyInput<'c, M::Shape>>,
        refine: F,
    ) -> ModelResult<Vec<M>>
    where
        C: DatabaseConnection + ?Sized,
        F: Fn(QueryBuilder<M>) -> QueryBuilder<M> + 'c,
        M: 'c,
    {
        self.iter_keys_with(conn, keys, refine).try_collect().await
    }
}

struct BatchState<'c, M: HashKeyed, C: ?Sized, F> {
    conn: &'c mut C,
    batches: VecDeque<Vec<KeyInput<'c, M::Shape>>>,
    refine: F,
    index: usize,
}

fn split_batches<T>(keys: Vec<T>, batch_size: usize) -> VecDeque<Vec<T>> {
    let batch_size = batch_size.max(1);
    let mut batches = VecDeque::with_capacity(keys.len().div_ceil(batch_size));
    let mut keys = keys.into_iter();
    loop {
        let batch: Vec<T> = keys.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push_back(batch);
    }
    batches
}

async fn next_batch<'c, M, C, F>(
    mut state: BatchState<'c, M, C, F>,
) -> ModelResult<Option<(Vec<M>, BatchState<'c, M, C, F>)>>
where
    M: HashKeyed,
    C: DatabaseConnection + ?Sized,
    F: Fn(QueryBuilder<M>) -> QueryBuilder<M>,
{
    let Some(batch) = state.batches.pop_front() else {
        return Ok(None);
    };

    tracing::debug!(
        "Querying {} batch {} ({} keys, {} remaining batches)",
        M::table_name(),
        state.index,
        batch.len(),
        state.batches.len()
    );

    let query = (state.refine)(M::query_keys(batch)?);
    let rows = query.get(&mut *state.conn).await?;
    state.index += 1;

    Ok(Some((rows, state)))
}
