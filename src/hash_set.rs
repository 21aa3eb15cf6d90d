use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::hash_table::DEFAULT_BUCKET_CAPACITY;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;

/// A hash set implemented using the extendible `HashTable` as the underlying
/// storage.
///
/// `HashSet<T, S, N>` stores values of type `T` where `T` implements
/// `Hash + Eq`, hashes them with the builder `S`, and keeps them in buckets of
/// `N` slots. A full bucket is split in two when it overflows, doubling the
/// directory only when the bucket cannot be split otherwise, so growth never
/// rehashes the whole set.
///
/// # Iteration order
///
/// Values are yielded in bucket creation order, then slot order. This is
/// unrelated to hash order and stays stable as long as the set is not
/// modified.
pub struct HashSet<T, S = DefaultHashBuilder, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    table: HashTable<T, N>,
    hash_builder: S,
}

impl<T, S, const N: usize> Clone for HashSet<T, S, N>
where
    T: Clone + Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Rebuilds the set by inserting every value of `self` into an empty set.
    /// Membership is identical; the bucket layout may differ.
    fn clone(&self) -> Self {
        let mut set = Self::with_hasher(self.hash_builder.clone());
        set.extend(self.iter().cloned());
        set
    }
}

impl<T, S, const N: usize> PartialEq for HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, const N: usize> Eq for HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S, const N: usize> Debug for HashSet<T, S, N>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S, const N: usize> HashSet<T, S, N> {
    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of low-order hash bits the directory currently
    /// uses.
    pub fn global_depth(&self) -> u32 {
        self.table.global_depth()
    }

    /// Returns the number of buckets allocated so far.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Removes all elements from the set.
    ///
    /// Unlike `std`, this releases every bucket: the set returns to the shape
    /// it had when it was constructed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (0..100).collect();
    /// assert!(set.bucket_count() > 1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.bucket_count(), 1);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Swaps the contents of two sets, including their hashers.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Returns an iterator over the values of the set.
    ///
    /// The iterator is also a cursor: two iterators compare equal when they
    /// point at the same slot of the same set, and an exhausted iterator
    /// equals [`end`].
    ///
    /// [`end`]: HashSet::end
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// for value in set.iter() {
    ///     println!("Value: {}", value);
    /// }
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Iter<'_, T, N> {
        Iter {
            inner: self.table.end(),
        }
    }

    /// Returns an iterator that removes and yields all values from the
    /// set. The bucket layout is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let values: Vec<_> = set.drain().collect();
    /// assert!(set.is_empty());
    /// assert_eq!(values.len(), 2);
    /// # }
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, N> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = (1..=4).collect();
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// # }
    /// ```
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Returns layout statistics of the underlying table.
    ///
    /// Compiled under `cfg(test)` or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    #[cfg(test)]
    pub(crate) fn raw_table(&self) -> &HashTable<T, N> {
        &self.table
    }
}

impl<T, S, const N: usize> HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use extendible_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain this value, `true` is returned.
    /// - If the set already contained this value, `false` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Adds a value to the set, returning a cursor positioned at the stored
    /// value and whether it was newly inserted.
    ///
    /// If the value was already present, the set is unchanged and the cursor
    /// points at the existing value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// let (mut cursor, inserted) = set.insert_full(5);
    /// assert!(inserted);
    /// assert_eq!(cursor.next(), Some(&5));
    ///
    /// let (cursor, inserted) = set.insert_full(5);
    /// assert!(!inserted);
    /// assert_eq!(cursor.peek(), Some(&5));
    /// # }
    /// ```
    pub fn insert_full(&mut self, value: T) -> (Iter<'_, T, N>, bool) {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            Entry::Occupied(entry) => (
                Iter {
                    inner: entry.into_cursor(),
                },
                false,
            ),
            Entry::Vacant(entry) => (
                Iter {
                    inner: entry.insert_entry(value).into_cursor(),
                },
                true,
            ),
        }
    }

    /// Adds a value to the set, replacing the existing value, if any, that is
    /// equal to the given one. Returns the replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.replace(1), Some(1));
    /// assert_eq!(set.replace(2), None);
    /// assert_eq!(set.len(), 2);
    /// # }
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            Entry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns `true` if the set contains a value.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns the number of elements equal to `value`: `1` if it is present,
    /// `0` otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let set: HashSet<i32> = [1, 1, 2].into_iter().collect();
    /// assert_eq!(set.count(&1), 1);
    /// assert_eq!(set.count(&3), 0);
    /// # }
    /// ```
    pub fn count(&self, value: &T) -> usize {
        usize::from(self.contains(value))
    }

    /// Returns a reference to the value in the set, if any, that is equal to
    /// the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Returns a cursor positioned at the value equal to the given one, or
    /// [`end`] if there is none.
    ///
    /// [`end`]: HashSet::end
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let set: HashSet<i32> = (0..10).collect();
    /// assert_eq!(set.find(&3).next(), Some(&3));
    /// assert_eq!(set.find(&30), set.end());
    /// # }
    /// ```
    pub fn find(&self, value: &T) -> Iter<'_, T, N> {
        let hash = self.hash_builder.hash_one(value);
        Iter {
            inner: self.table.cursor(hash, |v| v == value),
        }
    }

    /// Removes a value from the set. Returns whether the value was
    /// present in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// # }
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the value in the set, if any, that is equal to the
    /// given one.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns `true` if the set contains no elements in common with `other`.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if `other` contains at least all the elements in
    /// `self`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if `self` contains at least all the elements in
    /// `other`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }
}

impl<T, S, const N: usize> HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use extendible_hash::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.global_depth(), 1);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S, const N: usize> Default for HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a `HashSet`, doubling as a cursor.
pub struct Iter<'a, T, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    inner: crate::hash_table::Iter<'a, T, N>,
}

impl<'a, T, const N: usize> Iter<'a, T, N> {
    /// Returns the value under the cursor without advancing.
    pub fn peek(&self) -> Option<&'a T> {
        self.inner.peek()
    }

    /// Returns `true` if the cursor is past the last value.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, const N: usize> PartialEq for Iter<'_, T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T, const N: usize> Eq for Iter<'_, T, N> {}

impl<T, const N: usize> Debug for Iter<'_, T, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    inner: crate::hash_table::Drain<'a, T, N>,
}

impl<T, const N: usize> Iterator for Drain<'_, T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, const N: usize> ExactSizeIterator for Drain<'_, T, N> {}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    inner: crate::hash_table::IntoIter<T, N>,
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, S, const N: usize> IntoIterator for HashSet<T, S, N> {
    type IntoIter = IntoIter<T, N>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, const N: usize> IntoIterator for &'a HashSet<T, S, N> {
    type IntoIter = Iter<'a, T, N>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S, const N: usize> FromIterator<T> for HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, S, const N: usize> Extend<T> for HashSet<T, S, N>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, const N: usize> Extend<&'a T> for HashSet<T, S, N>
where
    T: Copy + Hash + Eq + 'a,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}
