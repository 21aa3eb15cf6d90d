use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

/// Number of slots per bucket when no capacity is given.
pub const DEFAULT_BUCKET_CAPACITY: usize = 11;

/// Directory depth at construction: two directory slots, both aliasing the
/// first bucket.
const INITIAL_GLOBAL_DEPTH: u32 = 1;

/// The first bucket ever allocated. It is never removed, so the enumeration
/// chain always starts here.
const CHAIN_HEAD: usize = 0;

/// Deepest directory addressable by a `u64` hash on this target.
const MAX_GLOBAL_DEPTH: u32 = if usize::BITS < u64::BITS {
    usize::BITS - 1
} else {
    u64::BITS - 1
};

#[inline(always)]
fn low_bits_mask(depth: u32) -> usize {
    (1usize << depth) - 1
}

/// A fixed-capacity slot table. `next` links buckets in creation order and is
/// only used for enumeration.
#[derive(Clone)]
struct Bucket<V, const N: usize> {
    slots: [Option<V>; N],
    local_depth: u32,
    next: Option<usize>,
}

impl<V, const N: usize> Bucket<V, N> {
    fn new(local_depth: u32, next: Option<usize>) -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            local_depth,
            next,
        }
    }

    #[cfg(any(test, feature = "stats"))]
    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Position of a value: arena index of its bucket plus the slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    bucket: usize,
    slot: usize,
}

/// Outcome of scanning a single bucket for a key.
enum Probe {
    Found(usize),
    Vacant(usize),
    Full,
}

/// Statistics about the directory and bucket layout.
///
/// Compiled under `cfg(test)` or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of values currently in the table
    pub populated: usize,
    /// Number of buckets allocated so far
    pub bucket_count: usize,
    /// Number of low-order hash bits used to index the directory
    pub global_depth: u32,
    /// Number of directory entries (always `1 << global_depth`)
    pub directory_len: usize,
    /// Total number of slots across all buckets
    pub total_slots: usize,
    /// Slot utilization (populated / total_slots)
    pub slot_utilization: f64,
    /// `local_depths[d]` is the number of buckets with local depth `d`
    pub local_depths: Vec<usize>,
    /// Total memory in bytes held by buckets and directory
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Extendible Hash Table Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% utilization)",
            self.populated,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!(
            "Directory: {} entries (global depth {})",
            self.directory_len, self.global_depth
        );
        println!("Buckets: {}", self.bucket_count);
        for (depth, count) in self.local_depths.iter().enumerate() {
            if *count != 0 {
                println!("  local depth {:>2}: {} buckets", depth, count);
            }
        }
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A hash table using extendible hashing.
///
/// Values live in fixed-capacity buckets of `N` slots. A directory of
/// `2^global_depth` entries maps the low-order bits of a hash to a bucket;
/// several entries may alias the same bucket. When a bucket overflows it is
/// split in two, doubling the directory first if the bucket already owns a
/// single entry. Nothing is ever rehashed globally.
///
/// `HashTable<V, N>` does not hash anything itself: every operation takes a
/// precomputed hash and an equality predicate, and operations that may split
/// a bucket also take a function to rehash stored values.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use extendible_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table: HashTable<Person> = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123, |p| hash_id(p.id)) {
///     extendible_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     extendible_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HashTable<V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    buckets: Vec<Bucket<V, N>>,
    directory: Vec<usize>,
    global_depth: u32,
    populated: usize,
}

impl<V, const N: usize> Debug for HashTable<V, N>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field("global_depth", &self.global_depth)
            .field(
                "directory",
                &self
                    .directory
                    .iter()
                    .enumerate()
                    .map(|(index, &bucket)| {
                        let bucket = &self.buckets[bucket];
                        let slots = bucket
                            .slots
                            .iter()
                            .map(|slot| match slot {
                                Some(value) => format!("{value:?}"),
                                None => "?".to_string(),
                            })
                            .collect::<Vec<String>>();
                        format!(
                            "{index}: [{}] lt = {}",
                            slots.join(", "),
                            bucket.local_depth
                        )
                    })
                    .collect::<Vec<_>>(),
            )
            .field("buckets", &self.buckets.len())
            .field("populated", &self.populated)
            .finish()
    }
}

impl<V, const N: usize> Default for HashTable<V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, const N: usize> HashTable<V, N> {
    /// Creates an empty table: one bucket aliased by a two-entry directory.
    ///
    /// `N` must be non-zero; this is checked at compile time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String, 4> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.global_depth(), 1);
    /// assert_eq!(table.bucket_count(), 1);
    /// ```
    pub fn new() -> Self {
        const { assert!(N > 0, "bucket capacity must be non-zero") };

        Self {
            buckets: alloc::vec![Bucket::new(0, None)],
            directory: alloc::vec![CHAIN_HEAD; 1 << INITIAL_GLOBAL_DEPTH],
            global_depth: INITIAL_GLOBAL_DEPTH,
            populated: 0,
        }
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of low-order hash bits used to index the directory.
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    /// Returns the number of buckets allocated so far. Buckets are never
    /// released individually, so this only grows until the table is cleared.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of slots in each bucket.
    pub const fn bucket_capacity(&self) -> usize {
        N
    }

    /// Removes all values, returning the table to its freshly constructed
    /// shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 1> = HashTable::new();
    /// for i in 0..8u64 {
    ///     table.entry(i, |&v| v == i, |&v| v).or_insert(i);
    /// }
    /// assert!(table.bucket_count() > 1);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 1);
    /// ```
    pub fn clear(&mut self) {
        let previous = core::mem::replace(self, Self::new());
        drop(previous);
    }

    /// Returns an iterator over all values, in bucket creation order and then
    /// slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 2> = HashTable::new();
    /// for i in [0u64, 2, 4] {
    ///     table.entry(i, |&v| v == i, |&v| v).or_insert(i);
    /// }
    ///
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, [0, 4, 2]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V, N> {
        Iter::at(self, Some(CHAIN_HEAD), 0)
    }

    /// Returns the past-the-end cursor. Every exhausted [`Iter`] over this
    /// table compares equal to it.
    pub fn end(&self) -> Iter<'_, V, N> {
        Iter {
            table: self,
            bucket: None,
            slot: 0,
        }
    }

    /// Removes and yields all values. The bucket and directory layout is left
    /// as it was; only the slots are vacated.
    pub fn drain(&mut self) -> Drain<'_, V, N> {
        Drain {
            table: self,
            bucket: Some(CHAIN_HEAD),
            slot: 0,
        }
    }

    /// Retains only the values for which `f` returns `true`. Removed values
    /// vacate their slots; no bucket is released.
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        for bucket in self.buckets.iter_mut() {
            for slot in bucket.slots.iter_mut() {
                if slot.as_ref().is_some_and(|value| !f(value)) {
                    *slot = None;
                    self.populated -= 1;
                }
            }
        }
    }

    #[inline(always)]
    fn directory_index(&self, hash: u64) -> usize {
        hash as usize & low_bits_mask(self.global_depth)
    }

    fn probe(&self, bucket: usize, eq: impl Fn(&V) -> bool) -> Probe {
        let mut vacant = None;
        for (index, slot) in self.buckets[bucket].slots.iter().enumerate() {
            match slot {
                Some(value) if eq(value) => return Probe::Found(index),
                None if vacant.is_none() => vacant = Some(index),
                _ => {}
            }
        }

        match vacant {
            Some(index) => Probe::Vacant(index),
            None => Probe::Full,
        }
    }

    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Location> {
        let bucket = self.directory[self.directory_index(hash)];
        self.buckets[bucket]
            .slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&eq))
            .map(|slot| Location { bucket, slot })
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, &str)> = HashTable::new();
    /// table.entry(7, |v| v.0 == 7, |v| v.0).or_insert((7, "seven"));
    ///
    /// assert_eq!(table.find(7, |v| v.0 == 7), Some(&(7, "seven")));
    /// assert_eq!(table.find(8, |v| v.0 == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let location = self.locate(hash, eq)?;
        self.buckets[location.bucket].slots[location.slot].as_ref()
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// The caller must not change the value in a way that changes its hash.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let location = self.locate(hash, eq)?;
        self.buckets[location.bucket].slots[location.slot].as_mut()
    }

    /// Returns a cursor positioned at the matching value, or [`end`] if there
    /// is none. Advancing the cursor continues in enumeration order.
    ///
    /// [`end`]: HashTable::end
    pub fn cursor(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Iter<'_, V, N> {
        match self.locate(hash, eq) {
            Some(location) => Iter::at(self, Some(location.bucket), location.slot),
            None => self.end(),
        }
    }

    /// Removes a value by hash and equality predicate, returning it if it was
    /// present. The slot is vacated; buckets and directory never shrink.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.entry(3, |&v| v == 3, |&v| v).or_insert(3);
    ///
    /// assert_eq!(table.remove(3, |&v| v == 3), Some(3));
    /// assert_eq!(table.remove(3, |&v| v == 3), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let location = self.locate(hash, eq)?;
        let value = self.buckets[location.bucket].slots[location.slot].take();
        debug_assert!(value.is_some());
        self.populated -= 1;
        value
    }

    /// Gets the entry for a hash and equality predicate.
    ///
    /// If the target bucket is full and holds no match, it is split (doubling
    /// the directory first when needed) until the key's bucket has a vacant
    /// slot. A single call may therefore split several times. `hasher` must
    /// return the same hash that was supplied when each stored value was
    /// inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::Entry;
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 2> = HashTable::new();
    /// for key in [0u64, 2, 4] {
    ///     match table.entry(key, |&v| v == key, |&v| v) {
    ///         Entry::Vacant(entry) => {
    ///             entry.insert(key);
    ///         }
    ///         Entry::Occupied(_) => unreachable!(),
    ///     }
    /// }
    ///
    /// assert_eq!(table.len(), 3);
    /// assert!(matches!(table.entry(2, |&v| v == 2, |&v| v), Entry::Occupied(_)));
    /// ```
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Entry<'_, V, N> {
        loop {
            let directory_index = self.directory_index(hash);
            let bucket = self.directory[directory_index];
            match self.probe(bucket, &eq) {
                Probe::Found(slot) => {
                    return Entry::Occupied(OccupiedEntry {
                        table: self,
                        location: Location { bucket, slot },
                    });
                }
                Probe::Vacant(slot) => {
                    return Entry::Vacant(VacantEntry {
                        table: self,
                        location: Location { bucket, slot },
                    });
                }
                Probe::Full => self.split(directory_index, &hasher),
            }
        }
    }

    /// Doubles the directory. The upper half duplicates the lower half, so
    /// every bucket keeps all of its aliases.
    fn expand(&mut self) {
        assert!(
            self.global_depth < MAX_GLOBAL_DEPTH,
            "directory depth exhausted at {} bits; too many values share a full hash",
            self.global_depth
        );

        self.directory.extend_from_within(..);
        self.global_depth += 1;
    }

    /// Splits the bucket at `directory_index` into itself and a new sibling.
    fn split(&mut self, directory_index: usize, hasher: impl Fn(&V) -> u64) {
        let old = self.directory[directory_index];
        if self.buckets[old].local_depth == self.global_depth {
            self.expand();
        }

        let new = self.buckets.len();
        let depth = self.buckets[old].local_depth + 1;
        let next = self.buckets[old].next.replace(new);
        self.buckets[old].local_depth = depth;
        self.buckets.push(Bucket::new(depth, next));

        // Entries aliasing `old` share its low `depth - 1` bits. Those with
        // bit `depth - 1` set now belong to the sibling.
        let distinguishing_bit = 1usize << (depth - 1);
        let mut index = (directory_index & (distinguishing_bit - 1)) | distinguishing_bit;
        while index < self.directory.len() {
            debug_assert_eq!(self.directory[index], old);
            self.directory[index] = new;
            index += distinguishing_bit << 1;
        }

        for slot in 0..N {
            let moves = match &self.buckets[old].slots[slot] {
                Some(value) => self.directory[self.directory_index(hasher(value))] == new,
                None => false,
            };
            if moves {
                let value = self.buckets[old].slots[slot].take();
                self.buckets[new].slots[slot] = value;
            }
        }
    }

    /// Returns layout statistics for debugging.
    ///
    /// Compiled under `cfg(test)` or with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.buckets.len() * N;
        let mut local_depths = alloc::vec![0usize; self.global_depth as usize + 1];
        for bucket in self.buckets.iter() {
            local_depths[bucket.local_depth as usize] += 1;
        }

        debug_assert_eq!(
            self.buckets.iter().map(Bucket::occupied).sum::<usize>(),
            self.populated
        );

        DebugStats {
            populated: self.populated,
            bucket_count: self.buckets.len(),
            global_depth: self.global_depth,
            directory_len: self.directory.len(),
            total_slots,
            slot_utilization: self.populated as f64 / total_slots as f64,
            local_depths,
            total_bytes: self.buckets.len() * core::mem::size_of::<Bucket<V, N>>()
                + self.directory.len() * core::mem::size_of::<usize>(),
        }
    }

    /// Panics if any structural invariant is violated. `hasher` must be the
    /// function used on insertion.
    #[cfg(test)]
    pub(crate) fn validate(&self, hasher: impl Fn(&V) -> u64) {
        assert_eq!(self.directory.len(), 1 << self.global_depth);

        let mut visited = alloc::vec![false; self.buckets.len()];
        let mut cursor = Some(CHAIN_HEAD);
        while let Some(bucket) = cursor {
            assert!(!visited[bucket], "bucket {bucket} linked twice");
            visited[bucket] = true;
            cursor = self.buckets[bucket].next;
        }
        assert!(visited.iter().all(|v| *v), "bucket missing from chain");

        let mut aliases = alloc::vec![0usize; self.buckets.len()];
        let mut first_alias: Vec<Option<usize>> = alloc::vec![None; self.buckets.len()];
        for (index, &bucket) in self.directory.iter().enumerate() {
            aliases[bucket] += 1;
            let mask = low_bits_mask(self.buckets[bucket].local_depth);
            match first_alias[bucket] {
                Some(first) => assert_eq!(index & mask, first & mask),
                None => first_alias[bucket] = Some(index),
            }
        }

        let mut occupied = 0;
        for (index, bucket) in self.buckets.iter().enumerate() {
            assert!(bucket.local_depth <= self.global_depth);
            assert_eq!(
                aliases[index],
                1 << (self.global_depth - bucket.local_depth),
                "bucket {index} has the wrong number of aliases"
            );

            for value in bucket.slots.iter().flatten() {
                occupied += 1;
                assert_eq!(
                    self.directory[self.directory_index(hasher(value))],
                    index,
                    "value stored in a bucket its hash does not reach"
                );
            }
        }
        assert_eq!(occupied, self.populated);
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V, N>),
    /// A vacant entry. Its bucket already has room for the value.
    Vacant(VacantEntry<'a, V, N>),
}

impl<'a, V, const N: usize> Entry<'a, V, N> {
    /// Ensures a value is in the entry by inserting the default if empty, and
    /// returns a mutable reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of the default
    /// function if empty, and returns a mutable reference to the value in the
    /// entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use extendible_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, u32)> = HashTable::new();
    /// table.entry(1, |v| v.0 == 1, |v| v.0).or_insert_with(|| (1, 10)).1 += 1;
    /// table.entry(1, |v| v.0 == 1, |v| v.0).or_insert_with(|| (1, 10)).1 += 1;
    ///
    /// assert_eq!(table.find(1, |v| v.0 == 1), Some(&(1, 12)));
    /// ```
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry, returning
    /// `None` for a vacant one.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Ensures a value is in the entry by inserting `V::default()` if empty.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant slot of a [`HashTable`].
pub struct VacantEntry<'a, V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    table: &'a mut HashTable<V, N>,
    location: Location,
}

impl<'a, V, const N: usize> VacantEntry<'a, V, N> {
    /// Inserts the value into the vacant slot and returns a mutable reference
    /// to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.insert_entry(value).into_mut()
    }

    /// Inserts the value into the vacant slot and returns the now occupied
    /// entry.
    pub fn insert_entry(self, value: V) -> OccupiedEntry<'a, V, N> {
        let Location { bucket, slot } = self.location;
        let target = &mut self.table.buckets[bucket].slots[slot];
        debug_assert!(target.is_none());
        *target = Some(value);
        self.table.populated += 1;

        OccupiedEntry {
            table: self.table,
            location: self.location,
        }
    }
}

/// A view into an occupied slot of a [`HashTable`].
pub struct OccupiedEntry<'a, V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    table: &'a mut HashTable<V, N>,
    location: Location,
}

impl<'a, V, const N: usize> OccupiedEntry<'a, V, N> {
    fn slot(&self) -> &Option<V> {
        &self.table.buckets[self.location.bucket].slots[self.location.slot]
    }

    fn slot_mut(&mut self) -> &mut Option<V> {
        &mut self.table.buckets[self.location.bucket].slots[self.location.slot]
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match self.slot() {
            Some(value) => value,
            None => unreachable!("occupied entry points at a vacant slot"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match self.slot_mut() {
            Some(value) => value,
            None => unreachable!("occupied entry points at a vacant slot"),
        }
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let Self { table, location } = self;
        match &mut table.buckets[location.bucket].slots[location.slot] {
            Some(value) => value,
            None => unreachable!("occupied entry points at a vacant slot"),
        }
    }

    /// Converts the entry into a cursor positioned at its value.
    pub fn into_cursor(self) -> Iter<'a, V, N> {
        let table: &'a HashTable<V, N> = self.table;
        Iter::at(table, Some(self.location.bucket), self.location.slot)
    }

    /// Removes the value from the table, vacating its slot.
    pub fn remove(mut self) -> V {
        let value = self.slot_mut().take();
        self.table.populated -= 1;
        match value {
            Some(value) => value,
            None => unreachable!("occupied entry points at a vacant slot"),
        }
    }
}

/// A cursor over the values of a [`HashTable`], following the enumeration
/// chain.
///
/// Two cursors are equal when they point at the same slot of the same table.
/// An exhausted cursor equals [`HashTable::end`].
pub struct Iter<'a, V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    table: &'a HashTable<V, N>,
    bucket: Option<usize>,
    slot: usize,
}

impl<'a, V, const N: usize> Iter<'a, V, N> {
    fn at(table: &'a HashTable<V, N>, bucket: Option<usize>, slot: usize) -> Self {
        let mut iter = Self {
            table,
            bucket,
            slot,
        };
        iter.seek();
        iter
    }

    /// Moves forward to the next occupied slot, following `next` links past
    /// exhausted buckets.
    fn seek(&mut self) {
        while let Some(bucket) = self.bucket {
            let bucket = &self.table.buckets[bucket];
            if let Some(offset) = bucket.slots[self.slot..].iter().position(Option::is_some) {
                self.slot += offset;
                return;
            }
            self.bucket = bucket.next;
            self.slot = 0;
        }
    }

    /// Returns the value under the cursor without advancing, or `None` at the
    /// end.
    pub fn peek(&self) -> Option<&'a V> {
        let table = self.table;
        table.buckets[self.bucket?].slots[self.slot].as_ref()
    }

    /// Returns `true` if the cursor is past the last value.
    pub fn is_end(&self) -> bool {
        self.bucket.is_none()
    }
}

impl<V, const N: usize> Clone for Iter<'_, V, N> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            bucket: self.bucket,
            slot: self.slot,
        }
    }
}

impl<V, const N: usize> PartialEq for Iter<'_, V, N> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.table, other.table)
            && self.bucket == other.bucket
            && self.slot == other.slot
    }
}

impl<V, const N: usize> Eq for Iter<'_, V, N> {}

impl<V, const N: usize> Debug for Iter<'_, V, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter")
            .field("bucket", &self.bucket)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<'a, V, const N: usize> Iterator for Iter<'a, V, N> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.peek()?;
        self.slot += 1;
        self.seek();
        Some(value)
    }
}

impl<V, const N: usize> FusedIterator for Iter<'_, V, N> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. Values
/// not yet yielded when it is dropped are dropped with it.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    table: &'a mut HashTable<V, N>,
    bucket: Option<usize>,
    slot: usize,
}

impl<V, const N: usize> Iterator for Drain<'_, V, N> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.bucket {
            let bucket = &mut self.table.buckets[bucket];
            while self.slot < N {
                let slot = self.slot;
                self.slot += 1;
                if let Some(value) = bucket.slots[slot].take() {
                    self.table.populated -= 1;
                    return Some(value);
                }
            }
            self.bucket = bucket.next;
            self.slot = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V, const N: usize> ExactSizeIterator for Drain<'_, V, N> {}

impl<V, const N: usize> Drop for Drain<'_, V, N> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// An owning iterator over the values of a [`HashTable`], in allocation
/// order of their buckets.
pub struct IntoIter<V, const N: usize = DEFAULT_BUCKET_CAPACITY> {
    buckets: alloc::vec::IntoIter<Bucket<V, N>>,
    slots: Option<core::array::IntoIter<Option<V>, N>>,
    remaining: usize,
}

impl<V, const N: usize> Iterator for IntoIter<V, N> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.slots.as_mut().and_then(|slots| slots.flatten().next()) {
                self.remaining -= 1;
                return Some(value);
            }
            self.slots = Some(self.buckets.next()?.slots.into_iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V, const N: usize> ExactSizeIterator for IntoIter<V, N> {}

impl<V, const N: usize> FusedIterator for IntoIter<V, N> {}

impl<V, const N: usize> IntoIterator for HashTable<V, N> {
    type IntoIter = IntoIter<V, N>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            buckets: self.buckets.into_iter(),
            slots: None,
        }
    }
}

impl<'a, V, const N: usize> IntoIterator for &'a HashTable<V, N> {
    type IntoIter = Iter<'a, V, N>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
