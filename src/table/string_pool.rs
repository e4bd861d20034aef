/// Handle to an interned string literal: the owning pool entry and the
/// byte at which the literal starts inside that entry. A handle into the
/// middle of an entry is a literal that shares the entry's tail.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct StringRef {
    entry: usize,
    start: usize,
}

#[derive(Clone, Debug)]
struct PoolEntry {
    bytes: Vec<u8>,
    // length+1 of this entry plus the total of every older entry
    total: usize,
}

/// Deduplicating pool for string literals.
///
/// Entries are stored oldest first but are searched and emitted newest
/// first. The emitted blob is a leading NUL followed by every entry (newest
/// first), each NUL terminated, so an entry's distance from the end of the
/// blob is fixed the moment it is created and never changes afterwards.
#[derive(Clone, Debug, Default)]
pub struct StringPool {
    entries: Vec<PoolEntry>,
}

impl StringPool {
    pub fn new() -> StringPool {
        StringPool {
            entries: Vec::new(),
        }
    }

    /// Intern `bytes`, reusing the tail of an existing entry when the new
    /// string is a suffix of it.
    pub fn intern(&mut self, bytes: Vec<u8>) -> StringRef {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            if entry.bytes.ends_with(&bytes) {
                log::trace!(
                    target: "lexer",
                    "string {:?} shares entry {}",
                    String::from_utf8_lossy(&bytes),
                    index
                );
                return StringRef {
                    entry: index,
                    start: entry.bytes.len() - bytes.len(),
                };
            }
        }

        let total = bytes.len() + 1 + self.total();
        self.entries.push(PoolEntry { bytes, total });
        StringRef {
            entry: self.entries.len() - 1,
            start: 0,
        }
    }

    /// Distance from the end of the emitted blob to the first byte of `string`.
    pub fn offset_of(&self, string: StringRef) -> usize {
        self.entries[string.entry].total - string.start
    }

    /// The content of an interned literal, without the terminating NUL.
    pub fn get(&self, string: StringRef) -> &[u8] {
        &self.entries[string.entry].bytes[string.start..]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bytes used by all entries, terminators included.
    pub fn total(&self) -> usize {
        self.entries.last().map_or(0, |entry| entry.total)
    }

    /// The literal section content, ending exactly where the end marker goes.
    pub fn blob(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(self.total() + 1);
        blob.push(0);
        for entry in self.entries.iter().rev() {
            blob.extend_from_slice(&entry.bytes);
            blob.push(0);
        }
        blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_back(pool: &StringPool, string: StringRef) -> Vec<u8> {
        let blob = pool.blob();
        let start = blob.len() - pool.offset_of(string);
        let end = start + blob[start..].iter().position(|&b| b == 0).unwrap();
        blob[start..end].to_vec()
    }

    #[test]
    fn suffix_is_shared_without_growing_pool() {
        let mut pool = StringPool::new();
        let hello = pool.intern(b"hello".to_vec());
        let total = pool.total();
        let lo = pool.intern(b"lo".to_vec());
        assert_eq!(pool.total(), total);
        assert_eq!(pool.get(lo), b"lo");
        assert_eq!(read_back(&pool, hello), b"hello");
        assert_eq!(read_back(&pool, lo), b"lo");
        assert_eq!(pool.offset_of(hello) - pool.offset_of(lo), 3);
    }

    #[test]
    fn longer_string_after_suffix_gets_new_entry() {
        let mut pool = StringPool::new();
        let lo = pool.intern(b"lo".to_vec());
        let hello = pool.intern(b"hello".to_vec());
        assert_ne!(lo, hello);
        assert_eq!(pool.total(), 3 + 6);
        assert_eq!(read_back(&pool, lo), b"lo");
        assert_eq!(read_back(&pool, hello), b"hello");
    }

    #[test]
    fn offsets_stay_valid_as_pool_grows() {
        let mut pool = StringPool::new();
        let words: Vec<&[u8]> = vec![b"alpha", b"beta", b"ta", b"", b"gamma", b"a", b"delta"];
        let mut handles = Vec::new();
        for word in &words {
            let handle = pool.intern(word.to_vec());
            handles.push((handle, pool.offset_of(handle)));
        }
        for (word, (handle, offset)) in words.iter().zip(handles.iter()) {
            assert_eq!(pool.offset_of(*handle), *offset);
            assert_eq!(&read_back(&pool, *handle)[..], *word);
        }
    }

    #[test]
    fn empty_pool_has_only_leading_nul() {
        let pool = StringPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.blob(), vec![0]);
    }
}
