//! Threshold counting over sorted posting lists.
//!
//! Given a set of strictly-increasing, duplicate-free id lists and a
//! threshold `t`, the kernels in this crate emit every id that occurs in
//! strictly more than `t` of the lists. The blocked variants sweep the id
//! universe in cache-resident tiles so the counter array never leaves L1d;
//! [`scan_reference`] keeps one counter per id in the whole universe and
//! serves as the correctness oracle.
//!
//! Counters are bytes. A query must therefore reference at most 255 lists;
//! the kernels do not check this and overflow silently corrupts the answer.

use log::debug;
use std::sync::OnceLock;

mod avx2;
mod avx512;
mod range;
mod reference;
mod scalar;

pub use avx2::scan_blocked_256;
pub use avx512::{scan_blocked_512, RANGE_SIZE_512};
pub use range::{build_all_range_ends, build_range_ends};
pub use reference::scan_reference;
pub use scalar::{scan_blocked, RANGE_SIZE};

pub type DocId = u32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("query references posting {index}, database has {count}")]
    InvalidQueryRef { index: DocId, count: usize },

    #[error("range size must be positive")]
    BadRangeSize,

    #[error("bad range-end tables: {0}")]
    BadRangeEnds(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Largest last element over the non-empty lists.
pub(crate) fn max_doc_id(lists: &[&[DocId]]) -> Option<DocId> {
    lists.iter().filter_map(|list| list.last().copied()).max()
}

pub(crate) fn has_avx2() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        std::arch::is_x86_feature_detected!("avx2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

pub(crate) fn has_avx512() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        std::arch::is_x86_feature_detected!("avx512f")
            && std::arch::is_x86_feature_detected!("avx512bw")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// The available scan-count implementations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// One counter per id in the universe; the oracle.
    Reference,
    /// Cache-blocked scalar sweep.
    Blocked,
    /// Blocked sweep with an AVX2 hit scan.
    Blocked256,
    /// Blocked sweep with AVX-512 gather/scatter counter updates.
    Blocked512,
}

impl Kernel {
    pub const ALL: [Kernel; 4] = [
        Kernel::Reference,
        Kernel::Blocked,
        Kernel::Blocked256,
        Kernel::Blocked512,
    ];

    /// Whether the vector path of this kernel runs on the current CPU. The
    /// entry points themselves degrade to an equivalent scalar schedule when
    /// it does not, so every kernel is callable everywhere.
    pub fn is_native(self) -> bool {
        match self {
            Kernel::Reference | Kernel::Blocked => true,
            Kernel::Blocked256 => has_avx2(),
            Kernel::Blocked512 => has_avx512(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Reference => "reference",
            Kernel::Blocked => "blocked",
            Kernel::Blocked256 => "blocked-256",
            Kernel::Blocked512 => "blocked-512",
        }
    }
}

/// Widest kernel the current CPU supports, decided once per process.
pub fn preferred_kernel() -> Kernel {
    static CHOSEN: OnceLock<Kernel> = OnceLock::new();
    *CHOSEN.get_or_init(|| {
        let kernel = if has_avx512() {
            Kernel::Blocked512
        } else if has_avx2() {
            Kernel::Blocked256
        } else {
            Kernel::Blocked
        };
        debug!("selected {} scan kernel", kernel.name());
        kernel
    })
}

/// Decoded posting lists plus their cached range-end tables.
///
/// The tables cost one linear pass per list to build and are shared by every
/// query answered against the same database.
pub struct ScanDatabase {
    lists: Vec<Vec<DocId>>,
    range_ends: Vec<Vec<u32>>,
}

impl ScanDatabase {
    pub fn new(lists: Vec<Vec<DocId>>) -> Result<Self> {
        let borrowed: Vec<&[DocId]> = lists.iter().map(Vec::as_slice).collect();
        let range_ends = build_all_range_ends(&borrowed, RANGE_SIZE_512)?;
        Ok(Self { lists, range_ends })
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of posting entries the query touches.
    pub fn query_weight(&self, query: &[DocId]) -> Result<usize> {
        let mut total = 0;
        for &index in query {
            total += self.resolve(index)?.len();
        }
        Ok(total)
    }

    /// Runs `query` through `kernel` and returns the ids occurring in
    /// strictly more than `threshold` of the referenced lists. Order follows
    /// the kernel's sweep; sort if you need sorted output.
    pub fn execute(&self, query: &[DocId], threshold: u8, kernel: Kernel) -> Result<Vec<DocId>> {
        let mut lists = Vec::with_capacity(query.len());
        let mut ends = Vec::with_capacity(query.len());
        for &index in query {
            lists.push(self.resolve(index)?);
            ends.push(self.range_ends[index as usize].as_slice());
        }

        let mut out = Vec::new();
        match kernel {
            Kernel::Reference => scan_reference(&lists, threshold, &mut out),
            Kernel::Blocked => scan_blocked(&lists, threshold, &mut out),
            Kernel::Blocked256 => scan_blocked_256(&lists, threshold, &mut out),
            Kernel::Blocked512 => {
                scan_blocked_512(RANGE_SIZE_512, &lists, &ends, threshold, &mut out)?
            }
        }
        Ok(out)
    }

    fn resolve(&self, index: DocId) -> Result<&[DocId]> {
        self.lists
            .get(index as usize)
            .map(Vec::as_slice)
            .ok_or(Error::InvalidQueryRef {
                index,
                count: self.lists.len(),
            })
    }
}
