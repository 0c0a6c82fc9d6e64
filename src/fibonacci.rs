//! Fibonacci numbers, recursive (memoized) and iterative
//!
//! These are the subjects the harness measures. Values are `u128`, which
//! holds every Fibonacci number up to `fib(186)`; anything larger is reported
//! as [`HarnessError::Overflow`] instead of wrapping.

use crate::error::{HarnessError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Computation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Top-down recursion over a memo table
    Recursive,
    /// Forward sweep keeping the last two values
    Iterative,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Iterative, Variant::Recursive];

    /// Name accepted by [`FromStr`] and written to the `variant` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Recursive => "recursive",
            Variant::Iterative => "iterative",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recursive" => Ok(Variant::Recursive),
            "iterative" => Ok(Variant::Iterative),
            other => Err(HarnessError::InvalidArgument(format!(
                "Unknown variant: {}",
                other
            ))),
        }
    }
}

/// Memoized Fibonacci values, seeded with the base cases
///
/// Entries are write-once: inserting an index that is already present keeps
/// the existing value.
#[derive(Debug, Clone)]
pub struct MemoTable {
    values: HashMap<u64, u128>,
}

impl MemoTable {
    /// Create a table holding only `0 -> 0` and `1 -> 1`
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(0, 0);
        values.insert(1, 1);
        Self { values }
    }

    /// Drop everything except the base cases
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Stored `fib(n)`, if already computed
    pub fn get(&self, n: u64) -> Option<u128> {
        self.values.get(&n).copied()
    }

    /// Whether `fib(n)` is stored
    pub fn contains(&self, n: u64) -> bool {
        self.values.contains_key(&n)
    }

    /// Number of stored indices, base cases included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false once constructed; the base cases are never removed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, n: u64, value: u128) -> u128 {
        *self.values.entry(n).or_insert(value)
    }
}

impl Default for MemoTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest index whose Fibonacci number fits in a `u128`
pub const MAX_N: u64 = 186;

/// Fail with [`HarnessError::Overflow`] for any index above [`MAX_N`]
pub fn check_index(n: u64) -> Result<()> {
    if n > MAX_N {
        return Err(HarnessError::Overflow { n });
    }
    Ok(())
}

/// Compute `fib(n)` with the variant named by `variant`
///
/// The recursive variant uses `memo` when given (and fills it in), or a
/// fresh table otherwise. The iterative variant ignores `memo`. Indices above
/// [`MAX_N`] fail with [`HarnessError::Overflow`] before any work is done.
///
/// # Example
/// ```
/// use fibmark::fibonacci::fibonacci;
///
/// assert_eq!(fibonacci(10, "recursive", None).unwrap(), 55);
/// assert_eq!(fibonacci(20, "iterative", None).unwrap(), 6765);
/// assert!(fibonacci(5, "random", None).is_err());
/// ```
pub fn fibonacci(n: u64, variant: &str, memo: Option<&mut MemoTable>) -> Result<u128> {
    fibonacci_with(n, variant.parse()?, memo)
}

/// Typed form of [`fibonacci`]
pub fn fibonacci_with(n: u64, variant: Variant, memo: Option<&mut MemoTable>) -> Result<u128> {
    check_index(n)?;
    match variant {
        Variant::Recursive => match memo {
            Some(memo) => recursive(n, memo),
            None => recursive(n, &mut MemoTable::new()),
        },
        Variant::Iterative => iterative(n),
    }
}

fn recursive(n: u64, memo: &mut MemoTable) -> Result<u128> {
    if let Some(value) = memo.get(n) {
        return Ok(value);
    }

    // The table always holds 0 and 1, so n >= 2 here.
    let value = recursive(n - 1, memo)?
        .checked_add(recursive(n - 2, memo)?)
        .ok_or(HarnessError::Overflow { n })?;
    Ok(memo.insert(n, value))
}

fn iterative(n: u64) -> Result<u128> {
    if n == 0 {
        return Ok(0);
    }

    let mut previous: u128 = 0;
    let mut current: u128 = 1;
    for _step in 1..n {
        let next = previous
            .checked_add(current)
            .ok_or(HarnessError::Overflow { n })?;
        previous = current;
        current = next;
    }

    Ok(current)
}
