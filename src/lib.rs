//
// Copyright (c) 2025 Nathan Fiedler
//

//! An implementation of the succinct resizable array as described in the paper
//! "Resizable Arrays in Optimal Time and Space" by Andrej Brodnik, Svante
//! Carlsson, Erik D. Demaine, J. Ian Munro, and Robert Sedgewick, published in
//! 1999, using the simplified layout evaluated in "An Empirical Evaluation of
//! Extendible Arrays" by Stelios Joannou and Rajeev Raman, published in 2011.
//!
//! * https://doi.org/10.1007/3-540-48447-7_4
//! * https://doi.org/10.1007/978-3-642-20662-7_38
//!
//! The elements live in about √N buffers of about √N slots each, and a
//! directory holds the owning handle of every buffer. All buffers share one
//! power-of-two capacity, so locating an element is a shift and a mask. When
//! the directory fills up either the directory doubles (cheap, only the handles
//! move) or every pair of buffers is merged into one buffer of twice the
//! capacity (expensive, every element moves). The two alternate, and shrinking
//! mirrors growing, which keeps both amortized constant time.
//!
//! # Memory Usage
//!
//! An empty array is approximately 56 bytes in size plus one buffer of two
//! slots, and while holding elements it will have a space overhead on the
//! order of O(√N). At most one empty buffer is retained past the last occupied
//! buffer so that alternating pushes and pops at a buffer boundary do not
//! allocate and free the same buffer over and over.
//!
//! # Performance
//!
//! Lookups are a shift, a mask, and two pointer dereferences. Appending and
//! removing at the end are amortized constant time, with the occasional
//! rebuild of the directory in O(√N) or of all the buffers in O(N).
//!
//! # Safety
//!
//! Because this data structure is allocating memory, copying bytes using
//! pointers, and de-allocating memory as needed, there are many `unsafe` blocks
//! throughout the code.

mod buffer;
mod error;

pub use error::{Error, PushError, Result};

use buffer::{Buffer, try_buffers, try_directory};
use std::alloc::handle_alloc_error;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::ptr::{copy_nonoverlapping, drop_in_place, slice_from_raw_parts_mut};

/// Log2 of the buffer capacity of a newly created array.
const INITIAL_LOG_CAPACITY: usize = 1;

/// Report an error from an operation that cannot return one, in the same
/// manner as the standard collections.
fn handle_error(error: Error) -> ! {
    match error {
        Error::AllocFailed { layout } => handle_alloc_error(layout),
        other => panic!("{other}"),
    }
}

///
/// Growable array with O(√N) unused space, after Brodnik et al.
///
pub struct SuccinctArray<T> {
    /// owning handles of the buffers, with the extra buffer (if any) last
    dir: Vec<Buffer<T>>,
    /// number of buffers counted as holding elements
    dir_size: usize,
    /// number of elements in the last counted buffer
    last_buffer_size: usize,
    /// every buffer holds 2^log_buffer_capacity elements
    log_buffer_capacity: usize,
    /// buffers have twice the capacity of the directory if true, otherwise the
    /// two capacities are equal
    big_buffer: bool,
    /// an empty buffer is held in the directory slot after the last counted
    /// buffer; avoids deallocating a buffer and then allocating another one of
    /// the same size for a pop followed by a push
    extra_buffer: bool,
}

impl<T> SuccinctArray<T> {
    /// Return an empty array holding a single buffer of two slots.
    ///
    /// # Panics
    ///
    /// Aborts if the initial buffer cannot be allocated.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|error| handle_error(error))
    }

    /// Return an empty array, or an error if the initial buffer could not be
    /// allocated.
    pub fn try_new() -> Result<Self> {
        let mut dir = try_directory(1)?;
        dir.push(Buffer::try_new(1 << INITIAL_LOG_CAPACITY)?);
        Ok(Self {
            dir,
            dir_size: 1,
            last_buffer_size: 0,
            log_buffer_capacity: INITIAL_LOG_CAPACITY,
            big_buffer: true,
            extra_buffer: false,
        })
    }

    #[inline]
    fn buffer_capacity(&self) -> usize {
        1 << self.log_buffer_capacity
    }

    #[inline]
    fn dir_capacity(&self) -> usize {
        1 << (self.log_buffer_capacity - self.big_buffer as usize)
    }

    /// Number of buffers allocated, including the extra buffer.
    #[inline]
    fn allocated_buffers(&self) -> usize {
        self.dir_size + self.extra_buffer as usize
    }

    /// Number of live elements in the counted buffer at `block`.
    #[inline]
    fn live_in_buffer(&self, block: usize) -> usize {
        if block + 1 < self.dir_size {
            self.buffer_capacity()
        } else {
            self.last_buffer_size
        }
    }

    /// Map an element index to a directory slot and an offset within the
    /// buffer in that slot.
    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        let big = index >> self.log_buffer_capacity;
        let little = index & (self.buffer_capacity() - 1);
        (big, little)
    }

    /// Return the number of elements in the array.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn len(&self) -> usize {
        ((self.dir_size - 1) << self.log_buffer_capacity) + self.last_buffer_size
    }

    /// Returns true if the array has a length of 0.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn is_empty(&self) -> bool {
        self.dir_size == 1 && self.last_buffer_size == 0
    }

    /// Returns the number of element slots across every allocated buffer,
    /// including the extra buffer and the unused tail of the last buffer.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn capacity(&self) -> usize {
        self.allocated_buffers() * self.buffer_capacity()
    }

    /// Check the structural rules that every public operation preserves.
    ///
    /// Mutating operations run this in debug builds only; tests may call it
    /// after any operation.
    pub fn validate(&self) -> Result<()> {
        fn rule(holds: bool, broken: &'static str) -> Result<()> {
            if holds {
                Ok(())
            } else {
                Err(Error::InvariantViolated(broken))
            }
        }
        rule(self.log_buffer_capacity > 0, "buffer capacity below two")?;
        rule(self.dir_size > 0, "no counted buffer")?;
        rule(
            self.dir_size <= self.dir_capacity(),
            "more counted buffers than directory slots",
        )?;
        rule(
            self.last_buffer_size < self.buffer_capacity(),
            "last buffer is full",
        )?;
        rule(
            self.last_buffer_size > 0 || !self.extra_buffer,
            "extra buffer held behind an empty last buffer",
        )?;
        rule(
            !self.extra_buffer || self.dir_size < self.dir_capacity(),
            "no directory slot for the extra buffer",
        )?;
        rule(
            self.allocated_buffers() * 4 >= self.dir_capacity(),
            "directory less than a quarter full",
        )?;
        rule(
            self.dir.len() == self.allocated_buffers(),
            "directory length disagrees with buffer count",
        )?;
        let capacity = self.buffer_capacity();
        rule(
            self.dir.first().is_some_and(|b| b.capacity() == capacity)
                && self.dir.last().is_some_and(|b| b.capacity() == capacity),
            "buffer capacity disagrees with directory",
        )?;
        Ok(())
    }

    /// Retrieve a reference to the element at the given offset.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            None
        } else {
            let (big, little) = self.locate(index);
            unsafe { (self.dir[big].as_ptr().add(little)).as_ref() }
        }
    }

    /// Returns a mutable reference to an element.
    ///
    /// # Time complexity
    ///
    /// Constant time.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            None
        } else {
            let (big, little) = self.locate(index);
            unsafe { (self.dir[big].as_ptr().add(little)).as_mut() }
        }
    }

    /// Appends an element to the back of a collection.
    ///
    /// # Panics
    ///
    /// Aborts if a buffer or the directory cannot be allocated, and panics if
    /// a buffer would exceed `isize::MAX` _bytes_.
    ///
    /// # Time complexity
    ///
    /// Amortized constant time, O(N) when every buffer is rebuilt.
    pub fn push(&mut self, value: T) {
        if let Err(failure) = self.try_push(value) {
            let (_, error) = failure.into_parts();
            handle_error(error)
        }
    }

    /// Appends an element, or returns it together with the error if the
    /// memory needed to make room for the next element could not be
    /// allocated.
    ///
    /// Every rebuild allocates all of its new memory before touching the
    /// existing buffers, so on failure the array holds exactly the same
    /// elements as before the call and remains fully usable.
    ///
    /// # Time complexity
    ///
    /// Amortized constant time, O(N) when every buffer is rebuilt.
    pub fn try_push(&mut self, value: T) -> std::result::Result<(), PushError<T>> {
        let last = self.dir_size - 1;
        unsafe {
            std::ptr::write(self.dir[last].as_ptr().add(self.last_buffer_size), value);
        }
        self.last_buffer_size += 1;
        if self.last_buffer_size == self.buffer_capacity() {
            if let Err(error) = self.advance_buffer() {
                // the value is still the last element, wherever a partial
                // rebuild may have moved it
                self.last_buffer_size -= 1;
                let last = self.dir_size - 1;
                let value = unsafe { self.dir[last].as_ptr().add(self.last_buffer_size).read() };
                log::debug!("push failed at length {}: {}", self.len(), error);
                debug_assert!(self.validate().is_ok(), "{self}");
                return Err(PushError::new(value, error));
            }
        }
        debug_assert!(self.validate().is_ok(), "{self}");
        Ok(())
    }

    /// Make the buffer after the (now full) last buffer the new last buffer,
    /// allocating it if there is no extra buffer to reuse.
    fn advance_buffer(&mut self) -> Result<()> {
        if !self.extra_buffer {
            if self.dir_size == self.dir_capacity() {
                // no extra buffer and no directory slot for a new one
                self.upsize()?;
            }
            let buffer = Buffer::try_new(self.buffer_capacity())?;
            self.dir.push(buffer);
        }
        self.dir_size += 1;
        self.extra_buffer = false;
        self.last_buffer_size = 0;
        Ok(())
    }

    /// Removes the last element from an array and returns it, or `None` if it
    /// is empty.
    ///
    /// # Panics
    ///
    /// Aborts if the rebuild of a sparse array cannot allocate its memory.
    ///
    /// # Time complexity
    ///
    /// Amortized constant time, O(N) when every buffer is rebuilt.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        if self.last_buffer_size == 0 {
            // the empty last buffer becomes the extra buffer
            self.last_buffer_size = self.buffer_capacity() - 1;
            self.dir_size -= 1;
            self.extra_buffer = true;
        } else {
            self.last_buffer_size -= 1;
        }
        let last = self.dir_size - 1;
        let value = unsafe { self.dir[last].as_ptr().add(self.last_buffer_size).read() };
        if self.last_buffer_size == 0 && self.extra_buffer {
            // the emptied last buffer now serves as the spare, release the other
            self.dir.pop();
            self.extra_buffer = false;
        }
        if self.allocated_buffers() * 4 <= self.dir_capacity() {
            // every earlier pop left the directory more than a quarter full
            debug_assert_eq!(self.allocated_buffers() * 4, self.dir_capacity());
            if let Err(error) = self.downsize() {
                handle_error(error)
            }
        }
        debug_assert!(self.validate().is_ok(), "{self}");
        Some(value)
    }

    /// Removes and returns the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty; nothing is modified in that case.
    ///
    /// # Time complexity
    ///
    /// Amortized constant time.
    pub fn pop_back(&mut self) -> T {
        let Some(value) = self.pop() else {
            panic!("pop_back on empty array");
        };
        value
    }

    /// Make room in the directory for at least one more buffer.
    fn upsize(&mut self) -> Result<()> {
        let old_len = self.len();
        if self.big_buffer {
            self.upsize_dir()?;
        } else {
            self.upsize_buffers()?;
        }
        debug_assert_eq!(self.len(), old_len);
        Ok(())
    }

    /// Rebuild a directory that has become at most a quarter full.
    fn downsize(&mut self) -> Result<()> {
        let old_len = self.len();
        if self.big_buffer {
            self.downsize_buffers()?;
        } else {
            self.downsize_dir()?;
        }
        debug_assert_eq!(self.len(), old_len);
        Ok(())
    }

    /// Double the capacity of the directory, leaving the buffers untouched.
    ///
    /// # Time complexity
    ///
    /// O(√N)
    fn upsize_dir(&mut self) -> Result<()> {
        debug_assert!(self.big_buffer);
        let old_capacity = self.dir_capacity();
        let mut dir = try_directory(2 * old_capacity)?;
        dir.append(&mut self.dir);
        self.dir = dir;
        self.big_buffer = false;
        log::trace!(
            "upsize_dir: directory capacity {} -> {}",
            old_capacity,
            self.dir_capacity()
        );
        Ok(())
    }

    /// Halve the capacity of the directory, leaving the buffers untouched.
    ///
    /// # Time complexity
    ///
    /// O(√N)
    fn downsize_dir(&mut self) -> Result<()> {
        debug_assert!(!self.big_buffer);
        let old_capacity = self.dir_capacity();
        debug_assert!(self.dir.len() <= old_capacity / 2);
        let mut dir = try_directory(old_capacity / 2)?;
        dir.append(&mut self.dir);
        self.dir = dir;
        self.big_buffer = true;
        log::trace!(
            "downsize_dir: directory capacity {} -> {}",
            old_capacity,
            self.dir_capacity()
        );
        Ok(())
    }

    /// Merge every pair of adjacent buffers into one buffer of twice the
    /// capacity.
    ///
    /// Only called from a push that filled the last slot of a full directory,
    /// hence the last buffer is exactly full and `last_buffer_size` is
    /// temporarily equal to the buffer capacity.
    ///
    /// # Time complexity
    ///
    /// O(N)
    fn upsize_buffers(&mut self) -> Result<()> {
        debug_assert!(!self.big_buffer);
        debug_assert!(!self.extra_buffer);
        debug_assert_eq!(self.dir_size, self.dir_capacity());
        debug_assert_eq!(self.last_buffer_size, self.buffer_capacity());
        let old_capacity = self.buffer_capacity();
        let mut merged = try_buffers::<T>(self.dir_size / 2, 2 * old_capacity)?;
        for (pair, target) in self.dir.chunks_exact(2).zip(merged.iter()) {
            unsafe {
                copy_nonoverlapping(pair[0].as_ptr(), target.as_ptr(), old_capacity);
                copy_nonoverlapping(
                    pair[1].as_ptr(),
                    target.as_ptr().add(old_capacity),
                    old_capacity,
                );
            }
        }
        // the old buffers no longer own any values, only release their memory
        self.dir.clear();
        self.dir.append(&mut merged);
        self.dir_size /= 2;
        self.last_buffer_size *= 2;
        self.log_buffer_capacity += 1;
        self.big_buffer = true;
        log::trace!(
            "upsize_buffers: buffer capacity {} -> {}, {} buffers",
            old_capacity,
            self.buffer_capacity(),
            self.dir_size
        );
        Ok(())
    }

    /// Split every buffer into two buffers of half the capacity.
    ///
    /// Only called from a pop that released the extra buffer, hence the last
    /// buffer is empty; it is replaced by one empty buffer of the new size.
    ///
    /// # Time complexity
    ///
    /// O(N)
    fn downsize_buffers(&mut self) -> Result<()> {
        debug_assert!(self.big_buffer);
        debug_assert!(!self.extra_buffer);
        debug_assert_eq!(self.last_buffer_size, 0);
        debug_assert!(self.dir_size * 2 < self.dir_capacity());
        let old_capacity = self.buffer_capacity();
        let half = old_capacity / 2;
        let full = self.dir_size - 1;
        let split = try_buffers::<T>(2 * full + 1, half)?;
        for (block, source) in self.dir[..full].iter().enumerate() {
            unsafe {
                copy_nonoverlapping(source.as_ptr(), split[2 * block].as_ptr(), half);
                copy_nonoverlapping(
                    source.as_ptr().add(half),
                    split[2 * block + 1].as_ptr(),
                    half,
                );
            }
        }
        self.dir.clear();
        self.dir.extend(split);
        self.dir_size = 2 * full + 1;
        self.log_buffer_capacity -= 1;
        self.big_buffer = false;
        log::trace!(
            "downsize_buffers: buffer capacity {} -> {}, {} buffers",
            old_capacity,
            self.buffer_capacity(),
            self.dir_size
        );
        Ok(())
    }

    /// Drop every live element and mark the array as empty. The buffers are
    /// left allocated and the directory may disagree with the counters until
    /// the caller replaces or drops it.
    fn drop_elements(&mut self) {
        let dir_size = self.dir_size;
        let last_buffer_size = self.last_buffer_size;
        // reset first so that a panicking destructor cannot lead to a second
        // drop of the same values
        self.dir_size = 1;
        self.last_buffer_size = 0;
        self.extra_buffer = false;
        if std::mem::needs_drop::<T>() {
            let capacity = self.buffer_capacity();
            for (block, buffer) in self.dir.iter().take(dir_size).enumerate() {
                let live = if block + 1 < dir_size {
                    capacity
                } else {
                    last_buffer_size
                };
                unsafe {
                    drop_in_place(slice_from_raw_parts_mut(buffer.as_ptr(), live));
                }
            }
        }
    }

    /// Clears the array, removing and dropping all values and deallocating
    /// all buffers, leaving it as if newly created.
    ///
    /// # Time complexity
    ///
    /// O(N) if elements are droppable, otherwise O(√N)
    pub fn clear(&mut self) {
        self.drop_elements();
        *self = Self::new();
    }
}

impl<T> Default for SuccinctArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SuccinctArray<T> {
    /// Deep copy with the same shape: the same directory capacity, the same
    /// buffer capacity, and as many buffers (including any extra buffer).
    fn clone(&self) -> Self {
        let capacity = self.buffer_capacity();
        let mut dir = try_directory::<T>(self.dir_capacity()).unwrap_or_else(|e| handle_error(e));
        for _ in 0..self.dir.len() {
            dir.push(Buffer::try_new(capacity).unwrap_or_else(|e| handle_error(e)));
        }
        // a panicking clone() leaks the values written so far, the new
        // buffers are still released by the directory
        for block in 0..self.dir_size {
            let source = self.dir[block].as_ptr();
            let target = dir[block].as_ptr();
            for slot in 0..self.live_in_buffer(block) {
                unsafe {
                    target.add(slot).write((*source.add(slot)).clone());
                }
            }
        }
        Self {
            dir,
            dir_size: self.dir_size,
            last_buffer_size: self.last_buffer_size,
            log_buffer_capacity: self.log_buffer_capacity,
            big_buffer: self.big_buffer,
            extra_buffer: self.extra_buffer,
        }
    }

    /// Releases the current contents before copying those of `source`.
    fn clone_from(&mut self, source: &Self) {
        self.drop_elements();
        self.dir = Vec::new();
        *self = source.clone();
    }
}

impl<T> fmt::Display for SuccinctArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SuccinctArray(n: {}, b: {}, d: {}/{}, l: {}, big: {}, extra: {})",
            self.len(),
            self.buffer_capacity(),
            self.dir_size,
            self.dir_capacity(),
            self.last_buffer_size,
            self.big_buffer,
            self.extra_buffer
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for SuccinctArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.len()).map(|index| &self[index]))
            .finish()
    }
}

impl<T> Drop for SuccinctArray<T> {
    fn drop(&mut self) {
        // the buffers and then the directory are released when `dir` drops
        self.drop_elements();
    }
}

impl<T> Index<usize> for SuccinctArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        let Some(item) = self.get(index) else {
            panic!("index out of bounds: {}", index);
        };
        item
    }
}

impl<T> IndexMut<usize> for SuccinctArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let Some(item) = self.get_mut(index) else {
            panic!("index out of bounds: {}", index);
        };
        item
    }
}
