//
// Copyright (c) 2025 Nathan Fiedler
//

//! Fixed-capacity blocks of element slots.
//!
//! A `Buffer` owns its memory but not the values stored in it; the array
//! decides which slots hold live values and drops them itself before the
//! buffer is released.

use crate::error::{Error, Result};
use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;

/// An owning handle to one contiguous block of `capacity` slots.
pub(crate) struct Buffer<T> {
    ptr: NonNull<T>,
    capacity: usize,
}

impl<T> Buffer<T> {
    /// Allocate a block that can hold `capacity` values.
    ///
    /// The slots are uninitialized. Zero-sized types never touch the
    /// allocator.
    pub(crate) fn try_new(capacity: usize) -> Result<Self> {
        let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;
        #[cfg(test)]
        testing::before_alloc(layout)?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            let raw = unsafe { alloc(layout).cast::<T>() };
            NonNull::new(raw).ok_or(Error::AllocFailed { layout })?
        };
        Ok(Self { ptr, capacity })
    }

    /// Number of slots in this block.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the first slot.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        // the layout was validated when the block was allocated
        if let Ok(layout) = Layout::array::<T>(self.capacity) {
            if layout.size() > 0 {
                unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) }
            }
        }
    }
}

/// Compute the error to report when the directory could not reserve room for
/// `slots` buffer handles.
pub(crate) fn directory_error<T>(slots: usize) -> Error {
    match Layout::array::<Buffer<T>>(slots) {
        Ok(layout) => Error::AllocFailed { layout },
        Err(_) => Error::CapacityOverflow,
    }
}

/// Allocate an empty directory with room for exactly `slots` handles.
pub(crate) fn try_directory<T>(slots: usize) -> Result<Vec<Buffer<T>>> {
    #[cfg(test)]
    testing::before_alloc(
        Layout::array::<Buffer<T>>(slots).map_err(|_| Error::CapacityOverflow)?,
    )?;
    let mut dir: Vec<Buffer<T>> = Vec::new();
    dir.try_reserve_exact(slots)
        .map_err(|_| directory_error::<T>(slots))?;
    Ok(dir)
}

/// Allocate `count` buffers of `capacity` slots each, releasing all of them
/// if any single allocation fails.
pub(crate) fn try_buffers<T>(count: usize, capacity: usize) -> Result<Vec<Buffer<T>>> {
    let mut buffers = try_directory::<T>(count)?;
    for _ in 0..count {
        buffers.push(Buffer::try_new(capacity)?);
    }
    Ok(buffers)
}
