//! Bit-offset and context windows for `BitParser`
//!
//! This module contains the stateful components of the bit-granular
//! [`BitParser`](crate::parse::bitparser::BitParser), grouped under the type
//! `ContextOffset`: a monotonically increasing bit index, an immutable
//! absolute limit (the bit-length of the buffer), and a stack of
//! context-window targets.
//!
//! Context windows are how open types and other length-prefixed fields are
//! bounded: once a window of `n` bits is opened, no read can proceed past
//! its end until the window is closed, and it can only be closed once the
//! index has reached its end exactly.

use crate::internal::stack::Stack;
use crate::parse::error::{ParseError, ParseResult, WindowError};
use std::fmt::Debug;

/// Wrapper around [`usize`] that represents monotonically increasing bit-indices
/// into a buffer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Index(usize);

impl Index {
    /// Constructs a new `Index` object initialized to `0`
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self(0usize)
    }

    /// Advances the held value by `n` unless this would cause it to exceed
    /// `lim`.
    ///
    /// Returns the original value (before incrementation), along with a boolean
    /// value that is equal to `true` if and only if the increment occurred.
    #[inline]
    pub fn increment_checked(&mut self, n: usize, lim: usize) -> (usize, bool) {
        let ret = self.0;
        let is_valid = self.0 + n <= lim;
        if is_valid {
            self.0 += n;
        }
        (ret, is_valid)
    }

    #[must_use]
    #[inline(always)]
    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<Index> for usize {
    #[inline]
    fn from(ix: Index) -> Self {
        ix.0
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <usize as std::fmt::Display>::fmt(&self.0, f)
    }
}

/// Trackers of a monotonically increasing index for non-backtracking
/// traversal of an array-like type, with an invariant absolute limit
/// that the index is not permitted to exceed, but is allowed to reach.
pub trait IndexTracker {
    /// Constructor method that takes an argument `abs`, representing
    /// an invariant absolute limit on the index being tracked.
    ///
    /// The initial index-value is always `0`.
    #[must_use]
    fn with_limit(abs: usize) -> Self;

    /// Returns the current value of the index being tracked.
    #[must_use]
    fn index(&self) -> usize;

    /// Returns the absolute upper bound on the index.
    #[must_use]
    fn absolute_limit(&self) -> usize;

    /// Returns the current upper bound on the index.
    ///
    /// If overridden by implementors that support temporary constraints on the
    /// index, the value returned must nevertheless be no greater than
    /// [`absolute_limit`](IndexTracker::absolute_limit).
    #[inline]
    #[must_use]
    fn limit(&self) -> usize {
        self.absolute_limit()
    }

    /// Attempt to increment the index-value by `n`.
    ///
    /// Returns a tuple containing the original index, as well as a boolean
    /// indicating whether the increment was valid, and therefore, whether
    /// it was performed.
    ///
    /// Saturation is not an option. The index must either remain unchanged
    /// or increase by exactly `n`.
    fn advance(&mut self, n: usize) -> (usize, bool);
}

/// Determines whether a new context-window can be created, which must
/// fully nest inside of the most recently created frame.
#[inline]
const fn detect_error(innermost: Option<usize>, request: usize) -> Option<WindowError> {
    match innermost {
        Some(limit) if request > limit => {
            Some(WindowError::OpenWouldExceedWindow { limit, request })
        }
        _ => None,
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "smallvec_framestack")] {
        type FrameVec = smallvec::SmallVec<[usize; 8]>;
    } else {
        type FrameVec = Vec<usize>;
    }
}

/// Stack of target bit-offsets representing the implicit bounds of
/// context windows.
///
/// The elements of a `FrameStack` are guaranteed by induction to be sorted
/// with the smallest value at the top of the stack.
#[derive(Debug)]
#[repr(transparent)]
pub struct FrameStack(FrameVec);

impl FrameStack {
    fn new() -> Self {
        Self(FrameVec::new())
    }

    /// Pushes a new target offset, failing with
    /// `WindowError::OpenWouldExceedWindow` if it does not nest inside the
    /// innermost window.
    fn push_frame(&mut self, target: usize) -> ParseResult<()> {
        Ok(self.0.push_validated(target, detect_error)?)
    }

    fn peek(&self) -> Option<usize> {
        self.0.peek()
    }

    fn pop(&mut self) -> Option<usize> {
        Stack::pop(&mut self.0)
    }

    fn depth(&self) -> usize {
        self.0.depth()
    }
}

/// `ContextOffset`: Utility type for tracking both the current bit-offset of
/// a buffer-based parser, as well as its stack of context-windows.
#[derive(Debug)]
pub struct ContextOffset {
    abs: usize,
    frames: FrameStack,
    cur: Index,
}

impl ContextOffset {
    /// Attempts to create a new context-frame of `winsize` bits, measured from
    /// the current value of the offset index.
    ///
    /// Fails if the novel context-frame exceeds the absolute limit set at time of creation,
    /// or if it would violate the nesting invariant of the innermost context-frame.
    pub fn set_fit(&mut self, winsize: usize) -> ParseResult<()> {
        let cur: usize = self.index();
        let new_tgt: usize = cur + winsize;
        if new_tgt > self.abs {
            Err(ParseError::Window(WindowError::OpenWouldExceedBuffer {
                bits_left: self.abs - cur,
                request: winsize,
            }))
        } else {
            self.frames.push_frame(new_tgt)
        }
    }

    /// Returns `true` when the frame-stack is non-empty and the current
    /// offset matches the innermost frame's target, or `false` otherwise.
    pub fn test_target(&self) -> ParseResult<bool> {
        let cur = self.index();

        if let Some(tgt) = self.frames.peek() {
            match tgt.cmp(&cur) {
                std::cmp::Ordering::Equal => Ok(true),
                std::cmp::Ordering::Greater => Ok(false),
                std::cmp::Ordering::Less => Err(ParseError::Window(WindowError::OffsetOverflow {
                    excess: cur - tgt,
                })),
            }
        } else {
            Ok(false)
        }
    }

    /// Attempt to close the innermost context-frame.
    ///
    /// This method returns `Ok(())` when the current offset
    /// exactly equals the innermost target offset, and fails
    /// otherwise, including the case where there are no
    /// context-windows to close.
    ///
    /// # Errors
    ///
    /// If there are no open context windows, returns a suitably wrapped
    /// [`CloseWithoutWindow`][cwow] error.
    ///
    /// If there are leftover bits in the innermost context window, returns
    /// a suitably wrapped [`CloseWithResidue`][cwr] error.
    ///
    /// [cwow]: crate::parse::error::WindowError::CloseWithoutWindow
    /// [cwr]: crate::parse::error::WindowError::CloseWithResidue
    pub fn enforce_target(&mut self) -> ParseResult<()> {
        let cur: usize = self.index();

        match self.frames.pop() {
            None => Err(ParseError::Window(WindowError::CloseWithoutWindow)),
            Some(tgt) => match tgt.cmp(&cur) {
                std::cmp::Ordering::Equal => Ok(()),
                std::cmp::Ordering::Greater => {
                    Err(ParseError::Window(WindowError::CloseWithResidue {
                        residual: tgt - cur,
                    }))
                }
                std::cmp::Ordering::Less => Err(ParseError::Window(WindowError::OffsetOverflow {
                    excess: cur - tgt,
                })),
            },
        }
    }

    /// Number of context windows currently open
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }
}

impl IndexTracker for ContextOffset {
    fn with_limit(abs: usize) -> Self {
        Self {
            abs,
            frames: FrameStack::new(),
            cur: Index::new(),
        }
    }

    #[inline]
    fn index(&self) -> usize {
        self.cur.to_usize()
    }

    #[inline(always)]
    fn absolute_limit(&self) -> usize {
        self.abs
    }

    /// Returns the upper bound of the narrowest context-window,
    /// or the absolute limit if there are no context windows set.
    #[inline]
    fn limit(&self) -> usize {
        self.frames.peek().unwrap_or(self.abs)
    }

    #[inline]
    fn advance(&mut self, n: usize) -> (usize, bool) {
        self.cur.increment_checked(n, self.limit())
    }
}
