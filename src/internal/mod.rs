//! Low-level logic used throughout this crate
//!
//! This module serves as a general heading for the stateful machinery
//! behind [`BitParser`](crate::parse::bitparser::BitParser): the `Stack`
//! abstraction over the context-window targets, and the `offset` submodule
//! containing the bit-index tracker with context-window support.

pub(crate) mod offset;
pub(crate) mod stack;

pub(crate) use stack::Stack;
