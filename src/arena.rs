//! Bump arena backing the AST.
//!
//! Byte accounting is a classic bump allocator: a cursor that only moves
//! forward, rounded up to each request's alignment, failing once the fixed
//! capacity would be exceeded. Nodes live in typed pools and are addressed
//! through generational [`NodeId`] handles, so a handle that outlives
//! [`Arena::reset`] is rejected instead of dangling.

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use snafu::{OptionExt, Snafu, ensure};

use crate::ast::{Expr, Stmt};

pub type ArenaResult<T> = Result<T, ArenaError>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArenaError {
  #[snafu(display(
    "arena exhausted: requested {requested} bytes with {used} of {capacity} in use"
  ))]
  Exhausted {
    requested: usize,
    used: usize,
    capacity: usize,
  },

  #[snafu(display("alignment {align} is not a power of two"))]
  InvalidAlignment { align: usize },

  #[snafu(display(
    "stale handle #{index} from generation {generation}, arena is at generation {current}"
  ))]
  StaleHandle {
    index: usize,
    generation: u64,
    current: u64,
  },
}

/// Typed handle to a node stored in an [`Arena`].
pub struct NodeId<T> {
  index: usize,
  generation: u64,
  _marker: PhantomData<fn() -> T>,
}

impl<T> NodeId<T> {
  /// Position of the node inside its pool.
  pub const fn index(self) -> usize {
    self.index
  }
}

impl<T> Clone for NodeId<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for NodeId<T> {}

impl<T> PartialEq for NodeId<T> {
  fn eq(&self, other: &Self) -> bool {
    self.index == other.index && self.generation == other.generation
  }
}

impl<T> Eq for NodeId<T> {}

impl<T> fmt::Debug for NodeId<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "NodeId({}@{})", self.index, self.generation)
  }
}

/// Node types the arena knows how to store.
pub trait ArenaNode: Sized {
  fn pool(arena: &Arena) -> &[Self];
  fn pool_mut(arena: &mut Arena) -> &mut Vec<Self>;
}

impl ArenaNode for Expr {
  fn pool(arena: &Arena) -> &[Self] {
    &arena.exprs
  }

  fn pool_mut(arena: &mut Arena) -> &mut Vec<Self> {
    &mut arena.exprs
  }
}

impl ArenaNode for Stmt {
  fn pool(arena: &Arena) -> &[Self] {
    &arena.stmts
  }

  fn pool_mut(arena: &mut Arena) -> &mut Vec<Self> {
    &mut arena.stmts
  }
}

/// Fixed-capacity arena. Single writer; not meant to be shared across threads
/// while it is being filled.
#[derive(Debug)]
pub struct Arena {
  capacity: usize,
  offset: usize,
  generation: u64,
  exprs: Vec<Expr>,
  stmts: Vec<Stmt>,
}

impl Arena {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      offset: 0,
      generation: 0,
      exprs: Vec::new(),
      stmts: Vec::new(),
    }
  }

  /// Reserve `size` bytes aligned to `align`, returning the aligned offset.
  ///
  /// A failed request leaves the cursor where it was.
  pub fn allocate(&mut self, size: usize, align: usize) -> ArenaResult<usize> {
    ensure!(align.is_power_of_two(), InvalidAlignmentSnafu { align });

    let span = self
      .offset
      .checked_next_multiple_of(align)
      .and_then(|start| Some((start, start.checked_add(size)?)));

    match span {
      Some((start, end)) if end <= self.capacity => {
        self.offset = end;
        Ok(start)
      }
      _ => ExhaustedSnafu {
        requested: size,
        used: self.offset,
        capacity: self.capacity,
      }
      .fail(),
    }
  }

  /// Reserve room for `value` and store it, returning its handle.
  pub fn alloc<T: ArenaNode>(&mut self, value: T) -> ArenaResult<NodeId<T>> {
    self.allocate(mem::size_of::<T>(), mem::align_of::<T>())?;

    let generation = self.generation;
    let pool = T::pool_mut(self);
    let index = pool.len();
    pool.push(value);

    Ok(NodeId {
      index,
      generation,
      _marker: PhantomData,
    })
  }

  /// Resolve a handle issued by this arena since its last reset.
  pub fn get<T: ArenaNode>(&self, id: NodeId<T>) -> ArenaResult<&T> {
    let stale = StaleHandleSnafu {
      index: id.index,
      generation: id.generation,
      current: self.generation,
    };
    ensure!(id.generation == self.generation, stale);
    T::pool(self).get(id.index).context(stale)
  }

  /// Rewind the cursor to zero and forget every node.
  ///
  /// Handles issued before the reset fail to resolve afterwards.
  pub fn reset(&mut self) {
    self.offset = 0;
    self.exprs.clear();
    self.stmts.clear();
    self.generation += 1;
  }

  pub fn used(&self) -> usize {
    self.offset
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn remaining(&self) -> usize {
    self.capacity - self.offset
  }

  /// Number of live nodes of type `T`.
  pub fn node_count<T: ArenaNode>(&self) -> usize {
    T::pool(self).len()
  }
}
