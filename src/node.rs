//! Arena of four-way linked nodes backing the sparse matrix.
//!
//! Every node carries `left`, `right`, `up` and `down` links expressed as
//! indices into the arena, so the root, the column headers and the cells can
//! all be spliced in and out of their circular lists without any aliasing.

use std::ops::{Index, IndexMut};

/// One of the four link directions of a [`Node`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// A single entry in the arena: the root, a column header or a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub left: usize,
    pub right: usize,
    pub up: usize,
    pub down: usize,

    /// Index of the owning column header. Headers and the root point at
    /// themselves.
    pub column: usize,
    /// Caller supplied row id, only present on cells.
    pub row: Option<usize>,
}

impl Node {
    fn self_ref(index: usize, column: usize, row: Option<usize>) -> Self {
        Node {
            left: index,
            right: index,
            up: index,
            down: index,
            column,
            row,
        }
    }

    /// Return the neighbour in the given direction.
    #[inline]
    pub fn link(&self, direction: Direction) -> usize {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }
}

/// Owner of every node in a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Nodes(Vec<Node>);

impl Nodes {
    pub fn with_capacity(capacity: usize) -> Self {
        Nodes(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Push a node that is its own column, with all links pointing at itself.
    ///
    /// Used for the root and for column headers.
    pub fn push_header(&mut self) -> usize {
        let index = self.0.len();
        self.0.push(Node::self_ref(index, index, None));
        index
    }

    /// Push an unlinked cell belonging to the column with header `column`.
    pub fn push_cell(&mut self, column: usize, row: usize) -> usize {
        let index = self.0.len();
        self.0.push(Node::self_ref(index, column, Some(row)));
        index
    }

    /// Return the row id of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is the root or a column header.
    pub fn row(&self, cell: usize) -> usize {
        match self[cell].row {
            Some(row) => row,
            None => panic!("node [{cell}] is a column header, not a cell"),
        }
    }

    /// Return an iterator over the nodes reached by following `direction`
    /// from `origin`, stopping before `origin` comes around again.
    pub fn walk(&self, origin: usize, direction: Direction) -> Iter<'_> {
        Iter {
            nodes: self,
            walk: Walk::new(origin, direction),
        }
    }
}

impl Index<usize> for Nodes {
    type Output = Node;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Nodes {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

macro_rules! add_direction {
    ($name:ident, $direction:ident, $opposite:ident) => {
        pub fn $name(&mut self, anchor: usize, node: usize) {
            let far = self[anchor].$direction;

            self[node].$direction = far;
            self[node].$opposite = anchor;
            self[far].$opposite = node;
            self[anchor].$direction = node;
        }
    };
}

impl Nodes {
    // Link `node` between `anchor` and its current neighbour in the named
    // direction. Inserting to the left of a list head appends at the tail.
    add_direction!(insert_left, left, right);

    add_direction!(insert_above, up, down);
}

// The neighbours are read before either write, so a node whose two neighbours
// are the same index (a list of two) is still spliced correctly.
impl Nodes {
    pub fn unlink_horizontal(&mut self, index: usize) {
        let Node { left, right, .. } = self[index];

        self[left].right = right;
        self[right].left = left;
    }

    pub fn relink_horizontal(&mut self, index: usize) {
        let Node { left, right, .. } = self[index];

        self[left].right = index;
        self[right].left = index;
    }

    pub fn unlink_vertical(&mut self, index: usize) {
        let Node { up, down, .. } = self[index];

        self[up].down = down;
        self[down].up = up;
    }

    pub fn relink_vertical(&mut self, index: usize) {
        let Node { up, down, .. } = self[index];

        self[up].down = index;
        self[down].up = index;
    }
}

/// A position in a circular walk that does not hold a borrow of the arena.
///
/// This lets callers mutate the arena between steps, as long as the links of
/// the nodes on the walk itself are left alone.
#[derive(Debug, Clone)]
pub(crate) struct Walk {
    origin: usize,
    current: usize,
    direction: Direction,
}

impl Walk {
    pub fn new(origin: usize, direction: Direction) -> Self {
        Walk {
            origin,
            current: origin,
            direction,
        }
    }

    pub fn next(&mut self, nodes: &Nodes) -> Option<usize> {
        let next = nodes[self.current].link(self.direction);

        if next == self.origin {
            None
        } else {
            self.current = next;
            Some(next)
        }
    }
}

/// Borrowing iterator returned by [`Nodes::walk`].
#[derive(Debug)]
pub(crate) struct Iter<'n> {
    nodes: &'n Nodes,
    walk: Walk,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next(self.nodes)
    }
}
