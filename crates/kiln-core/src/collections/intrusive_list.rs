// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! A circular doubly-linked list threaded through a slot table.
//!
//! The list bookkeeping ([`Link`]) is embedded in the owning struct, so putting an item
//! on a list never costs a second allocation. Links refer to each other by slot index
//! rather than by pointer: heads and members live in the same slice, and every list
//! operation is an extension method on `[T]` (see [`IntrusiveList`]).
//!
//! A head is a sentinel whose `head` field names its own slot. An unlinked member
//! points at itself in both directions. Linking a member always unlinks it first, so a
//! member can hop between lists that share a slot table.

/// Slot value meaning "no slot".
pub const NIL: u32 = u32::MAX;

/// The list bookkeeping embedded in an owner struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    prev: u32,
    next: u32,
    head: u32,
    owner: u32,
}

impl Link {
    /// Creates the sentinel of an empty list stored at `slot`.
    pub const fn head(slot: u32) -> Self {
        Self {
            prev: slot,
            next: slot,
            head: slot,
            owner: NIL,
        }
    }

    /// Creates an unlinked member stored at `slot`, owned by `owner`.
    pub const fn node(slot: u32, owner: u32) -> Self {
        Self {
            prev: slot,
            next: slot,
            head: NIL,
            owner,
        }
    }

    /// The identifier of the struct this link is embedded in.
    #[inline]
    pub fn owner(&self) -> u32 {
        self.owner
    }

    /// The head of the list this member is on, or [`NIL`].
    #[inline]
    pub fn list(&self) -> u32 {
        self.head
    }

    /// The next slot in the ring.
    #[inline]
    pub fn next(&self) -> u32 {
        self.next
    }

    /// The previous slot in the ring.
    #[inline]
    pub fn prev(&self) -> u32 {
        self.prev
    }
}

/// Implemented by structs that embed a [`Link`].
pub trait Linked {
    /// Returns the embedded link.
    fn link(&self) -> &Link;
    /// Returns the embedded link mutably.
    fn link_mut(&mut self) -> &mut Link;
}

impl Linked for Link {
    fn link(&self) -> &Link {
        self
    }

    fn link_mut(&mut self) -> &mut Link {
        self
    }
}

/// List operations over a slot table of [`Linked`] items.
///
/// All slots passed in must be in bounds; heads must have been initialised with
/// [`Link::head`].
pub trait IntrusiveList {
    /// The element type of the slot table.
    type Node: Linked;

    /// Returns `true` if `slot` holds a list head.
    fn is_list_head(&self, slot: u32) -> bool;

    /// Returns `true` if the member at `slot` is currently on a list.
    fn is_linked(&self, slot: u32) -> bool;

    /// Returns `true` if the list headed at `head` has no members.
    fn list_is_empty(&self, head: u32) -> bool;

    /// Moves `node` to the tail of the list headed at `head`.
    fn link_back(&mut self, head: u32, node: u32);

    /// Moves `node` to the front of the list headed at `head`.
    fn link_front(&mut self, head: u32, node: u32);

    /// Takes `node` off whatever list it is on. Unlinked members and heads are left
    /// untouched.
    fn unlink(&mut self, node: u32);

    /// On a head, unlinks every member in O(n). On a member, same as [`unlink`](Self::unlink).
    fn clear_links(&mut self, slot: u32);

    /// Returns the first member of the list, if any.
    fn list_front(&self, head: u32) -> Option<u32>;

    /// Returns the last member of the list, if any.
    fn list_back(&self, head: u32) -> Option<u32>;

    /// Iterates over the member slots of the list headed at `head`, front to back.
    fn list_iter(&self, head: u32) -> ListIter<'_, Self::Node>;
}

impl<T: Linked> IntrusiveList for [T] {
    type Node = T;

    #[inline]
    fn is_list_head(&self, slot: u32) -> bool {
        self[slot as usize].link().head == slot
    }

    #[inline]
    fn is_linked(&self, slot: u32) -> bool {
        let link = self[slot as usize].link();
        link.head != NIL && link.head != slot
    }

    #[inline]
    fn list_is_empty(&self, head: u32) -> bool {
        self[head as usize].link().next == head
    }

    fn link_back(&mut self, head: u32, node: u32) {
        debug_assert!(self.is_list_head(head), "slot {head} is not a list head");
        debug_assert!(!self.is_list_head(node), "cannot link a head as a member");

        self.unlink(node);
        let tail = self[head as usize].link().prev;
        let owner = self[node as usize].link().owner;
        *self[node as usize].link_mut() = Link {
            prev: tail,
            next: head,
            head,
            owner,
        };
        self[tail as usize].link_mut().next = node;
        self[head as usize].link_mut().prev = node;
    }

    fn link_front(&mut self, head: u32, node: u32) {
        debug_assert!(self.is_list_head(head), "slot {head} is not a list head");
        debug_assert!(!self.is_list_head(node), "cannot link a head as a member");

        self.unlink(node);
        let first = self[head as usize].link().next;
        let owner = self[node as usize].link().owner;
        *self[node as usize].link_mut() = Link {
            prev: head,
            next: first,
            head,
            owner,
        };
        self[first as usize].link_mut().prev = node;
        self[head as usize].link_mut().next = node;
    }

    fn unlink(&mut self, node: u32) {
        if !self.is_linked(node) {
            return;
        }
        let Link { prev, next, .. } = *self[node as usize].link();
        self[prev as usize].link_mut().next = next;
        self[next as usize].link_mut().prev = prev;

        let link = self[node as usize].link_mut();
        link.prev = node;
        link.next = node;
        link.head = NIL;
    }

    fn clear_links(&mut self, slot: u32) {
        if !self.is_list_head(slot) {
            self.unlink(slot);
            return;
        }

        let mut current = self[slot as usize].link().next;
        while current != slot {
            let link = self[current as usize].link_mut();
            let next = link.next;
            link.prev = current;
            link.next = current;
            link.head = NIL;
            current = next;
        }

        let head = self[slot as usize].link_mut();
        head.prev = slot;
        head.next = slot;
    }

    fn list_front(&self, head: u32) -> Option<u32> {
        let next = self[head as usize].link().next;
        (next != head).then_some(next)
    }

    fn list_back(&self, head: u32) -> Option<u32> {
        let prev = self[head as usize].link().prev;
        (prev != head).then_some(prev)
    }

    fn list_iter(&self, head: u32) -> ListIter<'_, T> {
        ListIter {
            nodes: self,
            head,
            current: self[head as usize].link().next,
        }
    }
}

/// Iterator over the member slots of one list.
pub struct ListIter<'a, T: Linked> {
    nodes: &'a [T],
    head: u32,
    current: u32,
}

impl<'a, T: Linked> Iterator for ListIter<'a, T> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.head {
            return None;
        }
        let slot = self.current;
        self.current = self.nodes[slot as usize].link().next;
        Some(slot)
    }
}
