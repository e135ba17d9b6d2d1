//! Parameter memory of one call frame.
//!
//! One flat arena of optional words. Declaring a form appends a block of
//! `slot_count` unset slots; scopes remember the arena and declaration
//! lengths on entry and truncate back to them on exit, so storage is
//! released strictly in reverse order of declaration.

use std::collections::HashMap;

use crate::form::{Form, FormBehavior, FormId};
use crate::procedure::InstructionId;

#[derive(Debug)]
struct Block {
    form: Form,
    start: usize,
    len: usize,
    origin: Option<InstructionId>,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    declared: usize,
    slots: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Memory {
    slots: Vec<Option<u64>>,
    blocks: HashMap<FormId, Block>,
    /// Declaration order, innermost scope last
    order: Vec<FormId>,
    scopes: Vec<Mark>,
}

impl Memory {
    /// Reserve a block for `form`. Returns false if it is already visible.
    pub fn declare(&mut self, form: &Form, origin: Option<InstructionId>) -> bool {
        let id = form.id();
        if self.blocks.contains_key(&id) {
            return false;
        }
        let start = self.slots.len();
        let len = form.slot_count();
        self.slots.resize(start + len, None);
        self.blocks.insert(
            id,
            Block {
                form: form.clone(),
                start,
                len,
                origin,
            },
        );
        self.order.push(id);
        true
    }

    pub fn get(&self, id: FormId) -> Option<&Form> {
        self.blocks.get(&id).map(|block| &block.form)
    }

    pub fn origin(&self, id: FormId) -> Option<InstructionId> {
        self.blocks.get(&id).and_then(|block| block.origin)
    }

    pub fn read(&self, id: FormId, offset: usize) -> Option<u64> {
        let block = self.blocks.get(&id)?;
        if offset >= block.len {
            return None;
        }
        self.slots[block.start + offset]
    }

    /// Returns false when the address is not backed by a declared block
    pub fn write(&mut self, id: FormId, offset: usize, word: u64) -> bool {
        let Some(block) = self.blocks.get(&id) else {
            return false;
        };
        if offset >= block.len {
            return false;
        }
        self.slots[block.start + offset] = Some(word);
        true
    }

    pub fn forms(&self) -> &[FormId] {
        &self.order
    }

    /// Forms declared since the innermost scope was entered
    pub fn scope_forms(&self) -> &[FormId] {
        let from = self.scopes.last().map_or(0, |mark| mark.declared);
        &self.order[from..]
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Mark {
            declared: self.order.len(),
            slots: self.slots.len(),
        });
    }

    /// Release everything declared in the innermost scope
    pub fn pop_scope(&mut self) {
        let Some(mark) = self.scopes.pop() else {
            return;
        };
        for id in self.order.drain(mark.declared..) {
            self.blocks.remove(&id);
        }
        self.slots.truncate(mark.slots);
    }
}
